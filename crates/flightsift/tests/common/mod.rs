//! Shared test utilities for flightsift integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated runs with a temp history file
//! - Builder patterns for messages and configurations

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
