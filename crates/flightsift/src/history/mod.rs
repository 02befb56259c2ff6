//! Persisted record of forwarded bookings, keyed by confirmation code.

mod error;
mod store;

pub use error::HistoryError;
pub use store::{Decision, HistoryStats, HistoryStore, ProcessedFlightEntry, HISTORY_VERSION};
