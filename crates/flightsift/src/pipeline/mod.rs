//! Scan orchestration and forwarding.

pub mod forward;
pub mod progress;
pub mod report;
pub mod runner;
pub mod source;

pub use forward::{forward_all, Forwarder};
pub use progress::{LogProgress, NoopProgress, ProgressReporter, ScanEvent, ScanPhase};
pub use report::{ForwardFailure, ForwardRequest, ForwardSummary, ScanReport, ScanStats};
pub use runner::ScanPipeline;
pub use source::{MessageSource, VecSource};
