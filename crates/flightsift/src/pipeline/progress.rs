use log::{info, warn};

use crate::history::Decision;

/// Stages of a scan run, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Classifying,
    Extracting,
    Grouping,
    Deciding,
    Forwarding,
}

/// Events emitted by the pipeline while scanning and forwarding.
/// Message bodies are never part of an event.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Phase {
        phase: ScanPhase,
        message: String,
    },
    Forwarded {
        index: usize,
        total: usize,
        booking: String,
        decision: Decision,
    },
    ForwardFailed {
        index: usize,
        total: usize,
        booking: String,
        error: String,
    },
    Completed {
        forwarded: usize,
        failed: usize,
        skipped: usize,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ScanEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ScanEvent) {}
}

/// Writes every event to the `log` facade.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ScanEvent) {
        match event {
            ScanEvent::Phase { phase, message } => info!("[{:?}] {}", phase, message),
            ScanEvent::Forwarded {
                index,
                total,
                booking,
                decision,
            } => info!("[{}/{}] Forwarded {} ({:?})", index + 1, total, booking, decision),
            ScanEvent::ForwardFailed {
                index,
                total,
                booking,
                error,
            } => warn!("[{}/{}] Failed to forward {}: {}", index + 1, total, booking, error),
            ScanEvent::Completed {
                forwarded,
                failed,
                skipped,
            } => info!(
                "Forwarding complete: {} sent, {} failed, {} already imported",
                forwarded, failed, skipped
            ),
        }
    }
}
