use chrono::Utc;
use tracing::{info, info_span, warn};

use crate::error::{FlightsiftError, ForwardError};
use crate::history::HistoryStore;

use super::progress::{ProgressReporter, ScanEvent, ScanPhase};
use super::report::{ForwardFailure, ForwardRequest, ForwardSummary, ScanReport};

/// Sends one booking's source message downstream.
///
/// Implementations own composition, authentication, retries and backoff.
pub trait Forwarder {
    /// Returns a reference to the outbound message (for example its
    /// Message-ID), stored in the history entry.
    fn forward(&mut self, request: &ForwardRequest) -> Result<String, ForwardError>;
}

/// Forwards every booking in `report` in order, committing each one to
/// `history` right after its own successful forward.
///
/// A dry run forwards and commits nothing. When the first forward fails the
/// run stops with [`ForwardError::Aborted`]; later failures are collected in
/// the summary and the remaining bookings still go out. A history write
/// failure stops the run.
pub fn forward_all(
    report: &ScanReport,
    history: &mut HistoryStore,
    forwarder: &mut dyn Forwarder,
    dry_run: bool,
    progress: &dyn ProgressReporter,
) -> Result<ForwardSummary, FlightsiftError> {
    let total = report.to_forward.len();
    let _span = info_span!("forward", total, dry_run).entered();

    let mut summary = ForwardSummary {
        dry_run,
        ..ForwardSummary::default()
    };

    if dry_run {
        info!("Dry run: {} booking(s) would be forwarded", total);
        progress.report(ScanEvent::Completed {
            forwarded: 0,
            failed: 0,
            skipped: report.skipped.len(),
        });
        return Ok(summary);
    }

    progress.report(ScanEvent::Phase {
        phase: ScanPhase::Forwarding,
        message: format!("Forwarding {} booking(s)...", total),
    });

    for (index, request) in report.to_forward.iter().enumerate() {
        let label = request.label();
        let _step = info_span!("forward_booking", index, booking = %label).entered();

        match forwarder.forward(request) {
            Ok(reference) => {
                history.commit(&request.booking, &reference, Utc::now())?;
                progress.report(ScanEvent::Forwarded {
                    index,
                    total,
                    booking: label.clone(),
                    decision: request.decision,
                });
                summary.forwarded.push(label);
            }
            Err(e) if index == 0 => {
                warn!("First forward failed, stopping: {}", e);
                progress.report(ScanEvent::ForwardFailed {
                    index,
                    total,
                    booking: label,
                    error: e.to_string(),
                });
                return Err(ForwardError::Aborted(e.to_string()).into());
            }
            Err(e) => {
                warn!("Failed to forward {}: {}", label, e);
                progress.report(ScanEvent::ForwardFailed {
                    index,
                    total,
                    booking: label.clone(),
                    error: e.to_string(),
                });
                summary.failed.push(ForwardFailure {
                    booking: label,
                    error: e.to_string(),
                });
            }
        }
    }

    progress.report(ScanEvent::Completed {
        forwarded: summary.forwarded.len(),
        failed: summary.failed.len(),
        skipped: report.skipped.len(),
    });

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::history::Decision;
    use crate::message::RawMessage;
    use crate::pipeline::progress::testing::RecordingProgress;
    use crate::pipeline::progress::NoopProgress;
    use crate::pipeline::ScanPipeline;
    use chrono::TimeZone;
    use tempfile::TempDir;

    /// Fails on the listed call indexes.
    struct ScriptedForwarder {
        fail_on: Vec<usize>,
        calls: usize,
        sent: Vec<String>,
    }

    impl ScriptedForwarder {
        fn new(fail_on: &[usize]) -> Self {
            Self {
                fail_on: fail_on.to_vec(),
                calls: 0,
                sent: Vec::new(),
            }
        }
    }

    impl Forwarder for ScriptedForwarder {
        fn forward(&mut self, request: &ForwardRequest) -> Result<String, ForwardError> {
            let call = self.calls;
            self.calls += 1;
            if self.fail_on.contains(&call) {
                return Err(ForwardError::Transport("550 rate limited".to_string()));
            }
            self.sent.push(request.label());
            Ok(format!("<fwd-{}@test>", call))
        }
    }

    fn messages() -> Vec<RawMessage> {
        ["EJZOSU", "DJWNTF", "KQPLMR"]
            .iter()
            .enumerate()
            .map(|(i, code)| {
                RawMessage::new(
                    format!("m{}", i),
                    "JetBlue <reservations@jetblue.com>",
                    format!("Your upcoming trip - {}", code),
                    format!(
                        "Your confirmation code is {}.\nBoston to Las Vegas\nDec {:02}\nFlight {}",
                        code,
                        7 + i,
                        349 + i
                    ),
                    Utc.with_ymd_and_hms(2025, 11, 1, 9, 0, 0).unwrap(),
                )
            })
            .collect()
    }

    fn scan(history: &HistoryStore) -> ScanReport {
        ScanPipeline::from_config(&Config::default())
            .unwrap()
            .scan(messages(), history, &NoopProgress)
    }

    #[test]
    fn test_forward_all_commits_each_success() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        let mut history = HistoryStore::open(&path).unwrap();
        let report = scan(&history);
        assert_eq!(report.to_forward.len(), 3);

        let mut forwarder = ScriptedForwarder::new(&[]);
        let progress = RecordingProgress::default();
        let summary = forward_all(&report, &mut history, &mut forwarder, false, &progress).unwrap();

        assert_eq!(summary.forwarded, vec!["EJZOSU", "DJWNTF", "KQPLMR"]);
        assert!(summary.failed.is_empty());
        let reloaded = HistoryStore::open(&path).unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded.get("DJWNTF").unwrap().forwarded_message, "<fwd-1@test>");
        assert!(matches!(
            progress.events().last(),
            Some(ScanEvent::Completed { forwarded: 3, failed: 0, skipped: 0 })
        ));
    }

    #[test]
    fn test_dry_run_sends_and_commits_nothing() {
        let mut history = HistoryStore::in_memory();
        let report = scan(&history);
        let mut forwarder = ScriptedForwarder::new(&[]);

        let summary = forward_all(&report, &mut history, &mut forwarder, true, &NoopProgress).unwrap();
        assert!(summary.dry_run);
        assert_eq!(forwarder.calls, 0);
        assert!(history.is_empty());
    }

    #[test]
    fn test_first_failure_aborts_without_commit() {
        let mut history = HistoryStore::in_memory();
        let report = scan(&history);
        let mut forwarder = ScriptedForwarder::new(&[0]);

        let err = forward_all(&report, &mut history, &mut forwarder, false, &NoopProgress).unwrap_err();
        assert!(matches!(err, FlightsiftError::Forward(ForwardError::Aborted(_))));
        assert_eq!(forwarder.calls, 1);
        assert!(history.is_empty());
    }

    #[test]
    fn test_later_failure_continues_and_rerun_retries_only_failed() {
        let mut history = HistoryStore::in_memory();
        let report = scan(&history);
        let mut forwarder = ScriptedForwarder::new(&[1]);

        let summary = forward_all(&report, &mut history, &mut forwarder, false, &NoopProgress).unwrap();
        assert_eq!(summary.forwarded, vec!["EJZOSU", "KQPLMR"]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].booking, "DJWNTF");

        let rerun = scan(&history);
        assert_eq!(rerun.skipped.len(), 2);
        assert_eq!(rerun.to_forward.len(), 1);
        assert_eq!(rerun.to_forward[0].confirmation_code(), Some("DJWNTF"));
        assert_eq!(rerun.to_forward[0].decision, Decision::New);
    }
}
