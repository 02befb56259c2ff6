use std::sync::Arc;

use tracing::{debug, info, info_span};

use crate::airports::AirportReference;
use crate::classifier::{ClassificationResult, Classifier, MessageKind};
use crate::config::Config;
use crate::error::{ConfigError, TransportError};
use crate::extractor::{prepare_body, FieldExtractor, FlightRecord};
use crate::grouping;
use crate::history::{Decision, HistoryStore};
use crate::message::RawMessage;
use crate::providers::ProviderTable;
use crate::sanitize;
use crate::selector::{self, CanonicalBooking};

use super::progress::{ProgressReporter, ScanEvent, ScanPhase};
use super::report::{forward_order, ForwardRequest, ScanReport, ScanStats};
use super::source::MessageSource;

/// classify -> extract -> group -> select -> decide, over one batch of
/// messages. Holds only read-only reference data.
pub struct ScanPipeline {
    classifier: Classifier,
    extractor: Arc<FieldExtractor>,
}

impl ScanPipeline {
    /// Production constructor: builds reference data and tables from config.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let airports = match &config.airports_file {
            Some(path) => AirportReference::with_file(path)?,
            None => AirportReference::builtin(),
        }
        .with_denied_codes(&config.deny_list.airport_codes);

        let providers = ProviderTable::with_extra(&config.providers)?;
        let extractor = Arc::new(
            FieldExtractor::new(Arc::new(airports))
                .with_denied_codes(&config.deny_list.confirmation_codes)
                .with_provider_names(providers.iter().map(|p| p.name.clone())),
        );

        let mut classifier = Classifier::new(providers, Arc::clone(&extractor));
        if config.scoring.enabled {
            classifier = classifier.with_score_threshold(config.scoring.threshold);
        }

        debug!(
            "Scan pipeline ready: {} airports, {} providers, scoring {}",
            extractor.airports().len(),
            classifier.providers().len(),
            if config.scoring.enabled { "on" } else { "off" }
        );

        Ok(Self::new(classifier, extractor))
    }

    /// Inject specific components. `extractor` should be the one the
    /// classifier was built with.
    pub fn new(classifier: Classifier, extractor: Arc<FieldExtractor>) -> Self {
        Self {
            classifier,
            extractor,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn extractor(&self) -> &FieldExtractor {
        &self.extractor
    }

    /// Drains `source` and scans everything it returned.
    pub fn scan_source(
        &self,
        source: &mut dyn MessageSource,
        history: &HistoryStore,
        progress: &dyn ProgressReporter,
    ) -> Result<ScanReport, TransportError> {
        let mut messages = Vec::new();
        while let Some(message) = source.next_message()? {
            messages.push(message);
        }
        Ok(self.scan(messages, history, progress))
    }

    /// Scans a batch. The history is only read; nothing is persisted here.
    pub fn scan(
        &self,
        messages: Vec<RawMessage>,
        history: &HistoryStore,
        progress: &dyn ProgressReporter,
    ) -> ScanReport {
        let _scan_span = info_span!("scan", messages = messages.len()).entered();
        let mut stats = ScanStats {
            messages: messages.len(),
            ..ScanStats::default()
        };

        // Step 1: Classify
        let classified: Vec<ClassificationResult> = {
            let _step = info_span!("classify").entered();
            progress.report(ScanEvent::Phase {
                phase: ScanPhase::Classifying,
                message: format!("Classifying {} messages...", messages.len()),
            });
            let classified: Vec<_> = messages
                .into_iter()
                .map(|m| self.classifier.classify(Arc::new(m)))
                .collect();
            for result in &classified {
                match result.kind {
                    MessageKind::Confirmation => stats.confirmations += 1,
                    MessageKind::Cancellation => stats.cancellations += 1,
                    MessageKind::Marketing => stats.marketing += 1,
                    MessageKind::LowScore => stats.low_score += 1,
                    MessageKind::Unmatched => stats.unmatched += 1,
                }
            }
            classified
        };

        let mut cancelled: Vec<String> = classified
            .iter()
            .filter(|result| result.kind == MessageKind::Cancellation)
            .filter_map(|result| {
                let body = prepare_body(&result.message.body);
                self.extractor
                    .confirmation()
                    .extract(&result.message.subject, &body, result.provider.as_deref())
                    .map(|m| m.code)
            })
            .collect();
        cancelled.sort_unstable();
        cancelled.dedup();

        // Step 2: Extract
        let records: Vec<FlightRecord> = {
            let _step = info_span!("extract", confirmations = stats.confirmations).entered();
            progress.report(ScanEvent::Phase {
                phase: ScanPhase::Extracting,
                message: format!("Extracting {} confirmations...", stats.confirmations),
            });
            classified
                .iter()
                .filter_map(|result| {
                    let record = self.extractor.extract(result);
                    if record.is_none() && result.is_flight_confirmation() {
                        debug!(
                            message_id = %sanitize::short_hash(&result.message.id),
                            "confirmation yielded no record"
                        );
                    }
                    record
                })
                .collect()
        };
        stats.records = records.len();

        // Step 3: Group and select
        let bookings: Vec<CanonicalBooking> = {
            let _step = info_span!("group", records = records.len()).entered();
            progress.report(ScanEvent::Phase {
                phase: ScanPhase::Grouping,
                message: format!("Grouping {} records into bookings...", records.len()),
            });
            grouping::group(records)
                .into_iter()
                .filter_map(selector::select)
                .collect()
        };
        stats.bookings = bookings.len();
        stats.duplicates_merged = stats.records.saturating_sub(stats.bookings);

        // Step 4: Decide against history
        let mut report = {
            let _step = info_span!("decide", bookings = bookings.len()).entered();
            progress.report(ScanEvent::Phase {
                phase: ScanPhase::Deciding,
                message: format!("Checking {} bookings against history...", bookings.len()),
            });
            let mut report = ScanReport::default();
            for booking in bookings {
                match history.decide(&booking) {
                    Decision::Skip => {
                        stats.skipped += 1;
                        report.skipped.push(booking);
                    }
                    decision => {
                        if decision == Decision::Update {
                            stats.updates += 1;
                        } else {
                            stats.new += 1;
                        }
                        report.to_forward.push(ForwardRequest { decision, booking });
                    }
                }
            }
            report
        };
        report.to_forward.sort_by(forward_order);
        report.cancelled = cancelled;
        report.stats = stats;

        info!(
            messages = report.stats.messages,
            confirmations = report.stats.confirmations,
            cancellations = report.stats.cancellations,
            bookings = report.stats.bookings,
            new = report.stats.new,
            updates = report.stats.updates,
            skipped = report.stats.skipped,
            "Scan complete"
        );

        report
    }
}
