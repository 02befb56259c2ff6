//! Sender/content classification.
//!
//! A message is a flight confirmation only when a known provider sent it,
//! its subject fits that provider, and it does not read as marketing. There
//! is no content-only fallback for unknown senders.

pub mod cancellation;
pub mod marketing;
pub mod scoring;

use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::extractor::{prepare_body, FieldExtractor};
use crate::message::RawMessage;
use crate::providers::{Provider, ProviderTable};
use crate::sanitize::redact_address;

pub use scoring::{score_message, FlightScore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Transactional flight confirmation from a known provider.
    Confirmation,
    /// Known provider, notice that a flight or booking was cancelled.
    Cancellation,
    /// Known provider, promotional content.
    Marketing,
    /// Known provider, but scored below the configured threshold.
    LowScore,
    /// No provider matched sender and subject.
    Unmatched,
}

#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub message: Arc<RawMessage>,
    pub kind: MessageKind,
    pub provider: Option<Arc<Provider>>,
    /// Present only when scoring is enabled and a provider matched.
    pub score: Option<FlightScore>,
}

impl ClassificationResult {
    pub fn is_flight_confirmation(&self) -> bool {
        self.kind == MessageKind::Confirmation
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_ref().map(|p| p.name.as_str())
    }
}

pub struct Classifier {
    providers: ProviderTable,
    extractor: Arc<FieldExtractor>,
    score_threshold: Option<i32>,
}

impl Classifier {
    pub fn new(providers: ProviderTable, extractor: Arc<FieldExtractor>) -> Self {
        Self {
            providers,
            extractor,
            score_threshold: None,
        }
    }

    /// Demotes provider-matched messages scoring below `threshold` to
    /// [`MessageKind::LowScore`].
    pub fn with_score_threshold(mut self, threshold: i32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    pub fn providers(&self) -> &ProviderTable {
        &self.providers
    }

    pub fn classify(&self, message: Arc<RawMessage>) -> ClassificationResult {
        let domain = message.sender_domain();
        let provider = self
            .providers
            .find_match(&message.sender, domain.as_deref(), &message.subject)
            .cloned();

        let Some(provider) = provider else {
            debug!(
                "Message {} from {} matched no provider",
                message.id,
                redact_address(&message.sender)
            );
            return ClassificationResult {
                message,
                kind: MessageKind::Unmatched,
                provider: None,
                score: None,
            };
        };

        let body = prepare_body(&message.body);

        let kind = if cancellation::is_cancellation(&message.subject, &body) {
            MessageKind::Cancellation
        } else if marketing::is_marketing(&message.subject, &body, self.extractor.confirmation()) {
            MessageKind::Marketing
        } else {
            MessageKind::Confirmation
        };

        let score = self
            .score_threshold
            .map(|_| score_message(&message, &body, Some(provider.as_ref()), &self.extractor));

        let kind = match (kind, self.score_threshold, &score) {
            (MessageKind::Confirmation, Some(threshold), Some(score)) if !score.passes(threshold) => {
                MessageKind::LowScore
            }
            (kind, _, _) => kind,
        };

        debug!(
            "Message {} classified as {:?} (provider {}, score {:?})",
            message.id,
            kind,
            provider.name,
            score.as_ref().map(|s| s.score)
        );

        ClassificationResult {
            message,
            kind,
            provider: Some(provider),
            score,
        }
    }
}
