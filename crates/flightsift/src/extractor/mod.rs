//! Field extraction: turns a classified confirmation into a [`FlightRecord`].
//!
//! Each field has its own ordered list of strategies (specific before
//! generic) and the first strategy that yields a value wins. Extraction
//! never fails; fields it cannot find stay `None`.

pub mod confirmation;
pub mod date;
pub mod flight_number;
pub mod route;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use serde::Serialize;

use crate::airports::AirportReference;
use crate::classifier::ClassificationResult;
use crate::message::{looks_like_html, strip_html, RawMessage};
use crate::providers::Provider;

pub use confirmation::{ConfirmationExtractor, ConfirmationMatch};
pub use route::RouteExtractor;

/// Which strategy produced a confirmation code. Ordered by specificity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeSource {
    /// Six-character token near a booking keyword.
    Generic,
    /// Built-in labeled form such as "Record Locator: XXXXXX".
    Labeled,
    /// Provider-specific pattern.
    Provider,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Route {
    pub origin: String,
    pub destination: String,
}

impl Route {
    /// Builds a route, refusing one that starts and ends at the same airport.
    pub fn new(origin: &str, destination: &str) -> Option<Self> {
        if origin == destination {
            return None;
        }
        Some(Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
        })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.origin, self.destination)
    }
}

/// Facts extracted from one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightRecord {
    pub message_id: String,
    pub confirmation_code: Option<String>,
    pub code_source: Option<CodeSource>,
    pub route: Option<Route>,
    pub flight_date: Option<NaiveDate>,
    pub flight_number: Option<String>,
    pub received_at: DateTime<Utc>,
    pub provider: Option<String>,
    #[serde(skip)]
    pub source: Arc<RawMessage>,
}

impl FlightRecord {
    pub fn origin(&self) -> Option<&str> {
        self.route.as_ref().map(|r| r.origin.as_str())
    }

    pub fn destination(&self) -> Option<&str> {
        self.route.as_ref().map(|r| r.destination.as_str())
    }

    /// Trimmed, uppercased confirmation code, if any.
    pub fn normalized_code(&self) -> Option<String> {
        self.confirmation_code
            .as_deref()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
    }
}

/// Runs every field's strategies over a message.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    airports: Arc<AirportReference>,
    confirmation: ConfirmationExtractor,
    routes: RouteExtractor,
}

impl FieldExtractor {
    pub fn new(airports: Arc<AirportReference>) -> Self {
        Self {
            routes: RouteExtractor::new(Arc::clone(&airports)),
            confirmation: ConfirmationExtractor::new().with_airports(Arc::clone(&airports)),
            airports,
        }
    }

    /// Adds confirmation-code deny-list entries.
    pub fn with_denied_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.confirmation = self.confirmation.with_denied_codes(codes);
        self
    }

    /// Keeps provider names from being read as confirmation codes.
    pub fn with_provider_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.confirmation = self.confirmation.with_provider_names(names);
        self
    }

    pub fn airports(&self) -> &AirportReference {
        &self.airports
    }

    pub fn confirmation(&self) -> &ConfirmationExtractor {
        &self.confirmation
    }

    pub fn routes(&self) -> &RouteExtractor {
        &self.routes
    }

    /// Extracts a record from a message classified as a confirmation.
    /// Anything else yields `None`.
    pub fn extract(&self, classified: &ClassificationResult) -> Option<FlightRecord> {
        if !classified.is_flight_confirmation() {
            return None;
        }
        self.extract_message(&classified.message, classified.provider.as_deref())
    }

    /// Extracts a record regardless of classification. Returns `None` when
    /// the message has neither a confirmation code nor a route.
    pub fn extract_message(
        &self,
        message: &Arc<RawMessage>,
        provider: Option<&Provider>,
    ) -> Option<FlightRecord> {
        let body = prepare_body(&message.body);
        let subject = message.subject.as_str();

        let code = self.confirmation.extract(subject, &body, provider);
        let route = self.routes.extract_for(
            subject,
            &body,
            provider.and_then(Provider::primary_airline_code),
        );

        if code.is_none() && route.is_none() {
            debug!("Message {} has no confirmation code and no route, dropping", message.id);
            return None;
        }

        let received = message.received_at.date_naive();
        let record = FlightRecord {
            message_id: message.id.clone(),
            confirmation_code: code.as_ref().map(|c| c.code.clone()),
            code_source: code.as_ref().map(|c| c.source),
            route,
            flight_date: date::extract_date(subject, &body, received),
            flight_number: flight_number::extract_flight_number(subject, &body, provider),
            received_at: message.received_at,
            provider: provider.map(|p| p.name.clone()),
            source: Arc::clone(message),
        };

        debug!(
            "Extracted message {}: code={:?} route={:?} date={:?} flight={:?}",
            message.id,
            record.confirmation_code,
            record.route.as_ref().map(|r| r.to_string()),
            record.flight_date,
            record.flight_number
        );
        Some(record)
    }
}

/// Flattens HTML and non-breaking spaces so the field rules see plain text.
pub(crate) fn prepare_body(body: &str) -> String {
    let text = if looks_like_html(body) {
        strip_html(body)
    } else {
        body.to_string()
    };
    text.replace('\u{a0}', " ")
}
