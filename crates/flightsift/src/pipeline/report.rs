use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use crate::history::Decision;
use crate::message::RawMessage;
use crate::selector::CanonicalBooking;

/// A canonical booking that must be forwarded, with the reason why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardRequest {
    pub decision: Decision,
    pub booking: CanonicalBooking,
}

impl ForwardRequest {
    pub fn confirmation_code(&self) -> Option<&str> {
        self.booking.confirmation_code.as_deref()
    }

    pub fn origin(&self) -> Option<&str> {
        self.booking.record.origin()
    }

    pub fn destination(&self) -> Option<&str> {
        self.booking.record.destination()
    }

    pub fn flight_date(&self) -> Option<NaiveDate> {
        self.booking.record.flight_date
    }

    pub fn flight_number(&self) -> Option<&str> {
        self.booking.record.flight_number.as_deref()
    }

    /// The email to forward: the latest message of the booking.
    pub fn source_message(&self) -> &RawMessage {
        &self.booking.record.source
    }

    pub fn is_update(&self) -> bool {
        self.decision == Decision::Update
    }

    /// Short human label for logs and progress events.
    pub fn label(&self) -> String {
        booking_label(&self.booking)
    }
}

pub(crate) fn booking_label(booking: &CanonicalBooking) -> String {
    if let Some(code) = &booking.confirmation_code {
        return code.clone();
    }
    let record = &booking.record;
    match (&record.route, record.flight_date) {
        (Some(route), Some(date)) => format!("{} on {}", route, date),
        (Some(route), None) => route.to_string(),
        _ => format!("message {}", record.message_id),
    }
}

/// Flight date first (undated last), then code, then message id.
pub(crate) fn forward_order(a: &ForwardRequest, b: &ForwardRequest) -> Ordering {
    let date_key = |r: &ForwardRequest| (r.flight_date().is_none(), r.flight_date());
    date_key(a)
        .cmp(&date_key(b))
        .then_with(|| a.confirmation_code().cmp(&b.confirmation_code()))
        .then_with(|| a.booking.record.message_id.cmp(&b.booking.record.message_id))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub messages: usize,
    pub confirmations: usize,
    pub cancellations: usize,
    pub marketing: usize,
    pub low_score: usize,
    pub unmatched: usize,
    /// Confirmations that yielded a record.
    pub records: usize,
    pub bookings: usize,
    /// Records folded into another record's booking.
    pub duplicates_merged: usize,
    pub new: usize,
    pub updates: usize,
    pub skipped: usize,
}

/// Outcome of a scan: what to forward and what is already imported.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub to_forward: Vec<ForwardRequest>,
    pub skipped: Vec<CanonicalBooking>,
    /// Confirmation codes named by cancellation notices, sorted. These
    /// bookings are never forwarded on the strength of the notice.
    pub cancelled: Vec<String>,
    pub stats: ScanStats,
}

impl ScanReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Outcome of [`super::forward_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForwardSummary {
    pub dry_run: bool,
    /// Labels of bookings sent, in order.
    pub forwarded: Vec<String>,
    pub failed: Vec<ForwardFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardFailure {
    pub booking: String,
    pub error: String,
}
