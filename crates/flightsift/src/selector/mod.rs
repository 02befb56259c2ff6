//! Canonical selection: one representative record per booking group.

use serde::Serialize;

use crate::extractor::FlightRecord;
use crate::fingerprint::Fingerprint;
use crate::grouping::{BookingGroup, GroupKey};

/// The record chosen to represent a booking, plus what the group told us.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalBooking {
    pub confirmation_code: Option<String>,
    pub record: FlightRecord,
    pub emails_found: usize,
    pub fingerprint: Fingerprint,
}

/// A record carrying a confirmation code always beats a code-less one
/// that joined its group. Among the rest the latest message wins; ties go
/// to the more specific code source, then to the larger message id so that
/// the choice never depends on input order.
pub fn pick_canonical(records: &[FlightRecord]) -> Option<&FlightRecord> {
    records.iter().max_by(|a, b| {
        a.confirmation_code
            .is_some()
            .cmp(&b.confirmation_code.is_some())
            .then_with(|| a.received_at.cmp(&b.received_at))
            .then_with(|| a.code_source.cmp(&b.code_source))
            .then_with(|| a.message_id.cmp(&b.message_id))
    })
}

/// Picks the canonical record of `group`. Returns `None` only for an empty
/// group, which [`crate::grouping::group`] never produces.
pub fn select(group: BookingGroup) -> Option<CanonicalBooking> {
    let emails_found = group.records.len();
    let record = pick_canonical(&group.records)?.clone();
    let confirmation_code = match group.key {
        GroupKey::Confirmation { code } => Some(code),
        _ => None,
    };
    let fingerprint = Fingerprint::of(&record);

    Some(CanonicalBooking {
        confirmation_code,
        record,
        emails_found,
        fingerprint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{CodeSource, Route};
    use crate::grouping::group;
    use crate::message::RawMessage;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use std::sync::Arc;

    fn record(id: &str, received_at: DateTime<Utc>, source: CodeSource, day: u32) -> FlightRecord {
        FlightRecord {
            message_id: id.to_string(),
            confirmation_code: Some("DJWNTF".to_string()),
            code_source: Some(source),
            route: Route::new("LAX", "SFO"),
            flight_date: NaiveDate::from_ymd_opt(2025, 12, day),
            flight_number: Some("UA100".to_string()),
            received_at,
            provider: Some("United".to_string()),
            source: Arc::new(RawMessage::new(id, "a@united.com", "s", "b", received_at)),
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_latest_timestamp_wins() {
        let records = vec![
            record("b", at(9), CodeSource::Provider, 7),
            record("a", at(10), CodeSource::Generic, 9),
        ];
        let booking = select(group(records).remove(0)).unwrap();
        assert_eq!(booking.record.message_id, "a");
        assert_eq!(booking.record.flight_date, NaiveDate::from_ymd_opt(2025, 12, 9));
        assert_eq!(booking.emails_found, 2);
        assert_eq!(booking.confirmation_code.as_deref(), Some("DJWNTF"));
    }

    #[test]
    fn test_tie_prefers_specific_source() {
        let records = vec![
            record("a", at(10), CodeSource::Generic, 7),
            record("b", at(10), CodeSource::Provider, 9),
            record("c", at(10), CodeSource::Labeled, 8),
        ];
        assert_eq!(pick_canonical(&records).unwrap().message_id, "b");
    }

    #[test]
    fn test_selection_ignores_input_order() {
        let mut records = vec![
            record("a", at(10), CodeSource::Labeled, 7),
            record("b", at(10), CodeSource::Labeled, 9),
        ];
        let first = pick_canonical(&records).unwrap().message_id.clone();
        records.reverse();
        assert_eq!(pick_canonical(&records).unwrap().message_id, first);
    }

    #[test]
    fn test_codeless_joiner_never_becomes_canonical() {
        let coded = record("a", at(9), CodeSource::Labeled, 7);
        let mut reminder = record("b", at(12), CodeSource::Labeled, 7);
        reminder.confirmation_code = None;
        reminder.code_source = None;
        reminder.flight_number = None;

        let groups = group(vec![coded.clone(), reminder]);
        assert_eq!(groups.len(), 1);
        let booking = select(groups.into_iter().next().unwrap()).unwrap();
        assert_eq!(booking.record.message_id, "a");
        assert_eq!(booking.emails_found, 2);
        assert_eq!(booking.fingerprint, Fingerprint::of(&coded));
    }

    #[test]
    fn test_empty_group() {
        assert_eq!(pick_canonical(&[]), None);
    }
}
