//! Booking grouping: partitions extracted records into bookings.
//!
//! Records with a confirmation code are grouped by that code. A record
//! without one joins a coded group only when exactly one group's canonical
//! record has the same route and date and no conflicting flight number;
//! otherwise code-less records group by route and date, or stand alone when
//! they have no date. The result does not depend on input order.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

use crate::extractor::flight_number::canonical;
use crate::extractor::{FlightRecord, Route};
use crate::selector::pick_canonical;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupKey {
    Confirmation { code: String },
    Route { route: Route, date: NaiveDate },
    Single { message_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingGroup {
    pub key: GroupKey,
    /// Sorted by receipt time, then message id.
    pub records: Vec<FlightRecord>,
}

impl BookingGroup {
    pub fn confirmation_code(&self) -> Option<&str> {
        match &self.key {
            GroupKey::Confirmation { code } => Some(code),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Trip attributes of a coded group's canonical record.
struct Anchor {
    code: String,
    route: Route,
    date: NaiveDate,
    flight_number: Option<String>,
}

impl Anchor {
    fn accepts(&self, record: &FlightRecord) -> bool {
        let same_trip = record.route.as_ref() == Some(&self.route) && record.flight_date == Some(self.date);
        let conflicting_flight = match (&self.flight_number, &record.flight_number) {
            (Some(a), Some(b)) => canonical(a) != canonical(b),
            _ => false,
        };
        same_trip && !conflicting_flight
    }
}

/// Partitions `records` into booking groups. Every record lands in exactly
/// one group.
pub fn group(records: Vec<FlightRecord>) -> Vec<BookingGroup> {
    let mut coded: BTreeMap<String, Vec<FlightRecord>> = BTreeMap::new();
    let mut uncoded = Vec::new();
    for record in records {
        match record.normalized_code() {
            Some(code) => coded.entry(code).or_default().push(record),
            None => uncoded.push(record),
        }
    }

    // Anchors come from the coded groups as they stand before any merge.
    let anchors: Vec<Anchor> = coded
        .iter()
        .filter_map(|(code, records)| {
            let chosen = pick_canonical(records)?;
            Some(Anchor {
                code: code.clone(),
                route: chosen.route.clone()?,
                date: chosen.flight_date?,
                flight_number: chosen.flight_number.clone(),
            })
        })
        .collect();

    let mut fallback: BTreeMap<GroupKey, Vec<FlightRecord>> = BTreeMap::new();
    for record in uncoded {
        let mut matches = anchors.iter().filter(|a| a.accepts(&record));
        match (matches.next(), matches.next()) {
            (Some(anchor), None) => {
                debug!(
                    "Code-less message {} joins booking {}",
                    record.message_id, anchor.code
                );
                coded.entry(anchor.code.clone()).or_default().push(record);
            }
            _ => {
                let key = match (&record.route, record.flight_date) {
                    (Some(route), Some(date)) => GroupKey::Route {
                        route: route.clone(),
                        date,
                    },
                    _ => GroupKey::Single {
                        message_id: record.message_id.clone(),
                    },
                };
                fallback.entry(key).or_default().push(record);
            }
        }
    }

    let mut groups: Vec<BookingGroup> = coded
        .into_iter()
        .map(|(code, records)| (GroupKey::Confirmation { code }, records))
        .chain(fallback)
        .map(|(key, mut records)| {
            records.sort_by(|a, b| {
                a.received_at
                    .cmp(&b.received_at)
                    .then_with(|| a.message_id.cmp(&b.message_id))
            });
            BookingGroup { key, records }
        })
        .collect();
    groups.sort_by(|a, b| a.key.cmp(&b.key));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::CodeSource;
    use crate::message::RawMessage;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn record(id: &str, code: Option<&str>, route: (&str, &str), day: Option<u32>) -> FlightRecord {
        let received_at = Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap();
        FlightRecord {
            message_id: id.to_string(),
            confirmation_code: code.map(str::to_string),
            code_source: code.map(|_| CodeSource::Labeled),
            route: Route::new(route.0, route.1),
            flight_date: day.and_then(|d| NaiveDate::from_ymd_opt(2025, 12, d)),
            flight_number: None,
            received_at,
            provider: None,
            source: Arc::new(RawMessage::new(id, "x@y.com", "s", "b", received_at)),
        }
    }

    fn ids(group: &BookingGroup) -> Vec<&str> {
        group.records.iter().map(|r| r.message_id.as_str()).collect()
    }

    #[test]
    fn test_groups_by_code_case_insensitively() {
        let groups = group(vec![
            record("1", Some("djwntf"), ("LAX", "SFO"), Some(7)),
            record("2", Some(" DJWNTF "), ("LAX", "SFO"), Some(7)),
            record("3", Some("EJZOSU"), ("BOS", "LAS"), Some(7)),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].confirmation_code(), Some("DJWNTF"));
        assert_eq!(ids(&groups[0]), vec!["1", "2"]);
        assert_eq!(groups[1].confirmation_code(), Some("EJZOSU"));
    }

    #[test]
    fn test_codeless_record_joins_unique_matching_group() {
        let groups = group(vec![
            record("1", Some("DJWNTF"), ("LAX", "SFO"), Some(7)),
            record("2", None, ("LAX", "SFO"), Some(7)),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["1", "2"]);
    }

    #[test]
    fn test_codeless_record_never_merges_on_date_alone() {
        let groups = group(vec![
            record("1", Some("DJWNTF"), ("LAX", "SFO"), Some(7)),
            record("2", None, ("BOS", "SFO"), Some(7)),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups[1].key,
            GroupKey::Route {
                route: Route::new("BOS", "SFO").unwrap(),
                date: NaiveDate::from_ymd_opt(2025, 12, 7).unwrap(),
            }
        );
    }

    #[test]
    fn test_ambiguous_match_stays_separate() {
        let groups = group(vec![
            record("1", Some("DJWNTF"), ("LAX", "SFO"), Some(7)),
            record("2", Some("EJZOSU"), ("LAX", "SFO"), Some(7)),
            record("3", None, ("LAX", "SFO"), Some(7)),
        ]);
        assert_eq!(groups.len(), 3);
        assert!(matches!(groups[2].key, GroupKey::Route { .. }));
    }

    #[test]
    fn test_conflicting_flight_number_stays_separate() {
        let mut coded = record("1", Some("DJWNTF"), ("LAX", "SFO"), Some(7));
        coded.flight_number = Some("UA100".to_string());
        let mut loose = record("2", None, ("LAX", "SFO"), Some(7));
        loose.flight_number = Some("UA200".to_string());
        assert_eq!(group(vec![coded, loose]).len(), 2);
    }

    #[test]
    fn test_dateless_codeless_records_are_singletons() {
        let groups = group(vec![
            record("1", None, ("LAX", "SFO"), None),
            record("2", None, ("LAX", "SFO"), None),
        ]);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| matches!(g.key, GroupKey::Single { .. })));
    }

    #[test]
    fn test_partition_and_order_independence() {
        let records = vec![
            record("1", Some("DJWNTF"), ("LAX", "SFO"), Some(7)),
            record("2", None, ("LAX", "SFO"), Some(7)),
            record("3", Some("EJZOSU"), ("BOS", "LAS"), Some(9)),
            record("4", None, ("JFK", "MIA"), Some(1)),
            record("5", None, ("JFK", "MIA"), None),
            record("6", Some("djwntf"), ("LAX", "SFO"), Some(7)),
        ];

        let forward = group(records.clone());
        let mut reversed_input = records.clone();
        reversed_input.reverse();
        let reversed = group(reversed_input);
        assert_eq!(forward, reversed);

        let mut seen: Vec<&str> = forward.iter().flat_map(ids).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec!["1", "2", "3", "4", "5", "6"]);
    }
}
