//! Booking fingerprints.
//!
//! A fingerprint is the SHA-256 of the normalized trip attributes (route,
//! date, flight number). Same code with a different fingerprint means the
//! trip changed; same fingerprint means a true duplicate.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::extractor::flight_number::canonical;
use crate::extractor::{FlightRecord, Route};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(route: Option<&Route>, date: Option<NaiveDate>, flight_number: Option<&str>) -> Self {
        let (origin, destination) = route
            .map(|r| (r.origin.trim().to_uppercase(), r.destination.trim().to_uppercase()))
            .unwrap_or_default();
        let date = date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        let flight = flight_number.map(canonical).unwrap_or_default();

        let material = format!("{}|{}|{}|{}", origin, destination, date, flight);
        Self(sha256_hex(material.as_bytes()))
    }

    pub fn of(record: &FlightRecord) -> Self {
        Self::compute(
            record.route.as_ref(),
            record.flight_date,
            record.flight_number.as_deref(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut output = String::with_capacity(digest.len() * 2);
    for byte in digest {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}
