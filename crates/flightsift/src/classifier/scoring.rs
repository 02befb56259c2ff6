//! Weighted flight-likelihood scoring.
//!
//! Only consulted for messages whose sender already matched a provider; a
//! high score never admits an unknown sender.

use serde::Serialize;

use crate::extractor::{flight_number, FieldExtractor};
use crate::message::RawMessage;
use crate::providers::Provider;

pub const DEFAULT_THRESHOLD: i32 = 50;

pub mod weights {
    pub const AIRPORTS_MULTIPLE: i32 = 30;
    pub const AIRPORTS_SINGLE: i32 = 10;
    pub const FLIGHT_NUMBER: i32 = 25;
    pub const PNR: i32 = 15;
    pub const FLIGHT_PHRASE: i32 = 10;
    pub const PROVIDER_DOMAIN: i32 = 20;
    pub const HOTEL_DOMAIN: i32 = -30;
    pub const ACCOMMODATION_TEXT: i32 = -30;
    pub const SPAM_PHRASE: i32 = -15;
    pub const SURVEY: i32 = -20;
}

const MAX_FLIGHT_PHRASES: usize = 5;
const MAX_SPAM_PHRASES: usize = 3;

pub const FLIGHT_PHRASES: &[&str] = &[
    "boarding pass",
    "e-ticket",
    "eticket",
    "itinerary",
    "flight confirmation",
    "booking confirmation",
    "reservation confirmation",
    "check-in",
    "check in online",
    "confirmation code",
    "confirmation number",
    "record locator",
    "departure",
    "arrival",
    "terminal",
    "gate",
    "seat assignment",
    "baggage",
    "carry-on",
    "checked bag",
    "reservation number",
    "booking reference",
];

pub const HOTEL_DOMAINS: &[&str] = &[
    "airbnb.com",
    "vrbo.com",
    "booking.com",
    "hotels.com",
    "marriott.com",
    "hilton.com",
    "hyatt.com",
    "ihg.com",
    "wyndham.com",
    "choicehotels.com",
    "trivago.com",
    "hostelworld.com",
];

const ACCOMMODATION_PHRASES: &[&str] = &[
    "airbnb",
    "where you're staying",
    "your stay",
    "your host",
    "check-in time",
];

pub const SPAM_PHRASES: &[&str] = &[
    "earn miles",
    "bonus miles",
    "limited time",
    "act now",
    "special offer",
    "unsubscribe",
    "email preferences",
    "promotional",
    "sale ends",
    "book now and save",
    "exclusive experiences",
    "reach status",
    "make an impact",
    "get more with",
    "discover exclusive",
    "your benefits",
];

const SURVEY_PHRASES: &[&str] = &[
    "survey",
    "how was your flight",
    "rate your experience",
    "feedback",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightScore {
    pub score: i32,
    pub reasons: Vec<String>,
}

impl FlightScore {
    pub fn passes(&self, threshold: i32) -> bool {
        self.score >= threshold
    }

    fn add(&mut self, weight: i32, reason: impl Into<String>) {
        self.score += weight;
        self.reasons.push(reason.into());
    }
}

/// Scores `message` using the same route, flight-number and code rules as
/// the extractor. `body` is the flattened body text.
pub fn score_message(
    message: &RawMessage,
    body: &str,
    provider: Option<&Provider>,
    extractor: &FieldExtractor,
) -> FlightScore {
    let mut score = FlightScore {
        score: 0,
        reasons: Vec::new(),
    };
    let subject = message.subject.as_str();
    let text = format!("{} {}", subject, body);
    let lower = text.to_lowercase();
    let sender = message.sender_address();

    if let Some(route) = extractor.routes().extract(subject, body) {
        score.add(weights::AIRPORTS_MULTIPLE, format!("Route: {}", route));
    } else {
        let airports = extractor.routes().route_airports(&text);
        match airports.len() {
            0 => {}
            1 => score.add(weights::AIRPORTS_SINGLE, format!("Airport: {}", airports[0])),
            _ => score.add(
                weights::AIRPORTS_MULTIPLE,
                format!("Airports: {}", airports.join(", ")),
            ),
        }
    }

    if let Some(number) = flight_number::extract_flight_number(subject, body, provider) {
        score.add(weights::FLIGHT_NUMBER, format!("Flight#: {}", number));
    }

    if extractor.confirmation().has_reference_token(subject, body) {
        score.add(weights::PNR, "PNR");
    }

    for phrase in FLIGHT_PHRASES
        .iter()
        .filter(|p| lower.contains(*p))
        .take(MAX_FLIGHT_PHRASES)
    {
        score.add(weights::FLIGHT_PHRASE, format!("\"{}\"", phrase));
    }

    if let Some(provider) = provider {
        score.add(weights::PROVIDER_DOMAIN, format!("From: {}", provider.name));
    }

    if let Some(domain) = HOTEL_DOMAINS.iter().find(|d| sender.contains(*d)) {
        score.add(weights::HOTEL_DOMAIN, format!("HOTEL: {}", domain));
    }

    if ACCOMMODATION_PHRASES.iter().any(|p| lower.contains(p)) {
        score.add(weights::ACCOMMODATION_TEXT, "ACCOMMODATION");
    }

    for phrase in SPAM_PHRASES
        .iter()
        .filter(|p| lower.contains(*p))
        .take(MAX_SPAM_PHRASES)
    {
        score.add(weights::SPAM_PHRASE, format!("SPAM: \"{}\"", phrase));
    }

    if SURVEY_PHRASES
        .iter()
        .any(|p| lower.contains(p) || sender.contains(p))
    {
        score.add(weights::SURVEY, "SURVEY");
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airports::AirportReference;
    use crate::providers::ProviderTable;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn message(sender: &str, subject: &str, body: &str) -> RawMessage {
        RawMessage::new(
            "m",
            sender,
            subject,
            body,
            Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap(),
        )
    }

    fn extractor() -> FieldExtractor {
        FieldExtractor::new(Arc::new(AirportReference::builtin()))
    }

    #[test]
    fn test_confirmation_scores_high() {
        let table = ProviderTable::builtin().unwrap();
        let jetblue = table.get("JetBlue").map(|p| p.as_ref());
        let body = "Your confirmation code is EJZOSU. BOS LAS Flight 349 Sun, Dec 07. Terminal C, Gate 12.";
        let msg = message("reservations@email.jetblue.com", "Your JetBlue itinerary", body);
        let score = score_message(&msg, body, jetblue, &extractor());
        // route 30 + flight 25 + pnr 15 + itinerary/confirmation code/terminal/gate 40 + provider 20
        assert_eq!(score.score, 130, "reasons: {:?}", score.reasons);
        assert!(score.passes(DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_hotel_and_spam_penalties() {
        let body = "Your stay is confirmed. Limited time special offer. Unsubscribe.";
        let msg = message("noreply@marriott.com", "Your stay", body);
        let score = score_message(&msg, body, None, &extractor());
        assert_eq!(score.score, -30 - 30 - 45, "reasons: {:?}", score.reasons);
        assert!(!score.passes(DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_survey_penalty() {
        let msg = message("survey@delta.com", "How was your flight?", "");
        let score = score_message(&msg, "", None, &extractor());
        assert!(score.reasons.contains(&"SURVEY".to_string()));
        assert_eq!(score.score, weights::SURVEY);
    }
}
