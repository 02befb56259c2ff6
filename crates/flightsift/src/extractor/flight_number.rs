//! Flight-number extraction.
//!
//! Results are normalized to designator + digits without leading zeros
//! ("DL0300" -> "DL300"). A bare "Flight 349" takes the provider's designator
//! or, failing that, one from an airline named nearby.

use std::sync::LazyLock;

use regex::Regex;

use crate::providers::airlines::{code_for_airline_name, is_airline_code, AIRLINE_NAME_VARIATIONS};
use crate::providers::Provider;

/// Bytes searched before a "Flight NNN" for an airline name.
const AIRLINE_NAME_LOOKBEHIND: usize = 120;

static CODE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][A-Z0-9]|[0-9][A-Z])\s?-?(\d{1,4})\b").unwrap());

static FLIGHT_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:flight|flt)\.?\s*(?:#|no\.?|number)?\s*:?\s*(\d{1,4})\b").unwrap()
});

static AIRLINE_NAME_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    let names = AIRLINE_NAME_VARIATIONS
        .iter()
        .map(|(name, _)| regex::escape(name).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({})\s+(?:flight\s+)?(\d{{1,4}})\b", names)).unwrap()
});

/// Receipt and order wording that turns "CA 1234" into a false positive.
static RECEIPT_CONTEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:order|receipt|invoice|total|card|account)\b").unwrap());

/// Designators that double as everyday abbreviations.
const AMBIGUOUS_DESIGNATORS: &[&str] = &["AM", "PM", "CA", "LA", "AD", "AS", "AI"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlightNumberStrategy {
    /// Designator + digits where the designator belongs to the provider.
    ProviderCode,
    /// "Flight 349", prefixed with a designator from context.
    FlightKeyword,
    /// Any known designator + digits, with guards.
    AirlineCode,
    /// "Delta 567", "United flight 2155"
    AirlineName,
}

impl FlightNumberStrategy {
    pub(crate) const ORDER: [FlightNumberStrategy; 4] = [
        FlightNumberStrategy::ProviderCode,
        FlightNumberStrategy::FlightKeyword,
        FlightNumberStrategy::AirlineCode,
        FlightNumberStrategy::AirlineName,
    ];

    pub(crate) fn find(self, text: &str, provider: Option<&Provider>) -> Option<String> {
        match self {
            FlightNumberStrategy::ProviderCode => {
                let codes = &provider?.airline_codes;
                CODE_NUMBER_RE.captures_iter(text).find_map(|caps| {
                    let code = caps.get(1)?.as_str();
                    codes
                        .iter()
                        .any(|c| c == code)
                        .then(|| normalize(code, &caps[2]))
                        .flatten()
                })
            }
            FlightNumberStrategy::FlightKeyword => FLIGHT_KEYWORD_RE.captures_iter(text).find_map(|caps| {
                let whole = caps.get(0)?;
                let prefix = provider
                    .and_then(|p| p.primary_airline_code())
                    .map(str::to_string)
                    .or_else(|| airline_named_before(text, whole.start()))
                    .unwrap_or_default();
                normalize(&prefix, caps.get(1)?.as_str())
            }),
            FlightNumberStrategy::AirlineCode => CODE_NUMBER_RE.captures_iter(text).find_map(|caps| {
                let whole = caps.get(0)?;
                let code = caps.get(1)?.as_str();
                let digits = caps.get(2)?.as_str();
                if !is_airline_code(code) || is_guarded(text, whole.start(), code, digits) {
                    return None;
                }
                normalize(code, digits)
            }),
            FlightNumberStrategy::AirlineName => {
                AIRLINE_NAME_NUMBER_RE.captures_iter(text).find_map(|caps| {
                    let name = caps.get(1)?.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
                    let code = code_for_airline_name(&name)?;
                    normalize(code, caps.get(2)?.as_str())
                })
            }
        }
    }
}

/// Rejects designator matches that are really times ("10 AM 1234"),
/// state abbreviations or receipt numbers.
fn is_guarded(text: &str, start: usize, code: &str, digits: &str) -> bool {
    if !AMBIGUOUS_DESIGNATORS.contains(&code) {
        return false;
    }

    let before = text[..start].trim_end();
    if before.ends_with(|c: char| c.is_ascii_digit()) {
        return true;
    }

    if digits.len() >= 4 {
        let mut from = start.saturating_sub(AIRLINE_NAME_LOOKBEHIND);
        while !text.is_char_boundary(from) {
            from -= 1;
        }
        if RECEIPT_CONTEXT_RE.is_match(&text[from..start]) {
            return true;
        }
    }

    // Lone ambiguous designators need the word "flight" close by.
    let mut from = start.saturating_sub(30);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    !text[from..start].to_ascii_lowercase().contains("flight")
}

fn airline_named_before(text: &str, end: usize) -> Option<String> {
    let mut from = end.saturating_sub(AIRLINE_NAME_LOOKBEHIND);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    let window = text[from..end].to_lowercase();
    AIRLINE_NAME_VARIATIONS
        .iter()
        .filter_map(|(name, code)| window.rfind(name).map(|pos| (pos, name.len(), *code)))
        .max_by_key(|(pos, len, _)| (*pos + *len, *len))
        .map(|(_, _, code)| code.to_string())
}

/// `"DL"`, `"0300"` -> `"DL300"`. Returns `None` for flight "0".
pub fn normalize(code: &str, digits: &str) -> Option<String> {
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return None;
    }
    Some(format!("{}{}", code.to_uppercase(), digits))
}

/// Canonical form of an already-extracted flight number: uppercase, no
/// separators, no leading zeros in the numeric part.
pub fn canonical(flight_number: &str) -> String {
    let compact: String = flight_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase();

    let (prefix, digits) = if compact.chars().all(|c| c.is_ascii_digit()) {
        ("", compact.as_str())
    } else if compact.len() > 2
        && compact.is_char_boundary(2)
        && compact[..2].chars().any(|c| c.is_ascii_alphabetic())
        && compact[2..].chars().all(|c| c.is_ascii_digit())
    {
        compact.split_at(2)
    } else {
        return compact;
    };
    format!("{}{}", prefix, digits.trim_start_matches('0'))
}

/// Finds the flight number, body first.
pub fn extract_flight_number(subject: &str, body: &str, provider: Option<&Provider>) -> Option<String> {
    FlightNumberStrategy::ORDER.iter().find_map(|strategy| {
        strategy
            .find(body, provider)
            .or_else(|| strategy.find(subject, provider))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderTable;

    #[test]
    fn test_flight_numbers() {
        struct TestCase {
            provider: Option<&'static str>,
            body: &'static str,
            expected: Option<&'static str>,
        }

        let cases = [
            TestCase { provider: Some("JetBlue"), body: "BOS SAV Flight 349 Wed, Nov 12", expected: Some("B6349") },
            TestCase { provider: Some("Delta"), body: "Tue, 17APR DELTA 2971 DETROIT", expected: Some("DL2971") },
            TestCase { provider: None, body: "Your flight DL0300 departs", expected: Some("DL300") },
            TestCase { provider: None, body: "Departure Thu, Jul 5 United 2155 Houston (IAH)", expected: Some("UA2155") },
            TestCase { provider: Some("Expedia"), body: "American Airlines Flight 100", expected: Some("AA100") },
            TestCase { provider: None, body: "Doors open at 10 AM 1234 Main St", expected: None },
            TestCase { provider: None, body: "Order total CA 1234 shipped", expected: None },
            TestCase { provider: None, body: "Nothing to see here", expected: None },
        ];

        let table = ProviderTable::builtin().unwrap();
        for case in cases {
            let provider = case.provider.and_then(|name| table.get(name)).map(|p| p.as_ref());
            assert_eq!(
                extract_flight_number("", case.body, provider).as_deref(),
                case.expected,
                "body {:?}",
                case.body
            );
        }
    }

    #[test]
    fn test_provider_code_beats_codeshare_mention() {
        let table = ProviderTable::builtin().unwrap();
        let jetblue = table.get("JetBlue").map(|p| p.as_ref());
        let body = "MVY BOS Flight 1 9K 3261 Sold as B6 5924";
        assert_eq!(extract_flight_number("", body, jetblue).as_deref(), Some("B65924"));
    }

    #[test]
    fn test_canonical() {
        assert_eq!(canonical("dl 0300"), "DL300");
        assert_eq!(canonical("B6-349"), "B6349");
        assert_eq!(canonical("B60349"), "B6349");
        assert_eq!(canonical("349"), "349");
        assert_eq!(canonical(""), "");
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(FlightNumberStrategy::ORDER[0], FlightNumberStrategy::ProviderCode);
        assert_eq!(FlightNumberStrategy::ORDER[3], FlightNumberStrategy::AirlineName);
    }
}
