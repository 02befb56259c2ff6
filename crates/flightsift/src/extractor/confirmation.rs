//! Confirmation-code (PNR) extraction.
//!
//! Strategies run in a fixed order: provider patterns, then labeled
//! patterns, then a generic token near a booking keyword. The first
//! candidate that passes [`ConfirmationExtractor::is_valid_code`] wins.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::CodeSource;
use crate::airports::AirportReference;
use crate::providers::airlines::is_airline_name;
use crate::providers::Provider;

pub const CODE_LENGTH: usize = 6;

/// How far past a booking keyword the generic strategy looks.
const GENERIC_WINDOW: usize = 40;

/// Uppercase words that fit the code shape but are never booking references.
pub const DEFAULT_DENIED_CONFIRMATION_CODES: &[&str] = &[
    "FLIGHT", "TRAVEL", "TICKET", "NUMBER", "DETAIL", "STATUS", "CHANGE", "UPDATE", "CANCEL",
    "AMOUNT", "CREDIT", "MANAGE", "REVIEW", "MEMBER", "RETURN", "DEPART", "ARRIVE", "CENTER",
    "MOBILE", "ONLINE", "SUBMIT", "BUTTON", "SELECT", "POLICY", "POINTS", "WINDOW", "MIDDLE",
    "FLYING", "OFFERS", "EXTRAS", "HOTELS", "SOCIAL", "FOLLOW", "PRICES", "ROUTES", "EMAILS",
    "PLEASE", "THANKS", "RECORD", "REFUND", "REWARD", "ADULTS", "PERSON", "PASSES", "BOARDS",
    "CABINS", "OPTION", "ISSUED", "GUESTS", "NOTICE", "SECURE", "RENTAL", "DINING", "ORDERS",
    "REPORT", "ALERTS", "ACCESS", "ACTION", "ADVICE", "AGENCY", "BEFORE", "CHOICE", "CLIENT",
    "CLOSED", "COUPON", "DELAYS", "DIRECT", "FAMILY", "FRIEND", "GROUND", "LOUNGE", "OFFICE",
    "PICKUP", "RECENT", "REMARK", "RESEND", "SAVING", "SCREEN", "SEARCH", "SECOND", "SENDER",
    "CHARGE", "TOTALS", "BOOKED", "NOTIFY", "VERIFY", "UNABLE", "ISSUES", "ALWAYS",
    "MONDAY", "FRIDAY", "SUNDAY", "AUGUST", "LOCATE", "SIGNIN", "LOGOUT", "INVITE", "SHARED",
];

static HEX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9A-F]+$").unwrap());

/// Codes captured from the subject only: `"... - ABC123"` at the end.
static SUBJECT_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s-\s([A-Z0-9]{6})\s*$").unwrap());

/// Labeled forms, most specific first. Keywords ignore case, codes do not.
static BODY_LABEL_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i:confirmation\s+code\s+is)\s*:?\s*([A-Z0-9]{6})\b",
        r"(?i:confirmation)[:\s#]+([A-Z0-9]{6})\b",
        r"(?i:confirmation\s+(?:number|no\.?|code))\s*[:#]?\s*([A-Z0-9]{6})\b",
        r"(?i:record\s+locator)[:\s]+([A-Z0-9]{6})\b",
        r"(?i:booking\s+(?:reference|ref\.?|code))[:\s#]+([A-Z0-9]{6})\b",
        r"(?i:(?:reservation|airline)\s+(?:code|number|reference))[:\s#]+([A-Z0-9]{6})\b",
        r"\bPNR[:\s#]+([A-Z0-9]{6})\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:confirmation|record\s+locator|locator|booking\s+(?:reference|ref|code|number)|reservation|pnr|trip\s+id)\b",
    )
    .unwrap()
});

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z0-9]{6}\b").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationMatch {
    pub code: String,
    pub source: CodeSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CodeStrategy {
    Provider,
    Labeled,
    Generic,
}

impl CodeStrategy {
    pub(crate) const ORDER: [CodeStrategy; 3] = [
        CodeStrategy::Provider,
        CodeStrategy::Labeled,
        CodeStrategy::Generic,
    ];
}

#[derive(Debug, Clone)]
pub struct ConfirmationExtractor {
    denied: HashSet<String>,
    /// City names are rejected as codes when a reference is attached.
    airports: Option<Arc<AirportReference>>,
}

impl Default for ConfirmationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmationExtractor {
    pub fn new() -> Self {
        Self {
            denied: DEFAULT_DENIED_CONFIRMATION_CODES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            airports: None,
        }
    }

    /// Rejects candidates that spell a known city or airport name.
    pub fn with_airports(mut self, airports: Arc<AirportReference>) -> Self {
        self.airports = Some(airports);
        self
    }

    /// Rejects candidates that spell a word of a provider's name
    /// ("HOPPER", "ORBITZ").
    pub fn with_provider_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.denied.extend(
                name.as_ref()
                    .split_whitespace()
                    .map(str::to_uppercase)
                    .filter(|word| word.len() == CODE_LENGTH),
            );
        }
        self
    }

    pub fn with_denied_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.denied
            .extend(codes.into_iter().map(|c| c.as_ref().trim().to_uppercase()));
        self
    }

    /// Rejects deny-listed words, airline and city names, hex colors,
    /// repeated characters, and pure-hex strings that lack either letters or
    /// digits.
    pub fn is_valid_code(&self, code: &str) -> bool {
        if code.len() != CODE_LENGTH
            || !code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return false;
        }
        if self.denied.contains(code) || self.is_known_name(code) {
            return false;
        }

        let mut chars = code.chars();
        let first = chars.next();
        if chars.all(|c| Some(c) == first) {
            return false;
        }

        if HEX_RE.is_match(code) {
            let has_letters = code.chars().any(|c| c.is_ascii_alphabetic());
            let has_digits = code.chars().any(|c| c.is_ascii_digit());
            if !(has_letters && has_digits) {
                return false;
            }
        }

        true
    }

    pub fn extract(
        &self,
        subject: &str,
        body: &str,
        provider: Option<&Provider>,
    ) -> Option<ConfirmationMatch> {
        CodeStrategy::ORDER
            .iter()
            .find_map(|strategy| self.run(*strategy, subject, body, provider))
    }

    /// True when the text carries something shaped like a booking
    /// reference, labeled or next to a booking keyword.
    pub fn has_reference_token(&self, subject: &str, body: &str) -> bool {
        self.run(CodeStrategy::Labeled, subject, body, None).is_some()
            || self.run(CodeStrategy::Generic, subject, body, None).is_some()
    }

    pub(crate) fn run(
        &self,
        strategy: CodeStrategy,
        subject: &str,
        body: &str,
        provider: Option<&Provider>,
    ) -> Option<ConfirmationMatch> {
        let code = match strategy {
            CodeStrategy::Provider => provider.and_then(|p| self.from_provider(p, subject, body)),
            CodeStrategy::Labeled => self.from_labels(subject, body),
            CodeStrategy::Generic => self
                .near_keyword(subject)
                .or_else(|| self.near_keyword(body)),
        }?;

        let source = match strategy {
            CodeStrategy::Provider => CodeSource::Provider,
            CodeStrategy::Labeled => CodeSource::Labeled,
            CodeStrategy::Generic => CodeSource::Generic,
        };
        Some(ConfirmationMatch { code, source })
    }

    /// All-letter candidates that name an airline or a place.
    fn is_known_name(&self, code: &str) -> bool {
        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return false;
        }
        is_airline_name(code)
            || self
                .airports
                .as_ref()
                .is_some_and(|airports| airports.city_alias(code).is_some())
    }

    fn from_provider(&self, provider: &Provider, subject: &str, body: &str) -> Option<String> {
        [subject, body].iter().find_map(|text| {
            provider.confirmation_patterns().iter().find_map(|re| {
                re.captures_iter(text)
                    .filter_map(|caps| caps.name("code"))
                    .map(|m| m.as_str().to_uppercase())
                    .find(|code| self.is_valid_code(code))
            })
        })
    }

    fn from_labels(&self, subject: &str, body: &str) -> Option<String> {
        if let Some(caps) = SUBJECT_LABEL_RE.captures(subject) {
            let code = caps[1].to_string();
            if self.is_valid_code(&code) {
                return Some(code);
            }
        }

        [subject, body].iter().find_map(|text| {
            BODY_LABEL_RES.iter().find_map(|re| {
                re.captures_iter(text)
                    .map(|caps| caps[1].to_string())
                    .find(|code| self.is_valid_code(code))
            })
        })
    }

    fn near_keyword(&self, text: &str) -> Option<String> {
        KEYWORD_RE.find_iter(text).find_map(|keyword| {
            let start = keyword.end();
            let mut end = (start + GENERIC_WINDOW).min(text.len());
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            TOKEN_RE
                .find_iter(&text[start..end])
                .map(|m| m.as_str())
                .find(|code| self.is_valid_code(code))
                .map(str::to_string)
        })
    }
}
