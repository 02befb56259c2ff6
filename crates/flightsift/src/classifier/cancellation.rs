//! Cancellation notices from known providers.

use std::sync::LazyLock;

use regex::Regex;

static SUBJECT_CANCEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcancel(?:l?ed|lation|l?ing)?\b").unwrap()
});

/// "Free cancellation" is a booking perk, not a notice.
static FREE_CANCELLATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:free|flexible)\s+cancell?ation\b").unwrap());

static BODY_CANCEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(?:has|have)\s+been|was|were)\s+cancell?ed\b").unwrap()
});

/// The message tells the traveler a flight or booking was cancelled.
pub fn is_cancellation(subject: &str, body: &str) -> bool {
    let subject_says_so =
        SUBJECT_CANCEL_RE.is_match(subject) && !FREE_CANCELLATION_RE.is_match(subject);
    subject_says_so || BODY_CANCEL_RE.is_match(body)
}
