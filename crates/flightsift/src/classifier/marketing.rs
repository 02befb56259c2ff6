//! Promotional-mail detection for messages from known providers.

use std::sync::LazyLock;

use regex::Regex;

use crate::extractor::ConfirmationExtractor;

/// Body phrases typical of promotional mail. Two or more of these, with no
/// booking reference in sight, mark the message as marketing.
pub const MARKETING_KEYWORDS: &[&str] = &[
    "unsubscribe",
    "opt out",
    "manage preferences",
    "email preferences",
    "view in browser",
    "trueblue points",
    "earn points",
    "bonus points",
    "limited time",
    "book now",
    "sale ends",
    "exclusive offer",
    "special offer",
    "credit card",
    "apply now",
    "newsletter",
    "% off",
];

static SUBJECT_PROMO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:%\s*off\b|\b(?:earn|bonus|points|sale|offers?|save|win|deals?|discounts?|rewards?|newsletter)\b)",
    )
    .unwrap()
});

static SUBJECT_TRANSACTIONAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:confirmation|confirmed|itinerary|receipt|e-?ticket|boarding pass|schedule change)\b",
    )
    .unwrap()
});

/// Subject reads like a promotion and not like a transaction.
pub fn is_promotional_subject(subject: &str) -> bool {
    SUBJECT_PROMO_RE.is_match(subject) && !SUBJECT_TRANSACTIONAL_RE.is_match(subject)
}

/// Number of [`MARKETING_KEYWORDS`] present in `text`.
pub fn marketing_keyword_count(text: &str) -> usize {
    let lower = text.to_lowercase();
    MARKETING_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count()
}

/// Decides whether a provider-matched message is promotional.
pub fn is_marketing(subject: &str, body: &str, codes: &ConfirmationExtractor) -> bool {
    if is_promotional_subject(subject) {
        return true;
    }

    let combined = format!("{} {}", subject, body);
    marketing_keyword_count(&combined) >= 2 && !codes.has_reference_token(subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marketing_detection() {
        struct TestCase {
            subject: &'static str,
            body: &'static str,
            expected: bool,
        }

        let cases = [
            TestCase { subject: "Earn 5,000 bonus points", body: "", expected: true },
            TestCase { subject: "30% off flights to Florida", body: "", expected: true },
            TestCase { subject: "Deals for your next trip", body: "", expected: true },
            TestCase { subject: "Your flight confirmation", body: "", expected: false },
            TestCase { subject: "Save on your itinerary upgrade", body: "", expected: false },
            TestCase { subject: "Window seat assigned", body: "", expected: false },
            TestCase {
                subject: "News from JetBlue",
                body: "Limited time fares. Book now! Unsubscribe here.",
                expected: true,
            },
            TestCase {
                subject: "Your trip",
                body: "Confirmation code: EJZOSU. Unsubscribe | Manage preferences",
                expected: false,
            },
        ];

        let codes = ConfirmationExtractor::new();
        for case in cases {
            assert_eq!(
                is_marketing(case.subject, case.body, &codes),
                case.expected,
                "subject {:?}",
                case.subject
            );
        }
    }

    #[test]
    fn test_keyword_count_is_case_insensitive() {
        assert_eq!(marketing_keyword_count("UNSUBSCRIBE and Apply Now"), 2);
    }
}
