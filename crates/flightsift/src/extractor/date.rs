//! Flight-date extraction and year inference.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use regex::{Captures, Regex};

/// A bare month/day further than this before the receipt date is taken to be
/// in the following year.
pub const ROLLOVER_DAYS: i64 = 60;

/// Receipt years at or below this are not trusted for inference.
const MIN_TRUSTED_YEAR: i32 = 2000;

const WEEKDAY: &str = r"(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues|tue|wed|thurs|thur|thu|fri|sat|sun)\b\.?,?";

static WEEKDAY_MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{WEEKDAY}\s+([a-z]{{3,9}})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?"
    ))
    .unwrap()
});

static WEEKDAY_DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{WEEKDAY}\s*(\d{{1,2}})\s*([a-z]{{3,9}})\b(?:\s+(\d{{4}})\b)?"
    ))
    .unwrap()
});

static MONTH_DAY_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-zA-Z]{2,8})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b").unwrap()
});

static DAY_MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\s+([A-Z][a-zA-Z]{2,8})\.?,?\s+(\d{4})\b").unwrap()
});

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})[-/](\d{2})[-/](\d{2})\b").unwrap());

static BARE_MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-zA-Z]{2,8})\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b").unwrap()
});

/// Parses a month name or its common abbreviation.
pub fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.to_ascii_lowercase().as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

/// Resolves a month/day without a year against the receipt date.
///
/// The receipt year is used unless the result would land more than
/// [`ROLLOVER_DAYS`] before receipt, in which case the next year is used.
pub fn infer_year(month: u32, day: u32, received: NaiveDate) -> Option<NaiveDate> {
    let received = if received.year() <= MIN_TRUSTED_YEAR {
        Utc::now().date_naive()
    } else {
        received
    };
    let year = received.year();

    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) if date < received - Duration::days(ROLLOVER_DAYS) => {
            NaiveDate::from_ymd_opt(year + 1, month, day)
        }
        Some(date) => Some(date),
        // Feb 29 outside a leap year
        None => NaiveDate::from_ymd_opt(year + 1, month, day),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DateStrategy {
    /// "Sun, Dec 07", "Wednesday, December 10, 2025"
    WeekdayMonthDay,
    /// "Tue, 17APR"
    WeekdayDayMonth,
    /// "December 7, 2025", "7 December 2025"
    MonthNameWithYear,
    /// "2025-12-07"
    Iso,
    /// "Dec 07"
    BareMonthDay,
}

impl DateStrategy {
    pub(crate) const ORDER: [DateStrategy; 5] = [
        DateStrategy::WeekdayMonthDay,
        DateStrategy::WeekdayDayMonth,
        DateStrategy::MonthNameWithYear,
        DateStrategy::Iso,
        DateStrategy::BareMonthDay,
    ];

    pub(crate) fn find(self, text: &str, received: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateStrategy::WeekdayMonthDay => WEEKDAY_MONTH_DAY_RE
                .captures_iter(text)
                .find_map(|caps| named_date(&caps, 1, 2, caps.get(3), received)),
            DateStrategy::WeekdayDayMonth => WEEKDAY_DAY_MONTH_RE
                .captures_iter(text)
                .find_map(|caps| named_date(&caps, 2, 1, caps.get(3), received)),
            DateStrategy::MonthNameWithYear => MONTH_DAY_YEAR_RE
                .captures_iter(text)
                .find_map(|caps| named_date(&caps, 1, 2, caps.get(3), received))
                .or_else(|| {
                    DAY_MONTH_YEAR_RE
                        .captures_iter(text)
                        .find_map(|caps| named_date(&caps, 2, 1, caps.get(3), received))
                }),
            DateStrategy::Iso => ISO_RE.captures_iter(text).find_map(|caps| {
                let year: i32 = caps[1].parse().ok()?;
                let month: u32 = caps[2].parse().ok()?;
                let day: u32 = caps[3].parse().ok()?;
                plausible_year(year)?;
                NaiveDate::from_ymd_opt(year, month, day)
            }),
            DateStrategy::BareMonthDay => BARE_MONTH_DAY_RE
                .captures_iter(text)
                .find_map(|caps| named_date(&caps, 1, 2, None, received)),
        }
    }
}

fn named_date(
    caps: &Captures,
    month_group: usize,
    day_group: usize,
    year: Option<regex::Match>,
    received: NaiveDate,
) -> Option<NaiveDate> {
    let month = month_from_name(caps.get(month_group)?.as_str())?;
    let day: u32 = caps.get(day_group)?.as_str().parse().ok()?;
    match year {
        Some(year) => {
            let year: i32 = year.as_str().parse().ok()?;
            plausible_year(year)?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
        None => infer_year(month, day, received),
    }
}

fn plausible_year(year: i32) -> Option<i32> {
    (2000..=2100).contains(&year).then_some(year)
}

/// Finds the flight date in `subject` and `body`, body first.
pub fn extract_date(subject: &str, body: &str, received: NaiveDate) -> Option<NaiveDate> {
    DateStrategy::ORDER.iter().find_map(|strategy| {
        strategy
            .find(body, received)
            .or_else(|| strategy.find(subject, received))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_inference() {
        struct TestCase {
            received: NaiveDate,
            month: u32,
            day: u32,
            expected: NaiveDate,
        }

        let cases = [
            TestCase { received: date(2025, 11, 1), month: 12, day: 7, expected: date(2025, 12, 7) },
            TestCase { received: date(2025, 12, 20), month: 1, day: 3, expected: date(2026, 1, 3) },
            TestCase { received: date(2025, 6, 1), month: 5, day: 20, expected: date(2025, 5, 20) },
            TestCase { received: date(2025, 6, 1), month: 3, day: 1, expected: date(2026, 3, 1) },
            TestCase { received: date(2024, 1, 10), month: 2, day: 29, expected: date(2024, 2, 29) },
        ];

        for case in cases {
            assert_eq!(
                infer_year(case.month, case.day, case.received),
                Some(case.expected),
                "received {} month {} day {}",
                case.received,
                case.month,
                case.day
            );
        }
        // Neither 2025 nor 2026 has a Feb 29.
        assert_eq!(infer_year(2, 29, date(2025, 1, 10)), None);
    }

    #[test]
    fn test_untrusted_receipt_year_uses_today() {
        let inferred = infer_year(6, 15, date(1970, 1, 1)).unwrap();
        assert!(inferred.year() >= Utc::now().year());
    }

    #[test]
    fn test_strategies() {
        struct TestCase {
            text: &'static str,
            expected: Option<NaiveDate>,
        }

        let received = date(2025, 11, 1);
        let cases = [
            TestCase { text: "BOS SAV Flight 349 Sun, Dec 07 3:50pm", expected: Some(date(2025, 12, 7)) },
            TestCase { text: "Wednesday, December 10, 2025", expected: Some(date(2025, 12, 10)) },
            TestCase { text: "Tue, 17APR DELTA 2971", expected: Some(date(2026, 4, 17)) },
            TestCase { text: "Departing December 7, 2025", expected: Some(date(2025, 12, 7)) },
            TestCase { text: "Departing 9 January 2026", expected: Some(date(2026, 1, 9)) },
            TestCase { text: "Date: 2025-12-09", expected: Some(date(2025, 12, 9)) },
            TestCase { text: "Leaves Dec 07", expected: Some(date(2025, 12, 7)) },
            TestCase { text: "Flight 349 from Gate 12", expected: None },
            TestCase { text: "Sun, Foo 12", expected: None },
            TestCase { text: "Thurs. 04 Dec", expected: Some(date(2025, 12, 4)) },
            TestCase { text: "Friends 12 december, see you Dec 20", expected: Some(date(2025, 12, 20)) },
            TestCase { text: "Money back 5 Dec", expected: None },
        ];

        for case in cases {
            assert_eq!(extract_date("", case.text, received), case.expected, "text {:?}", case.text);
        }
    }

    #[test]
    fn test_weekday_form_beats_earlier_bare_form() {
        let received = date(2025, 11, 1);
        let text = "Booked Nov 02. Your flight: Sun, Dec 07";
        assert_eq!(extract_date("", text, received), Some(date(2025, 12, 7)));
    }

    #[test]
    fn test_subject_used_when_body_has_no_date() {
        let received = date(2025, 11, 1);
        assert_eq!(
            extract_date("Your trip on Dec 07", "No dates here", received),
            Some(date(2025, 12, 7))
        );
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(DateStrategy::ORDER[0], DateStrategy::WeekdayMonthDay);
        assert_eq!(DateStrategy::ORDER[4], DateStrategy::BareMonthDay);
    }
}
