//! Route extraction.
//!
//! A three-letter token only counts as an airport when it sits in a route
//! context: after a city name in parentheses, around an arrow or "to", or in
//! a route header. Bare tokens elsewhere are ignored.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::Route;
use crate::airports::AirportReference;
use crate::providers::airlines::{airport_affinity, has_hub_data, AirportAffinity};

/// Words considered on either side of "to" when matching city names.
const MAX_CITY_WORDS: usize = 4;

static CITY_WITH_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z][A-Za-z.'\-]*,?\s*(?:[A-Z]{2}\s*)?\(([A-Z]{3})\)").unwrap()
});

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b([A-Z]{3})(?:\s*(?:->|→|⇒|=>|–|—|>)\s*|\s+-\s+|-|\s+(?i:to)\s+)([A-Z]{3})\b",
    )
    .unwrap()
});

static SECTION_HEADER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "BOS SAV Flight 349", "BOS MCO 10hr 30min Flight 451"
        r"\b([A-Z]{3})\s+([A-Z]{3})\s+(?:\d+\s*hr\s*(?:\d+\s*min\s+)?)?(?i:flight)\b",
        // "Flights BOS LAX"
        r"(?i:flights|route|routing)\s*:?\s+([A-Z]{3})\s+([A-Z]{3})\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static TO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bto\b").unwrap());

static CITY_TIMES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([a-z][a-z .,']*?)\s+\d{1,2}:\d{2}\s*[ap]\.?m\.?\s+([a-z][a-z .,']*?)\s+\d{1,2}:\d{2}\s*[ap]\.?m",
    )
    .unwrap()
});

/// Characters that end the phrase on either side of "to".
const PHRASE_STOPS: &[char] = &['\n', '!', '?', ';', '|', ':', '(', ')'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteStrategy {
    /// "Orlando (MCO) ... Boston (BOS)"
    CityWithCode,
    /// "BOS -> LAS", "LAX-SFO", "BOS to LAS"
    Marker,
    /// "BOS SAV Flight 349", "Flights BOS LAX"
    SectionHeader,
    /// "Boston to Las Vegas"
    CityNames,
    /// "DETROIT 8:11pm BOSTON, MA 10:09pm"
    CityTimes,
}

impl RouteStrategy {
    pub(crate) const ORDER: [RouteStrategy; 5] = [
        RouteStrategy::CityWithCode,
        RouteStrategy::Marker,
        RouteStrategy::SectionHeader,
        RouteStrategy::CityNames,
        RouteStrategy::CityTimes,
    ];
}

#[derive(Debug, Clone)]
pub struct RouteExtractor {
    airports: Arc<AirportReference>,
}

impl RouteExtractor {
    pub fn new(airports: Arc<AirportReference>) -> Self {
        Self { airports }
    }

    /// Finds the route in `body`, falling back to `subject` strategy by
    /// strategy.
    pub fn extract(&self, subject: &str, body: &str) -> Option<Route> {
        self.extract_for(subject, body, None)
    }

    /// Like [`extract`](Self::extract), but when `airline` has hub data a
    /// candidate touching one of its hubs or a major airport beats an
    /// earlier candidate touching neither. An unrated route is still
    /// returned when nothing better turns up.
    pub fn extract_for(&self, subject: &str, body: &str, airline: Option<&str>) -> Option<Route> {
        let airline = airline.filter(|code| has_hub_data(code));
        RouteStrategy::ORDER.iter().find_map(|strategy| {
            [body, subject]
                .into_iter()
                .find_map(|text| prefer_served(self.candidates(*strategy, text), airline))
        })
    }

    /// Distinct codes found in code-bearing route contexts, in order of
    /// appearance.
    pub fn route_airports(&self, text: &str) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        let mut push = |code: &str| {
            if self.airports.is_valid_code(code) && !codes.iter().any(|c| c == code) {
                codes.push(code.to_string());
            }
        };

        for caps in CITY_WITH_CODE_RE.captures_iter(text) {
            push(&caps[1]);
        }
        for caps in MARKER_RE.captures_iter(text) {
            push(&caps[1]);
            push(&caps[2]);
        }
        for re in SECTION_HEADER_RES.iter() {
            for caps in re.captures_iter(text) {
                push(&caps[1]);
                push(&caps[2]);
            }
        }
        codes
    }

    /// Every route `strategy` finds in `text`, in order of appearance.
    pub(crate) fn candidates(&self, strategy: RouteStrategy, text: &str) -> Vec<Route> {
        match strategy {
            RouteStrategy::CityWithCode => self.city_with_code(text).into_iter().collect(),
            RouteStrategy::Marker => self.code_pairs(&MARKER_RE, text),
            RouteStrategy::SectionHeader => SECTION_HEADER_RES
                .iter()
                .flat_map(|re| self.code_pairs(re, text))
                .collect(),
            RouteStrategy::CityNames => self.city_names(text),
            RouteStrategy::CityTimes => self.city_times(text),
        }
    }

    fn city_with_code(&self, text: &str) -> Option<Route> {
        let mut origin: Option<&str> = None;
        for caps in CITY_WITH_CODE_RE.captures_iter(text) {
            let code = caps.get(1)?.as_str();
            if !self.airports.is_valid_code(code) {
                continue;
            }
            match origin {
                None => origin = Some(code),
                Some(first) if first != code => return Route::new(first, code),
                Some(_) => {}
            }
        }
        None
    }

    fn code_pairs(&self, re: &Regex, text: &str) -> Vec<Route> {
        re.captures_iter(text)
            .filter_map(|caps| {
                let origin = caps.get(1)?.as_str();
                let destination = caps.get(2)?.as_str();
                if self.airports.is_valid_code(origin) && self.airports.is_valid_code(destination) {
                    Route::new(origin, destination)
                } else {
                    None
                }
            })
            .collect()
    }

    fn city_names(&self, text: &str) -> Vec<Route> {
        TO_RE
            .find_iter(text)
            .filter_map(|to| {
                let left = &text[..to.start()];
                let left = left.rsplit(PHRASE_STOPS).next().unwrap_or(left);
                let right = &text[to.end()..];
                let right = right.split(PHRASE_STOPS).next().unwrap_or(right);

                let origin = self.city_at_end(left)?;
                let destination = self.city_at_start(right)?;
                Route::new(&origin, &destination)
            })
            .collect()
    }

    fn city_times(&self, text: &str) -> Vec<Route> {
        CITY_TIMES_RE
            .captures_iter(text)
            .filter_map(|caps| {
                let origin = self.city_at_end(caps.get(1)?.as_str())?;
                let destination = self.city_at_start(caps.get(2)?.as_str())?;
                Route::new(&origin, &destination)
            })
            .collect()
    }

    /// Longest city phrase ending the segment ("... Boston, MA").
    fn city_at_end(&self, segment: &str) -> Option<String> {
        let mut words: Vec<&str> = segment.split_whitespace().collect();
        if words.len() >= 2 && is_state_suffix(words[words.len() - 1]) && words[words.len() - 2].ends_with(',') {
            words.pop();
        }
        let n = words.len();
        (1..=n.min(MAX_CITY_WORDS)).rev().find_map(|take| {
            let phrase = words[n - take..].join(" ");
            self.airports.city_alias(&phrase).map(str::to_string)
        })
    }

    /// Longest city phrase starting the segment ("Las Vegas on Dec 07").
    fn city_at_start(&self, segment: &str) -> Option<String> {
        let words: Vec<&str> = segment.split_whitespace().take(MAX_CITY_WORDS).collect();
        (1..=words.len()).rev().find_map(|take| {
            let phrase = words[..take].join(" ");
            // A comma inside the phrase means it ran into the next field.
            if phrase.trim_end_matches(',').contains(',') {
                return None;
            }
            self.airports.city_alias(&phrase).map(str::to_string)
        })
    }
}

/// First candidate the airline is known to serve at either end, else the
/// first candidate.
fn prefer_served(candidates: Vec<Route>, airline: Option<&str>) -> Option<Route> {
    if let Some(airline) = airline {
        let served = candidates.iter().position(|route| {
            airport_affinity(airline, &route.origin) > AirportAffinity::Unknown
                || airport_affinity(airline, &route.destination) > AirportAffinity::Unknown
        });
        if let Some(index) = served {
            return candidates.into_iter().nth(index);
        }
    }
    candidates.into_iter().next()
}

fn is_state_suffix(word: &str) -> bool {
    word.len() == 2 && word.chars().all(|c| c.is_ascii_uppercase())
}
