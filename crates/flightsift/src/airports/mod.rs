//! Airport reference data: the code table, city-name aliases and the deny
//! list of code-shaped words.

mod deny;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::ConfigError;

pub use deny::DEFAULT_DENIED_AIRPORT_CODES;

const BUILTIN_AIRPORTS: &str = include_str!("../../data/airports.csv");
const BUILTIN_CITY_ALIASES: &str = include_str!("../../data/city_aliases.csv");

/// Longest display label before it gets shortened.
const MAX_DISPLAY_NAME: usize = 25;

/// City names that are also everyday words. Only matched when they make up
/// the whole phrase, never inside running text.
const AMBIGUOUS_CITY_WORDS: &[&str] = &["nice", "mobile", "split", "male", "reading", "victoria"];

static CODE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{3})(?:\s*\(.*\))?$").unwrap());

/// A single airport row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportInfo {
    pub code: String,
    /// Short human-readable label, usually the city.
    pub display_name: String,
    /// Full airport name. Falls back to the display name.
    pub name: String,
}

/// Lookup tables for airport codes and city names.
///
/// Built once and shared read-only (usually behind an `Arc`) by the
/// extractor and the classifier.
#[derive(Debug, Clone)]
pub struct AirportReference {
    airports: HashMap<String, AirportInfo>,
    /// Normalized city phrase -> code.
    city_index: HashMap<String, String>,
    denied: HashSet<String>,
}

impl AirportReference {
    /// The embedded table with the default deny list.
    pub fn builtin() -> Self {
        let mut reference = Self::empty();
        reference.merge_table(BUILTIN_AIRPORTS);
        reference.merge_aliases(BUILTIN_CITY_ALIASES);
        reference
    }

    /// Builds a reference from an airport table in the embedded CSV format
    /// (`CODE,Display name[,Airport name]`), without city aliases.
    pub fn from_table(table: &str) -> Self {
        let mut reference = Self::empty();
        reference.merge_table(table);
        reference
    }

    /// The embedded table extended with an external CSV file. Rows in the
    /// file replace embedded rows with the same code.
    pub fn with_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadAirports {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut reference = Self::builtin();
        let before = reference.len();
        reference.merge_table(&content);
        debug!(
            "Loaded airport table {} ({} codes, {} new)",
            crate::sanitize::redact_path(path),
            reference.len(),
            reference.len() - before
        );
        Ok(reference)
    }

    /// Adds codes to the deny list.
    pub fn with_denied_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.denied
            .extend(codes.into_iter().map(|c| c.as_ref().trim().to_uppercase()));
        self
    }

    fn empty() -> Self {
        Self {
            airports: HashMap::new(),
            city_index: HashMap::new(),
            denied: DEFAULT_DENIED_AIRPORT_CODES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    fn merge_table(&mut self, table: &str) {
        for (line_no, line) in table.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut cols = line.splitn(3, ',').map(str::trim);
            let code = cols.next().unwrap_or_default().to_uppercase();
            let display_name = cols.next().unwrap_or_default().to_string();
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
                warn!("Skipping airport row {}: bad code {:?}", line_no + 1, code);
                continue;
            }
            let display_name = if display_name.is_empty() {
                code.clone()
            } else {
                display_name
            };
            let name = cols
                .next()
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| display_name.clone());

            for phrase in [&display_name, &name] {
                let key = normalize_city(phrase);
                if !key.is_empty() {
                    self.city_index.entry(key).or_insert_with(|| code.clone());
                }
            }

            self.airports.insert(
                code.clone(),
                AirportInfo {
                    code,
                    display_name,
                    name,
                },
            );
        }
    }

    fn merge_aliases(&mut self, aliases: &str) {
        for line in aliases.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((alias, code)) = line.rsplit_once(',') {
                let code = code.trim().to_uppercase();
                if self.airports.contains_key(&code) {
                    self.city_index.insert(normalize_city(alias), code);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&AirportInfo> {
        self.airports.get(code)
    }

    /// Code is in the table, regardless of the deny list.
    pub fn is_known_code(&self, code: &str) -> bool {
        self.airports.contains_key(code)
    }

    pub fn is_denied(&self, code: &str) -> bool {
        self.denied.contains(code)
    }

    /// Code may be accepted as a bare token: known and not deny-listed.
    pub fn is_valid_code(&self, code: &str) -> bool {
        self.is_known_code(code) && !self.is_denied(code)
    }

    /// All codes accepted as bare tokens, sorted.
    pub fn valid_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self
            .airports
            .keys()
            .map(String::as_str)
            .filter(|c| !self.is_denied(c))
            .collect();
        codes.sort_unstable();
        codes
    }

    /// Exact lookup of a city phrase after normalization.
    pub fn city_alias(&self, phrase: &str) -> Option<&str> {
        let key = normalize_city(phrase);
        if key.is_empty() {
            return None;
        }
        self.city_index.get(&key).map(String::as_str)
    }

    /// Maps free text naming a city to a code.
    ///
    /// Tries the whole text first (ignoring a trailing ", ST" state suffix),
    /// then the longest alias appearing as whole words. Ties go to the
    /// earliest occurrence.
    pub fn code_for_city_name(&self, text: &str) -> Option<String> {
        let head = text.split(',').next().unwrap_or(text);
        if let Some(code) = self.city_alias(head) {
            return Some(code.to_string());
        }

        let haystack = format!(" {} ", normalize_city(text));
        if haystack.trim().is_empty() {
            return None;
        }

        let mut best: Option<(usize, usize, &str, &str)> = None;
        for (alias, code) in &self.city_index {
            if AMBIGUOUS_CITY_WORDS.contains(&alias.as_str()) {
                continue;
            }
            let needle = format!(" {} ", alias);
            if let Some(pos) = haystack.find(&needle) {
                let candidate = (alias.len(), pos, alias.as_str(), code.as_str());
                let better = match best {
                    None => true,
                    Some((len, p, a, _)) => {
                        candidate.0 > len
                            || (candidate.0 == len && (pos < p || (pos == p && candidate.2 < a)))
                    }
                };
                if better {
                    best = Some(candidate);
                }
            }
        }
        best.map(|(_, _, _, code)| code.to_string())
    }

    /// Human-readable label, e.g. `"BOS (Boston)"`. Unknown codes are
    /// returned unchanged.
    pub fn display(&self, code: &str) -> String {
        match self.airports.get(code) {
            Some(info) => {
                let label = &info.display_name;
                if label.chars().count() > MAX_DISPLAY_NAME {
                    let short: String = label.chars().take(MAX_DISPLAY_NAME - 3).collect();
                    format!("{} ({}...)", code, short.trim_end())
                } else {
                    format!("{} ({})", code, label)
                }
            }
            None => code.to_string(),
        }
    }

    /// Accepts a bare code, the [`display`](Self::display) format, or a
    /// city name, and returns the code.
    pub fn resolve(&self, token: &str) -> Option<String> {
        let token = token.trim();
        if let Some(caps) = CODE_TOKEN_RE.captures(token) {
            let code = caps[1].to_uppercase();
            if self.is_valid_code(&code) {
                return Some(code);
            }
            // "Rio" and friends: fall through to city lookup.
        }
        self.code_for_city_name(token)
    }
}

impl Default for AirportReference {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lowercases, folds diacritics, drops periods, and turns other punctuation
/// into spaces so that "St. Louis", "Dallas-Fort Worth" and "dallas fort
/// worth" compare equal, as do "Zürich" and "Zurich".
pub(crate) fn normalize_city(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            '.' => {}
            '\u{2019}' | '\u{2018}' | '\'' => out.push('\''),
            c if c.is_alphanumeric() => out.extend(c.to_lowercase()),
            _ => out.push(' '),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
