//! The provider table: who sends flight confirmations and how to read them.
//!
//! Descriptors are plain data (embedded `data/providers.json` plus any
//! extras from the config file). [`ProviderTable`] compiles them once and is
//! then shared read-only.

pub mod airlines;

use std::sync::Arc;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const BUILTIN_PROVIDERS: &str = include_str!("../../data/providers.json");

/// Subject patterns used by providers that do not list their own.
pub const DEFAULT_SUBJECT_PATTERNS: &[&str] = &[
    r"confirm",
    r"itinerary",
    r"reservation",
    r"booking",
    r"e-?ticket",
    r"receipt",
    r"\btrip\b",
    r"\bflight\b",
    r"schedule change",
    r"boarding pass",
    r"check[- ]?in",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Airline,
    BookingSite,
    CorporateTravel,
    CardTravel,
    Aggregator,
}

/// Declarative description of one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDescriptor {
    pub name: String,
    pub kind: ProviderKind,
    /// Sender domains. A sender matches on the domain itself or any
    /// subdomain of it.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Case-insensitive regexes matched against the full sender line.
    #[serde(default)]
    pub sender_patterns: Vec<String>,
    /// Case-insensitive regexes matched against the subject. Empty means
    /// [`DEFAULT_SUBJECT_PATTERNS`].
    #[serde(default)]
    pub subject_patterns: Vec<String>,
    /// Designators used to prefix bare flight numbers.
    #[serde(default)]
    pub airline_codes: Vec<String>,
    /// Regexes with a named `code` group, tried on subject then body.
    #[serde(default)]
    pub confirmation_patterns: Vec<String>,
    #[serde(default)]
    pub priority: i32,
}

/// A compiled provider.
#[derive(Debug)]
pub struct Provider {
    pub name: String,
    pub kind: ProviderKind,
    pub domains: Vec<String>,
    pub airline_codes: Vec<String>,
    pub priority: i32,
    sender_patterns: Vec<Regex>,
    subject_patterns: Vec<Regex>,
    confirmation_patterns: Vec<Regex>,
}

impl Provider {
    pub fn compile(descriptor: &ProviderDescriptor) -> Result<Self, ConfigError> {
        let name = descriptor.name.trim();
        if name.is_empty() {
            return Err(ConfigError::InvalidProvider {
                name: descriptor.name.clone(),
                reason: "name must not be empty".to_string(),
            });
        }
        if descriptor.domains.is_empty() && descriptor.sender_patterns.is_empty() {
            return Err(ConfigError::InvalidProvider {
                name: name.to_string(),
                reason: "needs at least one domain or sender pattern".to_string(),
            });
        }

        let compile_ci = |pattern: &str| {
            Regex::new(&format!("(?i){}", pattern)).map_err(|e| ConfigError::InvalidPattern {
                provider: name.to_string(),
                reason: e.to_string(),
            })
        };

        let sender_patterns = descriptor
            .sender_patterns
            .iter()
            .map(|p| compile_ci(p))
            .collect::<Result<Vec<_>, _>>()?;

        let subject_patterns = if descriptor.subject_patterns.is_empty() {
            DEFAULT_SUBJECT_PATTERNS
                .iter()
                .map(|p| compile_ci(p))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            descriptor
                .subject_patterns
                .iter()
                .map(|p| compile_ci(p))
                .collect::<Result<Vec<_>, _>>()?
        };

        let confirmation_patterns = descriptor
            .confirmation_patterns
            .iter()
            .map(|p| {
                let regex = Regex::new(p).map_err(|e| ConfigError::InvalidPattern {
                    provider: name.to_string(),
                    reason: e.to_string(),
                })?;
                if !regex.capture_names().flatten().any(|n| n == "code") {
                    return Err(ConfigError::InvalidPattern {
                        provider: name.to_string(),
                        reason: format!("confirmation pattern '{}' has no 'code' group", p),
                    });
                }
                Ok(regex)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.to_string(),
            kind: descriptor.kind,
            domains: descriptor
                .domains
                .iter()
                .map(|d| d.trim().trim_start_matches('@').to_lowercase())
                .collect(),
            airline_codes: descriptor
                .airline_codes
                .iter()
                .map(|c| c.trim().to_uppercase())
                .collect(),
            priority: descriptor.priority,
            sender_patterns,
            subject_patterns,
            confirmation_patterns,
        })
    }

    /// Sender domain (or the full sender line) belongs to this provider.
    pub fn matches_sender(&self, sender: &str, domain: Option<&str>) -> bool {
        let domain_match = domain.is_some_and(|domain| {
            self.domains.iter().any(|d| {
                domain == d
                    || domain
                        .strip_suffix(d.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            })
        });
        domain_match || self.sender_patterns.iter().any(|re| re.is_match(sender))
    }

    pub fn matches_subject(&self, subject: &str) -> bool {
        self.subject_patterns.iter().any(|re| re.is_match(subject))
    }

    pub fn confirmation_patterns(&self) -> &[Regex] {
        &self.confirmation_patterns
    }

    /// Designator used to prefix bare flight numbers, if this provider
    /// operates flights.
    pub fn primary_airline_code(&self) -> Option<&str> {
        self.airline_codes.first().map(String::as_str)
    }
}

/// Compiled providers ordered by priority, highest first.
#[derive(Debug, Clone, Default)]
pub struct ProviderTable {
    providers: Vec<Arc<Provider>>,
}

impl ProviderTable {
    /// The embedded provider table.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_descriptors(&builtin_descriptors()?)
    }

    /// The embedded table plus extra descriptors. An extra descriptor with
    /// the same name as an embedded one replaces it.
    pub fn with_extra(extra: &[ProviderDescriptor]) -> Result<Self, ConfigError> {
        let mut descriptors = builtin_descriptors()?;
        for descriptor in extra {
            match descriptors
                .iter_mut()
                .find(|d| d.name.eq_ignore_ascii_case(&descriptor.name))
            {
                Some(existing) => *existing = descriptor.clone(),
                None => descriptors.push(descriptor.clone()),
            }
        }
        Self::from_descriptors(&descriptors)
    }

    pub fn from_descriptors(descriptors: &[ProviderDescriptor]) -> Result<Self, ConfigError> {
        let mut providers = descriptors
            .iter()
            .map(|d| Provider::compile(d).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        // Stable sort keeps file order within a priority.
        providers.sort_by(|a, b| b.priority.cmp(&a.priority));

        debug!("Compiled {} providers", providers.len());
        Ok(Self { providers })
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Provider>> {
        self.providers.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Provider>> {
        self.providers
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// First provider (by priority) whose sender and subject rules both
    /// match.
    pub fn find_match(&self, sender: &str, domain: Option<&str>, subject: &str) -> Option<&Arc<Provider>> {
        self.providers
            .iter()
            .find(|p| p.matches_sender(sender, domain) && p.matches_subject(subject))
    }

    /// First provider whose sender rule matches, regardless of subject.
    pub fn find_sender(&self, sender: &str, domain: Option<&str>) -> Option<&Arc<Provider>> {
        self.providers
            .iter()
            .find(|p| p.matches_sender(sender, domain))
    }
}

/// Parses the embedded provider descriptors.
pub fn builtin_descriptors() -> Result<Vec<ProviderDescriptor>, ConfigError> {
    Ok(serde_json::from_str(BUILTIN_PROVIDERS)?)
}
