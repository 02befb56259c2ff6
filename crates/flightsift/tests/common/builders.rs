//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use flightsift::config::{Config, LogFormat};
use flightsift::{ProviderDescriptor, ProviderKind, RawMessage};

/// Builder for creating `RawMessage` instances.
pub struct MessageBuilder {
    id: String,
    sender: String,
    subject: String,
    body: String,
    received_at: DateTime<Utc>,
}

impl MessageBuilder {
    /// A plain message from an unknown sender, received 2025-11-01.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            sender: "someone@example.com".to_string(),
            subject: String::new(),
            body: String::new(),
            received_at: at(2025, 11, 1, 9),
        }
    }

    /// A JetBlue confirmation carrying `code`.
    pub fn jetblue(id: &str, code: &str) -> Self {
        Self::new(id)
            .sender("JetBlue Reservations <reservations@jetblue.com>")
            .subject(&format!("Your upcoming trip - {}", code))
    }

    /// An Alaska Airlines confirmation carrying `code` in the body.
    pub fn alaska(id: &str, code: &str) -> Self {
        Self::new(id)
            .sender("Alaska Airlines <service@ifly.alaskaair.com>")
            .subject("Your confirmation receipt")
            .body(&format!("Confirmation code: {}\n", code))
    }

    pub fn sender(mut self, sender: &str) -> Self {
        self.sender = sender.to_string();
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    /// Append a line to the body.
    pub fn line(mut self, line: &str) -> Self {
        self.body.push_str(line);
        self.body.push('\n');
        self
    }

    pub fn received(mut self, year: i32, month: u32, day: u32, hour: u32) -> Self {
        self.received_at = at(year, month, day, hour);
        self
    }

    pub fn build(self) -> RawMessage {
        RawMessage::new(self.id, self.sender, self.subject, self.body, self.received_at)
    }
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid test timestamp")
}

/// Builder for creating `Config` instances.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn history_file(mut self, path: &std::path::Path) -> Self {
        self.config.history_file = path.to_path_buf();
        self
    }

    pub fn airports_file(mut self, path: &std::path::Path) -> Self {
        self.config.airports_file = Some(path.to_path_buf());
        self
    }

    pub fn provider(mut self, provider: ProviderDescriptor) -> Self {
        self.config.providers.push(provider);
        self
    }

    pub fn deny_airport(mut self, code: &str) -> Self {
        self.config.deny_list.airport_codes.push(code.to_string());
        self
    }

    pub fn deny_confirmation(mut self, code: &str) -> Self {
        self.config.deny_list.confirmation_codes.push(code.to_string());
        self
    }

    pub fn scoring(mut self, threshold: i32) -> Self {
        self.config.scoring.enabled = true;
        self.config.scoring.threshold = threshold;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.forwarding.dry_run = dry_run;
        self
    }

    pub fn json_logs(mut self) -> Self {
        self.config.logging.format = LogFormat::Json;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Builder for custom provider descriptors.
pub struct ProviderBuilder {
    descriptor: ProviderDescriptor,
}

impl ProviderBuilder {
    pub fn new(name: &str, kind: ProviderKind) -> Self {
        Self {
            descriptor: ProviderDescriptor {
                name: name.to_string(),
                kind,
                domains: vec![],
                sender_patterns: vec![],
                subject_patterns: vec![],
                airline_codes: vec![],
                confirmation_patterns: vec![],
                priority: 0,
            },
        }
    }

    pub fn domain(mut self, domain: &str) -> Self {
        self.descriptor.domains.push(domain.to_string());
        self
    }

    pub fn subject_pattern(mut self, pattern: &str) -> Self {
        self.descriptor.subject_patterns.push(pattern.to_string());
        self
    }

    pub fn airline_code(mut self, code: &str) -> Self {
        self.descriptor.airline_codes.push(code.to_string());
        self
    }

    pub fn confirmation_pattern(mut self, pattern: &str) -> Self {
        self.descriptor.confirmation_patterns.push(pattern.to_string());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.descriptor.priority = priority;
        self
    }

    pub fn build(self) -> ProviderDescriptor {
        self.descriptor
    }
}
