//! The normalized inbound message and the helpers that produce it.

use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use mail_parser::decoders::html::html_to_text;
use mail_parser::MessageParser;
use regex::Regex;

use crate::error::TransportError;

/// An inbound message as seen by the detection pipeline.
///
/// Produced by a message source and shared read-only with every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Stable identifier (the Message-ID when available).
    pub id: String,
    /// Sender as it appeared on the From line.
    pub sender: String,
    pub subject: String,
    /// Plain-text body. HTML parts are flattened before they get here.
    pub body: String,
    pub received_at: DateTime<Utc>,
}

impl RawMessage {
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            sender: sender.into(),
            subject: subject.into(),
            body: body.into(),
            received_at,
        }
    }

    /// The bare, lowercased sender address.
    ///
    /// `"JetBlue <Reservations@Email.JetBlue.com>"` becomes
    /// `"reservations@email.jetblue.com"`.
    pub fn sender_address(&self) -> String {
        let sender = self.sender.trim();
        let bare = match (sender.rfind('<'), sender.rfind('>')) {
            (Some(start), Some(end)) if start < end => &sender[start + 1..end],
            _ => sender,
        };
        bare.trim().to_lowercase()
    }

    /// The lowercased domain part of the sender address.
    pub fn sender_domain(&self) -> Option<String> {
        let address = self.sender_address();
        let (_, domain) = address.rsplit_once('@')?;
        let domain = domain.trim_end_matches('.');
        if domain.is_empty() {
            None
        } else {
            Some(domain.to_string())
        }
    }
}

/// Closing block tags that should end a line. mail-parser only breaks on
/// `<br>` and `</p>`.
static BLOCK_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*/\s*(?:div|tr|li|h[1-6]|table|tbody|thead|tfoot)\s*>|<\s*hr\b[^>]*>").unwrap()
});
static CELL_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<\s*/?\s*(?:td|th)\b[^>]*>").unwrap());

/// Heuristic check for HTML bodies that were passed through unflattened.
pub fn looks_like_html(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("<html") || lower.contains("<body") || lower.contains("<table") || lower.contains("<div")
}

/// Flattens an HTML document into text suitable for the field rules.
///
/// Tags, `<head>`/`<style>`/`<script>` content and entities are handled by
/// mail-parser's converter. Block-level tags additionally become line
/// breaks and table cells become spaces, so that "BOS" and "LAS" in
/// adjacent cells stay separate tokens.
pub fn strip_html(html: &str) -> String {
    let html = BLOCK_END_RE.replace_all(html, "<br>");
    let html = CELL_TAG_RE.replace_all(&html, "$0 ");

    html_to_text(&html)
        .replace('\u{a0}', " ")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses an RFC 822 message into a [`RawMessage`].
///
/// The text part is preferred; when only HTML is present it is flattened
/// with [`strip_html`]. Messages without a Date header take
/// `fallback_received_at`, and messages without a Message-ID get a
/// content-derived identifier so that re-reads stay stable.
pub fn parse_rfc822(
    raw: &[u8],
    fallback_received_at: DateTime<Utc>,
) -> Result<RawMessage, TransportError> {
    let message = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| TransportError::Parse("Failed to parse email message".to_string()))?;

    let subject = message.subject().unwrap_or_default().to_string();

    let sender = message
        .from()
        .and_then(|from| from.first())
        .map(|addr| match (addr.name(), addr.address()) {
            (Some(name), Some(address)) => format!("{} <{}>", name, address),
            (None, Some(address)) => address.to_string(),
            (Some(name), None) => name.to_string(),
            (None, None) => String::new(),
        })
        .unwrap_or_default();

    let body = match message.body_text(0) {
        Some(text) if !text.trim().is_empty() => text.into_owned(),
        _ => message
            .body_html(0)
            .map(|html| strip_html(&html))
            .unwrap_or_default(),
    };

    let received_at = message
        .date()
        .and_then(|date| Utc.timestamp_opt(date.to_timestamp(), 0).single())
        .unwrap_or(fallback_received_at);

    let id = match message.message_id() {
        Some(id) => id.to_string(),
        None => format!(
            "generated-{}",
            crate::sanitize::short_hash(&format!("{}|{}|{}", sender, subject, received_at))
        ),
    };

    debug!(
        "Parsed message id={} subject={:?}",
        id,
        if subject.is_empty() { "(no subject)" } else { subject.as_str() }
    );

    Ok(RawMessage {
        id,
        sender,
        subject,
        body,
        received_at,
    })
}
