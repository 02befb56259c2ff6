use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::error::TransportError;
use crate::message::{parse_rfc822, RawMessage};

/// Supplies decoded messages to a scan, in transport order.
///
/// Implementations own connection handling, retries and charset decoding.
pub trait MessageSource {
    /// Next message, or `Ok(None)` when the mailbox is exhausted.
    fn next_message(&mut self) -> Result<Option<RawMessage>, TransportError>;
}

/// An in-memory source, used by tests and by callers that fetch up front.
#[derive(Debug, Default)]
pub struct VecSource {
    messages: VecDeque<RawMessage>,
}

impl VecSource {
    pub fn new(messages: Vec<RawMessage>) -> Self {
        Self {
            messages: messages.into(),
        }
    }

    /// Parses raw RFC 822 messages. Messages without a `Date` header are
    /// stamped with `fallback_received_at`.
    pub fn from_rfc822<I, B>(raw: I, fallback_received_at: DateTime<Utc>) -> Result<Self, TransportError>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let messages = raw
            .into_iter()
            .map(|bytes| parse_rfc822(bytes.as_ref(), fallback_received_at))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(messages))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl MessageSource for VecSource {
    fn next_message(&mut self) -> Result<Option<RawMessage>, TransportError> {
        Ok(self.messages.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_vec_source_preserves_order() {
        let at = Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap();
        let mut source = VecSource::new(vec![
            RawMessage::new("a", "x@y.com", "one", "", at),
            RawMessage::new("b", "x@y.com", "two", "", at),
        ]);
        assert_eq!(source.len(), 2);
        assert_eq!(source.next_message().unwrap().unwrap().id, "a");
        assert_eq!(source.next_message().unwrap().unwrap().id, "b");
        assert!(source.next_message().unwrap().is_none());
    }

    #[test]
    fn test_from_rfc822() {
        let raw = b"From: JetBlue <reservations@jetblue.com>\r\n\
Subject: Your upcoming trip - EJZOSU\r\n\
Message-ID: <abc@jetblue.com>\r\n\
Date: Sat, 01 Nov 2025 10:00:00 +0000\r\n\
\r\n\
Confirmation code: EJZOSU\r\n";
        let fallback = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let mut source = VecSource::from_rfc822([&raw[..]], fallback).unwrap();
        let message = source.next_message().unwrap().unwrap();
        assert_eq!(message.subject, "Your upcoming trip - EJZOSU");
        assert_eq!(message.received_at, Utc.with_ymd_and_hms(2025, 11, 1, 10, 0, 0).unwrap());
    }
}
