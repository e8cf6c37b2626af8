//! Decoded message type.

use serde::Serialize;

/// The text content of one raw message, with headers resolved and the body
/// reduced to its plain-text part.
///
/// Every field may be empty: decoding never fails, it degrades.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedMessage {
    /// Decoded subject line (RFC 2047 encoded-words resolved).
    pub subject: String,

    /// Decoded `From:` header, as written (display name and address).
    pub from: String,

    /// Decoded `To:` header, as written (all recipients).
    pub to: String,

    /// Plain-text body. Empty when the message has no usable text part.
    pub body_text: String,
}

impl DecodedMessage {
    /// Text handed to the entity extractor: subject and body joined by a newline.
    pub fn analysis_text(&self) -> String {
        match (self.subject.is_empty(), self.body_text.is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.subject.clone(),
            (true, false) => self.body_text.clone(),
            (false, false) => format!("{}\n{}", self.subject, self.body_text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_text_joins_subject_and_body() {
        let msg = DecodedMessage {
            subject: "Reminder".into(),
            body_text: "Due tomorrow".into(),
            ..Default::default()
        };
        assert_eq!(msg.analysis_text(), "Reminder\nDue tomorrow");
    }

    #[test]
    fn test_analysis_text_empty() {
        assert_eq!(DecodedMessage::default().analysis_text(), "");
    }
}
