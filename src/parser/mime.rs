//! Raw message decoding: headers, MIME part selection, and body charset handling.

use mail_parser::{MessageParser, MessagePart, MimeHeaders, PartType};

use crate::diagnostic::{Diagnostic, DiagnosticSink, NullSink};
use crate::model::DecodedMessage;

use super::header::{self, HeaderFields};

/// Decode one raw message. Never fails; malformed input yields empty fields.
pub fn decode_message(raw: &[u8]) -> DecodedMessage {
    decode_message_observed(raw, &mut NullSink)
}

/// Like [`decode_message`], reporting recovered failures to `sink`.
pub fn decode_message_observed(raw: &[u8], sink: &mut dyn DiagnosticSink) -> DecodedMessage {
    let data = header::skip_envelope(raw);
    let (header_block, body_bytes) = header::split_header_block(data);
    let headers = HeaderFields::parse(header_block);

    let body_text = match MessageParser::default().parse(data) {
        Some(msg) => select_body(&msg),
        None => {
            sink.report(Diagnostic::DecodeFailure {
                reason: format!("unparseable MIME structure ({} bytes)", raw.len()),
            });
            String::from_utf8_lossy(body_bytes).into_owned()
        }
    };

    DecodedMessage {
        subject: headers.decoded("subject"),
        from: headers.decoded("from"),
        to: headers.decoded("to"),
        body_text: body_text.trim().to_string(),
    }
}

/// Pick the body text of a parsed message.
///
/// Multipart: the first `text/plain` leaf (in document order, through nested
/// multiparts) that is not an attachment. Single part: the payload itself.
fn select_body(msg: &mail_parser::Message<'_>) -> String {
    let Some(root) = msg.parts.first() else {
        return String::new();
    };

    if !matches!(root.body, PartType::Multipart(_)) {
        return part_text(root);
    }

    msg.parts
        .iter()
        .skip(1)
        .find(|part| is_plain_text(part) && !is_attachment(part))
        .map(part_text)
        .unwrap_or_default()
}

fn is_plain_text(part: &MessagePart<'_>) -> bool {
    match part.content_type() {
        Some(ct) => {
            ct.ctype().eq_ignore_ascii_case("text")
                && ct
                    .subtype()
                    .is_some_and(|sub| sub.eq_ignore_ascii_case("plain"))
        }
        // Parts without a Content-Type default to text/plain.
        None => matches!(part.body, PartType::Text(_)),
    }
}

fn is_attachment(part: &MessagePart<'_>) -> bool {
    part.content_disposition()
        .is_some_and(|d| d.ctype().eq_ignore_ascii_case("attachment"))
}

/// Text of a single part. `mail-parser` has already undone the transfer
/// encoding and, for text parts, the charset.
fn part_text(part: &MessagePart<'_>) -> String {
    match &part.body {
        PartType::Text(text) | PartType::Html(text) => text.to_string(),
        PartType::Binary(bytes) | PartType::InlineBinary(bytes) => {
            let charset = part.content_type().and_then(|ct| ct.attribute("charset"));
            header::decode_charset(charset, bytes)
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_part_body() {
        let raw = b"Subject: Hi\nFrom: a@example.com\nTo: b@example.com\n\nThe report is due Friday.\n";
        let msg = decode_message(raw);
        assert_eq!(msg.subject, "Hi");
        assert_eq!(msg.from, "a@example.com");
        assert_eq!(msg.to, "b@example.com");
        assert_eq!(msg.body_text, "The report is due Friday.");
    }

    #[test]
    fn test_encoded_subject() {
        let raw = b"Subject: =?UTF-8?B?UmV1bmnDs24gbWHDsWFuYQ==?=\n\nbody\n";
        assert_eq!(decode_message(raw).subject, "Reunión mañana");
    }

    #[test]
    fn test_multipart_picks_plain_over_html() {
        let raw = b"Subject: Mixed\n\
MIME-Version: 1.0\n\
Content-Type: multipart/alternative; boundary=\"b1\"\n\
\n\
--b1\n\
Content-Type: text/html; charset=utf-8\n\
\n\
<p>HTML version</p>\n\
--b1\n\
Content-Type: text/plain; charset=utf-8\n\
\n\
Plain version\n\
--b1--\n";
        assert_eq!(decode_message(raw).body_text, "Plain version");
    }

    #[test]
    fn test_multipart_skips_plain_attachment() {
        let raw = b"Subject: Files\n\
MIME-Version: 1.0\n\
Content-Type: multipart/mixed; boundary=\"b2\"\n\
\n\
--b2\n\
Content-Type: text/plain\n\
Content-Disposition: attachment; filename=\"notes.txt\"\n\
\n\
attached notes\n\
--b2\n\
Content-Type: text/plain\n\
\n\
inline body\n\
--b2--\n";
        assert_eq!(decode_message(raw).body_text, "inline body");
    }

    #[test]
    fn test_multipart_without_plain_is_empty() {
        let raw = b"Subject: Only HTML\n\
MIME-Version: 1.0\n\
Content-Type: multipart/alternative; boundary=\"b3\"\n\
\n\
--b3\n\
Content-Type: text/html\n\
\n\
<p>Due next Friday</p>\n\
--b3--\n";
        assert_eq!(decode_message(raw).body_text, "");
    }

    #[test]
    fn test_nested_multipart_plain_leaf() {
        let raw = b"Subject: Nested\n\
MIME-Version: 1.0\n\
Content-Type: multipart/mixed; boundary=\"outer\"\n\
\n\
--outer\n\
Content-Type: multipart/alternative; boundary=\"inner\"\n\
\n\
--inner\n\
Content-Type: text/plain\n\
\n\
nested plain\n\
--inner\n\
Content-Type: text/html\n\
\n\
<b>nested html</b>\n\
--inner--\n\
--outer\n\
Content-Type: application/pdf\n\
Content-Disposition: attachment; filename=\"a.pdf\"\n\
Content-Transfer-Encoding: base64\n\
\n\
JVBERi0=\n\
--outer--\n";
        assert_eq!(decode_message(raw).body_text, "nested plain");
    }

    #[test]
    fn test_base64_body_with_latin1_charset() {
        // "réunion jeudi" in ISO-8859-1, base64 encoded
        let raw = b"Subject: x\n\
Content-Type: text/plain; charset=iso-8859-1\n\
Content-Transfer-Encoding: base64\n\
\n\
cul1bmlvbiBqZXVkaQ==\n";
        assert_eq!(decode_message(raw).body_text, "réunion jeudi");
    }

    #[test]
    fn test_undecodable_body_gets_replacement_chars() {
        let raw = b"Subject: bad bytes\n\
Content-Type: text/plain; charset=utf-8\n\
Content-Transfer-Encoding: 8bit\n\
\n\
Due \xff\xfe Friday\n";
        let msg = decode_message(raw);
        assert!(!msg.body_text.is_empty());
        assert!(msg.body_text.contains('\u{FFFD}'));
        assert!(msg.body_text.contains("Friday"));
    }

    #[test]
    fn test_mbox_envelope_skipped() {
        let raw = b"From someone@example.com Mon Oct 19 09:00:00 2026\nSubject: Env\n\nbody\n";
        assert_eq!(decode_message(raw).subject, "Env");
    }

    #[test]
    fn test_empty_input_never_panics() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        let msg = decode_message_observed(b"", &mut sink);
        assert_eq!(msg, DecodedMessage::default());
    }

    #[test]
    fn test_garbage_input_never_panics() {
        let msg = decode_message(b"\x00\x01\x02 not an email at all \xff");
        assert!(msg.subject.is_empty());
    }
}
