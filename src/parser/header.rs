//! RFC 5322 header block handling: locating, unfolding, and RFC 2047 decoding.

use tracing::warn;

/// Strip a UTF-8 BOM and a leading MBOX `From ` envelope line, if present.
pub fn skip_envelope(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}

/// Split a message into its header block and body at the first blank line.
///
/// A message without a blank line is all headers and has an empty body.
pub fn split_header_block(data: &[u8]) -> (&[u8], &[u8]) {
    for i in 0..data.len() {
        if data[i] != b'\n' {
            continue;
        }
        let rest = &data[i + 1..];
        if rest.starts_with(b"\n") {
            return (&data[..i], &rest[1..]);
        }
        if rest.starts_with(b"\r\n") {
            return (&data[..i], &rest[2..]);
        }
    }
    // A header block that opens with a blank line has no headers at all.
    if let Some(body) = data.strip_prefix(b"\r\n").or_else(|| data.strip_prefix(b"\n")) {
        return (&[], body);
    }
    (data, &[])
}

/// Unfolded header fields of one message, in order of appearance.
#[derive(Debug, Clone, Default)]
pub struct HeaderFields {
    /// `(lowercase_name, raw_value)` pairs.
    fields: Vec<(String, String)>,
}

impl HeaderFields {
    /// Parse a raw header block.
    pub fn parse(raw_headers: &[u8]) -> Self {
        let text = decode_header_bytes(raw_headers);
        Self {
            fields: unfold_headers(&text),
        }
    }

    /// First raw value for a header name (case-insensitive).
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First value for a header name with encoded-words resolved, or `""`.
    pub fn decoded(&self, name: &str) -> String {
        self.raw(name).map(decode_encoded_words).unwrap_or_default()
    }
}

/// Decode raw header bytes to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
fn decode_header_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Join continuation lines (starting with space or tab) onto the previous field.
fn unfold_headers(text: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = result.last_mut() {
                if !last.1.is_empty() {
                    last.1.push(' ');
                }
                last.1.push_str(line.trim());
            }
        } else if let Some((name, value)) = line.split_once(':') {
            result.push((name.trim().to_lowercase(), value.trim().to_string()));
        }
        // Lines without a colon that are not continuations carry nothing usable.
    }

    result
}

/// Decode RFC 2047 encoded-words in a header value.
///
/// Example: `"=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?="` → `"Hola mundo"`
///
/// Any token that fails to decode is kept verbatim, so the worst case is the
/// raw header text.
pub fn decode_encoded_words(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut remaining = input;
    let mut last_was_encoded = false;

    while let Some(start) = remaining.find("=?") {
        let before = &remaining[..start];
        // Whitespace between two encoded words is not part of the text (RFC 2047 §6.2).
        if !last_was_encoded || !before.trim().is_empty() {
            result.push_str(before);
        }

        let after_start = &remaining[start + 2..];
        match decode_word(after_start) {
            Some((text, consumed)) => {
                result.push_str(&text);
                remaining = &after_start[consumed..];
                last_was_encoded = true;
            }
            None => {
                result.push_str("=?");
                remaining = after_start;
                last_was_encoded = false;
            }
        }
    }

    result.push_str(remaining);
    result
}

/// Decode one `charset?encoding?text?=` word (the leading `=?` already consumed).
///
/// Returns the decoded text and the number of bytes consumed.
fn decode_word(s: &str) -> Option<(String, usize)> {
    let (charset, rest) = s.split_once('?')?;
    let (encoding, rest) = rest.split_once('?')?;
    let end = rest.find("?=")?;
    let encoded_text = &rest[..end];

    if charset.is_empty() || charset.contains(char::is_whitespace) {
        return None;
    }
    // RFC 2231 language suffix: `UTF-8*en`
    let charset = charset.split('*').next().unwrap_or(charset);

    let bytes = match encoding {
        "B" | "b" => decode_base64(encoded_text)?,
        "Q" | "q" => decode_q(encoded_text),
        _ => return None,
    };

    let consumed = s.len() - rest.len() + end + 2;
    Some((decode_charset(Some(charset), &bytes), consumed))
}

/// Decode standard base64, ignoring whitespace. Invalid input yields `None`.
fn decode_base64(input: &str) -> Option<Vec<u8>> {
    fn sextet(c: u8) -> Option<u32> {
        match c {
            b'A'..=b'Z' => Some(u32::from(c - b'A')),
            b'a'..=b'z' => Some(u32::from(c - b'a') + 26),
            b'0'..=b'9' => Some(u32::from(c - b'0') + 52),
            b'+' => Some(62),
            b'/' => Some(63),
            _ => None,
        }
    }

    let symbols: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .take_while(|&b| b != b'=')
        .collect();

    let mut out = Vec::with_capacity(symbols.len() * 3 / 4);
    for chunk in symbols.chunks(4) {
        if chunk.len() == 1 {
            return None;
        }
        let mut acc = 0u32;
        for (i, &c) in chunk.iter().enumerate() {
            acc |= sextet(c)? << (18 - 6 * i);
        }
        out.push((acc >> 16) as u8);
        if chunk.len() > 2 {
            out.push((acc >> 8) as u8);
        }
        if chunk.len() > 3 {
            out.push(acc as u8);
        }
    }
    Some(out)
}

/// Decode Q-encoding (RFC 2047): underscores → spaces, `=XX` → byte.
fn decode_q(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => out.push(b' '),
            b'=' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                if let Some(byte) = hex {
                    out.push(byte);
                    i += 3;
                    continue;
                }
                out.push(b'=');
            }
            b => out.push(b),
        }
        i += 1;
    }
    out
}

/// Decode bytes using a named charset, replacing invalid sequences.
///
/// A missing label means UTF-8. Unknown labels fall back to UTF-8 as well.
pub fn decode_charset(charset: Option<&str>, bytes: &[u8]) -> String {
    let label = charset.map(str::trim).unwrap_or("");
    if label.is_empty()
        || label.eq_ignore_ascii_case("utf-8")
        || label.eq_ignore_ascii_case("utf8")
        || label.eq_ignore_ascii_case("us-ascii")
    {
        return String::from_utf8_lossy(bytes).into_owned();
    }

    match encoding_rs::Encoding::for_label(label.as_bytes()) {
        Some(encoding) => {
            let (decoded, _, _) = encoding.decode(bytes);
            decoded.into_owned()
        }
        None => {
            warn!(charset = label, "Unknown charset, falling back to UTF-8 lossy");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_encoded_word() {
        assert_eq!(decode_encoded_words("=?UTF-8?B?SG9sYSBtdW5kbw==?="), "Hola mundo");
    }

    #[test]
    fn test_decode_q_encoded_word() {
        assert_eq!(decode_encoded_words("=?ISO-8859-1?Q?caf=E9?="), "café");
    }

    #[test]
    fn test_adjacent_encoded_words_drop_whitespace() {
        let input = "=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?=";
        assert_eq!(decode_encoded_words(input), "Hola mundo");
    }

    #[test]
    fn test_mixed_plain_and_encoded() {
        let input = "Re: =?UTF-8?Q?Entrega_ma=C3=B1ana?= please";
        assert_eq!(decode_encoded_words(input), "Re: Entrega mañana please");
    }

    #[test]
    fn test_broken_encoded_word_kept_verbatim() {
        assert_eq!(decode_encoded_words("=?UTF-8?X?abc?="), "=?UTF-8?X?abc?=");
        assert_eq!(decode_encoded_words("=?UTF-8?B?###?="), "=?UTF-8?B?###?=");
        assert_eq!(decode_encoded_words("50% off =? maybe"), "50% off =? maybe");
    }

    #[test]
    fn test_language_suffix_ignored() {
        assert_eq!(decode_encoded_words("=?UTF-8*en?Q?Hello?="), "Hello");
    }

    #[test]
    fn test_windows1252_encoded_word() {
        assert_eq!(decode_encoded_words("=?Windows-1252?Q?M=FCller?="), "Müller");
    }

    #[test]
    fn test_unfold_headers() {
        let text = "Subject: Budget review is\n\tdue Friday\nFrom: a@example.com\n";
        let headers = unfold_headers(text);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].0, "subject");
        assert_eq!(headers[0].1, "Budget review is due Friday");
    }

    #[test]
    fn test_header_fields_case_insensitive() {
        let fields = HeaderFields::parse(b"SUBJECT: Hi\r\nfrom: x@y.z\r\n");
        assert_eq!(fields.raw("subject"), Some("Hi"));
        assert_eq!(fields.decoded("From"), "x@y.z");
        assert_eq!(fields.decoded("To"), "");
    }

    #[test]
    fn test_split_header_block_lf_and_crlf() {
        let (h, b) = split_header_block(b"Subject: Hi\n\nBody\n");
        assert_eq!(h, b"Subject: Hi");
        assert_eq!(b, b"Body\n");

        let (h, b) = split_header_block(b"Subject: Hi\r\n\r\nBody\r\n");
        assert_eq!(h, b"Subject: Hi\r");
        assert_eq!(b, b"Body\r\n");
    }

    #[test]
    fn test_split_header_block_without_body() {
        let (h, b) = split_header_block(b"Subject: Hi\n");
        assert_eq!(h, b"Subject: Hi\n");
        assert!(b.is_empty());
    }

    #[test]
    fn test_skip_envelope() {
        let data = b"From user@example.com Thu Jan 01 00:00:00 2024\nSubject: Test\n\nBody\n";
        assert!(skip_envelope(data).starts_with(b"Subject:"));
        assert_eq!(skip_envelope(b"Subject: Test\n"), b"Subject: Test\n");
    }

    #[test]
    fn test_decode_charset_replaces_invalid_bytes() {
        let text = decode_charset(Some("utf-8"), b"due \xff\xfe soon");
        assert!(text.contains('\u{FFFD}'));
        assert!(text.starts_with("due "));
    }

    #[test]
    fn test_decode_charset_latin1() {
        assert_eq!(decode_charset(Some("iso-8859-1"), b"r\xe9union"), "réunion");
    }

    #[test]
    fn test_decode_charset_unknown_label() {
        assert_eq!(decode_charset(Some("x-made-up"), b"plain"), "plain");
    }
}
