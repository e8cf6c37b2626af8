//! Mailbox query parser and matcher.
//!
//! # Supported syntax
//!
//! **Simple search**: `deadline` matches subject, from, or to.
//!
//! **Field-specific**:
//! - `from:boss@example.com`
//! - `to:team@example.com`
//! - `subject:invoice`
//!
//! **Operators**:
//! - `term1 term2`: implicit AND
//! - `-term`: NOT (exclude)
//! - `"exact phrase"`: quoted phrase, whitespace kept
//!
//! Matching is case-insensitive substring matching. An empty query matches
//! every message.

use super::MessageHeaders;

/// Which header a term looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
    /// Subject, from, or to.
    All,
    From,
    To,
    Subject,
}

/// One search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerm {
    pub field: QueryField,
    /// Lowercased text to look for.
    pub needle: String,
    pub negated: bool,
}

/// A parsed query. All terms must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailboxQuery {
    pub terms: Vec<QueryTerm>,
}

impl MailboxQuery {
    /// Parse a query string. Never fails; unknown prefixes are plain text.
    pub fn parse(input: &str) -> Self {
        let mut terms = Vec::new();

        for token in tokenize(input.trim()) {
            let (negated, token) = match token.strip_prefix('-') {
                Some(stripped) if !stripped.is_empty() => (true, stripped),
                _ => (false, token.as_str()),
            };

            let (field, value) = if let Some(value) = token.strip_prefix("from:") {
                (QueryField::From, value)
            } else if let Some(value) = token.strip_prefix("to:") {
                (QueryField::To, value)
            } else if let Some(value) = token.strip_prefix("subject:") {
                (QueryField::Subject, value)
            } else {
                (QueryField::All, token)
            };

            let needle = unquote(value).to_lowercase();
            if needle.is_empty() {
                continue;
            }
            terms.push(QueryTerm {
                field,
                needle,
                negated,
            });
        }

        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether a message with these headers satisfies every term.
    pub fn matches(&self, headers: &MessageHeaders) -> bool {
        self.terms.iter().all(|term| term_matches(headers, term))
    }
}

fn term_matches(headers: &MessageHeaders, term: &QueryTerm) -> bool {
    let raw_match = match term.field {
        QueryField::All => {
            contains(&headers.subject, &term.needle)
                || contains(&headers.from, &term.needle)
                || contains(&headers.to, &term.needle)
        }
        QueryField::From => contains(&headers.from, &term.needle),
        QueryField::To => contains(&headers.to, &term.needle),
        QueryField::Subject => contains(&headers.subject, &term.needle),
    };

    if term.negated {
        !raw_match
    } else {
        raw_match
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(value)
}

/// Tokenize input respecting quoted strings.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            current.push(ch);
        } else if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
