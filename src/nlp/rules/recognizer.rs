//! Regex-based temporal entity recognizer.

use std::sync::OnceLock;

use regex::Regex;

use crate::nlp::{EntityRecognizer, RecognizerError, TaggedSpan};

use super::lexicon::{date_pattern, time_pattern, HOLIDAY};

/// Tags English date, time, and holiday expressions.
///
/// A date directly followed by a clock time (`next Friday at 3 PM`), or a
/// time followed by a date (`10am on Monday`), is one `DATE` span. A lone
/// clock time is `TIME`; a holiday name is `EVENT`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleRecognizer;

impl RuleRecognizer {
    pub fn new() -> Self {
        Self
    }
}

fn mention_regex() -> &'static Regex {
    static MENTION_RE: OnceLock<Regex> = OnceLock::new();
    MENTION_RE.get_or_init(|| {
        let date = date_pattern();
        let time = time_pattern();
        let pattern = format!(
            r"(?i)\b(?:(?P<event>{HOLIDAY})\b|(?P<date>{date})(?:,?\s+(?:at\s+|@\s*|by\s+)?(?P<dtime>{time}))?|(?P<time>{time})(?:,?\s+(?:on\s+)?(?P<tdate>{date}))?)"
        );
        Regex::new(&pattern).expect("mention regex must compile")
    })
}

impl EntityRecognizer for RuleRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<TaggedSpan>, RecognizerError> {
        let spans = mention_regex()
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let label = if caps.name("event").is_some() {
                    "EVENT"
                } else if caps.name("date").is_some() || caps.name("tdate").is_some() {
                    "DATE"
                } else {
                    "TIME"
                };
                Some(TaggedSpan {
                    text: whole.as_str().to_string(),
                    label: label.to_string(),
                    start: whole.start(),
                    end: whole.end(),
                })
            })
            .collect();
        Ok(spans)
    }
}
