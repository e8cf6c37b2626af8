//! Candidate mention extraction on top of an [`EntityRecognizer`].

use std::ops::Range;

use tracing::debug;

use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::model::{CandidateMention, EntityKind};

use super::EntityRecognizer;

/// Tokens kept on each side of a mention by default.
pub const DEFAULT_CONTEXT_RADIUS: usize = 10;

/// Turns free text into temporal [`CandidateMention`]s.
pub struct TemporalEntityExtractor {
    recognizer: Box<dyn EntityRecognizer>,
    context_radius: usize,
}

impl TemporalEntityExtractor {
    pub fn new(recognizer: Box<dyn EntityRecognizer>) -> Self {
        Self {
            recognizer,
            context_radius: DEFAULT_CONTEXT_RADIUS,
        }
    }

    /// Number of whitespace tokens kept before and after each mention.
    pub fn with_context_radius(mut self, radius: usize) -> Self {
        self.context_radius = radius;
        self
    }

    pub fn context_radius(&self) -> usize {
        self.context_radius
    }

    /// Extract DATE/TIME/EVENT mentions from `text`.
    ///
    /// A failing recognizer yields no candidates; the failure goes to `sink`.
    pub fn extract(&self, text: &str, sink: &mut dyn DiagnosticSink) -> Vec<CandidateMention> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let spans = match self.recognizer.recognize(text) {
            Ok(spans) => spans,
            Err(e) => {
                sink.report(Diagnostic::ExtractionUnavailable {
                    reason: e.to_string(),
                });
                return Vec::new();
            }
        };

        let tokens = token_ranges(text);
        let mut mentions = Vec::new();

        for span in spans {
            let Some(kind) = EntityKind::from_label(&span.label) else {
                continue;
            };
            let in_bounds = span.start < span.end
                && span.end <= text.len()
                && text.is_char_boundary(span.start)
                && text.is_char_boundary(span.end);
            if !in_bounds {
                sink.report(Diagnostic::InvalidSpan {
                    start: span.start,
                    end: span.end,
                });
                continue;
            }

            let source_span = span.start..span.end;
            let Some(context_window) = context_window(text, &tokens, &source_span, self.context_radius)
            else {
                continue;
            };

            mentions.push(CandidateMention {
                entity_text: text[source_span.clone()].to_string(),
                entity_kind: kind,
                context_window,
                source_span,
            });
        }

        debug!(candidates = mentions.len(), "extracted temporal mentions");
        mentions
    }
}

/// Byte ranges of the whitespace-separated tokens of `text`.
fn token_ranges(text: &str) -> Vec<Range<usize>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push(s..i);
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(s..text.len());
    }
    tokens
}

/// Slice of `text` spanning `radius` tokens either side of `span`.
///
/// `None` when no token overlaps the span (a whitespace-only span).
fn context_window(
    text: &str,
    tokens: &[Range<usize>],
    span: &Range<usize>,
    radius: usize,
) -> Option<String> {
    let first = tokens.iter().position(|t| t.end > span.start)?;
    let last = tokens.iter().rposition(|t| t.start < span.end)?;
    if last < first {
        return None;
    }

    let lo = first.saturating_sub(radius);
    let hi = (last + radius).min(tokens.len() - 1);
    Some(text[tokens[lo].start..tokens[hi].end].to_string())
}
