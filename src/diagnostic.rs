//! Soft-failure reporting for the event pipeline.
//!
//! Nothing in the pipeline is fatal. Recovered failures are handed to an
//! optional [`DiagnosticSink`] so the caller can count or log them, and are
//! also traced at debug level.

use std::fmt;

/// A failure the pipeline recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The MIME structure could not be parsed; fields were degraded.
    DecodeFailure { reason: String },
    /// The entity recognizer errored; the text produced no candidates.
    ExtractionUnavailable { reason: String },
    /// A mention did not resolve to a date and was dropped.
    ResolutionFailure { text: String },
    /// The recognizer returned a span that does not fit the analysed text.
    InvalidSpan { start: usize, end: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecodeFailure { reason } => write!(f, "decode failure: {reason}"),
            Self::ExtractionUnavailable { reason } => {
                write!(f, "entity extraction unavailable: {reason}")
            }
            Self::ResolutionFailure { text } => write!(f, "could not resolve '{text}'"),
            Self::InvalidSpan { start, end } => write!(f, "invalid span {start}..{end}"),
        }
    }
}

/// Receiver for recovered failures.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(%diagnostic, "pipeline diagnostic");
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(%diagnostic, "pipeline diagnostic");
        self.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        sink.report(Diagnostic::ResolutionFailure {
            text: "someday".into(),
        });
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].to_string(), "could not resolve 'someday'");
    }
}
