//! Temporal entity extraction and date resolution.
//!
//! The recognizer and resolver engines are capabilities behind two narrow
//! traits, [`EntityRecognizer`] and [`TemporalResolver`]. The pipeline only
//! talks to the traits; [`rules`] ships a rule-based implementation of each.

pub mod extract;
pub mod resolve;
pub mod rules;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::model::ResolvedInstant;

pub use extract::TemporalEntityExtractor;
pub use resolve::DateResolver;

/// One span tagged by an entity recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSpan {
    pub text: String,
    /// Entity label, e.g. `DATE`, `TIME`, `EVENT`, `PERSON`.
    pub label: String,
    /// Byte offset of the first byte of the span.
    pub start: usize,
    /// Byte offset one past the last byte of the span.
    pub end: usize,
}

/// Failure of an entity recognizer. Never escapes the pipeline.
#[derive(Error, Debug)]
pub enum RecognizerError {
    /// The model is not installed or could not be loaded.
    #[error("recognizer unavailable: {0}")]
    Unavailable(String),

    /// The model ran but failed on this input.
    #[error("recognition failed: {0}")]
    Failed(String),
}

/// Named-entity recognition capability.
pub trait EntityRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<TaggedSpan>, RecognizerError>;
}

/// Inputs to a resolution besides the text itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveContext {
    /// Evaluation instant; relative expressions are measured from here.
    pub now: DateTime<FixedOffset>,
    /// Pick the future reading of expressions with no temporal direction.
    pub prefer_future: bool,
}

/// Date/time resolution capability.
pub trait TemporalResolver {
    fn resolve(&self, text: &str, ctx: &ResolveContext) -> Option<ResolvedInstant>;
}
