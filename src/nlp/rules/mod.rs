//! Rule-based English recognizer and resolver.
//!
//! No model files: both engines are regular expressions over a small lexicon,
//! so they are always available.

pub mod lexicon;
mod recognizer;
mod resolver;

pub use recognizer::RuleRecognizer;
pub use resolver::RuleResolver;
