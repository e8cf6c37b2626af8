//! Core data model types: decoded messages, candidate mentions, and events.

pub mod event;
pub mod message;

pub use event::{CandidateMention, EntityKind, Event, ResolvedInstant, UrgencyTier};
pub use message::DecodedMessage;
