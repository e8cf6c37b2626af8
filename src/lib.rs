//! `mailremind`: turn raw email into a ranked list of dated action items.
//!
//! The core is [`pipeline::Pipeline`]: raw message bytes are decoded, scanned
//! for date and time mentions, resolved against an explicit evaluation time,
//! classified by urgency, deduplicated across messages, and ranked.
//! [`mailbox`] and [`scan`] feed it from local mailboxes; [`notify`] turns
//! the result into notification text.

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod mailbox;
pub mod model;
pub mod nlp;
pub mod notify;
pub mod parser;
pub mod pipeline;
pub mod rank;
pub mod scan;
pub mod urgency;
