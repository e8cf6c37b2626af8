//! Email parsing: header decoding, MIME body selection, and MBOX splitting.

pub mod header;
pub mod mbox;
pub mod mime;

pub use mime::{decode_message, decode_message_observed};
