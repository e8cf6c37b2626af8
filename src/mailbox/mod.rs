//! Local mailbox access.
//!
//! A [`Mailbox`] answers two questions: which messages match a query, and
//! what are the raw bytes of one of them. Remote mailboxes can implement the
//! same trait; this crate ships an MBOX file and a directory of `.eml` files.

pub mod eml;
pub mod mbox;
pub mod query;

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::{RemindError, Result};
use crate::parser::header::{self, HeaderFields};

pub use eml::EmlDirMailbox;
pub use mbox::MboxMailbox;
pub use query::MailboxQuery;

/// Opaque identifier of a message within one mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of raw messages.
pub trait Mailbox {
    /// Identifiers of the messages matching `query`, in mailbox order.
    fn search(&self, query: &MailboxQuery) -> Result<Vec<MessageId>>;

    /// Raw bytes of one message; `None` if the mailbox has no such message.
    fn fetch(&self, id: &MessageId) -> Result<Option<Vec<u8>>>;
}

/// The decoded headers a query is matched against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageHeaders {
    pub subject: String,
    pub from: String,
    pub to: String,
}

impl MessageHeaders {
    /// Decode the headers of a raw message (MBOX envelope line allowed).
    pub fn from_raw(raw: &[u8]) -> Self {
        let (header_block, _) = header::split_header_block(header::skip_envelope(raw));
        let fields = HeaderFields::parse(header_block);
        Self {
            subject: fields.decoded("subject"),
            from: fields.decoded("from"),
            to: fields.decoded("to"),
        }
    }
}

/// Open `path` as a mailbox: a directory of `.eml` files or an MBOX file.
pub fn open(path: &Path) -> Result<Box<dyn Mailbox>> {
    let metadata = std::fs::metadata(path).map_err(|e| RemindError::io(path, e))?;
    if metadata.is_dir() {
        Ok(Box::new(EmlDirMailbox::open(path)?))
    } else {
        Ok(Box::new(MboxMailbox::open(path)?))
    }
}
