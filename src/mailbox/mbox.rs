//! MBOX file mailbox.

use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::parser::mbox::MboxReader;

use super::{Mailbox, MailboxQuery, MessageHeaders, MessageId};

/// Where one message lives in the file, plus its headers for searching.
#[derive(Debug, Clone)]
struct MboxEntry {
    offset: u64,
    length: u64,
    headers: MessageHeaders,
}

/// An MBOX file, indexed once when opened.
///
/// Message ids are byte offsets of the `From ` separator lines.
pub struct MboxMailbox {
    reader: MboxReader,
    entries: Vec<MboxEntry>,
}

impl MboxMailbox {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let reader = MboxReader::new(path)?;
        let mut entries = Vec::new();
        reader.for_each_message(&mut |offset, bytes| {
            entries.push(MboxEntry {
                offset,
                length: bytes.len() as u64,
                headers: MessageHeaders::from_raw(bytes),
            });
            true
        })?;
        info!(
            path = %reader.path().display(),
            messages = entries.len(),
            "Indexed mbox"
        );
        Ok(Self { reader, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, id: &MessageId) -> Option<&MboxEntry> {
        let offset: u64 = id.as_str().parse().ok()?;
        let pos = self
            .entries
            .binary_search_by_key(&offset, |e| e.offset)
            .ok()?;
        self.entries.get(pos)
    }
}

impl Mailbox for MboxMailbox {
    fn search(&self, query: &MailboxQuery) -> Result<Vec<MessageId>> {
        let ids: Vec<MessageId> = self
            .entries
            .iter()
            .filter(|e| query.matches(&e.headers))
            .map(|e| MessageId::new(e.offset.to_string()))
            .collect();
        debug!(matched = ids.len(), total = self.entries.len(), "mbox search");
        Ok(ids)
    }

    fn fetch(&self, id: &MessageId) -> Result<Option<Vec<u8>>> {
        let Some(entry) = self.entry(id) else {
            return Ok(None);
        };
        self.reader
            .read_message_at(entry.offset, entry.length)
            .map(Some)
    }
}
