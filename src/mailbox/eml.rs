//! Directory-of-`.eml` mailbox.
//!
//! An EML file is a bare RFC 5322 message (no `From ` separator).

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{RemindError, Result};

use super::{Mailbox, MailboxQuery, MessageHeaders, MessageId};

/// The `.eml` files directly inside one directory, in file-name order.
///
/// Message ids are file names. The listing is taken when the mailbox is
/// opened; file contents are read on demand.
pub struct EmlDirMailbox {
    root: PathBuf,
    names: Vec<String>,
}

impl EmlDirMailbox {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.is_dir() {
            if !root.exists() {
                return Err(RemindError::FileNotFound(root));
            }
            return Err(RemindError::InvalidMailbox(root));
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&root).map_err(|e| RemindError::io(&root, e))? {
            let entry = entry.map_err(|e| RemindError::io(&root, e))?;
            let path = entry.path();
            let is_eml = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"));
            if !is_eml || !path.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => warn!(?name, "Skipping non-UTF-8 file name"),
            }
        }
        names.sort();
        debug!(path = %root.display(), messages = names.len(), "Listed eml directory");

        Ok(Self { root, names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.root.join(name);
        match std::fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Message file disappeared");
                Ok(None)
            }
            Err(e) => Err(RemindError::io(path, e)),
        }
    }
}

impl Mailbox for EmlDirMailbox {
    fn search(&self, query: &MailboxQuery) -> Result<Vec<MessageId>> {
        if query.is_empty() {
            return Ok(self.names.iter().map(MessageId::new).collect());
        }

        let mut ids = Vec::new();
        for name in &self.names {
            let Some(data) = self.read(name)? else {
                continue;
            };
            if query.matches(&MessageHeaders::from_raw(&data)) {
                ids.push(MessageId::new(name));
            }
        }
        Ok(ids)
    }

    fn fetch(&self, id: &MessageId) -> Result<Option<Vec<u8>>> {
        if self.names.binary_search_by(|n| n.as_str().cmp(id.as_str())).is_err() {
            return Ok(None);
        }
        self.read(id.as_str())
    }
}
