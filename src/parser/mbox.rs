//! Streaming MBOX splitter.
//!
//! Reads an MBOX file line by line and hands each message's raw bytes to a
//! callback. Tolerant of mixed line endings, a UTF-8 BOM, separators without a
//! preceding blank line, and a truncated last message.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{RemindError, Result};

/// Size of the internal read buffer.
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Messages larger than this are truncated (64 MB).
const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Sequential reader over the messages of one MBOX file.
pub struct MboxReader {
    path: PathBuf,
    file_size: u64,
    max_message_size: usize,
}

impl MboxReader {
    /// Open an MBOX file. Only checks that it exists; the content is not validated.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path).map_err(|e| RemindError::io(&path, e))?;
        if !metadata.is_file() {
            return Err(RemindError::InvalidMailbox(path));
        }
        Ok(Self {
            path,
            file_size: metadata.len(),
            max_message_size: MAX_MESSAGE_SIZE,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Walk the file, calling `on_message(offset, raw_bytes)` for every message.
    ///
    /// `raw_bytes` includes the `From ` separator line. The callback returns
    /// `false` to stop early. Returns the number of messages delivered.
    pub fn for_each_message(&self, on_message: &mut dyn FnMut(u64, &[u8]) -> bool) -> Result<u64> {
        if self.file_size == 0 {
            return Ok(0);
        }

        let file = File::open(&self.path).map_err(|e| RemindError::io(&self.path, e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut count: u64 = 0;
        let mut offset: u64 = 0;
        let mut message_start: u64 = 0;
        let mut message_buf: Vec<u8> = Vec::with_capacity(64 * 1024);
        let mut line_buf: Vec<u8> = Vec::with_capacity(4096);
        let mut prev_line_blank = true;
        let mut truncated = false;

        loop {
            line_buf.clear();
            let line_len = reader
                .read_until(b'\n', &mut line_buf)
                .map_err(|e| RemindError::io(&self.path, e))?;
            if line_len == 0 {
                break;
            }

            if is_mbox_separator(&line_buf) {
                if !prev_line_blank && offset > 0 {
                    warn!(offset, "Found 'From ' separator without preceding blank line");
                }
                if !message_buf.is_empty() {
                    count += 1;
                    if !on_message(message_start, &message_buf) {
                        return Ok(count);
                    }
                }
                message_start = offset;
                message_buf.clear();
                truncated = false;
                message_buf.extend_from_slice(&line_buf);
            } else if message_buf.len() + line_buf.len() <= self.max_message_size {
                message_buf.extend_from_slice(&line_buf);
            } else if !truncated {
                warn!(
                    offset = message_start,
                    max_size = self.max_message_size,
                    "Message exceeds maximum size, truncating body"
                );
                truncated = true;
            }

            prev_line_blank = is_blank_line(&line_buf);
            offset += line_len as u64;
        }

        if !message_buf.is_empty() {
            count += 1;
            on_message(message_start, &message_buf);
        }

        Ok(count)
    }

    /// Read `length` bytes of one message starting at `offset`.
    pub fn read_message_at(&self, offset: u64, length: u64) -> Result<Vec<u8>> {
        let mut file = File::open(&self.path).map_err(|e| RemindError::io(&self.path, e))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| RemindError::io(&self.path, e))?;
        let mut buffer = Vec::with_capacity(length as usize);
        file.take(length)
            .read_to_end(&mut buffer)
            .map_err(|e| RemindError::io(&self.path, e))?;
        Ok(buffer)
    }
}

/// `From ` at the start of a line (after an optional BOM) separates messages.
fn is_mbox_separator(line: &[u8]) -> bool {
    let line = line.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(line);
    line.starts_with(b"From ")
}

fn is_blank_line(line: &[u8]) -> bool {
    line.iter().all(|b| matches!(b, b'\n' | b'\r' | b' ' | b'\t'))
}
