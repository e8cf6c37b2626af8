//! Centralized error types for mailremind.
//!
//! Only the mailbox layer fails with these; configuration and the CLI use
//! `anyhow`. The event pipeline itself never returns an error; it reports
//! soft failures through [`crate::diagnostic::Diagnostic`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailremind library.
#[derive(Error, Debug)]
pub enum RemindError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file or directory does not exist.
    #[error("Mailbox not found: {0}")]
    FileNotFound(PathBuf),

    /// The path exists but cannot be opened as a mailbox.
    #[error("Not a usable mailbox: {0}")]
    InvalidMailbox(PathBuf),
}

/// Convenience alias for `Result<T, RemindError>`.
pub type Result<T> = std::result::Result<T, RemindError>;

impl RemindError {
    /// Create an `Io` variant from a path and an `io::Error`.
    ///
    /// `NotFound` is mapped to [`RemindError::FileNotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::FileNotFound(path);
        }
        Self::Io { path, source }
    }
}
