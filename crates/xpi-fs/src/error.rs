//! Error types for xpi-fs

use std::path::PathBuf;

/// Result type for xpi-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in xpi-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Path the failed operation was working on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::LockFailed { path } => path,
        }
    }
}
