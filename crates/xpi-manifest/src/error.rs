//! Error types for xpi-manifest

use std::path::PathBuf;

/// Result type for xpi-manifest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Terminal failures of an update run.
///
/// Recoverable conditions (unreadable input manifest, unsigned archive) are
/// logged and never surface as an `Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The archive file does not exist
    #[error("File {path} does not exist")]
    ArchiveNotFound { path: PathBuf },

    /// The archive was read to the end without a `manifest.json` entry
    #[error("No manifest.json found in {path}")]
    ArchiveMissingManifest { path: PathBuf },

    /// The zip container could not be decoded
    #[error("Could not read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The archive's `manifest.json` is not valid JSON
    #[error("Could not parse manifest: {0}")]
    DescriptorParse(#[source] serde_json::Error),

    /// No extension id in the descriptor
    #[error("Add-on id not found in manifest")]
    IdentityMissing,

    /// No version string in the descriptor
    #[error("Add-on version not found in manifest")]
    VersionMissing,

    /// Neither a link template nor a previous link is available
    #[error("No update URL specified nor reused for {addon_id}. Try using parameter --update-link")]
    LinkUnresolvable { addon_id: String },

    /// Reading the archive for hashing failed
    #[error("Could not compute hash: {0}")]
    Digest(#[source] xpi_fs::Error),

    /// The existing record for the add-on does not have the expected shape
    #[error("Update record for {addon_id} is malformed: {source}")]
    InvalidAddonRecord {
        addon_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// The update manifest could not be serialized
    #[error("Could not serialize update manifest: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Writing the update manifest failed
    #[error("Could not write update file: {0}")]
    Fs(#[from] xpi_fs::Error),

    /// A background task was cancelled or panicked
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
