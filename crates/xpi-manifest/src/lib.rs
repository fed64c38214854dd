//! Update manifest maintenance for packaged browser extensions.
//!
//! Given a packaged extension (`.xpi`), this crate reads its identity and
//! version, hashes the package and publishes a new version entry into an
//! update manifest (`updates.json`).
//!
//! # Modules
//!
//! - [`version`]: extension-platform version ordering
//! - [`archive`]: scan of the package entries
//! - [`descriptor`]: the package's `manifest.json`
//! - [`manifest`]: the update manifest document
//! - [`link`]: update link templating
//! - [`merge`]: publishing a version into the document
//! - [`pipeline`]: a complete run

pub mod archive;
pub mod descriptor;
pub mod error;
pub mod link;
pub mod manifest;
pub mod merge;
pub mod pipeline;
pub mod version;

pub use archive::{ArchiveScan, DESCRIPTOR_ENTRY, SIGNATURE_MARKER_ENTRY};
pub use descriptor::ExtensionDescriptor;
pub use error::{Error, Result};
pub use link::VERSION_PLACEHOLDER;
pub use manifest::{AddonRecord, UpdateManifest, VersionEntry};
pub use merge::{LinkSource, MergeOutcome, MergeRequest, merge};
pub use pipeline::{RunOptions, RunSummary, run};
