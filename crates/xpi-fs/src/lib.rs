//! Filesystem helpers for xpi-update
//!
//! Provides the streaming archive digest and the atomic write used to
//! persist update manifests.

pub mod checksum;
pub mod error;
pub mod io;

pub use checksum::{PREFIX, digest_file, format_checksum};
pub use error::{Error, Result};
