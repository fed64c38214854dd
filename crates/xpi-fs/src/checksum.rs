//! SHA-256 archive digests
//!
//! Update manifests store hashes in the canonical `sha256:<hex>` format.
//! [`digest_file`] produces the bare hex part; [`format_checksum`] adds the
//! prefix.

use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::{Error, Result};

/// Prefix for all checksums written to an update manifest
pub const PREFIX: &str = "sha256:";

const CHUNK_SIZE: usize = 64 * 1024;

/// Stream the file at `path` through SHA-256 and return the lowercase hex
/// digest.
///
/// The hash is only finalized once the whole file has been read. Any read
/// error aborts with no partial result.
pub async fn digest_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).await.map_err(|e| Error::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = file.read(&mut buf).await.map_err(|e| Error::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }

    let hex = format!("{:x}", hasher.finalize());
    tracing::debug!(path = %path.display(), bytes = total, digest = %hex, "Archive digest computed");
    Ok(hex)
}

/// Format a hex digest as `"sha256:<hex>"`.
pub fn format_checksum(hex: &str) -> String {
    format!("{PREFIX}{hex}")
}
