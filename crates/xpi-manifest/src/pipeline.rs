//! One update run: scan + digest, merge, write.
//!
//! The archive is scanned and hashed concurrently through two independent
//! readers. Merging starts only after both have finished; a failure in
//! either aborts the run before anything is written.

use std::path::{Path, PathBuf};

use crate::archive::{self, ArchiveScan};
use crate::descriptor::ExtensionDescriptor;
use crate::error::{Error, Result};
use crate::manifest::UpdateManifest;
use crate::merge::{self, LinkSource, MergeRequest};

/// Inputs of a run, already resolved from flags and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Packaged extension to publish.
    pub archive: PathBuf,
    /// Existing update manifest to start from.
    pub update_in: Option<PathBuf>,
    /// Where to write the resulting manifest. `None` validates only.
    pub update_out: Option<PathBuf>,
    /// Link template for the new version.
    pub update_link: Option<String>,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub addon_id: String,
    pub version: String,
    pub update_hash: String,
    pub update_link: String,
    pub link_source: LinkSource,
    /// Number of existing entries with this version that were replaced.
    pub replaced: usize,
    pub signed: bool,
    /// Path written, if any.
    pub written: Option<PathBuf>,
    /// The merged document.
    pub manifest: UpdateManifest,
}

/// Execute one update run.
pub async fn run(options: &RunOptions) -> Result<RunSummary> {
    let archive = options.archive.as_path();
    ensure_archive_exists(archive).await?;

    let manifest = UpdateManifest::load_or_default(options.update_in.as_deref());

    tracing::debug!(archive = %archive.display(), "Scanning and hashing archive");
    let (scan, digest_hex) = tokio::try_join!(
        archive::scan_file_async(archive.to_path_buf()),
        digest(archive),
    )?;

    let descriptor = ExtensionDescriptor::from_slice(scan.require_descriptor(archive)?)?;
    tracing::info!(addon = %descriptor.id, version = %descriptor.version, "Read extension manifest");

    publish(manifest, &descriptor, &scan, &digest_hex, options)
}

async fn ensure_archive_exists(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(Error::ArchiveNotFound {
            path: path.to_path_buf(),
        }),
    }
}

async fn digest(path: &Path) -> Result<String> {
    xpi_fs::digest_file(path).await.map_err(Error::Digest)
}

fn publish(
    mut manifest: UpdateManifest,
    descriptor: &ExtensionDescriptor,
    scan: &ArchiveScan,
    digest_hex: &str,
    options: &RunOptions,
) -> Result<RunSummary> {
    let request = MergeRequest {
        addon_id: &descriptor.id,
        version: &descriptor.version,
        digest_hex,
        link_template: options.update_link.as_deref(),
    };
    let outcome = merge::merge(&mut manifest, &request)?;

    let written = match options.update_out.as_deref() {
        Some(path) => {
            manifest.save(path)?;
            Some(path.to_path_buf())
        }
        None => {
            tracing::info!(
                "No update.json output path specified. You may want to use option --update-out or --update"
            );
            None
        }
    };

    Ok(RunSummary {
        addon_id: descriptor.id.clone(),
        version: descriptor.version.clone(),
        update_hash: outcome.entry.update_hash().unwrap_or_default().to_string(),
        update_link: outcome.entry.update_link().unwrap_or_default().to_string(),
        link_source: outcome.link_source,
        replaced: outcome.replaced,
        signed: scan.signed,
        written,
        manifest,
    })
}
