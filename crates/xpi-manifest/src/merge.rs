//! Merging a new package version into an update manifest.
//!
//! The previous history of the add-on is folded once to find the latest
//! version entry and to drop any entry with the version being published.
//! The new entry starts as a copy of the latest one, so compatibility
//! fields and key order carry forward, and is appended at the end of the
//! history. Entries other than the replaced ones are written back as read.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::link;
use crate::manifest::{UpdateManifest, VersionEntry};
use crate::version;

/// Everything needed to publish one version.
#[derive(Debug, Clone, Copy)]
pub struct MergeRequest<'a> {
    pub addon_id: &'a str,
    pub version: &'a str,
    /// Lowercase hex SHA-256 of the package.
    pub digest_hex: &'a str,
    /// Link template, may contain [`link::VERSION_PLACEHOLDER`].
    pub link_template: Option<&'a str>,
}

/// Where the new entry's link came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSource {
    Template,
    Reused { from_link: String },
}

/// What a merge did.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The appended entry.
    pub entry: VersionEntry,
    /// Number of existing entries with the same version that were dropped.
    pub replaced: usize,
    pub link_source: LinkSource,
}

/// An add-on history split by [`partition_updates`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Entries whose version is not the new one, in original order.
    pub kept: Vec<VersionEntry>,
    /// Highest version seen, earliest wins on ties. Dropped entries count.
    pub latest: Option<VersionEntry>,
    /// Number of entries dropped because they share the new version.
    pub replaced: usize,
}

/// Single pass over `updates` that tracks the latest entry and filters out
/// entries whose version is the string `new_version`.
pub fn partition_updates(updates: Vec<VersionEntry>, new_version: &str) -> Partition {
    updates
        .into_iter()
        .fold(Partition::default(), |mut acc, entry| {
            let is_newer = acc.latest.as_ref().is_none_or(|latest| {
                version::compare(&entry.version(), &latest.version()) == Ordering::Greater
            });
            if is_newer {
                acc.latest = Some(entry.clone());
            }

            if entry.has_version(new_version) {
                acc.replaced += 1;
            } else {
                acc.kept.push(entry);
            }
            acc
        })
}

/// Resolve the link for the new version.
///
/// An explicit, non-empty template wins. Otherwise the latest entry's link
/// is rebased onto the new version.
pub fn resolve_link(
    request: &MergeRequest<'_>,
    latest: Option<&VersionEntry>,
) -> Result<(String, LinkSource)> {
    if let Some(template) = request.link_template.filter(|t| !t.is_empty()) {
        return Ok((
            link::expand_template(template, request.version),
            LinkSource::Template,
        ));
    }

    let previous = latest.and_then(|entry| {
        entry
            .update_link()
            .filter(|l| !l.is_empty())
            .map(|l| (entry.version(), l))
    });

    match previous {
        Some((old_version, old_link)) => {
            let url = link::rebase_link(old_link, &old_version, request.version);
            tracing::info!("Reusing former update URL {old_link} => {url}");
            Ok((
                url,
                LinkSource::Reused {
                    from_link: old_link.to_string(),
                },
            ))
        }
        None => Err(Error::LinkUnresolvable {
            addon_id: request.addon_id.to_string(),
        }),
    }
}

/// Publish `request` into `manifest`.
///
/// On error `manifest` is left unchanged.
pub fn merge(manifest: &mut UpdateManifest, request: &MergeRequest<'_>) -> Result<MergeOutcome> {
    let mut record = manifest.addon(request.addon_id)?;

    let Partition {
        kept,
        latest,
        replaced,
    } = partition_updates(std::mem::take(&mut record.updates), request.version);

    if replaced > 0 {
        tracing::warn!(
            addon = request.addon_id,
            version = request.version,
            "Found already existing version {} in update file",
            request.version
        );
    }

    let (update_link, link_source) = resolve_link(request, latest.as_ref())?;

    let entry = latest.unwrap_or_default().successor(
        request.version,
        xpi_fs::format_checksum(request.digest_hex),
        update_link,
    );

    record.updates = kept;
    record.updates.push(entry.clone());
    manifest.set_addon(request.addon_id, record)?;

    tracing::debug!(
        addon = request.addon_id,
        version = request.version,
        replaced,
        "Merged version entry"
    );

    Ok(MergeOutcome {
        entry,
        replaced,
        link_source,
    })
}
