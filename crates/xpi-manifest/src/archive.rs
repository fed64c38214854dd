//! Scan of packaged extension archives.
//!
//! Entries are listed from the central directory, so archives whose sizes
//! live in trailing data descriptors read the same as any other. Only the
//! entries a sink asks for are decompressed and held in memory.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{Error, Result};

/// Archive path of the extension descriptor.
pub const DESCRIPTOR_ENTRY: &str = "manifest.json";

/// Archive path whose presence marks a signed package.
pub const SIGNATURE_MARKER_ENTRY: &str = "META-INF/mozilla.sf";

const MAX_PREALLOC: u64 = 1 << 20;

/// What to do with an entry's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    /// Skip the content without decompressing it.
    Drain,
    /// Read the whole content and hand it to [`EntrySink::accept`].
    Buffer,
}

/// Receives the entries of an archive one at a time.
pub trait EntrySink {
    /// Decide how to handle the entry at `name`.
    fn action(&mut self, name: &str) -> EntryAction;

    /// Receive the full content of an entry marked [`EntryAction::Buffer`].
    fn accept(&mut self, name: &str, content: Vec<u8>);

    /// Called once after the last entry has been consumed.
    fn closed(&mut self) {}
}

/// Visit every entry of the zip container in `reader` through `sink`, in
/// central directory order.
///
/// Returns the number of entries seen.
pub fn visit_entries<R: Read + Seek, S: EntrySink>(
    reader: R,
    sink: &mut S,
) -> zip::result::ZipResult<usize> {
    let mut archive = ZipArchive::new(reader)?;

    for index in 0..archive.len() {
        let name = archive.by_index_raw(index)?.name().to_string();

        match sink.action(&name) {
            EntryAction::Buffer => {
                let mut entry = archive.by_index(index)?;
                let mut content = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
                entry.read_to_end(&mut content)?;
                tracing::trace!(entry = %name, bytes = content.len(), "Buffered archive entry");
                sink.accept(&name, content);
            }
            EntryAction::Drain => {}
        }
    }

    sink.closed();
    Ok(archive.len())
}

/// Result of scanning an extension package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveScan {
    /// Raw bytes of `manifest.json`, if the archive had one.
    pub descriptor: Option<Vec<u8>>,
    /// Whether the signature marker entry was present.
    pub signed: bool,
    /// Number of entries in the archive.
    pub entries: usize,
}

impl ArchiveScan {
    /// The descriptor bytes, or [`Error::ArchiveMissingManifest`].
    pub fn require_descriptor(&self, path: &Path) -> Result<&[u8]> {
        self.descriptor
            .as_deref()
            .ok_or_else(|| Error::ArchiveMissingManifest {
                path: path.to_path_buf(),
            })
    }
}

/// Sink that keeps the descriptor and notes the signature marker.
struct ExtensionSink<'a> {
    path: &'a Path,
    descriptor: Option<Vec<u8>>,
    signed: bool,
}

impl EntrySink for ExtensionSink<'_> {
    fn action(&mut self, name: &str) -> EntryAction {
        match name {
            DESCRIPTOR_ENTRY => EntryAction::Buffer,
            SIGNATURE_MARKER_ENTRY => {
                self.signed = true;
                EntryAction::Drain
            }
            _ => EntryAction::Drain,
        }
    }

    fn accept(&mut self, _name: &str, content: Vec<u8>) {
        self.descriptor = Some(content);
    }

    fn closed(&mut self) {
        if self.descriptor.is_none() {
            tracing::warn!(path = %self.path.display(), "No manifest.json found in archive");
        }
        if !self.signed {
            tracing::warn!(path = %self.path.display(), "File has not been signed by Mozilla");
        }
    }
}

/// Scan an extension package from any byte source.
///
/// `path` is only used for diagnostics.
pub fn scan<R: Read + Seek>(reader: R, path: &Path) -> Result<ArchiveScan> {
    let mut sink = ExtensionSink {
        path,
        descriptor: None,
        signed: false,
    };

    let entries = visit_entries(reader, &mut sink).map_err(|source| Error::Archive {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ArchiveScan {
        descriptor: sink.descriptor,
        signed: sink.signed,
        entries,
    })
}

/// Open and scan the extension package at `path`.
pub fn scan_file(path: &Path) -> Result<ArchiveScan> {
    let file = File::open(path).map_err(|e| Error::Archive {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    scan(BufReader::new(file), path)
}

/// Scan on the blocking pool so it can run alongside the async digest.
pub async fn scan_file_async(path: PathBuf) -> Result<ArchiveScan> {
    tokio::task::spawn_blocking(move || scan_file(&path)).await?
}
