//! [`XpiBuilder`] for extension package fixtures.

use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read, Write};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, ZipArchive};

/// General purpose flag bit 3: sizes and CRC follow the entry data.
const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;
const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
const DATA_DESCRIPTOR_SIG: u32 = 0x0807_4b50;
const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4b50;
/// 1980-01-01 in MS-DOS date format.
const DOS_EPOCH_DATE: u16 = 0x0021;

/// Builds a zip-format extension package in memory.
///
/// Entries are written in the order they are added.
///
/// # Example
///
/// ```rust
/// use xpi_test_utils::XpiBuilder;
///
/// let bytes = XpiBuilder::new()
///     .descriptor("ext@example.com", "1.0")
///     .file("background.js", b"console.log('hi')")
///     .signed()
///     .build();
/// assert!(bytes.starts_with(b"PK\x03\x04"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct XpiBuilder {
    entries: Vec<(String, Vec<u8>)>,
    stored: bool,
    data_descriptors: bool,
}

impl XpiBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `manifest.json` with the given gecko id and version.
    pub fn descriptor(self, id: &str, version: &str) -> Self {
        self.descriptor_json(json!({
            "manifest_version": 2,
            "name": "Test extension",
            "version": version,
            "applications": { "gecko": { "id": id } }
        }))
    }

    /// Add a `manifest.json` with arbitrary JSON content.
    pub fn descriptor_json(self, manifest: Value) -> Self {
        let content = serde_json::to_vec_pretty(&manifest).unwrap();
        self.file("manifest.json", &content)
    }

    /// Add an entry with raw content.
    pub fn file(mut self, name: &str, content: &[u8]) -> Self {
        self.entries.push((name.to_string(), content.to_vec()));
        self
    }

    /// Add the `META-INF` files of a signed package.
    pub fn signed(self) -> Self {
        self.file("META-INF/manifest.mf", b"Manifest-Version: 1.0\n")
            .file("META-INF/mozilla.sf", b"Signature-Version: 1.0\n")
            .file("META-INF/mozilla.rsa", &[0x30, 0x82, 0x01, 0x00])
    }

    /// Store entries uncompressed instead of deflating them.
    pub fn stored(mut self) -> Self {
        self.stored = true;
        self
    }

    /// Write every entry the way streaming zippers do: the local header
    /// has flag bit 3 set and zero sizes, and the CRC and sizes follow the
    /// data in a data descriptor.
    pub fn data_descriptors(mut self) -> Self {
        self.data_descriptors = true;
        self
    }

    /// Produce the archive bytes.
    pub fn build(&self) -> Vec<u8> {
        let bytes = self.build_seekable();
        if self.data_descriptors {
            with_data_descriptors(&bytes)
        } else {
            bytes
        }
    }

    fn build_seekable(&self) -> Vec<u8> {
        let method = if self.stored {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        let options = SimpleFileOptions::default().compression_method(method);

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in &self.entries {
            writer.start_file(name.as_str(), options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

struct RawEntry {
    name: String,
    method: u16,
    crc32: u32,
    compressed: Vec<u8>,
    size: u32,
}

/// Re-lay `bytes` so every entry defers its sizes to a data descriptor.
/// Compressed data is copied as is.
fn with_data_descriptors(bytes: &[u8]) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let raw: Vec<RawEntry> = (0..archive.len())
        .map(|index| {
            let mut entry = archive.by_index_raw(index).unwrap();
            let method = match entry.compression() {
                CompressionMethod::Stored => 0,
                CompressionMethod::Deflated => 8,
                other => panic!("unsupported compression method {other:?}"),
            };
            let mut compressed = Vec::new();
            entry.read_to_end(&mut compressed).unwrap();
            RawEntry {
                name: entry.name().to_string(),
                method,
                crc32: entry.crc32(),
                compressed,
                size: entry.size() as u32,
            }
        })
        .collect();

    let mut out = Vec::new();
    let mut offsets = Vec::with_capacity(raw.len());
    for entry in &raw {
        offsets.push(out.len() as u32);
        put_u32(&mut out, LOCAL_HEADER_SIG);
        put_u16(&mut out, 20);
        put_u16(&mut out, FLAG_DATA_DESCRIPTOR);
        put_u16(&mut out, entry.method);
        put_u16(&mut out, 0);
        put_u16(&mut out, DOS_EPOCH_DATE);
        put_u32(&mut out, 0);
        put_u32(&mut out, 0);
        put_u32(&mut out, 0);
        put_u16(&mut out, entry.name.len() as u16);
        put_u16(&mut out, 0);
        out.extend_from_slice(entry.name.as_bytes());
        out.extend_from_slice(&entry.compressed);
        put_u32(&mut out, DATA_DESCRIPTOR_SIG);
        put_u32(&mut out, entry.crc32);
        put_u32(&mut out, entry.compressed.len() as u32);
        put_u32(&mut out, entry.size);
    }

    let central_start = out.len() as u32;
    for (entry, offset) in raw.iter().zip(offsets) {
        put_u32(&mut out, CENTRAL_HEADER_SIG);
        put_u16(&mut out, 20);
        put_u16(&mut out, 20);
        put_u16(&mut out, FLAG_DATA_DESCRIPTOR);
        put_u16(&mut out, entry.method);
        put_u16(&mut out, 0);
        put_u16(&mut out, DOS_EPOCH_DATE);
        put_u32(&mut out, entry.crc32);
        put_u32(&mut out, entry.compressed.len() as u32);
        put_u32(&mut out, entry.size);
        put_u16(&mut out, entry.name.len() as u16);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u32(&mut out, 0);
        put_u32(&mut out, offset);
        out.extend_from_slice(entry.name.as_bytes());
    }
    let central_size = out.len() as u32 - central_start;

    put_u32(&mut out, END_OF_CENTRAL_DIR_SIG);
    put_u16(&mut out, 0);
    put_u16(&mut out, 0);
    put_u16(&mut out, raw.len() as u16);
    put_u16(&mut out, raw.len() as u16);
    put_u32(&mut out, central_size);
    put_u32(&mut out, central_start);
    put_u16(&mut out, 0);
    out
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
