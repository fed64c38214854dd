//! The update manifest document (`updates.json`).
//!
//! Only the record of the add-on being updated is decoded, and its version
//! entries stay as raw JSON objects. Every other add-on and any unknown key
//! is kept as opaque JSON so that a run never rewrites data it does not
//! understand.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::path::Path;

use crate::error::{Error, Result};

/// Root of an update manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateManifest {
    /// Add-on records keyed by extension id.
    #[serde(default)]
    pub addons: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Published history of one add-on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddonRecord {
    /// Version entries in insertion order. `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub updates: Vec<VersionEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<VersionEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<VersionEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One published version, kept as the JSON object it was read from.
///
/// Key order and values the tool does not manage are preserved, and all of
/// them carry forward to the next version (for example
/// `applications.gecko.strict_min_version`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionEntry {
    fields: Map<String, Value>,
}

impl From<Map<String, Value>> for VersionEntry {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl VersionEntry {
    /// The version as text. Numbers read through their JSON form; any
    /// other non-string value reads as empty.
    pub fn version(&self) -> Cow<'_, str> {
        match self.fields.get("version") {
            Some(Value::String(s)) => Cow::Borrowed(s),
            Some(Value::Number(n)) => Cow::Owned(n.to_string()),
            _ => Cow::Borrowed(""),
        }
    }

    /// Whether `version` is a string exactly equal to `version`.
    pub fn has_version(&self, version: &str) -> bool {
        self.fields.get("version").and_then(Value::as_str) == Some(version)
    }

    pub fn update_link(&self) -> Option<&str> {
        self.fields.get("update_link").and_then(Value::as_str)
    }

    pub fn update_hash(&self) -> Option<&str> {
        self.fields.get("update_hash").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// A copy of this entry with the three managed keys overwritten.
    /// Existing keys keep their position; missing ones are appended.
    pub fn successor(&self, version: &str, update_hash: String, update_link: String) -> Self {
        let mut fields = self.fields.clone();
        fields.insert("version".to_string(), Value::String(version.to_string()));
        fields.insert("update_hash".to_string(), Value::String(update_hash));
        fields.insert("update_link".to_string(), Value::String(update_link));
        Self { fields }
    }
}

impl UpdateManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Read the manifest at `path`, or start an empty one.
    ///
    /// A missing, unreadable or unparsable file is not an error: it is
    /// logged and an empty manifest is returned.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        let parsed = xpi_fs::io::read_text(path)
            .map_err(|e| e.to_string())
            .and_then(|content| Self::from_json(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(manifest) => {
                tracing::debug!(path = %path.display(), addons = manifest.addons.len(), "Loaded update file");
                manifest
            }
            Err(message) => {
                tracing::warn!(
                    path = %path.display(),
                    "Could not read update file: {message}. Assuming new update manifest"
                );
                Self::default()
            }
        }
    }

    /// Decode the record for `addon_id`, or an empty record if absent.
    pub fn addon(&self, addon_id: &str) -> Result<AddonRecord> {
        match self.addons.get(addon_id) {
            None | Some(Value::Null) => Ok(AddonRecord::default()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|source| {
                Error::InvalidAddonRecord {
                    addon_id: addon_id.to_string(),
                    source,
                }
            }),
        }
    }

    /// Store `record` under `addon_id`, keeping the key's position if it
    /// already exists and the position of the record's own keys.
    pub fn set_addon(&mut self, addon_id: &str, record: AddonRecord) -> Result<()> {
        let updates = serde_json::to_value(record.updates).map_err(Error::Serialize)?;
        match self.addons.get_mut(addon_id) {
            Some(Value::Object(fields)) => {
                fields.extend(record.extra);
                fields.insert("updates".to_string(), updates);
            }
            _ => {
                let mut fields = record.extra;
                fields.insert("updates".to_string(), updates);
                self.addons.insert(addon_id.to_string(), Value::Object(fields));
            }
        }
        Ok(())
    }

    /// Serialize as UTF-8 JSON indented with four spaces.
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer).map_err(Error::Serialize)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Write the manifest to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_pretty_json()?;
        xpi_fs::io::write_text(path, &content)?;
        tracing::info!(path = %path.display(), "Update file written");
        Ok(())
    }
}
