//! The extension descriptor (`manifest.json` inside the package).

use serde_json::Value;

use crate::error::{Error, Result};

/// Keys of the platform-specific block that carries the extension id,
/// in lookup order.
const PLATFORM_BLOCKS: [&str; 2] = ["applications", "browser_specific_settings"];

/// Identity and version of a packaged extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    pub id: String,
    pub version: String,
}

impl ExtensionDescriptor {
    /// Parse the raw bytes of a `manifest.json` entry.
    ///
    /// The id is read from `applications.gecko.id`, falling back to
    /// `browser_specific_settings.gecko.id`. Other fields are ignored.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let manifest: Value = serde_json::from_slice(bytes).map_err(Error::DescriptorParse)?;

        let id = PLATFORM_BLOCKS
            .iter()
            .find_map(|block| {
                manifest
                    .get(block)
                    .and_then(|b| b.get("gecko"))
                    .and_then(|g| g.get("id"))
                    .and_then(Value::as_str)
                    .filter(|id| !id.is_empty())
            })
            .ok_or(Error::IdentityMissing)?;

        let version = manifest
            .get("version")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .ok_or(Error::VersionMissing)?;

        Ok(Self {
            id: id.to_string(),
            version: version.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_applications_block() {
        let json = br#"{
            "manifest_version": 2,
            "name": "Example",
            "version": "1.2.3",
            "applications": { "gecko": { "id": "ext@example.com" } }
        }"#;

        let descriptor = ExtensionDescriptor::from_slice(json).unwrap();
        assert_eq!(descriptor.id, "ext@example.com");
        assert_eq!(descriptor.version, "1.2.3");
    }

    #[test]
    fn falls_back_to_browser_specific_settings() {
        let json = br#"{
            "version": "2.0",
            "browser_specific_settings": { "gecko": { "id": "{d3b07384-d9a7-4c6e}" } }
        }"#;

        let descriptor = ExtensionDescriptor::from_slice(json).unwrap();
        assert_eq!(descriptor.id, "{d3b07384-d9a7-4c6e}");
    }

    #[test]
    fn applications_block_wins() {
        let json = br#"{
            "version": "2.0",
            "applications": { "gecko": { "id": "first@x" } },
            "browser_specific_settings": { "gecko": { "id": "second@x" } }
        }"#;

        let descriptor = ExtensionDescriptor::from_slice(json).unwrap();
        assert_eq!(descriptor.id, "first@x");
    }

    #[test]
    fn ignores_byte_order_mark() {
        let mut json = b"\xEF\xBB\xBF".to_vec();
        json.extend_from_slice(br#"{"version":"1","applications":{"gecko":{"id":"a@b"}}}"#);

        assert!(ExtensionDescriptor::from_slice(&json).is_ok());
    }

    #[test]
    fn missing_id_is_identity_error() {
        let json = br#"{"version": "1.0", "applications": {"gecko": {}}}"#;
        assert!(matches!(
            ExtensionDescriptor::from_slice(json),
            Err(Error::IdentityMissing)
        ));
    }

    #[test]
    fn non_string_id_is_identity_error() {
        let json = br#"{"version": "1.0", "applications": {"gecko": {"id": 42}}}"#;
        assert!(matches!(
            ExtensionDescriptor::from_slice(json),
            Err(Error::IdentityMissing)
        ));
    }

    #[test]
    fn missing_version_is_an_error() {
        let json = br#"{"applications": {"gecko": {"id": "a@b"}}}"#;
        assert!(matches!(
            ExtensionDescriptor::from_slice(json),
            Err(Error::VersionMissing)
        ));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        assert!(matches!(
            ExtensionDescriptor::from_slice(b"{ not json"),
            Err(Error::DescriptorParse(_))
        ));
    }
}
