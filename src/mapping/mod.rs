mod types;

pub use types::{default_document, MappingDocument, NameMap, PlatformMapping};

use crate::paths::Platform;
use serde::Serialize;
use std::path::{Component, Path};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Settings file not found at {0}")]
    NotFound(String),

    #[error("No mapping defined for platform {0}")]
    MissingPlatform(Platform),

    #[error("Invalid entry '{name}' in {platform}.{section}: names must be relative and stay inside their root")]
    InvalidEntry {
        platform: Platform,
        section: &'static str,
        name: String,
    },
}

/// Read and validate the mapping document
pub async fn read_mapping(settings_path: &Path) -> Result<MappingDocument, MappingError> {
    if !settings_path.exists() {
        return Err(MappingError::NotFound(settings_path.display().to_string()));
    }

    let content = fs::read_to_string(settings_path).await?;
    let document: MappingDocument = serde_json::from_str(&content)?;
    validate_document(&document)?;
    Ok(document)
}

/// Write the mapping document with sorted keys and 4-space indentation
pub async fn write_mapping(
    settings_path: &Path,
    document: &MappingDocument,
) -> Result<(), MappingError> {
    let content = to_pretty_json(document)?;
    fs::write(settings_path, content).await?;
    Ok(())
}

/// Serialize the document the way it is stored on disk
pub fn to_pretty_json(document: &MappingDocument) -> Result<String, MappingError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut serializer)?;
    buf.push(b'\n');
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Get the mapping for one platform
pub fn platform_mapping(
    document: &MappingDocument,
    platform: Platform,
) -> Result<&PlatformMapping, MappingError> {
    document
        .get(&platform)
        .ok_or(MappingError::MissingPlatform(platform))
}

/// Reject names that are absolute or climb out of their root
pub fn validate_document(document: &MappingDocument) -> Result<(), MappingError> {
    for (platform, mapping) in document {
        for (section, backup_name, live_name) in mapping.entries() {
            for name in [backup_name, live_name] {
                if !is_contained_name(name) {
                    return Err(MappingError::InvalidEntry {
                        platform: *platform,
                        section,
                        name: name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn is_contained_name(name: &str) -> bool {
    let path = Path::new(name);
    !name.trim().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_layout() {
        let json = to_pretty_json(&default_document()).unwrap();
        let expected = r#"{
    "linux": {
        "directories": {},
        "files": {},
        "rename": {}
    },
    "osx": {
        "directories": {},
        "files": {},
        "rename": {}
    },
    "windows": {
        "directories": {},
        "files": {},
        "rename": {}
    }
}
"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_missing_map_is_an_error() {
        let json = r#"{"linux": {"files": {}, "directories": {}}}"#;
        assert!(serde_json::from_str::<MappingDocument>(json).is_err());
    }

    #[test]
    fn test_unknown_platform_is_an_error() {
        let json = r#"{"beos": {"files": {}, "directories": {}, "rename": {}}}"#;
        assert!(serde_json::from_str::<MappingDocument>(json).is_err());
    }

    #[test]
    fn test_platform_mapping_lookup() {
        let mut document = MappingDocument::new();
        document.insert(Platform::Linux, PlatformMapping::default());

        assert!(platform_mapping(&document, Platform::Linux).is_ok());
        assert!(matches!(
            platform_mapping(&document, Platform::Windows),
            Err(MappingError::MissingPlatform(Platform::Windows))
        ));
    }

    #[test]
    fn test_validate_rejects_escaping_names() {
        let mut mapping = PlatformMapping::default();
        mapping
            .files
            .insert("ok.txt".to_string(), "../outside.txt".to_string());
        let mut document = default_document();
        document.insert(Platform::Osx, mapping);

        let err = validate_document(&document).unwrap_err();
        assert!(matches!(
            err,
            MappingError::InvalidEntry { platform: Platform::Osx, section: "files", .. }
        ));
    }

    #[test]
    fn test_validate_accepts_nested_names() {
        let mut mapping = PlatformMapping::default();
        mapping.rename.insert(
            "Pkg/Open With/Side Bar.sublime-menu.json".to_string(),
            "Pkg/Open With/Side Bar.sublime-menu".to_string(),
        );
        let mut document = default_document();
        document.insert(Platform::Windows, mapping);

        assert!(validate_document(&document).is_ok());
    }

    #[test]
    fn test_is_contained_name() {
        assert!(is_contained_name("a/b.txt"));
        assert!(is_contained_name("./a"));
        assert!(!is_contained_name("/etc/passwd"));
        assert!(!is_contained_name("a/../../b"));
        assert!(!is_contained_name(""));
    }
}
