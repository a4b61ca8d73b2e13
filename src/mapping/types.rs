use crate::paths::Platform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping of entry names, backup-side name -> live-side name
pub type NameMap = BTreeMap<String, String>;

/// What to synchronize for one platform.
///
/// All three maps are required in the document: a missing map fails to parse,
/// an empty one means nothing to do. Fields are declared in sorted order so the
/// serialized document keeps sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformMapping {
    /// Whole directory trees, backup name -> live name
    pub directories: NameMap,
    /// Single files, backup name -> live name
    pub files: NameMap,
    /// Renames applied inside copied trees, backup name -> live name
    pub rename: NameMap,
}

impl PlatformMapping {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty() && self.rename.is_empty()
    }

    /// Every name in the mapping with the section it came from
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &String, &String)> {
        self.files
            .iter()
            .map(|(k, v)| ("files", k, v))
            .chain(self.directories.iter().map(|(k, v)| ("directories", k, v)))
            .chain(self.rename.iter().map(|(k, v)| ("rename", k, v)))
    }
}

/// The persisted settings document, keyed by platform
pub type MappingDocument = BTreeMap<Platform, PlatformMapping>;

/// Default document: every platform present with three empty maps
pub fn default_document() -> MappingDocument {
    Platform::ALL
        .into_iter()
        .map(|platform| (platform, PlatformMapping::default()))
        .collect()
}
