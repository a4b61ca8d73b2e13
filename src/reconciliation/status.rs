//! Drift report: how each mapped entry compares between backup and live root.

use crate::mapping::PlatformMapping;
use crate::paths::{resolve, Layout};
use crate::utils::compute_file_hash;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftState {
    InSync,
    Differs,
    MissingLive,
    MissingBackup,
    MissingBoth,
}

impl fmt::Display for DriftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DriftState::InSync => "in sync",
            DriftState::Differs => "differs",
            DriftState::MissingLive => "missing live",
            DriftState::MissingBackup => "missing backup",
            DriftState::MissingBoth => "missing both",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct EntryStatus {
    pub kind: EntryKind,
    pub backup_name: String,
    pub live_name: String,
    pub state: DriftState,
}

/// Compare every `files` and `directories` entry of the active platform
pub async fn inspect_mapping(layout: &Layout, mapping: &PlatformMapping) -> Vec<EntryStatus> {
    let mut statuses = Vec::new();
    let sections = [
        (EntryKind::File, &mapping.files),
        (EntryKind::Directory, &mapping.directories),
    ];

    for (kind, names) in sections {
        for (backup_name, live_name) in names {
            let backup = resolve(layout.platform_backup_root(), backup_name);
            let live = resolve(layout.live_root(), live_name);

            let state = match (backup.exists(), live.exists()) {
                (false, false) => DriftState::MissingBoth,
                (true, false) => DriftState::MissingLive,
                (false, true) => DriftState::MissingBackup,
                (true, true) => {
                    let same = match kind {
                        EntryKind::File => same_file(&backup, &live).await,
                        EntryKind::Directory => same_tree(&backup, &live).await,
                    };
                    if same {
                        DriftState::InSync
                    } else {
                        DriftState::Differs
                    }
                }
            };

            statuses.push(EntryStatus {
                kind,
                backup_name: backup_name.clone(),
                live_name: live_name.clone(),
                state,
            });
        }
    }

    statuses
}

async fn same_file(a: &Path, b: &Path) -> bool {
    match (compute_file_hash(a).await, compute_file_hash(b).await) {
        (Ok(ha), Ok(hb)) => ha == hb,
        (Err(e), _) | (_, Err(e)) => {
            warn!(a = %a.display(), b = %b.display(), error = %e, "Could not hash file");
            false
        }
    }
}

async fn same_tree(a: &Path, b: &Path) -> bool {
    match (tree_digest(a).await, tree_digest(b).await) {
        (Ok(da), Ok(db)) => da == db,
        (Err(e), _) | (_, Err(e)) => {
            warn!(a = %a.display(), b = %b.display(), error = %e, "Could not hash directory");
            false
        }
    }
}

/// Relative path -> content hash for every entry below `root` (directories hash to "")
async fn tree_digest(root: &Path) -> Result<BTreeMap<String, String>, std::io::Error> {
    let mut digest = BTreeMap::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(true) {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        let hash = if entry.file_type().is_dir() {
            String::new()
        } else {
            compute_file_hash(entry.path()).await?
        };
        digest.insert(relative, hash);
    }

    Ok(digest)
}
