use super::execute::execute_actions;
use super::types::{
    PlannedAction, Reconciliation, ReconciliationKind, ReconciliationRequest,
    ReconciliationResult,
};
use crate::mapping::NameMap;
use crate::paths::{normalize_path, resolve, Layout};
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, warn};

/// Deletes backup entries that no `files` or `directories` key refers to.
///
/// Only the immediate children of each scanned platform folder are inspected.
/// Hidden entries are left alone. The scan always behaves as forced.
pub struct CleanOrphans;

/// Orphans found by a scan, plus whether any folder could not be listed
pub struct OrphanScan {
    pub orphans: Vec<PlannedAction>,
    pub scan_failed: bool,
}

/// List the orphaned entries under every platform folder in the request's scope
pub async fn find_orphans(layout: &Layout, request: &ReconciliationRequest) -> OrphanScan {
    let mut scan = OrphanScan {
        orphans: Vec::new(),
        scan_failed: false,
    };

    for platform in request.orphan_scope.platforms(layout.platform()) {
        let os_folder = layout.platform_root(platform);
        info!(folder = %os_folder.display(), "Searching OS folder");

        if !os_folder.is_dir() {
            warn!(folder = %os_folder.display(), "OS folder missing, skipping");
            continue;
        }

        let mut entries = match fs::read_dir(&os_folder).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(folder = %os_folder.display(), error = %e, "Could not list OS folder");
                scan.scan_failed = true;
                continue;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    error!(folder = %os_folder.display(), error = %e, "Could not list OS folder");
                    scan.scan_failed = true;
                    break;
                }
            };

            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            let found = normalize_path(&entry.path());
            if found.is_dir() {
                if !is_referenced(&os_folder, &request.mapping.directories, &found) {
                    info!(path = %found.display(), "Orphaned directory");
                    scan.orphans.push(PlannedAction::RemoveDirectory { path: found });
                }
            } else if !is_referenced(&os_folder, &request.mapping.files, &found) {
                info!(path = %found.display(), "Orphaned file");
                scan.orphans.push(PlannedAction::RemoveFile { path: found });
            }
        }
    }

    scan
}

/// True when some key of `names`, joined to `os_folder`, is exactly `found`
fn is_referenced(os_folder: &Path, names: &NameMap, found: &Path) -> bool {
    names
        .keys()
        .any(|backup_name| resolve(os_folder, backup_name) == found)
}

#[async_trait]
impl Reconciliation for CleanOrphans {
    fn kind(&self) -> ReconciliationKind {
        ReconciliationKind::CleanOrphans
    }

    fn description(&self) -> &str {
        "Remove orphaned backup files and directories"
    }

    async fn plan(&self, layout: &Layout, request: &ReconciliationRequest) -> Vec<PlannedAction> {
        find_orphans(layout, request).await.orphans
    }

    async fn apply(
        &self,
        layout: &Layout,
        request: &ReconciliationRequest,
    ) -> ReconciliationResult {
        let mut result = ReconciliationResult::new(self.kind(), request.run_id);

        let scan = find_orphans(layout, request).await;
        result.error_occurred |= scan.scan_failed;
        execute_actions(&scan.orphans, &mut result).await;

        result.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_referenced_uses_normalized_keys() {
        let mut names = NameMap::new();
        names.insert("./a.txt".to_string(), "a.txt".to_string());
        names.insert("sub/../b.txt".to_string(), "b.txt".to_string());

        let folder = Path::new("/backup/linux");
        assert!(is_referenced(folder, &names, Path::new("/backup/linux/a.txt")));
        assert!(is_referenced(folder, &names, Path::new("/backup/linux/b.txt")));
        assert!(!is_referenced(folder, &names, Path::new("/backup/linux/c.txt")));
    }

    #[test]
    fn test_is_referenced_matches_keys_not_values() {
        let mut names = NameMap::new();
        names.insert("stored.txt".to_string(), "live.txt".to_string());

        let folder = Path::new("/backup/linux");
        assert!(is_referenced(folder, &names, Path::new("/backup/linux/stored.txt")));
        assert!(!is_referenced(folder, &names, Path::new("/backup/linux/live.txt")));
    }
}
