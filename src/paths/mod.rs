//! Fixed filesystem locations derived from a platform and a live root.

mod platform;

pub use platform::{Platform, UnknownPlatform};

use crate::utils::{BACKUP_FOLDER, SETTINGS_FILE};
use std::path::{Component, Path, PathBuf};

/// The four locations every reconciliation works against.
///
/// Built once per process; all paths are normalized so they can be compared
/// by equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    platform: Platform,
    live_root: PathBuf,
    backup_root: PathBuf,
    platform_backup_root: PathBuf,
    settings_path: PathBuf,
}

impl Layout {
    pub fn new(platform: Platform, live_root: impl AsRef<Path>) -> Self {
        let live_root = normalize_path(live_root.as_ref());
        let backup_root = live_root.join(BACKUP_FOLDER);
        let platform_backup_root = backup_root.join(platform.as_str());
        let settings_path = live_root.join(SETTINGS_FILE);

        Self {
            platform,
            live_root,
            backup_root,
            platform_backup_root,
            settings_path,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn live_root(&self) -> &Path {
        &self.live_root
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    /// Backup folder of the active platform
    pub fn platform_backup_root(&self) -> &Path {
        &self.platform_backup_root
    }

    /// Backup folder of any platform
    pub fn platform_root(&self, platform: Platform) -> PathBuf {
        self.backup_root.join(platform.as_str())
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }
}

/// Lexically normalize a path.
///
/// Drops `.` components and folds `..` into the preceding normal component.
/// Does not touch the filesystem, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }

    normalized
}

/// Join a mapping entry name onto a root and normalize the result
pub fn resolve(root: &Path, name: &str) -> PathBuf {
    normalize_path(&root.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = Layout::new(Platform::Linux, "/home/user/User");

        assert_eq!(layout.live_root(), Path::new("/home/user/User"));
        assert_eq!(
            layout.backup_root(),
            Path::new("/home/user/User/OsSpecificUserFiles")
        );
        assert_eq!(
            layout.platform_backup_root(),
            Path::new("/home/user/User/OsSpecificUserFiles/linux")
        );
        assert_eq!(
            layout.settings_path(),
            Path::new("/home/user/User/os_specific_user_files.json")
        );
        assert_eq!(
            layout.platform_root(Platform::Osx),
            Path::new("/home/user/User/OsSpecificUserFiles/osx")
        );
    }

    #[test]
    fn test_layout_normalizes_live_root() {
        let a = Layout::new(Platform::Windows, "/tmp/./root/sub/..");
        let b = Layout::new(Platform::Windows, "/tmp/root");
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalize_path_removes_dots() {
        assert_eq!(normalize_path(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize_path(Path::new("/a/b/../../..")), PathBuf::from("/"));
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize_path(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn test_resolve_different_joins_compare_equal() {
        let root = Path::new("/backup/linux");
        let direct = resolve(root, "Pkg/file.txt");
        let roundabout = resolve(&root.join("Pkg"), "./other/../file.txt");
        assert_eq!(direct, roundabout);
    }
}
