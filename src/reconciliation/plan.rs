//! Gating rules shared by CopyDown and BackupUp.
//!
//! A run is three stages: files, directories, renames. Each stage is planned
//! against the filesystem as it is when the stage starts, so renames see the
//! trees the directory stage just copied.

use super::types::{PlannedAction, ReconciliationRequest};
use crate::mapping::NameMap;
use crate::paths::{resolve, Layout};
use std::path::{Path, PathBuf};

/// Which way entries flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Backup -> live
    Down,
    /// Live -> backup
    Up,
}

/// Stages of a transfer, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Files,
    Directories,
    Renames,
}

impl Stage {
    pub const ORDER: [Stage; 3] = [Stage::Files, Stage::Directories, Stage::Renames];
}

/// Answers whether a path exists
pub trait Probe {
    fn exists(&self, path: &Path) -> bool;
}

/// Looks at the filesystem as it is now
pub struct DiskProbe;

impl Probe for DiskProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Looks at the filesystem as it will be once `planned` has run.
///
/// The most recent action touching a path wins; anything no action touches is
/// answered from disk.
pub struct ProjectedProbe<'a> {
    planned: &'a [PlannedAction],
}

impl<'a> ProjectedProbe<'a> {
    pub fn new(planned: &'a [PlannedAction]) -> Self {
        Self { planned }
    }
}

impl Probe for ProjectedProbe<'_> {
    fn exists(&self, path: &Path) -> bool {
        for action in self.planned.iter().rev() {
            match action {
                PlannedAction::CopyFile { dest, .. } if path == dest => return true,
                PlannedAction::CopyDirectory { src, dest } => {
                    if let Ok(relative) = path.strip_prefix(dest) {
                        return src.join(relative).exists();
                    }
                }
                PlannedAction::Move { src, dest } => {
                    if path == dest {
                        return true;
                    }
                    if path.starts_with(src) {
                        return false;
                    }
                }
                PlannedAction::RemoveFile { path: removed }
                | PlannedAction::RemoveDirectory { path: removed } => {
                    if path.starts_with(removed) {
                        return false;
                    }
                }
                _ => {}
            }
        }
        path.exists()
    }
}

/// Source, destination and parent requirement for one mapping entry
struct Endpoints {
    src: PathBuf,
    dest: PathBuf,
    require_parent: bool,
}

fn endpoints(
    direction: Direction,
    stage: Stage,
    layout: &Layout,
    backup_name: &str,
    live_name: &str,
) -> Endpoints {
    let backup = layout.platform_backup_root();
    let live = layout.live_root();

    match (direction, stage) {
        (Direction::Down, Stage::Renames) => Endpoints {
            src: resolve(live, backup_name),
            dest: resolve(live, live_name),
            require_parent: false,
        },
        (Direction::Down, _) => Endpoints {
            src: resolve(backup, backup_name),
            dest: resolve(live, live_name),
            require_parent: true,
        },
        (Direction::Up, Stage::Renames) => Endpoints {
            src: resolve(backup, live_name),
            dest: resolve(backup, backup_name),
            require_parent: true,
        },
        (Direction::Up, _) => Endpoints {
            src: resolve(live, live_name),
            dest: resolve(backup, backup_name),
            require_parent: true,
        },
    }
}

fn stage_map(request: &ReconciliationRequest, stage: Stage) -> &NameMap {
    match stage {
        Stage::Files => &request.mapping.files,
        Stage::Directories => &request.mapping.directories,
        Stage::Renames => &request.mapping.rename,
    }
}

/// Plan one stage.
///
/// An entry proceeds when its destination is absent (or `force` is set), its
/// source exists, and, where required, the destination's parent exists.
pub fn plan_stage(
    direction: Direction,
    stage: Stage,
    layout: &Layout,
    request: &ReconciliationRequest,
    probe: &dyn Probe,
) -> Vec<PlannedAction> {
    let mut actions = Vec::new();

    for (backup_name, live_name) in stage_map(request, stage) {
        let Endpoints {
            src,
            dest,
            require_parent,
        } = endpoints(direction, stage, layout, backup_name, live_name);

        let dest_clear = request.force || !probe.exists(&dest);
        let parent_ok = !require_parent || dest.parent().is_some_and(|p| probe.exists(p));

        if dest_clear && parent_ok && probe.exists(&src) {
            actions.push(match stage {
                Stage::Files => PlannedAction::CopyFile { src, dest },
                Stage::Directories => PlannedAction::CopyDirectory { src, dest },
                Stage::Renames => PlannedAction::Move { src, dest },
            });
        }
    }

    actions
}

/// Plan every stage of a transfer without touching the filesystem
pub fn plan_transfer(
    direction: Direction,
    layout: &Layout,
    request: &ReconciliationRequest,
) -> Vec<PlannedAction> {
    let mut planned: Vec<PlannedAction> = Vec::new();

    for stage in Stage::ORDER {
        let next = plan_stage(
            direction,
            stage,
            layout,
            request,
            &ProjectedProbe::new(&planned),
        );
        planned.extend(next);
    }

    planned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::PlatformMapping;
    use crate::paths::Platform;
    use std::fs;
    use std::sync::Arc;

    fn request(mapping: PlatformMapping, force: bool) -> ReconciliationRequest {
        ReconciliationRequest::new(Arc::new(mapping), force)
    }

    fn layout_in(dir: &Path) -> Layout {
        let layout = Layout::new(Platform::Linux, dir);
        fs::create_dir_all(layout.platform_backup_root()).unwrap();
        layout
    }

    #[test]
    fn test_down_endpoints() {
        let layout = Layout::new(Platform::Osx, "/u");
        let e = endpoints(Direction::Down, Stage::Files, &layout, "b.txt", "l.txt");
        assert_eq!(e.src, PathBuf::from("/u/OsSpecificUserFiles/osx/b.txt"));
        assert_eq!(e.dest, PathBuf::from("/u/l.txt"));
        assert!(e.require_parent);

        let e = endpoints(Direction::Down, Stage::Renames, &layout, "m.json", "m");
        assert_eq!(e.src, PathBuf::from("/u/m.json"));
        assert_eq!(e.dest, PathBuf::from("/u/m"));
        assert!(!e.require_parent);
    }

    #[test]
    fn test_up_endpoints() {
        let layout = Layout::new(Platform::Osx, "/u");
        let e = endpoints(Direction::Up, Stage::Directories, &layout, "B", "L");
        assert_eq!(e.src, PathBuf::from("/u/L"));
        assert_eq!(e.dest, PathBuf::from("/u/OsSpecificUserFiles/osx/B"));

        let e = endpoints(Direction::Up, Stage::Renames, &layout, "m.json", "m");
        assert_eq!(e.src, PathBuf::from("/u/OsSpecificUserFiles/osx/m"));
        assert_eq!(e.dest, PathBuf::from("/u/OsSpecificUserFiles/osx/m.json"));
        assert!(e.require_parent);
    }

    #[test]
    fn test_plan_stage_skips_existing_destination_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout_in(dir.path());
        fs::write(layout.platform_backup_root().join("a.txt"), "X").unwrap();
        fs::write(layout.live_root().join("a.txt"), "Y").unwrap();

        let mut mapping = PlatformMapping::default();
        mapping.files.insert("a.txt".into(), "a.txt".into());

        let lazy = plan_stage(
            Direction::Down,
            Stage::Files,
            &layout,
            &request(mapping.clone(), false),
            &DiskProbe,
        );
        assert!(lazy.is_empty());

        let forced = plan_stage(
            Direction::Down,
            Stage::Files,
            &layout,
            &request(mapping, true),
            &DiskProbe,
        );
        assert_eq!(forced.len(), 1);
    }

    #[test]
    fn test_plan_stage_requires_destination_parent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout_in(dir.path());
        fs::write(layout.platform_backup_root().join("a.txt"), "X").unwrap();

        let mut mapping = PlatformMapping::default();
        mapping.files.insert("a.txt".into(), "missing/a.txt".into());

        let actions = plan_stage(
            Direction::Down,
            Stage::Files,
            &layout,
            &request(mapping, true),
            &DiskProbe,
        );
        assert!(actions.is_empty());
    }

    #[test]
    fn test_plan_transfer_projects_renames_through_directory_copy() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout_in(dir.path());
        let pkg = layout.platform_backup_root().join("Pkg");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("menu.json"), "{}").unwrap();

        let mut mapping = PlatformMapping::default();
        mapping.directories.insert("Pkg".into(), "Pkg".into());
        mapping
            .rename
            .insert("Pkg/menu.json".into(), "Pkg/menu".into());

        let actions = plan_transfer(Direction::Down, &layout, &request(mapping, false));

        assert_eq!(actions.len(), 2);
        assert!(matches!(actions[0], PlannedAction::CopyDirectory { .. }));
        assert_eq!(
            actions[1],
            PlannedAction::Move {
                src: layout.live_root().join("Pkg/menu.json"),
                dest: layout.live_root().join("Pkg/menu"),
            }
        );
        assert!(!layout.live_root().join("Pkg").exists());
    }

    #[test]
    fn test_projected_probe_hides_replaced_tree_contents() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale"), "").unwrap();

        let planned = vec![PlannedAction::CopyDirectory {
            src: src.clone(),
            dest: dest.clone(),
        }];
        let probe = ProjectedProbe::new(&planned);

        assert!(probe.exists(&dest));
        assert!(!probe.exists(&dest.join("stale")));
    }
}
