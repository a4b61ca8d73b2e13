#![allow(dead_code)]

use os_user_files::{Layout, Notifier, Platform, PlatformMapping, ReconciliationRequest};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Linux layout rooted at `root` with every platform backup folder created
pub fn create_layout(root: &Path) -> Layout {
    let layout = Layout::new(Platform::Linux, root);
    for platform in Platform::ALL {
        fs::create_dir_all(layout.platform_root(platform)).expect("Should create backup folder");
    }
    layout
}

/// Write a file, creating parent directories
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Should create parent");
    }
    fs::write(path, content).expect("Should write file");
}

pub fn read_file(path: &Path) -> String {
    fs::read_to_string(path).expect("Should read file")
}

/// Build a mapping from (backup name, live name) pairs
pub fn mapping(
    files: &[(&str, &str)],
    directories: &[(&str, &str)],
    rename: &[(&str, &str)],
) -> PlatformMapping {
    PlatformMapping {
        directories: to_map(directories),
        files: to_map(files),
        rename: to_map(rename),
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn request(mapping: &PlatformMapping, force: bool) -> ReconciliationRequest {
    ReconciliationRequest::new(Arc::new(mapping.clone()), force)
}

/// Every entry below `root`: relative path -> file content ("<dir>" for directories)
pub fn snapshot(root: &Path) -> BTreeMap<String, String> {
    let mut tree = BTreeMap::new();
    for entry in walkdir::WalkDir::new(root).min_depth(1) {
        let entry = entry.expect("Should walk tree");
        let relative = entry
            .path()
            .strip_prefix(root)
            .expect("Entry below root")
            .to_string_lossy()
            .to_string();
        let content = if entry.file_type().is_dir() {
            "<dir>".to_string()
        } else {
            read_file(entry.path())
        };
        tree.insert(relative, content);
    }
    tree
}

/// Notifier that records every signal it receives
#[derive(Default)]
pub struct RecordingNotifier {
    pub infos: Mutex<Vec<String>>,
    pub alerts: Mutex<Vec<String>>,
    pub busy_ticks: AtomicUsize,
}

impl RecordingNotifier {
    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn busy_ticks(&self) -> usize {
        self.busy_ticks.load(Ordering::SeqCst)
    }
}

impl Notifier for RecordingNotifier {
    fn busy(&self, _indicator: &str) {
        self.busy_ticks.fetch_add(1, Ordering::SeqCst);
    }

    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}
