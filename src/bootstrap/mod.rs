//! First-run setup: backup folders and the default mapping document.

use crate::fsops::create_directory;
use crate::mapping::{default_document, write_mapping};
use crate::paths::{Layout, Platform};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Could not set up {} path(s): {}", .failed.len(), display_paths(.failed))]
    Setup { failed: Vec<PathBuf> },
}

/// What bootstrap had to create
#[derive(Debug, Clone, Default)]
pub struct BootstrapReport {
    pub created_directories: Vec<PathBuf>,
    pub created_settings: bool,
}

/// Make sure the backup folders and the settings document exist.
///
/// Platform folders are only attempted once the backup root exists. Every path
/// that could not be created is reported together.
pub async fn ensure_layout(layout: &Layout) -> Result<BootstrapReport, BootstrapError> {
    info!(live_root = %layout.live_root().display(), "Checking if setup is required");

    let mut report = BootstrapReport::default();
    let mut failed = Vec::new();

    let backup_root = layout.backup_root().to_path_buf();
    if !backup_root.exists() {
        match create_directory(&backup_root).await {
            Ok(()) => report.created_directories.push(backup_root.clone()),
            Err(_) => failed.push(backup_root.clone()),
        }
    }

    if failed.is_empty() {
        for platform in Platform::ALL {
            let dir = layout.platform_root(platform);
            if dir.exists() {
                continue;
            }
            match create_directory(&dir).await {
                Ok(()) => report.created_directories.push(dir),
                Err(_) => failed.push(dir),
            }
        }
    }

    let settings_path = layout.settings_path();
    if !settings_path.exists() {
        match write_mapping(settings_path, &default_document()).await {
            Ok(()) => {
                info!(path = %settings_path.display(), "Created default settings file");
                report.created_settings = true;
            }
            Err(e) => {
                error!(path = %settings_path.display(), error = %e, "Could not create settings file");
                failed.push(settings_path.to_path_buf());
            }
        }
    }

    if !failed.is_empty() {
        for path in &failed {
            error!(path = %path.display(), "Could not set up file or directory");
        }
        return Err(BootstrapError::Setup { failed });
    }

    Ok(report)
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
