//! Filesystem primitives used by every reconciliation.
//!
//! Each primitive reports a typed [`FsOpError`] instead of panicking and traces
//! both outcomes, so the log holds one line per attempted operation.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{error, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum FsOpError {
    #[error("Could not remove existing {path}: {source}")]
    RemoveExisting { path: PathBuf, source: io::Error },

    #[error("Could not copy file {src} to {dest}: {source}")]
    CopyFile {
        src: PathBuf,
        dest: PathBuf,
        source: io::Error,
    },

    #[error("Could not copy directory {src} to {dest}: {source}")]
    CopyDirectory {
        src: PathBuf,
        dest: PathBuf,
        source: io::Error,
    },

    #[error("Could not move {src} to {dest}: {source}")]
    Move {
        src: PathBuf,
        dest: PathBuf,
        source: io::Error,
    },

    #[error("Could not create directory {path}: {source}")]
    CreateDirectory { path: PathBuf, source: io::Error },

    #[error("Could not remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
}

/// Copy a single file, overwriting `dest` if present
pub async fn copy_file(src: &Path, dest: &Path) -> Result<(), FsOpError> {
    match fs::copy(src, dest).await {
        Ok(_) => {
            info!(src = %src.display(), dest = %dest.display(), "Copied file");
            Ok(())
        }
        Err(source) => {
            error!(src = %src.display(), dest = %dest.display(), error = %source, "Could not copy file");
            Err(FsOpError::CopyFile {
                src: src.to_path_buf(),
                dest: dest.to_path_buf(),
                source,
            })
        }
    }
}

/// Replace `dest` with a recursive copy of `src`.
///
/// An existing `dest` is removed first; if that fails nothing is copied.
pub async fn copy_directory(src: &Path, dest: &Path) -> Result<(), FsOpError> {
    if dest.exists() {
        info!(path = %dest.display(), "Removing existing directory");
        remove_existing(dest).await?;
    }

    match copy_tree(src, dest).await {
        Ok(files) => {
            info!(src = %src.display(), dest = %dest.display(), files, "Copied directory");
            Ok(())
        }
        Err(source) => {
            error!(src = %src.display(), dest = %dest.display(), error = %source, "Could not copy directory");
            Err(FsOpError::CopyDirectory {
                src: src.to_path_buf(),
                dest: dest.to_path_buf(),
                source,
            })
        }
    }
}

/// Rename `src` to `dest`, removing whatever occupies `dest` first
pub async fn move_path(src: &Path, dest: &Path) -> Result<(), FsOpError> {
    if fs::symlink_metadata(dest).await.is_ok() {
        info!(path = %dest.display(), "Removing existing target before move");
        remove_existing(dest).await?;
    }

    match fs::rename(src, dest).await {
        Ok(()) => {
            info!(src = %src.display(), dest = %dest.display(), "Moved");
            Ok(())
        }
        Err(source) => {
            error!(src = %src.display(), dest = %dest.display(), error = %source, "Could not move");
            Err(FsOpError::Move {
                src: src.to_path_buf(),
                dest: dest.to_path_buf(),
                source,
            })
        }
    }
}

/// Create `path` and any missing parents. An existing directory is not an error.
pub async fn create_directory(path: &Path) -> Result<(), FsOpError> {
    if path.is_dir() {
        info!(path = %path.display(), "Directory already present");
        return Ok(());
    }

    match fs::create_dir_all(path).await {
        Ok(()) => {
            info!(path = %path.display(), "Created directory");
            Ok(())
        }
        Err(source) => {
            error!(path = %path.display(), error = %source, "Could not create directory");
            Err(FsOpError::CreateDirectory {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Remove a single file
pub async fn remove_file(path: &Path) -> Result<(), FsOpError> {
    match fs::remove_file(path).await {
        Ok(()) => {
            info!(path = %path.display(), "Removed file");
            Ok(())
        }
        Err(source) => {
            error!(path = %path.display(), error = %source, "Could not remove file");
            Err(FsOpError::Remove {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Remove a directory and everything below it
pub async fn remove_directory(path: &Path) -> Result<(), FsOpError> {
    match fs::remove_dir_all(path).await {
        Ok(()) => {
            info!(path = %path.display(), "Removed directory");
            Ok(())
        }
        Err(source) => {
            error!(path = %path.display(), error = %source, "Could not remove directory");
            Err(FsOpError::Remove {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Delete whatever is at `path`: recursively for directories, singly otherwise
async fn remove_existing(path: &Path) -> Result<(), FsOpError> {
    let result = match fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).await,
        Ok(_) => fs::remove_file(path).await,
        Err(e) => Err(e),
    };

    result.map_err(|source| {
        error!(path = %path.display(), error = %source, "Could not remove existing target");
        FsOpError::RemoveExisting {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Copy the tree rooted at `src` into a fresh `dest`. Returns the number of files copied.
async fn copy_tree(src: &Path, dest: &Path) -> io::Result<usize> {
    if !src.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", src.display()),
        ));
    }

    let mut files = 0;

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).await?;
        } else {
            fs::copy(entry.path(), &target).await?;
            files += 1;
        }
    }

    Ok(files)
}
