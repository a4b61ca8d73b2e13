//! Types shared by the reconciliation algorithms.

use crate::config::OrphanScope;
use crate::fsops::{self, FsOpError};
use crate::mapping::PlatformMapping;
use crate::paths::Layout;
use crate::utils::{now_iso, MESSAGE_PREFIX};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Text shown to the user when any target failed
pub const ALERT_MESSAGE: &str =
    "OS Specific User Files encountered one or more errors.\nPlease see the log for more info.";

/// The three reconciliation algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconciliationKind {
    /// Populate the live root from the backup ("Update User Files")
    CopyDown,
    /// Populate the backup from the live root ("Backup User Files")
    BackupUp,
    /// Delete backup entries the mapping no longer references
    CleanOrphans,
}

impl ReconciliationKind {
    /// Summary for a run that finished without errors
    pub fn summary(&self, count: u32) -> String {
        match (self, count) {
            (ReconciliationKind::CopyDown, 0) => "No copy required!".to_string(),
            (ReconciliationKind::CopyDown, n) => format!("{} targets copied successfully!", n),
            (ReconciliationKind::BackupUp, 0) => "No backup required!".to_string(),
            (ReconciliationKind::BackupUp, n) => format!("{} targets backed up successfully!", n),
            (ReconciliationKind::CleanOrphans, 0) => {
                "No orphaned files/directories found!".to_string()
            }
            (ReconciliationKind::CleanOrphans, n) => {
                format!("{} orphaned files/directories removed successfully!", n)
            }
        }
    }
}

impl fmt::Display for ReconciliationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReconciliationKind::CopyDown => "copy",
            ReconciliationKind::BackupUp => "backup",
            ReconciliationKind::CleanOrphans => "clean-orphans",
        };
        f.write_str(name)
    }
}

/// Input of one run: an immutable mapping snapshot plus flags
#[derive(Debug, Clone)]
pub struct ReconciliationRequest {
    pub run_id: Uuid,
    pub mapping: Arc<PlatformMapping>,
    /// Overwrite destinations even when they already exist
    pub force: bool,
    pub orphan_scope: OrphanScope,
}

impl ReconciliationRequest {
    pub fn new(mapping: Arc<PlatformMapping>, force: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            mapping,
            force,
            orphan_scope: OrphanScope::default(),
        }
    }

    pub fn with_orphan_scope(mut self, scope: OrphanScope) -> Self {
        self.orphan_scope = scope;
        self
    }
}

/// What the user gets told about a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    Failed,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Text for the status line or the alert
    pub fn text(&self) -> String {
        match self {
            Outcome::Success(message) => format!("{}: {}", MESSAGE_PREFIX, message),
            Outcome::Failed => ALERT_MESSAGE.to_string(),
        }
    }
}

/// Result of one run
#[derive(Debug, Clone)]
pub struct ReconciliationResult {
    pub kind: ReconciliationKind,
    pub run_id: Uuid,
    pub error_occurred: bool,
    /// Targets processed successfully
    pub count: u32,
    pub completed_at: Option<String>,
}

impl ReconciliationResult {
    pub fn new(kind: ReconciliationKind, run_id: Uuid) -> Self {
        Self {
            kind,
            run_id,
            error_occurred: false,
            count: 0,
            completed_at: None,
        }
    }

    /// Result for a run whose worker never reported back
    pub fn failed(kind: ReconciliationKind, run_id: Uuid) -> Self {
        Self {
            error_occurred: true,
            ..Self::new(kind, run_id)
        }
        .finish()
    }

    /// Fold one primitive outcome into the tally
    pub fn record(&mut self, outcome: Result<(), FsOpError>) {
        match outcome {
            Ok(()) => self.count += 1,
            Err(_) => self.error_occurred = true,
        }
    }

    pub fn finish(mut self) -> Self {
        self.completed_at = Some(now_iso());
        self
    }

    pub fn outcome(&self) -> Outcome {
        if self.error_occurred {
            Outcome::Failed
        } else {
            Outcome::Success(self.kind.summary(self.count))
        }
    }

    /// Summary message, only present when no error occurred
    pub fn message(&self) -> Option<String> {
        match self.outcome() {
            Outcome::Success(message) => Some(message),
            Outcome::Failed => None,
        }
    }
}

/// One filesystem operation a run will perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    CopyFile { src: PathBuf, dest: PathBuf },
    CopyDirectory { src: PathBuf, dest: PathBuf },
    Move { src: PathBuf, dest: PathBuf },
    RemoveFile { path: PathBuf },
    RemoveDirectory { path: PathBuf },
}

impl PlannedAction {
    pub async fn execute(&self) -> Result<(), FsOpError> {
        match self {
            PlannedAction::CopyFile { src, dest } => fsops::copy_file(src, dest).await,
            PlannedAction::CopyDirectory { src, dest } => fsops::copy_directory(src, dest).await,
            PlannedAction::Move { src, dest } => fsops::move_path(src, dest).await,
            PlannedAction::RemoveFile { path } => fsops::remove_file(path).await,
            PlannedAction::RemoveDirectory { path } => fsops::remove_directory(path).await,
        }
    }
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedAction::CopyFile { src, dest } => {
                write!(f, "copy file {} -> {}", src.display(), dest.display())
            }
            PlannedAction::CopyDirectory { src, dest } => {
                write!(f, "copy directory {} -> {}", src.display(), dest.display())
            }
            PlannedAction::Move { src, dest } => {
                write!(f, "move {} -> {}", src.display(), dest.display())
            }
            PlannedAction::RemoveFile { path } => write!(f, "remove file {}", path.display()),
            PlannedAction::RemoveDirectory { path } => {
                write!(f, "remove directory {}", path.display())
            }
        }
    }
}

/// A reconciliation algorithm.
///
/// `apply` never fails as a whole: per-target failures are logged by the
/// primitives and reduced to the result's error flag.
#[async_trait]
pub trait Reconciliation: Send + Sync {
    fn kind(&self) -> ReconciliationKind;

    /// Human-readable description used in logs.
    fn description(&self) -> &str;

    /// Actions the run would perform, without touching the filesystem.
    async fn plan(&self, layout: &Layout, request: &ReconciliationRequest) -> Vec<PlannedAction>;

    /// Run the algorithm to completion.
    async fn apply(
        &self,
        layout: &Layout,
        request: &ReconciliationRequest,
    ) -> ReconciliationResult;
}
