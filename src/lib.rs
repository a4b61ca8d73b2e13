pub mod bootstrap;
pub mod config;
pub mod coordinator;
pub mod fsops;
pub mod logging;
pub mod mapping;
pub mod paths;
pub mod reconciliation;
pub mod utils;

// Re-export commonly used types
pub use bootstrap::{ensure_layout, BootstrapError, BootstrapReport};
pub use config::{OrphanScope, SyncConfig};
pub use coordinator::{Coordinator, LogNotifier, Notifier, RunGate, SetupError, SubmitError};
pub use fsops::FsOpError;
pub use mapping::{
    default_document, read_mapping, write_mapping, MappingDocument, MappingError, PlatformMapping,
};
pub use paths::{normalize_path, Layout, Platform};
pub use reconciliation::{
    create_registry, BackupUp, CleanOrphans, CopyDown, DriftState, EntryStatus, Outcome,
    PlannedAction, Reconciliation, ReconciliationKind, ReconciliationRegistry,
    ReconciliationRequest, ReconciliationResult, ALERT_MESSAGE,
};
