mod backup_up;
mod clean_orphans;
mod copy_down;
mod execute;
mod plan;
mod registry;
mod status;
mod types;

pub use backup_up::BackupUp;
pub use clean_orphans::{find_orphans, CleanOrphans, OrphanScan};
pub use copy_down::CopyDown;
pub use execute::{execute_actions, execute_transfer};
pub use plan::{plan_stage, plan_transfer, Direction, DiskProbe, Probe, ProjectedProbe, Stage};
pub use registry::{create_registry, ReconciliationRegistry};
pub use status::{inspect_mapping, DriftState, EntryKind, EntryStatus};
pub use types::{
    Outcome, PlannedAction, Reconciliation, ReconciliationKind, ReconciliationRequest,
    ReconciliationResult, ALERT_MESSAGE,
};
