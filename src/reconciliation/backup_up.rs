use super::execute::execute_transfer;
use super::plan::{plan_transfer, Direction};
use super::types::{
    PlannedAction, Reconciliation, ReconciliationKind, ReconciliationRequest,
    ReconciliationResult,
};
use crate::paths::Layout;
use async_trait::async_trait;

/// Copies live entries into the active platform's backup folder ("Backup User Files").
///
/// Renames run inside the backup folder, turning live names back into backup
/// names after the copy.
pub struct BackupUp;

#[async_trait]
impl Reconciliation for BackupUp {
    fn kind(&self) -> ReconciliationKind {
        ReconciliationKind::BackupUp
    }

    fn description(&self) -> &str {
        "Back up live files to the platform backup folder"
    }

    async fn plan(&self, layout: &Layout, request: &ReconciliationRequest) -> Vec<PlannedAction> {
        plan_transfer(Direction::Up, layout, request)
    }

    async fn apply(
        &self,
        layout: &Layout,
        request: &ReconciliationRequest,
    ) -> ReconciliationResult {
        execute_transfer(self.kind(), Direction::Up, layout, request).await
    }
}
