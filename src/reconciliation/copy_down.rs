use super::execute::execute_transfer;
use super::plan::{plan_transfer, Direction};
use super::types::{
    PlannedAction, Reconciliation, ReconciliationKind, ReconciliationRequest,
    ReconciliationResult,
};
use crate::paths::Layout;
use async_trait::async_trait;

/// Copies backed up entries over the live root ("Update User Files").
///
/// Files, then directories, then renames inside the live root.
pub struct CopyDown;

#[async_trait]
impl Reconciliation for CopyDown {
    fn kind(&self) -> ReconciliationKind {
        ReconciliationKind::CopyDown
    }

    fn description(&self) -> &str {
        "Copy backed up files to the live root"
    }

    async fn plan(&self, layout: &Layout, request: &ReconciliationRequest) -> Vec<PlannedAction> {
        plan_transfer(Direction::Down, layout, request)
    }

    async fn apply(
        &self,
        layout: &Layout,
        request: &ReconciliationRequest,
    ) -> ReconciliationResult {
        execute_transfer(self.kind(), Direction::Down, layout, request).await
    }
}
