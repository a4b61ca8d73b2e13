use super::plan::{plan_stage, Direction, DiskProbe, Stage};
use super::types::{PlannedAction, ReconciliationKind, ReconciliationRequest, ReconciliationResult};
use crate::paths::Layout;
use tracing::debug;

/// Run planned actions one by one, tallying into `result`.
///
/// A failed action does not stop the ones after it.
pub async fn execute_actions(actions: &[PlannedAction], result: &mut ReconciliationResult) {
    for action in actions {
        debug!(run_id = %result.run_id, action = %action, "Executing");
        result.record(action.execute().await);
    }
}

/// Run a transfer stage by stage, planning each stage right before it runs
pub async fn execute_transfer(
    kind: ReconciliationKind,
    direction: Direction,
    layout: &Layout,
    request: &ReconciliationRequest,
) -> ReconciliationResult {
    let mut result = ReconciliationResult::new(kind, request.run_id);

    for stage in Stage::ORDER {
        let actions = plan_stage(direction, stage, layout, request, &DiskProbe);
        debug!(run_id = %request.run_id, ?stage, targets = actions.len(), "Stage planned");
        execute_actions(&actions, &mut result).await;
    }

    result.finish()
}
