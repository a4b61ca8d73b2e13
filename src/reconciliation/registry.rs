//! Registry of the available reconciliation algorithms.

use super::backup_up::BackupUp;
use super::clean_orphans::CleanOrphans;
use super::copy_down::CopyDown;
use super::types::{Reconciliation, ReconciliationKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Maps each kind to the algorithm that implements it.
pub struct ReconciliationRegistry {
    entries: HashMap<ReconciliationKind, Arc<dyn Reconciliation>>,
}

impl ReconciliationRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register an algorithm, replacing any previous one of the same kind.
    pub fn register(&mut self, reconciliation: Arc<dyn Reconciliation>) {
        self.entries.insert(reconciliation.kind(), reconciliation);
    }

    pub fn get(&self, kind: ReconciliationKind) -> Option<Arc<dyn Reconciliation>> {
        self.entries.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ReconciliationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry holding CopyDown, BackupUp and CleanOrphans.
pub fn create_registry() -> ReconciliationRegistry {
    let mut registry = ReconciliationRegistry::new();
    registry.register(Arc::new(CopyDown));
    registry.register(Arc::new(BackupUp));
    registry.register(Arc::new(CleanOrphans));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::Layout;
    use crate::reconciliation::types::{
        PlannedAction, ReconciliationRequest, ReconciliationResult,
    };

    struct NoOp;

    #[async_trait::async_trait]
    impl Reconciliation for NoOp {
        fn kind(&self) -> ReconciliationKind {
            ReconciliationKind::CopyDown
        }

        fn description(&self) -> &str {
            "No-op"
        }

        async fn plan(&self, _: &Layout, _: &ReconciliationRequest) -> Vec<PlannedAction> {
            Vec::new()
        }

        async fn apply(&self, _: &Layout, request: &ReconciliationRequest) -> ReconciliationResult {
            ReconciliationResult::new(self.kind(), request.run_id).finish()
        }
    }

    #[test]
    fn test_create_registry_has_all_kinds() {
        let registry = create_registry();
        assert_eq!(registry.len(), 3);
        for kind in [
            ReconciliationKind::CopyDown,
            ReconciliationKind::BackupUp,
            ReconciliationKind::CleanOrphans,
        ] {
            assert_eq!(registry.get(kind).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_register_replaces_same_kind() {
        let mut registry = create_registry();
        registry.register(Arc::new(NoOp));

        assert_eq!(registry.len(), 3);
        let copy = registry.get(ReconciliationKind::CopyDown).unwrap();
        assert_eq!(copy.description(), "No-op");
    }

    #[test]
    fn test_empty_registry() {
        let registry = ReconciliationRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(ReconciliationKind::BackupUp).is_none());
    }
}
