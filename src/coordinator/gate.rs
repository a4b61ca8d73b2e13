use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Mutual-exclusion gate: at most one reconciliation runs at a time.
///
/// A disabled gate stays closed for the rest of the session.
#[derive(Debug, Default)]
pub struct RunGate {
    running: AtomicBool,
    disabled: AtomicBool,
}

/// Held while a run is active; reopens the gate on drop
#[derive(Debug)]
pub struct RunGuard {
    gate: Arc<RunGate>,
}

impl RunGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim the gate if nothing is running and it is not disabled
    pub fn try_acquire(self: &Arc<Self>) -> Option<RunGuard> {
        if self.is_disabled() {
            return None;
        }
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                gate: Arc::clone(self),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Acquire)
    }

    /// Close the gate permanently
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Release);
        self.running.store(true, Ordering::Release);
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.gate.is_disabled() {
            self.gate.running.store(false, Ordering::Release);
        }
    }
}
