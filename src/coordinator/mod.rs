//! Serializes reconciliation runs and reports their outcome.
//!
//! The [`Coordinator`] owns the run gate and an immutable snapshot of the
//! active platform's mapping. Every accepted submission runs on its own tokio
//! task, is awaited explicitly while a busy indicator ticks, and ends with
//! exactly one `info` or `alert` on the [`Notifier`].

mod gate;
mod notify;

pub use gate::{RunGate, RunGuard};
pub use notify::{LogNotifier, Notifier, Throbber, THROBBER_FRAMES};

use crate::bootstrap::{ensure_layout, BootstrapError};
use crate::config::SyncConfig;
use crate::mapping::{platform_mapping, read_mapping, MappingError, PlatformMapping};
use crate::paths::Layout;
use crate::reconciliation::{
    create_registry, inspect_mapping, EntryStatus, Outcome, PlannedAction,
    ReconciliationKind, ReconciliationRegistry, ReconciliationRequest, ReconciliationResult,
    ALERT_MESSAGE,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Reconciliation is disabled for this session after a setup failure")]
    Disabled,

    #[error("Another reconciliation was still running after {0} deferrals")]
    Busy(u32),

    #[error("No reconciliation registered for {0}")]
    NotRegistered(ReconciliationKind),
}

pub struct Coordinator {
    config: SyncConfig,
    layout: Arc<Layout>,
    mapping: Option<Arc<PlatformMapping>>,
    registry: Arc<ReconciliationRegistry>,
    gate: Arc<RunGate>,
    notifier: Arc<dyn Notifier>,
}

impl Coordinator {
    /// Bootstrap the live root, load the mapping and build a coordinator.
    ///
    /// A setup failure is reported through the notifier and leaves the
    /// coordinator permanently disabled.
    pub async fn initialize(config: SyncConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self::initialize_with_registry(config, notifier, create_registry()).await
    }

    pub async fn initialize_with_registry(
        config: SyncConfig,
        notifier: Arc<dyn Notifier>,
        registry: ReconciliationRegistry,
    ) -> Self {
        let layout = config.layout();

        match load_session(&layout).await {
            Ok(mapping) => Self::new(config, mapping, registry, notifier),
            Err(e) => {
                error!(error = %e, "Setup failed, reconciliation disabled for this session");
                notifier.alert(ALERT_MESSAGE);

                let gate = RunGate::new();
                gate.disable();
                Self {
                    config,
                    layout: Arc::new(layout),
                    mapping: None,
                    registry: Arc::new(registry),
                    gate,
                    notifier,
                }
            }
        }
    }

    /// Build a coordinator around an already loaded mapping, skipping bootstrap
    pub fn new(
        config: SyncConfig,
        mapping: PlatformMapping,
        registry: ReconciliationRegistry,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            layout: Arc::new(config.layout()),
            config,
            mapping: Some(Arc::new(mapping)),
            registry: Arc::new(registry),
            gate: RunGate::new(),
            notifier,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.gate.is_disabled()
    }

    pub fn is_running(&self) -> bool {
        self.gate.is_running()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn mapping(&self) -> Option<&PlatformMapping> {
        self.mapping.as_deref()
    }

    fn request(&self, force: bool) -> Result<ReconciliationRequest, SubmitError> {
        let mapping = self.mapping.clone().ok_or(SubmitError::Disabled)?;
        Ok(ReconciliationRequest::new(mapping, force).with_orphan_scope(self.config.orphan_scope))
    }

    /// Run one reconciliation to completion.
    ///
    /// Waits for a running reconciliation by retrying after `retry_delay`, at
    /// most `max_retries` times.
    pub async fn submit(
        &self,
        kind: ReconciliationKind,
        force: bool,
    ) -> Result<ReconciliationResult, SubmitError> {
        let reconciliation = self
            .registry
            .get(kind)
            .ok_or(SubmitError::NotRegistered(kind))?;
        let request = self.request(force)?;
        let guard = self.acquire(kind).await?;

        let run_id = request.run_id;
        info!(%run_id, %kind, force, "{}", reconciliation.description());

        let layout = Arc::clone(&self.layout);
        let notifier = Arc::clone(&self.notifier);
        let poll_interval = self.config.poll_interval.max(Duration::from_millis(1));
        let span = info_span!("reconciliation", %run_id, %kind);

        // The run owns the guard, so the gate only reopens once the worker is done
        let run = tokio::spawn(
            async move {
                let worker = tokio::spawn(
                    async move { reconciliation.apply(&layout, &request).await }.in_current_span(),
                );
                let result =
                    supervise(worker, kind, run_id, notifier.as_ref(), poll_interval).await;
                drop(guard);

                info!(
                    count = result.count,
                    error_occurred = result.error_occurred,
                    "Reconciliation finished"
                );
                dispatch(notifier.as_ref(), &result);
                result
            }
            .instrument(span),
        );

        match run.await {
            Ok(result) => Ok(result),
            Err(e) => {
                error!(%run_id, %kind, error = %e, "Reconciliation run did not report back");
                Ok(ReconciliationResult::failed(kind, run_id))
            }
        }
    }

    /// Submit from the foreground without waiting for the run
    pub fn spawn_submit(
        self: &Arc<Self>,
        kind: ReconciliationKind,
        force: bool,
    ) -> JoinHandle<Result<ReconciliationResult, SubmitError>> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            let submitted = coordinator.submit(kind, force).await;
            if let Err(e) = &submitted {
                warn!(%kind, error = %e, "Submission not run");
            }
            submitted
        })
    }

    /// Copy anything missing from the live root, then back up anything never backed up
    pub async fn run_startup_sync(&self) -> Result<Vec<ReconciliationResult>, SubmitError> {
        info!("Checking for files that have never been copied over");
        let copied = self.submit(ReconciliationKind::CopyDown, false).await?;

        info!("Checking for files that have never been backed up");
        let backed_up = self.submit(ReconciliationKind::BackupUp, false).await?;

        Ok(vec![copied, backed_up])
    }

    /// Actions a submission would perform right now
    pub async fn preview(
        &self,
        kind: ReconciliationKind,
        force: bool,
    ) -> Result<Vec<PlannedAction>, SubmitError> {
        let reconciliation = self
            .registry
            .get(kind)
            .ok_or(SubmitError::NotRegistered(kind))?;
        let request = self.request(force)?;
        Ok(reconciliation.plan(&self.layout, &request).await)
    }

    /// Drift between backup and live root for every mapped entry
    pub async fn status(&self) -> Result<Vec<EntryStatus>, SubmitError> {
        let mapping = self.mapping.as_deref().ok_or(SubmitError::Disabled)?;
        Ok(inspect_mapping(&self.layout, mapping).await)
    }

    async fn acquire(&self, kind: ReconciliationKind) -> Result<RunGuard, SubmitError> {
        let mut deferrals = 0;

        loop {
            if self.gate.is_disabled() {
                return Err(SubmitError::Disabled);
            }
            if let Some(guard) = self.gate.try_acquire() {
                return Ok(guard);
            }
            if deferrals >= self.config.max_retries {
                warn!(%kind, deferrals, "Giving up waiting for the running reconciliation");
                return Err(SubmitError::Busy(deferrals));
            }

            deferrals += 1;
            debug!(%kind, deferrals, "Reconciliation already running, deferring");
            tokio::time::sleep(self.config.retry_delay).await;
        }
    }
}

/// Await the worker while ticking the busy indicator
async fn supervise(
    mut worker: JoinHandle<ReconciliationResult>,
    kind: ReconciliationKind,
    run_id: Uuid,
    notifier: &dyn Notifier,
    poll_interval: Duration,
) -> ReconciliationResult {
    let mut throbber = Throbber::default();
    let mut ticker = tokio::time::interval(poll_interval);

    let joined = loop {
        tokio::select! {
            joined = &mut worker => break joined,
            _ = ticker.tick() => notifier.busy(&throbber.tick()),
        }
    };

    match joined {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Reconciliation worker did not finish");
            ReconciliationResult::failed(kind, run_id)
        }
    }
}

fn dispatch(notifier: &dyn Notifier, result: &ReconciliationResult) {
    let outcome = result.outcome();
    match outcome {
        Outcome::Success(_) => notifier.info(&outcome.text()),
        Outcome::Failed => notifier.alert(ALERT_MESSAGE),
    }
}

async fn load_session(layout: &Layout) -> Result<PlatformMapping, SetupError> {
    ensure_layout(layout).await?;
    let document = read_mapping(layout.settings_path()).await?;
    let mapping = platform_mapping(&document, layout.platform())?;
    Ok(mapping.clone())
}
