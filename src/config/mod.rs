use crate::paths::{Layout, Platform};
use std::path::PathBuf;
use std::time::Duration;

/// Delay before a submission that found another run active is retried
pub const DEFAULT_RETRY_DELAY_MS: u64 = 3000;

/// How often the progress indicator ticks while a run is active
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 300;

/// Deferrals allowed before a submission gives up
pub const DEFAULT_MAX_RETRIES: u32 = 100;

/// Which backup folders orphan cleanup inspects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrphanScope {
    /// Only the active platform's folder
    #[default]
    ActivePlatform,
    /// The linux, windows and osx folders, all checked against the active
    /// platform's mapping. Entries backed up for other platforms are deleted.
    AllPlatforms,
}

impl OrphanScope {
    /// Platform folders to scan for the given active platform
    pub fn platforms(&self, active: Platform) -> Vec<Platform> {
        match self {
            OrphanScope::ActivePlatform => vec![active],
            OrphanScope::AllPlatforms => Platform::ALL.to_vec(),
        }
    }
}

/// Runtime settings for a sync session
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Directory holding the live user files
    pub live_root: PathBuf,
    /// Platform whose mapping and backup folder are active
    pub platform: Platform,
    pub orphan_scope: OrphanScope,
    pub retry_delay: Duration,
    pub poll_interval: Duration,
    pub max_retries: u32,
}

impl SyncConfig {
    pub fn new(live_root: impl Into<PathBuf>) -> Self {
        Self {
            live_root: live_root.into(),
            ..Self::default()
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.platform, &self.live_root)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            live_root: PathBuf::from("."),
            platform: Platform::current(),
            orphan_scope: OrphanScope::default(),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}
