use clap::{Parser, Subcommand, ValueEnum};
use os_user_files::config::{
    DEFAULT_MAX_RETRIES, DEFAULT_POLL_INTERVAL_MS, DEFAULT_RETRY_DELAY_MS,
};
use os_user_files::{
    ensure_layout, logging, Coordinator, Notifier, OrphanScope, Platform, ReconciliationKind,
    SyncConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// OS Specific User Files - keep per-platform user files in a backup folder
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the live user files
    #[arg(long, env = "OS_USER_FILES_ROOT", default_value = ".")]
    live_root: PathBuf,

    /// Platform whose mapping is active (windows, osx, linux)
    #[arg(long, env = "OS_USER_FILES_PLATFORM")]
    platform: Option<Platform>,

    /// Also write the diagnostic log to this file
    #[arg(long, env = "OS_USER_FILES_LOG")]
    log_file: Option<PathBuf>,

    /// Delay before retrying a submission while another run is active
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS)]
    retry_delay_ms: u64,

    /// Busy indicator cadence
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,

    /// Deferrals allowed before a submission gives up
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the backup folders and the default settings file
    Init,
    /// Copy missing live files from backup, then back up files never backed up
    Startup,
    /// Copy backed up files over the live files
    Copy {
        /// Only copy targets missing from the live root
        #[arg(long)]
        if_missing: bool,
    },
    /// Back up live files
    Backup {
        /// Only back up targets missing from the backup
        #[arg(long)]
        if_missing: bool,
    },
    /// Remove backup entries the settings no longer mention
    CleanOrphans {
        /// Scan every platform folder against the active platform's settings
        #[arg(long)]
        all_platforms: bool,
    },
    /// Show what an operation would do without changing anything
    Plan {
        operation: Operation,
        /// Only consider targets missing from the destination
        #[arg(long)]
        if_missing: bool,
        #[arg(long)]
        all_platforms: bool,
    },
    /// Compare every mapped entry between backup and live root
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Operation {
    Copy,
    Backup,
    CleanOrphans,
}

impl From<Operation> for ReconciliationKind {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Copy => ReconciliationKind::CopyDown,
            Operation::Backup => ReconciliationKind::BackupUp,
            Operation::CleanOrphans => ReconciliationKind::CleanOrphans,
        }
    }
}

/// Prints messages for the terminal and remembers whether an alert was raised
#[derive(Default)]
struct TerminalNotifier {
    alerted: AtomicBool,
}

impl Notifier for TerminalNotifier {
    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn alert(&self, message: &str) {
        self.alerted.store(true, Ordering::Release);
        eprintln!("{}", message);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    logging::init(args.verbose, args.log_file.as_deref())?;

    let all_platforms = matches!(
        args.command,
        Command::CleanOrphans { all_platforms: true } | Command::Plan { all_platforms: true, .. }
    );

    let config = SyncConfig {
        live_root: args.live_root.clone(),
        platform: args.platform.unwrap_or_else(Platform::current),
        orphan_scope: if all_platforms {
            OrphanScope::AllPlatforms
        } else {
            OrphanScope::ActivePlatform
        },
        retry_delay: Duration::from_millis(args.retry_delay_ms),
        poll_interval: Duration::from_millis(args.poll_interval_ms),
        max_retries: args.max_retries,
    };

    info!(
        live_root = %config.live_root.display(),
        platform = %config.platform,
        "Starting"
    );

    if let Command::Init = args.command {
        let report = ensure_layout(&config.layout()).await?;
        for dir in &report.created_directories {
            println!("Created {}", dir.display());
        }
        if report.created_settings {
            println!("Created {}", config.layout().settings_path().display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let notifier = Arc::new(TerminalNotifier::default());
    let coordinator = Coordinator::initialize(config, notifier.clone()).await;
    if !coordinator.is_enabled() {
        return Ok(ExitCode::FAILURE);
    }

    match args.command {
        Command::Init => {}
        Command::Startup => {
            coordinator.run_startup_sync().await?;
        }
        Command::Copy { if_missing } => {
            coordinator
                .submit(ReconciliationKind::CopyDown, !if_missing)
                .await?;
        }
        Command::Backup { if_missing } => {
            coordinator
                .submit(ReconciliationKind::BackupUp, !if_missing)
                .await?;
        }
        Command::CleanOrphans { .. } => {
            coordinator
                .submit(ReconciliationKind::CleanOrphans, true)
                .await?;
        }
        Command::Plan {
            operation,
            if_missing,
            ..
        } => {
            let actions = coordinator.preview(operation.into(), !if_missing).await?;
            if actions.is_empty() {
                println!("Nothing to do");
            }
            for action in actions {
                println!("{}", action);
            }
        }
        Command::Status => {
            for entry in coordinator.status().await? {
                println!(
                    "{:<16} {:?} {} -> {}",
                    entry.state.to_string(),
                    entry.kind,
                    entry.backup_name,
                    entry.live_name
                );
            }
        }
    }

    if notifier.alerted.load(Ordering::Acquire) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
