mod hash;

pub use hash::{compute_file_hash, compute_hash};

/// Name of the backup folder created under the live root
pub const BACKUP_FOLDER: &str = "OsSpecificUserFiles";

/// Name of the mapping document stored in the live root
pub const SETTINGS_FILE: &str = "os_specific_user_files.json";

/// Prefix used for every user-visible message
pub const MESSAGE_PREFIX: &str = "OS Specific User Files";

/// Get current timestamp in ISO 8601 format
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}
