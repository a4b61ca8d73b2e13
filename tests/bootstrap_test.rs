mod common;

use common::{create_test_dir, read_file, write_file};
use os_user_files::{ensure_layout, read_mapping, BootstrapError, Layout, Platform};

#[tokio::test]
async fn test_creates_backup_folders_and_default_settings() {
    let temp_dir = create_test_dir();
    let layout = Layout::new(Platform::Windows, temp_dir.path());

    let report = ensure_layout(&layout).await.expect("Bootstrap should succeed");

    assert!(report.created_settings);
    // Backup root plus one folder per platform
    assert_eq!(report.created_directories.len(), 4);
    for platform in Platform::ALL {
        assert!(layout.platform_root(platform).is_dir());
    }

    let document = read_mapping(layout.settings_path()).await.unwrap();
    assert_eq!(document.len(), 3);
    assert!(document.values().all(|mapping| mapping.is_empty()));
}

#[tokio::test]
async fn test_second_run_creates_nothing() {
    let temp_dir = create_test_dir();
    let layout = Layout::new(Platform::Linux, temp_dir.path());

    ensure_layout(&layout).await.unwrap();
    let report = ensure_layout(&layout).await.unwrap();

    assert!(!report.created_settings);
    assert!(report.created_directories.is_empty());
}

#[tokio::test]
async fn test_existing_settings_are_kept() {
    let temp_dir = create_test_dir();
    let layout = Layout::new(Platform::Linux, temp_dir.path());
    let custom = r#"{"linux": {"directories": {}, "files": {"a": "b"}, "rename": {}}}"#;
    write_file(layout.settings_path(), custom);

    let report = ensure_layout(&layout).await.unwrap();

    assert!(!report.created_settings);
    assert_eq!(read_file(layout.settings_path()), custom);
    // Platform folders are still filled in next to the existing settings
    assert!(layout.platform_root(Platform::Osx).is_dir());
}

#[tokio::test]
async fn test_reports_every_path_it_could_not_create() {
    let temp_dir = create_test_dir();
    let occupied = temp_dir.path().join("occupied");
    write_file(&occupied, "not a directory");
    let layout = Layout::new(Platform::Linux, &occupied);

    let err = ensure_layout(&layout).await.unwrap_err();

    let BootstrapError::Setup { failed } = err;
    assert!(failed.contains(&layout.backup_root().to_path_buf()));
    assert!(failed.contains(&layout.settings_path().to_path_buf()));
    // Platform folders are not attempted without a backup root
    assert!(!failed.contains(&layout.platform_root(Platform::Linux)));
}
