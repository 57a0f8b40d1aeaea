//! Unit tests for configuration loading and root folder resolution
//!
//! Tests cover:
//! - Priority order for root folder resolution (CLI > env > TOML > default)
//! - Missing config files fall back to defaults
//! - TOML parsing of every bootstrap key
//! - Root folder layout
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate TUNEBOX_ROOT_FOLDER are marked with #[serial].

use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tunebox_common::config::{
    default_root_folder, resolve_root_folder, RootLayout, StorageBackend, TomlConfig,
    ROOT_FOLDER_ENV,
};

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = resolve_root_folder(None, ROOT_FOLDER_ENV, &TomlConfig::default());

    assert!(!root_folder.as_os_str().is_empty());
    assert_eq!(root_folder, default_root_folder());
}

#[test]
#[serial]
fn test_resolver_cli_arg_takes_precedence() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/tunebox-env-folder");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/tunebox-toml-folder")),
        ..Default::default()
    };

    let root_folder = resolve_root_folder(Some(Path::new("/tmp/tunebox-cli-folder")), ROOT_FOLDER_ENV, &toml);
    assert_eq!(root_folder, PathBuf::from("/tmp/tunebox-cli-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_env_var_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/tunebox-env-folder");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/tunebox-toml-folder")),
        ..Default::default()
    };

    let root_folder = resolve_root_folder(None, ROOT_FOLDER_ENV, &toml);
    assert_eq!(root_folder, PathBuf::from("/tmp/tunebox-env-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_toml_beats_default() {
    env::remove_var(ROOT_FOLDER_ENV);
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/tunebox-toml-folder")),
        ..Default::default()
    };

    let root_folder = resolve_root_folder(None, ROOT_FOLDER_ENV, &toml);
    assert_eq!(root_folder, PathBuf::from("/tmp/tunebox-toml-folder"));
}

#[test]
fn test_toml_config_full_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/tunebox"
bind_address = "0.0.0.0"
port = 8080
storage = "sqlite"
max_upload_bytes = 1024
static_dir = "/srv/tunebox/www"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = TomlConfig::load(Some(&path)).unwrap();

    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/tunebox")));
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.port, Some(8080));
    assert_eq!(config.storage, Some(StorageBackend::Sqlite));
    assert_eq!(config.max_upload_bytes, Some(1024));
    assert_eq!(config.static_dir, Some(PathBuf::from("/srv/tunebox/www")));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_toml_config_empty_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "").unwrap();

    let config = TomlConfig::load(Some(&path)).unwrap();

    assert!(config.root_folder.is_none());
    assert!(config.storage.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_toml_config_invalid_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    assert!(TomlConfig::load(Some(&path)).is_err());
}

#[test]
fn test_explicit_missing_config_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.toml");

    assert!(TomlConfig::load(Some(&path)).is_err());
}

#[test]
fn test_storage_backend_parse() {
    assert_eq!("json".parse::<StorageBackend>().unwrap(), StorageBackend::Json);
    assert_eq!("SQLite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
    assert!("postgres".parse::<StorageBackend>().is_err());
    assert_eq!(StorageBackend::default(), StorageBackend::Json);
}

#[test]
fn test_root_layout_paths() {
    let layout = RootLayout::new("/tmp/tunebox-layout");

    assert_eq!(layout.audio_metadata_path(), PathBuf::from("/tmp/tunebox-layout/audio_metadata.json"));
    assert_eq!(layout.playlists_path(), PathBuf::from("/tmp/tunebox-layout/playlists.json"));
    assert_eq!(layout.database_path(), PathBuf::from("/tmp/tunebox-layout/tunebox.db"));
    assert_eq!(layout.uploads_dir(), PathBuf::from("/tmp/tunebox-layout/uploads"));
}

#[test]
fn test_root_layout_creates_directory_idempotently() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("nested").join("root");
    let layout = RootLayout::new(&root);

    layout.ensure_exists().unwrap();
    layout.ensure_exists().unwrap();

    assert!(root.is_dir());
}
