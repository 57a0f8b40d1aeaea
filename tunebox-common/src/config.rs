//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "TUNEBOX_ROOT_FOLDER";

/// Which Storage Adapter implementation backs the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `audio_metadata.json` + `playlists.json` in the root folder
    #[default]
    Json,
    /// `tunebox.db` in the root folder
    Sqlite,
}

impl std::str::FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(StorageBackend::Json),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(Error::Config(format!("Unknown storage backend: {}", other))),
        }
    }
}

/// Bootstrap configuration loaded from TOML file
///
/// Every key is optional. Values given on the command line or through the
/// environment take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Data directory (metadata documents or database, uploads)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Interface to bind the HTTP server to
    #[serde(default)]
    pub bind_address: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Storage backend
    #[serde(default)]
    pub storage: Option<StorageBackend>,

    /// Upper bound for multipart upload bodies
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

    /// Directory holding a built front end to serve
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Load configuration, tolerating a missing file
    ///
    /// `explicit` is a path given on the command line or through the
    /// environment; it must exist. Without one the platform locations are
    /// searched and defaults are used if none is present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading config file: {}", path.display());
            return Self::from_file(path);
        }

        match find_config_file() {
            Some(path) => {
                info!("Loading config file: {}", path.display());
                Self::from_file(&path)
            }
            None => {
                warn!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Locate the configuration file for the platform
///
/// Linux checks `~/.config/tunebox/config.toml` then
/// `/etc/tunebox/config.toml`; other platforms only the user config dir.
pub fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("tunebox").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tunebox/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tunebox"))
        .unwrap_or_else(|| PathBuf::from("./tunebox_data"))
}

/// File layout inside the root folder
#[derive(Debug, Clone)]
pub struct RootLayout {
    root: PathBuf,
}

impl RootLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// JSON backend audio metadata document
    pub fn audio_metadata_path(&self) -> PathBuf {
        self.root.join("audio_metadata.json")
    }

    /// JSON backend playlist document
    pub fn playlists_path(&self) -> PathBuf {
        self.root.join("playlists.json")
    }

    /// SQLite backend database file
    pub fn database_path(&self) -> PathBuf {
        self.root.join("tunebox.db")
    }

    /// Directory holding uploaded payloads
    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    /// Create the root folder if it is missing
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.root.exists() {
            info!("Creating root folder: {}", self.root.display());
        }
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }
}
