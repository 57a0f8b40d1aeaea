//! Server configuration
//!
//! Each setting resolves as: command line > `TUNEBOX_*` environment variable
//! > TOML config file > compiled default.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tunebox_common::config::{resolve_root_folder, StorageBackend, TomlConfig, ROOT_FOLDER_ENV};
use tunebox_common::{Error, Result};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5174;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Command-line arguments for tunebox-server
#[derive(Parser, Debug, Default)]
#[command(name = "tunebox-server")]
#[command(about = "Audio library and playlist service")]
#[command(version)]
pub struct Args {
    /// Data directory (falls back to TUNEBOX_ROOT_FOLDER, then the config file)
    #[arg(short, long)]
    pub root_folder: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long, env = "TUNEBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "TUNEBOX_PORT")]
    pub port: Option<u16>,

    /// Interface to bind to
    #[arg(long, env = "TUNEBOX_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Storage backend: json or sqlite
    #[arg(long, env = "TUNEBOX_STORAGE")]
    pub storage: Option<StorageBackend>,

    /// Maximum accepted upload size in bytes
    #[arg(long, env = "TUNEBOX_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,

    /// Directory with a built front end to serve
    #[arg(long, env = "TUNEBOX_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "TUNEBOX_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub max_upload_bytes: usize,
    pub static_dir: Option<PathBuf>,
    pub log_level: String,
}

impl ServerConfig {
    /// Load the TOML file named by `args` (or found on the platform) and merge
    pub fn resolve(args: &Args) -> Result<Self> {
        let toml = TomlConfig::load(args.config.as_deref())?;
        Ok(Self::merge(args, &toml))
    }

    /// Merge already-parsed sources
    pub fn merge(args: &Args, toml: &TomlConfig) -> Self {
        Self {
            root_folder: resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV, toml),
            bind_address: args
                .bind_address
                .clone()
                .or_else(|| toml.bind_address.clone())
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port: args.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            storage: args.storage.or(toml.storage).unwrap_or_default(),
            max_upload_bytes: args
                .max_upload_bytes
                .or(toml.max_upload_bytes)
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            static_dir: args.static_dir.clone().or_else(|| toml.static_dir.clone()),
            log_level: args
                .log_level
                .clone()
                .unwrap_or_else(|| toml.logging.level.clone()),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| {
                Error::Config(format!(
                    "Invalid bind address {}:{}: {}",
                    self.bind_address, self.port, e
                ))
            })
    }
}
