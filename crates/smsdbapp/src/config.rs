//! # Configuration
//!
//! Smsdb configuration is managed by [`confique`], which handles layered
//! loading from a TOML file, environment variables and compiled defaults.
//!
//! ## Resolution Order
//!
//! Configuration is resolved in priority order:
//! 1. **Command-line flags**: applied by the binary on top of the loaded value.
//! 2. **Environment variables**: `SMSDB_DATA_DIR`, `SMSDB_BACKEND`, `SMSDB_BIND`, `SMSDB_LOG`.
//! 3. **Config file**: the file passed with `--config` (or `SMSDB_CONFIG`), else
//!    `smsdb.toml` in the OS config directory (via `directories`), if present.
//! 4. **Compiled defaults**: built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data dir, else `./smsdb-data` | Where the `fs` backend keeps collection files |
//! | `backend` | `fs` | Storage engine: `fs` or `memory` |
//! | `bind` | `0.0.0.0:8000` | Listen address for `smsdb serve` |
//! | `log_level` | `info` | Default log filter when `RUST_LOG` is unset |

use crate::error::{Result, SmsdbError};
use crate::store::BackendKind;
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "smsdb.toml";

/// Configuration for smsdb, stored in `smsdb.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SmsdbConfig {
    /// Directory holding one JSON file per collection.
    #[config(env = "SMSDB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Storage engine, "fs" or "memory".
    #[config(default = "fs", env = "SMSDB_BACKEND")]
    pub backend: String,

    /// Listen address for the HTTP server.
    #[config(default = "0.0.0.0:8000", env = "SMSDB_BIND")]
    pub bind: String,

    #[config(default = "info", env = "SMSDB_LOG")]
    pub log_level: String,
}

impl Default for SmsdbConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            backend: "fs".to_string(),
            bind: "0.0.0.0:8000".to_string(),
            log_level: "info".to_string(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "smsdb")
}

/// `smsdb.toml` in the OS config directory, if one can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("smsdb-data"))
}

impl SmsdbConfig {
    /// Load from environment, config file and defaults.
    ///
    /// An explicitly named file must exist; the default location is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = SmsdbConfig::builder().env();
        match config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(SmsdbError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                builder = builder.file(path);
            }
            None => {
                if let Some(path) = default_config_path() {
                    builder = builder.file(path);
                }
            }
        }
        builder
            .load()
            .map_err(|e| SmsdbError::Config(e.to_string()))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn backend_kind(&self) -> Result<BackendKind> {
        self.backend.parse().map_err(SmsdbError::Config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| SmsdbError::Config(format!("invalid bind address '{}': {}", self.bind, e)))
    }
}
