//! Application configuration loading.
//!
//! Configuration lives in a small `config.toml` next to the binary and can be
//! overridden per-environment with `PLEDGEBOOK_DATA_DIR`. A missing config file
//! is not an error: the defaults cover the common single-directory layout.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable overriding the configured data directory.
pub const DATA_DIR_ENV: &str = "PLEDGEBOOK_DATA_DIR";

/// Application configuration from config.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding the five collection CSV files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the application configuration.
///
/// Reads `./config.toml` when present, falls back to defaults when it is not,
/// and lets `PLEDGEBOOK_DATA_DIR` override the data directory in either case.
pub fn load_app_configuration() -> Result<AppConfig> {
    let mut config = if Path::new("config.toml").exists() {
        load_config("config.toml")?
    } else {
        info!("No config.toml found, using default configuration.");
        AppConfig::default()
    };

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        config.data_dir = PathBuf::from(dir);
    }

    Ok(config)
}
