//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `BLESSING_ROOT_FOLDER`
//! 3. TOML config file (`root_folder = "..."`)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing config file is never fatal: a warning is logged and defaults apply.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "BLESSING_ROOT_FOLDER";

/// Application directory name used under the platform config/data dirs
pub const APP_DIR_NAME: &str = "blessing-harvest";

/// File name of the persisted bucket snapshot
pub const SNAPSHOT_FILE_NAME: &str = "blessings.json";

/// File name of the persisted combination progress
pub const PROGRESS_FILE_NAME: &str = "scrape_progress.json";

/// Logging section of the TOML config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Shared top-level TOML keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Output root folder (snapshot + progress documents live here)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("./blessing_data"));

        Self {
            root_folder,
            log_level: default_log_level(),
        }
    }
}

/// Default config file location (`~/.config/blessing-harvest/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// Load a TOML document, falling back to `T::default()` when the file is absent
///
/// A file that exists but does not parse is an error.
pub fn load_toml_or_default<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(p) => p,
        None => {
            warn!("Could not determine config directory, using defaults");
            return Ok(T::default());
        }
    };

    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let parsed = toml::from_str(&content)
        .map_err(|e| Error::Toml(format!("{}: {}", path.display(), e)))?;
    info!(path = %path.display(), "Loaded config file");
    Ok(parsed)
}

/// Resolves the output root folder from CLI, environment, TOML and defaults
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, toml_config: &TomlConfig) -> Self {
        Self {
            cli_arg,
            toml_value: toml_config.root_folder.clone(),
        }
    }

    /// Resolve root folder following the priority order in the module docs
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            debug!(path = %path.display(), "Root folder from command line");
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                debug!(path = %path, "Root folder from environment");
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_value {
            debug!(path = %path.display(), "Root folder from TOML config");
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder and exposes the document paths inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            info!(path = %self.root_folder.display(), "Creating root folder");
            std::fs::create_dir_all(&self.root_folder)?;
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root_folder.join(SNAPSHOT_FILE_NAME)
    }

    pub fn progress_path(&self) -> PathBuf {
        self.root_folder.join(PROGRESS_FILE_NAME)
    }
}
