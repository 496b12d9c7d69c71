//! Layered configuration loading.
//!
//! Sources are merged in increasing priority:
//! 1. Built-in defaults
//! 2. `fob-dev.toml` in the project root (or an explicit file)
//! 3. `FOB_DEV_*` environment variables (nested keys use `__`)

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};

use crate::error::{ConfigError, Result};
use crate::options::MiddlewareConfig;

/// Conventional config file name
pub const CONFIG_FILE_NAME: &str = "fob-dev.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "FOB_DEV_";

/// Builder for loading [`MiddlewareConfig`] from layered sources.
///
/// # Example
///
/// ```no_run
/// use fob_dev_config::ConfigLoader;
///
/// let config = ConfigLoader::new(".").load().unwrap();
/// assert!(config.allows_method("GET"));
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    root: PathBuf,
    file: Option<PathBuf>,
    env: bool,
}

impl ConfigLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            file: None,
            env: true,
        }
    }

    /// Use an explicit config file instead of `fob-dev.toml` in the root.
    ///
    /// Unlike the conventional file, an explicit file must exist.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Skip environment overrides.
    pub fn without_env(mut self) -> Self {
        self.env = false;
        self
    }

    /// The config file this loader reads, if any.
    pub fn config_path(&self) -> Option<PathBuf> {
        match &self.file {
            Some(file) if file.is_absolute() => Some(file.clone()),
            Some(file) => Some(self.root.join(file)),
            None => {
                let conventional = self.root.join(CONFIG_FILE_NAME);
                conventional.is_file().then_some(conventional)
            }
        }
    }

    /// Assemble the provider stack without extracting.
    pub fn figment(&self) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(MiddlewareConfig::default()));

        if let Some(path) = self.config_path() {
            if self.file.is_some() && !path.is_file() {
                return Err(ConfigError::NotFound(path));
            }
            tracing::debug!("loading middleware config from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        if self.env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment)
    }

    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` for a missing explicit file,
    /// `ConfigError::Figment` for syntax or type errors, and
    /// `ConfigError::InvalidValue` when validation fails.
    pub fn load(&self) -> Result<MiddlewareConfig> {
        let config: MiddlewareConfig = self.figment()?.extract()?;
        config.validate()?;
        Ok(config)
    }
}

/// Load config from the current directory (convenience function).
pub fn discover() -> Result<MiddlewareConfig> {
    let root = std::env::current_dir()?;
    ConfigLoader::new(root).load()
}
