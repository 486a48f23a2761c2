//! Tool configuration
//!
//! Settings that apply to every `jobtmpl` invocation are read from a TOML
//! file:
//!
//! ```toml
//! # Namespace treated as implicit in template references
//! default_namespace = "default"
//!
//! # Directory of parent templates; `~` and `$VAR` are expanded
//! templates_dir = "~/ci/templates"
//!
//! # Treat composition warnings as failures
//! strict = false
//! ```
//!
//! # Location
//!
//! The first of these that applies wins:
//! 1. an explicit path (the `--config` flag)
//! 2. the `JOBTMPL_CONFIG_PATH` environment variable
//! 3. `<config dir>/jobtmpl/config.toml` (`~/.config/jobtmpl/config.toml` on Linux)
//!
//! A missing file at the default location yields the defaults. A missing file
//! that was asked for explicitly is an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{CONFIG_PATH_ENV, DEFAULT_NAMESPACE};
use crate::core::JobTmplError;

/// Settings shared by all commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Namespace a reference without one points into
    pub default_namespace: String,

    /// Directory the template store is loaded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,

    /// Fail validation when composition produced warnings
    pub strict: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            templates_dir: None,
            strict: false,
        }
    }
}

impl ToolConfig {
    /// Load from the default location, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// `JOBTMPL_CONFIG_PATH` names a file that does not exist.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, otherwise from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly requested file is missing, or if the
    /// file cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let explicit = path.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        if let Some(path) = explicit {
            return Self::load_from(&path).await;
        }

        match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from(&path).await,
            Ok(path) => {
                tracing::debug!("No config file at {}; using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => {
                tracing::debug!("{e}; using default config");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails [`validate`](Self::validate).
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Platform config location, `<config dir>/jobtmpl/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine config directory"))?;
        Ok(config_dir.join("jobtmpl").join("config.toml"))
    }

    /// Check values that TOML typing cannot.
    ///
    /// # Errors
    ///
    /// Returns [`JobTmplError::ConfigError`] for an empty default namespace.
    pub fn validate(&self) -> Result<()> {
        if self.default_namespace.trim().is_empty() {
            return Err(JobTmplError::ConfigError {
                message: "default_namespace must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// The templates directory with `~` and environment variables expanded.
    ///
    /// # Errors
    ///
    /// Returns an error if the path refers to an undefined variable.
    pub fn expanded_templates_dir(&self) -> Result<Option<PathBuf>> {
        self.templates_dir.as_deref().map(expand_path).transpose()
    }
}

/// Expand `~` and `$VAR` in a path.
///
/// # Errors
///
/// Returns [`JobTmplError::ConfigError`] naming the undefined variable.
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw).map_err(|e| JobTmplError::ConfigError {
        message: format!("Failed to expand {raw}: {e}"),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}
