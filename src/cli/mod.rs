//! Command-line interface for jobtmpl
//!
//! # Commands
//!
//! - `validate` - check a template document and report every problem found
//! - `flatten` - print a template composed with its parent
//!
//! # Global options
//!
//! - `-v, --verbose` - debug logging
//! - `-q, --quiet` - errors only
//! - `-c, --config <PATH>` - configuration file (see [`crate::config`])
//! - `--namespace <NS>` - override the configured default namespace
//!
//! Logs go to stderr so that `--format json` output on stdout can be piped.
//!
//! # Examples
//!
//! ```bash
//! jobtmpl validate job.yaml --templates-dir ./templates
//! jobtmpl validate job.yaml --format json --strict
//! jobtmpl flatten job.yaml --templates-dir ./templates > flat.yaml
//! ```

mod common;
pub mod flatten;
pub mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::ToolConfig;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter directive; `None` defers to `RUST_LOG`
    pub log_level: Option<String>,

    /// Explicit configuration file
    pub config_path: Option<PathBuf>,

    /// Default namespace override
    pub namespace: Option<String>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the tool configuration and apply the flag overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded or the
    /// namespace override is empty.
    pub async fn tool_config(&self) -> Result<ToolConfig> {
        let mut config = ToolConfig::load_with_optional(self.config_path.clone()).await?;
        if let Some(namespace) = &self.namespace {
            config.default_namespace.clone_from(namespace);
            config.validate()?;
        }
        Ok(config)
    }
}

/// Validate and flatten CI job templates.
#[derive(Parser)]
#[command(
    name = "jobtmpl",
    about = "Validate and compose CI build-job templates",
    version,
    long_about = "jobtmpl checks job template documents against the template schema and \
                  composes them with the parent template they extend."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Namespace that references without one point into
    #[arg(long, global = true, value_name = "NS")]
    namespace: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a template document
    Validate(validate::ValidateCommand),

    /// Print a template document composed with its parent
    Flatten(flatten::FlattenCommand),
}

impl Cli {
    /// Run the selected command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or the command fails.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
            namespace: self.namespace.clone(),
        }
    }

    /// Run the selected command with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or the command fails.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let tool = config.tool_config().await?;
        tracing::debug!("Using default namespace {}", tool.default_namespace);

        match self.command {
            Commands::Validate(cmd) => cmd.execute(&tool).await,
            Commands::Flatten(cmd) => cmd.execute(&tool).await,
        }
    }
}

/// Install the process-wide log subscriber.
///
/// `level` wins over `RUST_LOG`; with neither, only warnings and errors are
/// shown.
pub fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
