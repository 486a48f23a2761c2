//! Shared helpers for the integration tests.

#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use jobtmpl_cli::test_utils::TemplateFixture;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch workspace with a templates directory and an isolated config.
pub struct TestProject {
    _temp_dir: TempDir,
    project_dir: PathBuf,
    templates_dir: PathBuf,
    config_path: PathBuf,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let templates_dir = temp_dir.path().join("templates");
        let config_path = temp_dir.path().join("config.toml");

        fs::create_dir_all(&project_dir)?;
        fs::create_dir_all(&templates_dir)?;
        fs::write(&config_path, "")?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            templates_dir,
            config_path,
        })
    }

    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    pub fn templates_path(&self) -> &Path {
        &self.templates_dir
    }

    /// Replace the contents of the isolated config file.
    pub fn write_config(&self, content: &str) -> Result<()> {
        fs::write(&self.config_path, content)
            .with_context(|| format!("Failed to write config to {}", self.config_path.display()))
    }

    /// Add a parent template to the templates directory.
    pub fn add_template(&self, fixture: &TemplateFixture) -> Result<PathBuf> {
        fixture.write_to(&self.templates_dir)
    }

    /// Write a document into the project directory.
    pub fn write_document(&self, fixture: &TemplateFixture) -> Result<PathBuf> {
        fixture.write_to(&self.project_dir)
    }

    /// A `jobtmpl` command running in the project directory.
    pub fn jobtmpl(&self) -> Command {
        let mut cmd = Command::cargo_bin("jobtmpl").expect("jobtmpl binary is built");
        cmd.current_dir(&self.project_dir)
            .env("JOBTMPL_CONFIG_PATH", &self.config_path)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run `jobtmpl` with `args` and capture its output.
    pub fn run_jobtmpl(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.jobtmpl().args(args).output().context("Failed to run jobtmpl")?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Captured output of one run.
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStdout: {}\nStderr: {}",
            self.code, self.stdout, self.stderr
        );
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{text}'\nActual stdout: {}",
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{text}'\nActual stderr: {}",
            self.stderr
        );
        self
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).expect("stdout is JSON")
    }
}
