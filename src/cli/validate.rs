//! `jobtmpl validate`
//!
//! Validates a template document, composes it with its parent when a
//! templates directory is available, and prints the result.
//!
//! Text output lists every violation and warning:
//!
//! ```text
//! ✗ job.yaml has 2 error(s)
//!   - "description" is required
//!   - "config.image" must be a string
//! ```
//!
//! JSON output is the `{errors, template, warnMessages?}` report. A document
//! that cannot be parsed or composed prints `{fatal, detail}` instead.
//!
//! The command fails when the document has violations, cannot be parsed or
//! composed, or (with `--strict`) produced warnings.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::common::open_store;
use crate::config::ToolConfig;
use crate::core::JobTmplError;
use crate::store::TemplateStore;
use crate::validator::{FatalKind, ValidationOutcome, validate_file};

#[derive(Args)]
pub struct ValidateCommand {
    /// Template document to validate
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Directory of parent templates (overrides `templates_dir` in the config)
    #[arg(long, value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Output format for validation results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct FatalReport<'a> {
    fatal: FatalKind,
    detail: &'a str,
}

impl ValidateCommand {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Returns [`JobTmplError::ValidationFailed`] when validation does not
    /// pass, or the underlying error when the file or store cannot be read.
    pub async fn execute(self, tool: &ToolConfig) -> Result<()> {
        let store = open_store(self.templates_dir.as_deref(), tool).await?;
        let store = store.as_ref().map(|s| s as &dyn TemplateStore);

        let outcome = validate_file(&self.file, store, &tool.default_namespace).await?;
        let strict = self.strict || tool.strict;

        match self.format {
            OutputFormat::Text => print_text(&self.file, &outcome),
            OutputFormat::Json => print_json(&outcome)?,
        }

        let failures = failure_count(&outcome, strict);
        if failures > 0 {
            return Err(JobTmplError::ValidationFailed {
                count: failures,
            }
            .into());
        }
        Ok(())
    }
}

/// Number of problems that make validation fail.
fn failure_count(outcome: &ValidationOutcome, strict: bool) -> usize {
    match outcome {
        ValidationOutcome::Composed {
            warnings,
            ..
        } if strict => warnings.len(),
        ValidationOutcome::Composed {
            ..
        } => 0,
        ValidationOutcome::StructurallyInvalid {
            violations,
            ..
        } => violations.len(),
        ValidationOutcome::Fatal {
            ..
        } => 1,
    }
}

fn print_text(file: &Path, outcome: &ValidationOutcome) {
    match outcome {
        ValidationOutcome::Composed {
            warnings,
            ..
        } => {
            println!("{} {} is valid", "✓".green(), file.display());
            for warning in warnings {
                println!("{} {warning}", "⚠".yellow());
            }
        }
        ValidationOutcome::StructurallyInvalid {
            violations,
            ..
        } => {
            println!("{} {} has {} error(s)", "✗".red(), file.display(), violations.len());
            for violation in violations {
                println!("  - {violation}");
            }
        }
        ValidationOutcome::Fatal {
            kind,
            detail,
        } => {
            println!("{} {}: {kind}", "✗".red(), file.display());
            println!("  {detail}");
        }
    }
}

fn print_json(outcome: &ValidationOutcome) -> Result<()> {
    let rendered = match (outcome.to_report()?, outcome) {
        (Some(report), _) => serde_json::to_string_pretty(&report)?,
        (
            None,
            ValidationOutcome::Fatal {
                kind,
                detail,
            },
        ) => serde_json::to_string_pretty(&FatalReport {
            fatal: *kind,
            detail,
        })?,
        (None, _) => return Ok(()),
    };
    println!("{rendered}");
    Ok(())
}
