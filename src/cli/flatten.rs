//! `jobtmpl flatten`
//!
//! Prints a template document composed with its parent, with image aliases
//! resolved. Warnings go to stderr; the document goes to stdout.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::open_store;
use crate::config::ToolConfig;
use crate::core::JobTmplError;
use crate::store::TemplateStore;
use crate::template::TemplateDocument;
use crate::validator::{ValidationOutcome, validate_file};

#[derive(Args)]
pub struct FlattenCommand {
    /// Template document to flatten
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Directory of parent templates (overrides `templates_dir` in the config)
    #[arg(long, value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Print JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

impl FlattenCommand {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Returns an error when the document does not validate or cannot be
    /// composed.
    pub async fn execute(self, tool: &ToolConfig) -> Result<()> {
        let store = open_store(self.templates_dir.as_deref(), tool).await?;
        let store = store.as_ref().map(|s| s as &dyn TemplateStore);

        let outcome = validate_file(&self.file, store, &tool.default_namespace).await?;
        let document = composed_document(outcome)?;
        println!("{}", self.render(&document)?);
        Ok(())
    }

    fn render(&self, document: &TemplateDocument) -> Result<String> {
        if self.json {
            Ok(serde_json::to_string_pretty(document)?)
        } else {
            Ok(serde_yaml::to_string(document)?)
        }
    }
}

fn composed_document(outcome: ValidationOutcome) -> Result<TemplateDocument> {
    match outcome {
        ValidationOutcome::Composed {
            document,
            warnings,
        } => {
            for warning in &warnings {
                eprintln!("{} {warning}", "⚠".yellow());
            }
            Ok(document)
        }
        ValidationOutcome::StructurallyInvalid {
            violations,
            ..
        } => {
            for violation in &violations {
                eprintln!("  - {violation}");
            }
            Err(JobTmplError::ValidationFailed {
                count: violations.len(),
            }
            .into())
        }
        ValidationOutcome::Fatal {
            kind,
            detail,
        } => Err(JobTmplError::Other {
            message: format!("{kind}: {detail}"),
        }
        .into()),
    }
}
