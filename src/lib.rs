//! jobtmpl - validation and composition of CI build-job templates
//!
//! A job template declares a reusable job body (image, environment, secrets,
//! ordered steps) and may extend a parent template. This crate checks
//! template documents against the template schema and composes a child
//! template with its parent into one flattened job config.
//!
//! # Pipeline
//!
//! ```text
//! text ──▶ template::loader ──▶ schema ──▶ compose ──▶ image aliases ──▶ ValidationOutcome
//!                                             │
//!                                             ▼
//!                                      store::TemplateStore
//! ```
//!
//! # Modules
//!
//! - [`template`] - document data model, step and reference types, loading
//! - [`schema`] - structural validation with exhaustive `{path, message}` violations
//! - [`store`] - the parent-template lookup seam and its in-memory implementation
//! - [`compose`] - the merge of a child config onto its parent
//! - [`validator`] - the end-to-end pipeline and its report shape
//! - [`config`] - tool configuration file
//! - [`cli`] - the `jobtmpl` command line
//! - [`core`] - error types and user-facing error rendering
//!
//! # Example
//!
//! ```rust,no_run
//! use jobtmpl_cli::store::load_directory;
//! use jobtmpl_cli::validator::validate_template;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = load_directory(Path::new("templates"), "default").await?;
//! let text = std::fs::read_to_string("job.yaml")?;
//! let outcome = validate_template(&text, Some(&store), "default").await?;
//! if let Some(report) = outcome.to_report()? {
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod compose;
pub mod config;
pub mod constants;
pub mod core;
pub mod schema;
pub mod store;
pub mod template;
pub mod validator;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
