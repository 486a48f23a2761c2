//! Template validation pipeline
//!
//! Runs a document through every stage and packages the outcome:
//!
//! 1. parse the text ([`crate::template::loader`])
//! 2. check it against the schema ([`crate::schema`])
//! 3. drop `order` when there is no `template` to order against
//! 4. compose it with its parent ([`crate::compose`])
//! 5. resolve the final `image` through the composed image aliases
//!
//! Each call is independent. The only suspension point is the single parent
//! lookup made by the composition step.
//!
//! # Outcomes
//!
//! [`ValidationOutcome`] makes the three possible results explicit:
//! - `Composed` - the flattened document plus any warnings
//! - `StructurallyInvalid` - the partially loaded document and every violation
//! - `Fatal` - a parse failure or a composition failure that cannot be
//!   partially reported
//!
//! Store transport failures and I/O errors are not outcomes; they come back
//! as `Err`.
//!
//! # Example
//!
//! ```rust,no_run
//! use jobtmpl_cli::store::InMemoryStore;
//! use jobtmpl_cli::validator::{ValidationOutcome, validate_template};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = InMemoryStore::default();
//! let text = std::fs::read_to_string("job.yaml")?;
//! match validate_template(&text, Some(&store), "default").await? {
//!     ValidationOutcome::Composed { warnings, .. } => println!("ok, {} warning(s)", warnings.len()),
//!     ValidationOutcome::StructurallyInvalid { violations, .. } => {
//!         for violation in violations {
//!             println!("{violation}");
//!         }
//!     }
//!     ValidationOutcome::Fatal { detail, .. } => eprintln!("{detail}"),
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;

use crate::compose::compose;
use crate::core::JobTmplError;
use crate::schema::{Violation, validate_document};
use crate::store::TemplateStore;
use crate::template::{TemplateDocument, parse_document};

/// Warning emitted when `order` is given without a parent template.
pub const ORDER_WITHOUT_TEMPLATE_WARNING: &str =
    "\"order\" in template config cannot be used without \"template\"";

/// Category of a fatal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FatalKind {
    Parse,
    Composition,
}

impl fmt::Display for FatalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => f.write_str("parse error"),
            Self::Composition => f.write_str("composition error"),
        }
    }
}

/// Result of validating one document.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Composed {
        /// The document with its config flattened against the parent
        document: TemplateDocument,
        warnings: Vec<String>,
    },
    StructurallyInvalid {
        /// The document as parsed, before narrowing
        partial: Value,
        violations: Vec<Violation>,
    },
    Fatal {
        kind: FatalKind,
        detail: String,
    },
}

/// Serializable `{errors, template, warnMessages?}` view of an outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub errors: Vec<Violation>,
    pub template: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warn_messages: Vec<String>,
}

impl ValidationOutcome {
    #[must_use]
    pub const fn is_composed(&self) -> bool {
        matches!(self, Self::Composed { .. })
    }

    /// Warnings of a successful outcome; empty otherwise.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        match self {
            Self::Composed {
                warnings,
                ..
            } => warnings,
            _ => &[],
        }
    }

    /// Build the report for a composed or structurally invalid outcome.
    ///
    /// Fatal outcomes have no report and return `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the composed document cannot be serialized.
    pub fn to_report(&self) -> Result<Option<ValidationReport>> {
        let report = match self {
            Self::Composed {
                document,
                warnings,
            } => ValidationReport {
                errors: Vec::new(),
                template: serde_json::to_value(document)?,
                warn_messages: warnings.clone(),
            },
            Self::StructurallyInvalid {
                partial,
                violations,
            } => ValidationReport {
                errors: violations.clone(),
                template: partial.clone(),
                warn_messages: Vec::new(),
            },
            Self::Fatal {
                ..
            } => return Ok(None),
        };
        Ok(Some(report))
    }
}

/// Validate and compose template text.
///
/// # Errors
///
/// Returns an error only when the store fails; every problem with the
/// document itself is a [`ValidationOutcome`].
pub async fn validate_template(
    text: &str,
    store: Option<&dyn TemplateStore>,
    default_namespace: &str,
) -> Result<ValidationOutcome> {
    let value = match parse_document(text) {
        Ok(value) => value,
        Err(e) => return fatal_or_err(e, FatalKind::Parse),
    };

    let mut document = match validate_document(&value) {
        Ok(document) => document,
        Err(errors) => {
            return Ok(ValidationOutcome::StructurallyInvalid {
                partial: errors.partial,
                violations: errors.violations,
            });
        }
    };

    let mut warnings = Vec::new();
    if document.config.template.is_none() && document.config.order.take().is_some() {
        tracing::debug!("Dropping order from {}: no parent template", document.name);
        warnings.push(ORDER_WITHOUT_TEMPLATE_WARNING.to_string());
    }

    let merged = match compose(&document, store, default_namespace).await {
        Ok(merged) => merged,
        Err(e) => return fatal_or_err(e, FatalKind::Composition),
    };
    warnings.extend(merged.warnings);

    let mut config = merged.flattened_config;
    let alias = config
        .image
        .as_deref()
        .and_then(|image| merged.images.as_ref()?.get(image))
        .cloned();
    if let Some(resolved) = alias {
        tracing::debug!("Resolved image alias to {resolved}");
        config.image = Some(resolved);
    }

    document.config = config;
    document.images = merged.images;
    Ok(ValidationOutcome::Composed {
        document,
        warnings,
    })
}

/// Read a template file and validate it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the store fails.
pub async fn validate_file(
    path: &Path,
    store: Option<&dyn TemplateStore>,
    default_namespace: &str,
) -> Result<ValidationOutcome> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read template document: {}", path.display()))?;
    validate_template(&text, store, default_namespace).await
}

fn fatal_or_err(error: anyhow::Error, kind: FatalKind) -> Result<ValidationOutcome> {
    let classified = error.downcast_ref::<JobTmplError>().is_some_and(|e| match kind {
        FatalKind::Parse => e.is_parse_failure(),
        FatalKind::Composition => e.is_composition_failure(),
    });
    if !classified {
        return Err(error);
    }

    tracing::debug!("Fatal {kind}: {error}");
    Ok(ValidationOutcome::Fatal {
        kind,
        detail: error.to_string(),
    })
}
