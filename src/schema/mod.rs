//! Structural validation of template documents
//!
//! Checks a generic parsed value against the template schema and either
//! narrows it into a [`TemplateDocument`] or returns every violation found.
//! Validation never stops at the first problem, so one run reports all the
//! fixes a document needs.
//!
//! Each [`Violation`] carries the path to the offending field and a message
//! that quotes the field's dotted label:
//!
//! ```text
//! "description" is required
//! "config.image" must be a string
//! "config.steps[1]" must have 1 key
//! ```
//!
//! A few lenient coercions are applied to fields that otherwise validate:
//! numeric or boolean environment values become strings, a numeric `version`
//! becomes a string, and a single-string `requires` or `blockedBy` becomes a
//! one-element list.

mod rules;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::template::TemplateDocument;

/// One segment of a path into a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A single field-level schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Violation {
    /// Dotted label of the path, e.g. `config.steps[0].build`.
    #[must_use]
    pub fn label(&self) -> String {
        label_of(&self.path)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A document that failed structural validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaErrors {
    /// The document as parsed, with coercions applied to the fields that passed
    pub partial: Value,
    /// Every violation found, in schema order
    pub violations: Vec<Violation>,
}

/// Validate a parsed document.
///
/// # Errors
///
/// Returns [`SchemaErrors`] holding the best-effort document and every
/// violation when the value does not match the template schema.
pub fn validate_document(value: &Value) -> Result<TemplateDocument, SchemaErrors> {
    let mut document = value.clone();
    let violations = rules::check_document(&mut document);

    if !violations.is_empty() {
        tracing::debug!("Document failed structural validation with {} violation(s)", violations.len());
        return Err(SchemaErrors {
            partial: document,
            violations,
        });
    }

    serde_json::from_value::<TemplateDocument>(document.clone()).map_err(|e| SchemaErrors {
        partial: document,
        violations: vec![Violation {
            path: Vec::new(),
            message: format!("\"value\" could not be read as a template: {e}"),
        }],
    })
}

pub(crate) fn label_of(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "value".to_string();
    }

    let mut label = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) => {
                if !label.is_empty() {
                    label.push('.');
                }
                label.push_str(key);
            }
            PathSegment::Index(index) => {
                label.push_str(&format!("[{index}]"));
            }
        }
    }
    label
}
