//! Document loading
//!
//! Turns raw document text into a generic [`serde_json::Value`] tree. YAML is
//! the source format; JSON documents load through the same parser since JSON
//! is valid YAML. No schema checks happen here.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::core::JobTmplError;

/// Parse document text into a generic value.
///
/// An empty document parses to [`Value::Null`]; the schema validator reports
/// that as a non-object document.
///
/// # Errors
///
/// Returns [`JobTmplError::ParseError`] when the text is not well-formed, or
/// when a mapping uses keys that are not strings.
pub fn parse_document(content: &str) -> Result<Value> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_yaml::from_str::<Value>(content).map_err(|e| {
        JobTmplError::ParseError {
            reason: e.to_string(),
        }
        .into()
    })
}

/// Read and parse a document from disk.
///
/// # Errors
///
/// Returns an I/O error (with the path as context) if the file cannot be read,
/// or [`JobTmplError::ParseError`] if its content is malformed.
pub async fn read_document(path: &Path) -> Result<Value> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read template document: {}", path.display()))?;
    tracing::debug!("Read {} bytes from {}", content.len(), path.display());
    parse_document(&content)
}
