//! Helpers shared by the commands.

use anyhow::Result;
use std::path::Path;

use crate::config::{ToolConfig, expand_path};
use crate::store::{InMemoryStore, load_directory};

/// Open the template store for a command.
///
/// The `--templates-dir` flag wins over the configured directory. Without
/// either there is no store, and parent references are left unresolved.
///
/// # Errors
///
/// Returns an error if the directory cannot be expanded or read.
pub(crate) async fn open_store(flag: Option<&Path>, tool: &ToolConfig) -> Result<Option<InMemoryStore>> {
    let dir = match flag {
        Some(dir) => Some(expand_path(dir)?),
        None => tool.expanded_templates_dir()?,
    };

    let Some(dir) = dir else {
        tracing::debug!("No templates directory configured; parent templates will not be resolved");
        return Ok(None);
    };

    let store = load_directory(&dir, &tool.default_namespace).await?;
    tracing::debug!("Template store has {} template(s)", store.len());
    Ok(Some(store))
}
