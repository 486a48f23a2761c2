use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use super::InMemoryStore;
use crate::constants::TEMPLATE_FILE_EXTENSIONS;
use crate::schema::validate_document;
use crate::template::read_document;

/// Load every template file under `dir` into an [`InMemoryStore`].
///
/// Files with a `.yaml`, `.yml` or `.json` extension are read recursively.
/// A file that does not parse or fails structural validation is skipped with
/// a warning; it never aborts the load. Documents without an `id` get their
/// canonical `namespace/name@version` reference as id.
///
/// # Errors
///
/// Returns an error if `dir` does not exist or is not a directory.
pub async fn load_directory(dir: &Path, default_namespace: &str) -> Result<InMemoryStore> {
    let metadata = tokio::fs::metadata(dir)
        .await
        .with_context(|| format!("Templates directory not found: {}", dir.display()))?;
    if !metadata.is_dir() {
        bail!("Templates path is not a directory: {}", dir.display());
    }

    let mut store = InMemoryStore::new(default_namespace);
    for path in list_template_files(dir) {
        let value = match read_document(&path).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Skipping {}: {e}", path.display());
                continue;
            }
        };

        match validate_document(&value) {
            Ok(document) => {
                let reference = document.canonical_reference(default_namespace);
                if store.insert(document).is_some() {
                    tracing::warn!("{} redefines template {reference}", path.display());
                }
            }
            Err(errors) => {
                let first = errors.violations.first().map(ToString::to_string).unwrap_or_default();
                tracing::warn!(
                    "Skipping {}: {} schema violation(s), first: {first}",
                    path.display(),
                    errors.violations.len()
                );
            }
        }
    }

    tracing::debug!("Loaded {} template(s) from {}", store.len(), dir.display());
    Ok(store)
}

fn list_template_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_template_file(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

fn is_template_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEMPLATE_FILE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
