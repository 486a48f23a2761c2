//! Template stores
//!
//! A store resolves a parent-template reference to the stored document. The
//! composition engine issues at most one lookup per call and does no caching
//! or retrying of its own; a store that needs either implements it itself.
//!
//! `Ok(None)` means the reference does not resolve. `Err` is a transport or
//! I/O failure and is propagated untouched.
//!
//! Two implementations ship with the crate:
//! - [`InMemoryStore`] - documents held in memory, with version selection
//! - [`load_directory`] - builds an [`InMemoryStore`] from template files on disk

mod directory;
mod memory;
pub mod version;

use anyhow::Result;
use futures::future::BoxFuture;

use crate::template::TemplateDocument;

pub use directory::load_directory;
pub use memory::InMemoryStore;
pub use version::VersionSelector;

/// Resolves template references to documents.
///
/// The trait is object safe so callers can pass `&dyn TemplateStore`.
///
/// # Example
///
/// ```rust,no_run
/// use futures::future::BoxFuture;
/// use jobtmpl_cli::store::TemplateStore;
/// use jobtmpl_cli::template::TemplateDocument;
///
/// struct Empty;
///
/// impl TemplateStore for Empty {
///     fn get_template<'a>(
///         &'a self,
///         _reference: &'a str,
///     ) -> BoxFuture<'a, anyhow::Result<Option<TemplateDocument>>> {
///         Box::pin(async { Ok(None) })
///     }
/// }
/// ```
pub trait TemplateStore: Send + Sync {
    /// Look up the document a reference points to.
    fn get_template<'a>(
        &'a self,
        reference: &'a str,
    ) -> BoxFuture<'a, Result<Option<TemplateDocument>>>;
}
