//! Test utilities for jobtmpl
//!
//! Helpers shared by unit and integration tests: one-time logging setup and
//! canned template documents.
//!
//! # Example
//!
//! ```rust,no_run
//! use jobtmpl_cli::test_utils::{TemplateFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let temp = tempfile::TempDir::new().unwrap();
//! let path = TemplateFixture::node_base().write_to(temp.path()).unwrap();
//! assert!(path.exists());
//! ```

pub mod fixtures;

pub use fixtures::TemplateFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Installs a test-writer subscriber once per process. Uses `level` when
/// given, otherwise `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=jobtmpl_cli=trace cargo test compose
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
