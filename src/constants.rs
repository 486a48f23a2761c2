//! Global constants used throughout the jobtmpl codebase.
//!
//! Names and prefixes that carry meaning in template documents live here so
//! the composition engine, the schema validator and the CLI agree on them.

/// Namespace assumed for templates that do not declare one.
///
/// Templates in this namespace are referred to by their bare name, so the
/// full name of `default/nodejs` is just `nodejs`.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Prefix that marks a step as a teardown step.
///
/// Teardown steps always run after every ordinary step, whatever their
/// position in the parent or child step list.
pub const TEARDOWN_PREFIX: &str = "teardown-";

/// Prefix of a child step that runs immediately before the parent step of the
/// same suffix in wrap mode (`prebuild` wraps `build`).
pub const PRE_STEP_PREFIX: &str = "pre";

/// Prefix of a child step that runs immediately after the parent step of the
/// same suffix in wrap mode (`postbuild` wraps `build`).
pub const POST_STEP_PREFIX: &str = "post";

/// Environment key injected with the parent template's full name.
pub const ENV_TEMPLATE_FULLNAME: &str = "TEMPLATE_FULLNAME";

/// Environment key injected with the parent template's bare name.
pub const ENV_TEMPLATE_NAME: &str = "TEMPLATE_NAME";

/// Environment key injected with the parent template's namespace.
///
/// Empty when the parent declares no namespace.
pub const ENV_TEMPLATE_NAMESPACE: &str = "TEMPLATE_NAMESPACE";

/// Environment key injected with the parent template's version.
pub const ENV_TEMPLATE_VERSION: &str = "TEMPLATE_VERSION";

/// Version selector that resolves to the highest available version.
pub const LATEST_VERSION_TAG: &str = "latest";

/// Environment variable that overrides the configuration file location.
pub const CONFIG_PATH_ENV: &str = "JOBTMPL_CONFIG_PATH";

/// File extensions recognised as template documents by the directory store.
pub const TEMPLATE_FILE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Returns `true` when `name` denotes a teardown step.
pub fn is_teardown(name: &str) -> bool {
    name.starts_with(TEARDOWN_PREFIX)
}
