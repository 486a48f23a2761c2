//! Template references and full names
//!
//! A reference names a parent template: `namespace/name@version`,
//! `name@version` or just `name`. The namespace is everything before the last
//! `/`, so nested namespaces such as `org/team/name@1` keep `org/team`.

use anyhow::Result;
use std::fmt;
use std::str::FromStr;

use crate::constants::LATEST_VERSION_TAG;
use crate::core::JobTmplError;

/// Build a template's canonical full name.
///
/// The namespace is omitted when absent or equal to `default_namespace`.
///
/// ```
/// use jobtmpl_cli::template::full_name;
///
/// assert_eq!(full_name(Some("tools"), "node", "default"), "tools/node");
/// assert_eq!(full_name(Some("default"), "node", "default"), "node");
/// assert_eq!(full_name(None, "node", "default"), "node");
/// ```
#[must_use]
pub fn full_name(namespace: Option<&str>, name: &str, default_namespace: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() && ns != default_namespace => format!("{ns}/{name}"),
        _ => name.to_string(),
    }
}

/// A parsed parent-template reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateReference {
    pub namespace: Option<String>,
    pub name: String,
    /// Exact version, version prefix, `latest`, or `None` for latest
    pub version: Option<String>,
}

impl TemplateReference {
    /// Parse a reference string.
    ///
    /// # Errors
    ///
    /// Returns [`JobTmplError::InvalidReference`] when the name or version
    /// part is empty.
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = |reason: &str| JobTmplError::InvalidReference {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = reference.trim();
        let (path, version) = match trimmed.split_once('@') {
            Some((path, version)) => {
                if version.is_empty() {
                    return Err(invalid("version after '@' is empty").into());
                }
                (path, Some(version.to_string()))
            }
            None => (trimmed, None),
        };

        let (namespace, name) = match path.rsplit_once('/') {
            Some((namespace, name)) => {
                if namespace.is_empty() {
                    return Err(invalid("namespace before '/' is empty").into());
                }
                (Some(namespace.to_string()), name)
            }
            None => (None, path),
        };

        if name.is_empty() {
            return Err(invalid("template name is empty").into());
        }

        Ok(Self {
            namespace,
            name: name.to_string(),
            version,
        })
    }

    /// Full name of the referenced template.
    #[must_use]
    pub fn full_name(&self, default_namespace: &str) -> String {
        full_name(self.namespace.as_deref(), &self.name, default_namespace)
    }

    /// Namespace the reference points into, falling back to `default_namespace`.
    #[must_use]
    pub fn effective_namespace<'a>(&'a self, default_namespace: &'a str) -> &'a str {
        self.namespace.as_deref().unwrap_or(default_namespace)
    }

    /// `true` when the reference asks for the newest available version.
    #[must_use]
    pub fn wants_latest(&self) -> bool {
        self.version.as_deref().is_none_or(|v| v == LATEST_VERSION_TAG)
    }
}

impl FromStr for TemplateReference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TemplateReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "{namespace}/")?;
        }
        f.write_str(&self.name)?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        Ok(())
    }
}
