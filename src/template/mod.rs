//! Template document data model
//!
//! A template document declares a reusable job body and, optionally, the parent
//! template it extends:
//!
//! ```yaml
//! namespace: tools
//! name: node-build
//! version: 1.2.0
//! description: Builds and tests a node project
//! maintainer: ci-team@example.com
//! images:
//!   lts: node:20
//! config:
//!   image: lts
//!   template: tools/base@1
//!   environment:
//!     NODE_ENV: test
//!   secrets: [NPM_TOKEN]
//!   steps:
//!     - install: npm ci
//!     - test: npm test
//! ```
//!
//! The types here are plain serde values. Structural checks (required fields,
//! types, patterns) are done by [`crate::schema`] before a document is narrowed
//! into a [`TemplateDocument`], so deserialization itself is permissive.

pub mod loader;
pub mod reference;
pub mod step;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

pub use loader::{parse_document, read_document};
pub use reference::{TemplateReference, full_name};
pub use step::{Step, StepDefinition, StepSpec};

/// Opaque identifier a template store assigns to a stored document.
///
/// Recorded as `templateId` on a composed config so consumers can tell which
/// parent it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateId {
    Number(u64),
    Text(String),
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<u64> for TemplateId {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

/// A complete template document.
///
/// Identity is `namespace/name@version`. Documents fetched from a store are
/// treated as read-only; composition copies out of them and never writes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDocument {
    /// Store-assigned identifier, absent on documents read from user input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TemplateId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    pub name: String,

    pub version: String,

    pub description: String,

    pub maintainer: String,

    pub config: JobConfig,

    /// Image aliases: label to concrete image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<BTreeMap<String, String>>,
}

impl TemplateDocument {
    /// Canonical full name, omitting the namespace when it is the default one.
    #[must_use]
    pub fn full_name(&self, default_namespace: &str) -> String {
        full_name(self.namespace.as_deref(), &self.name, default_namespace)
    }

    /// The namespace this document lives in, falling back to `default_namespace`.
    #[must_use]
    pub fn effective_namespace<'a>(&'a self, default_namespace: &'a str) -> &'a str {
        self.namespace.as_deref().unwrap_or(default_namespace)
    }

    /// `namespace/name@version` with the namespace always spelled out.
    #[must_use]
    pub fn canonical_reference(&self, default_namespace: &str) -> String {
        format!(
            "{}/{}@{}",
            self.effective_namespace(default_namespace),
            self.name,
            self.version
        )
    }
}

/// The job body a template declares.
///
/// Field names follow the document format (`camelCase`). Empty maps and
/// lists are omitted on output so a config that never mentioned a field
/// serializes back without it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, Value>,

    /// Secret names; a set that keeps first-seen order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<String>,

    /// Source path filters; a set that keeps first-seen order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_paths: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freeze_windows: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, Parameter>>,

    /// Explicit step order; only meaningful together with `template`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<String>>,

    /// Parent template reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Id of the parent a composed config was built from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,
}

/// A parameter value: a string, a list of choices, or either with a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parameter {
    Plain(ParameterValue),
    Detailed {
        value: ParameterValue,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

/// The value part of a [`Parameter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Single(String),
    Choices(Vec<String>),
}

impl Parameter {
    #[must_use]
    pub const fn value(&self) -> &ParameterValue {
        match self {
            Self::Plain(value)
            | Self::Detailed {
                value,
                ..
            } => value,
        }
    }
}
