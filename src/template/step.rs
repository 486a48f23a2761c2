//! Job steps
//!
//! In a document a step is a single-key map from step name to either a bare
//! command or a `{command, locked}` object:
//!
//! ```yaml
//! steps:
//!   - install: npm ci
//!   - teardown-clean:
//!       command: rm -rf tmp
//!       locked: true
//! ```

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::is_teardown;

/// A named step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub definition: StepDefinition,
}

/// What a step runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepDefinition {
    Command(String),
    Detailed(StepSpec),
}

/// Structured step definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    pub command: String,
    /// Forbids extending templates from substituting their own command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl StepDefinition {
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Command(command) => command,
            Self::Detailed(spec) => &spec.command,
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        match self {
            Self::Command(_) => false,
            Self::Detailed(spec) => spec.locked.unwrap_or(false),
        }
    }

    /// Collapse `{command}` with no other keys to a bare command string.
    #[must_use]
    pub fn normalized(&self) -> Self {
        match self {
            Self::Detailed(StepSpec {
                command,
                locked: None,
            }) => Self::Command(command.clone()),
            other => other.clone(),
        }
    }
}

impl Step {
    pub fn new(name: impl Into<String>, definition: StepDefinition) -> Self {
        Self {
            name: name.into(),
            definition,
        }
    }

    /// A step that runs `command` with no extra attributes.
    pub fn command(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(name, StepDefinition::Command(command.into()))
    }

    /// A locked step.
    pub fn locked(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(
            name,
            StepDefinition::Detailed(StepSpec {
                command: command.into(),
                locked: Some(true),
            }),
        )
    }

    #[must_use]
    pub fn is_teardown(&self) -> bool {
        is_teardown(&self.name)
    }
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.definition)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, StepDefinition>::deserialize(deserializer)?;
        if entries.len() != 1 {
            return Err(de::Error::invalid_length(entries.len(), &"a map with exactly one step"));
        }
        let Some((name, definition)) = entries.into_iter().next() else {
            return Err(de::Error::custom("empty step entry"));
        };
        Ok(Self {
            name,
            definition,
        })
    }
}
