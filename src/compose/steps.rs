//! Step merging
//!
//! Both sides of a merge are first normalized into a [`StepIndex`]: an
//! insertion-ordered map from step name to definition plus the list of
//! locked names. Order mode and wrap mode both work off that index.

use anyhow::Result;
use indexmap::IndexMap;

use crate::constants::{POST_STEP_PREFIX, PRE_STEP_PREFIX, is_teardown};
use crate::core::JobTmplError;
use crate::template::{Step, StepDefinition};

/// Name-keyed view of a step list. The first occurrence of a name wins.
#[derive(Debug, Default)]
pub(crate) struct StepIndex<'a> {
    steps: IndexMap<&'a str, &'a StepDefinition>,
    locked: Vec<&'a str>,
}

impl<'a> StepIndex<'a> {
    pub(crate) fn new(steps: Option<&'a [Step]>) -> Self {
        let mut index = IndexMap::new();
        for step in steps.unwrap_or_default() {
            index.entry(step.name.as_str()).or_insert(&step.definition);
        }
        let locked = index
            .iter()
            .filter(|(_, definition)| definition.is_locked())
            .map(|(name, _)| *name)
            .collect();
        Self {
            steps: index,
            locked,
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&'a StepDefinition> {
        self.steps.get(name).copied()
    }

    pub(crate) fn is_locked(&self, name: &str) -> bool {
        self.locked.iter().any(|locked| *locked == name)
    }

    pub(crate) fn locked(&self) -> &[&'a str] {
        &self.locked
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.steps.keys().copied()
    }
}

fn resolved(name: &str, definition: &StepDefinition) -> Step {
    Step::command(name, definition.command())
}

pub(crate) fn locked_override_warning(name: &str, reference: &str) -> String {
    format!("cannot override locked step {name}; using step definition from template {reference}")
}

/// Build the step list by walking the child's `order`.
///
/// # Errors
///
/// Returns [`JobTmplError::MissingLockedSteps`] when a locked parent step is
/// not named in `order`.
pub(crate) fn merge_ordered(
    parent: &StepIndex<'_>,
    child: &StepIndex<'_>,
    order: &[String],
    reference: &str,
    warnings: &mut Vec<String>,
) -> Result<Vec<Step>> {
    let missing: Vec<String> = parent
        .locked()
        .iter()
        .filter(|name| !order.iter().any(|entry| entry == *name))
        .map(ToString::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(JobTmplError::MissingLockedSteps {
            reference: reference.to_string(),
            steps: missing,
        }
        .into());
    }

    let mut steps = Vec::new();
    let mut teardown = Vec::new();
    for name in order {
        let locked = parent.is_locked(name);
        let definition = match (child.get(name), parent.get(name)) {
            (Some(own), _) if !locked => own,
            (own, Some(inherited)) => {
                if locked && own.is_some() {
                    warnings.push(locked_override_warning(name, reference));
                }
                inherited
            }
            (_, None) => {
                warnings.push(format!("{name} step definition not found; skipping"));
                continue;
            }
        };

        tracing::trace!("Ordered step {name}");
        let step = resolved(name, definition);
        if is_teardown(name) {
            teardown.push(step);
        } else {
            steps.push(step);
        }
    }

    steps.extend(teardown);
    Ok(steps)
}

/// Build the step list by walking the parent's steps and wrapping each with
/// the child's `pre<name>` and `post<name>` steps.
pub(crate) fn merge_wrapped(
    parent: &StepIndex<'_>,
    child: &StepIndex<'_>,
    child_steps: &[Step],
    reference: &str,
    warnings: &mut Vec<String>,
) -> Vec<Step> {
    let mut steps = Vec::new();

    for name in parent.names() {
        let pre = format!("{PRE_STEP_PREFIX}{name}");
        if let Some(definition) = child.get(&pre) {
            steps.push(resolved(&pre, definition));
        }

        let definition = match (parent.get(name), child.get(name)) {
            (Some(inherited), own) if parent.is_locked(name) => {
                if own.is_some() {
                    warnings.push(locked_override_warning(name, reference));
                }
                Some(inherited)
            }
            (inherited, None) => inherited,
            (_, Some(own)) if !is_teardown(name) => Some(own),
            // the child's own teardown is appended below
            _ => None,
        };
        if let Some(definition) = definition {
            steps.push(resolved(name, definition));
        }

        let post = format!("{POST_STEP_PREFIX}{name}");
        if let Some(definition) = child.get(&post) {
            steps.push(resolved(&post, definition));
        }
    }

    for step in child_steps.iter().filter(|step| step.is_teardown()) {
        if parent.is_locked(&step.name) {
            continue;
        }
        if steps.iter().any(|merged| merged.name == step.name) {
            continue;
        }
        if let Some(definition) = child.get(&step.name) {
            steps.push(resolved(&step.name, definition));
        }
    }

    steps
}

/// Copy `steps` with every definition normalized. Locked steps keep their
/// structured form.
pub(crate) fn normalized(steps: &[Step]) -> Vec<Step> {
    steps
        .iter()
        .map(|step| Step::new(step.name.clone(), step.definition.normalized()))
        .collect()
}

/// Move every teardown step after the other steps, keeping relative order.
pub(crate) fn teardown_last(steps: Vec<Step>) -> Vec<Step> {
    let (teardown, regular): (Vec<Step>, Vec<Step>) = steps.into_iter().partition(Step::is_teardown);
    regular.into_iter().chain(teardown).collect()
}
