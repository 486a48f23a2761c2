//! Template composition
//!
//! Merges a child template's job config onto the config of the parent it
//! names in `config.template`. Only the direct parent is merged; a parent's
//! own `template` reference is dropped, not followed.
//!
//! # Field merge
//!
//! | Field | Rule |
//! |---|---|
//! | `image`, `cache` | child if set, else parent |
//! | `environment`, `settings`, `annotations`, `parameters` | key-wise union, child wins |
//! | `secrets`, `sourcePaths` | set union, parent entries first |
//! | `requires`, `blockedBy`, `freezeWindows` | child list replaces parent list |
//!
//! The parent's environment also receives `TEMPLATE_FULLNAME`,
//! `TEMPLATE_NAME`, `TEMPLATE_NAMESPACE` and `TEMPLATE_VERSION` before the
//! merge, so a child can still override them.
//!
//! # Step merge
//!
//! - **Order mode** (child has `order`): steps are emitted in `order`
//!   sequence. Every locked parent step must be listed.
//! - **Wrap mode** (child has `steps` but no `order`): the parent's steps are
//!   walked in their own order, each wrapped by the child's `pre<name>` and
//!   `post<name>` steps, and replaced by the child's step of the same name
//!   unless the parent locked it.
//! - Otherwise the parent's steps are used as they are, except that a bare
//!   `{command}` object collapses to a plain command string.
//!
//! Teardown steps (`teardown-*`) always end up after every other step.

mod fields;
mod steps;


use anyhow::Result;
use std::collections::BTreeMap;

use crate::constants::{
    ENV_TEMPLATE_FULLNAME, ENV_TEMPLATE_NAME, ENV_TEMPLATE_NAMESPACE, ENV_TEMPLATE_VERSION,
};
use crate::core::JobTmplError;
use crate::store::TemplateStore;
use crate::template::{JobConfig, TemplateDocument};

use steps::StepIndex;

/// Output of a composition.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub flattened_config: JobConfig,
    /// Advisory messages, in the order they were produced
    pub warnings: Vec<String>,
    /// Image aliases visible to the composed config: the parent's, overlaid
    /// with the child's
    pub images: Option<BTreeMap<String, String>>,
}

impl MergeResult {
    fn unchanged(child: &TemplateDocument) -> Self {
        Self {
            flattened_config: child.config.clone(),
            warnings: Vec::new(),
            images: child.images.clone(),
        }
    }
}

/// Compose `child` with the parent template it references.
///
/// Without a `template` reference, or without a store, the child's config is
/// returned unchanged.
///
/// # Errors
///
/// - [`JobTmplError::TemplateNotFound`] when the store has no template for the reference
/// - [`JobTmplError::MissingLockedSteps`] when `order` leaves out a locked parent step
/// - [`JobTmplError::InvalidReference`] when the reference is malformed
/// - any error the store itself returns
pub async fn compose(
    child: &TemplateDocument,
    store: Option<&dyn TemplateStore>,
    default_namespace: &str,
) -> Result<MergeResult> {
    let (Some(reference), Some(store)) = (child.config.template.as_deref(), store) else {
        tracing::debug!("No parent template to merge for {}", child.name);
        return Ok(MergeResult::unchanged(child));
    };

    let parent = store.get_template(reference).await?.ok_or_else(|| JobTmplError::TemplateNotFound {
        reference: reference.to_string(),
    })?;
    tracing::debug!(
        "Merging {} onto parent {}",
        child.name,
        parent.canonical_reference(default_namespace)
    );

    merge(child, &parent, reference, default_namespace)
}

/// Merge against an already-resolved parent.
fn merge(
    child: &TemplateDocument,
    parent: &TemplateDocument,
    reference: &str,
    default_namespace: &str,
) -> Result<MergeResult> {
    let parent_config = with_identity_env(parent, default_namespace);
    let child_config = &child.config;
    let mut warnings = Vec::new();

    let mut merged = fields::merge_fields(&parent_config, child_config);

    let parent_index = StepIndex::new(parent_config.steps.as_deref());
    let child_index = StepIndex::new(child_config.steps.as_deref());
    let merged_steps = match (&child_config.order, &child_config.steps) {
        (Some(order), _) => {
            tracing::debug!("Merging steps in order mode ({} entries)", order.len());
            let ordered = steps::merge_ordered(&parent_index, &child_index, order, reference, &mut warnings)?;
            Some(steps::teardown_last(ordered))
        }
        (None, Some(child_steps)) => {
            tracing::debug!("Merging steps in wrap mode");
            let wrapped = steps::merge_wrapped(&parent_index, &child_index, child_steps, reference, &mut warnings);
            Some(steps::teardown_last(wrapped))
        }
        (None, None) => parent_config.steps.as_deref().map(steps::normalized),
    };

    merged.steps = merged_steps;
    merged.template_id = parent.id.clone();

    let images = match (&parent.images, &child.images) {
        (None, None) => None,
        (parent_images, child_images) => Some(fields::union_map(
            parent_images.as_ref().unwrap_or(&BTreeMap::new()),
            child_images.as_ref().unwrap_or(&BTreeMap::new()),
        )),
    };

    Ok(MergeResult {
        flattened_config: merged,
        warnings,
        images,
    })
}

/// The parent's config with its identity injected into the environment.
fn with_identity_env(parent: &TemplateDocument, default_namespace: &str) -> JobConfig {
    let mut config = parent.config.clone();
    let identity = [
        (ENV_TEMPLATE_FULLNAME, parent.full_name(default_namespace)),
        (ENV_TEMPLATE_NAME, parent.name.clone()),
        (ENV_TEMPLATE_NAMESPACE, parent.namespace.clone().unwrap_or_default()),
        (ENV_TEMPLATE_VERSION, parent.version.clone()),
    ];
    config
        .environment
        .extend(identity.into_iter().map(|(key, value)| (key.to_string(), value)));
    config
}
