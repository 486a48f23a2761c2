//! Job-level field merge, parent as base and child as override.

use std::collections::{BTreeMap, HashSet};

use crate::template::JobConfig;

/// Merge every non-step field of two configs.
///
/// The returned config has no `steps`, `order`, `template` or `templateId`;
/// the caller fills in the ones that survive composition.
pub(crate) fn merge_fields(parent: &JobConfig, child: &JobConfig) -> JobConfig {
    JobConfig {
        image: child.image.clone().or_else(|| parent.image.clone()),
        environment: union_map(&parent.environment, &child.environment),
        settings: union_map(&parent.settings, &child.settings),
        annotations: union_map(&parent.annotations, &child.annotations),
        secrets: union_set(&parent.secrets, &child.secrets),
        source_paths: union_set(&parent.source_paths, &child.source_paths),
        requires: replace_list(parent.requires.as_ref(), child.requires.as_ref()),
        blocked_by: replace_list(parent.blocked_by.as_ref(), child.blocked_by.as_ref()),
        freeze_windows: replace_list(parent.freeze_windows.as_ref(), child.freeze_windows.as_ref()),
        cache: child.cache.or(parent.cache),
        parameters: match (&parent.parameters, &child.parameters) {
            (None, None) => None,
            (parent, child) => Some(union_map(
                parent.as_ref().unwrap_or(&BTreeMap::new()),
                child.as_ref().unwrap_or(&BTreeMap::new()),
            )),
        },
        order: None,
        template: None,
        template_id: None,
        steps: None,
    }
}

/// Key-wise union; child values win.
pub(crate) fn union_map<V: Clone>(
    parent: &BTreeMap<String, V>,
    child: &BTreeMap<String, V>,
) -> BTreeMap<String, V> {
    let mut merged = parent.clone();
    merged.extend(child.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Ordered set union: parent entries first, then new child entries.
pub(crate) fn union_set(parent: &[String], child: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    parent
        .iter()
        .chain(child)
        .filter(|entry| seen.insert(entry.as_str()))
        .cloned()
        .collect()
}

fn replace_list(parent: Option<&Vec<String>>, child: Option<&Vec<String>>) -> Option<Vec<String>> {
    child.or(parent).cloned()
}
