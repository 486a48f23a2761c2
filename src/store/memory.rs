use anyhow::Result;
use futures::future::BoxFuture;

use super::TemplateStore;
use super::version::{VersionSelector, select_highest};
use crate::constants::DEFAULT_NAMESPACE;
use crate::template::{TemplateDocument, TemplateId, TemplateReference};

/// A store backed by a list of documents.
///
/// References resolve by namespace and name, then by version selection (see
/// [`crate::store::version`]). A reference without a namespace, and a
/// document without one, both mean the default namespace.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    default_namespace: String,
    templates: Vec<TemplateDocument>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl InMemoryStore {
    #[must_use]
    pub fn new(default_namespace: impl Into<String>) -> Self {
        Self {
            default_namespace: default_namespace.into(),
            templates: Vec::new(),
        }
    }

    /// Add a document, replacing any stored one with the same identity.
    ///
    /// Documents without an id get `namespace/name@version` as their id.
    /// Returns the document that was replaced, if any.
    pub fn insert(&mut self, mut document: TemplateDocument) -> Option<TemplateDocument> {
        let reference = document.canonical_reference(&self.default_namespace);
        if document.id.is_none() {
            document.id = Some(TemplateId::Text(reference.clone()));
        }

        let existing = self.templates.iter().position(|stored| {
            stored.canonical_reference(&self.default_namespace) == reference
        });
        match existing {
            Some(index) => {
                tracing::debug!("Replacing stored template {reference}");
                Some(std::mem::replace(&mut self.templates[index], document))
            }
            None => {
                tracing::trace!("Storing template {reference}");
                self.templates.push(document);
                None
            }
        }
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_template(mut self, document: TemplateDocument) -> Self {
        self.insert(document);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn templates(&self) -> impl Iterator<Item = &TemplateDocument> {
        self.templates.iter()
    }

    #[must_use]
    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    /// Find the document a reference resolves to.
    ///
    /// # Errors
    ///
    /// Returns [`crate::core::JobTmplError::InvalidReference`] when the
    /// reference string is malformed.
    pub fn resolve(&self, reference: &str) -> Result<Option<&TemplateDocument>> {
        let parsed = TemplateReference::parse(reference)?;
        let namespace = parsed.effective_namespace(&self.default_namespace);
        let selector = VersionSelector::parse(parsed.version.as_deref());

        let candidates = self
            .templates
            .iter()
            .filter(|doc| {
                doc.name == parsed.name && doc.effective_namespace(&self.default_namespace) == namespace
            })
            .map(|doc| (doc.version.as_str(), doc));

        let found = select_highest(candidates, &selector);
        match found {
            Some(doc) => tracing::debug!(
                "Resolved {reference} to {}",
                doc.canonical_reference(&self.default_namespace)
            ),
            None => tracing::debug!("No stored template matches {reference}"),
        }
        Ok(found)
    }
}

impl TemplateStore for InMemoryStore {
    fn get_template<'a>(
        &'a self,
        reference: &'a str,
    ) -> BoxFuture<'a, Result<Option<TemplateDocument>>> {
        Box::pin(async move { Ok(self.resolve(reference)?.cloned()) })
    }
}
