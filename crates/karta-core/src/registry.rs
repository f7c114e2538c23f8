//! Operator registry
//!
//! A [`Registry`] holds the operators of each category in registration order.
//! It is assembled once through [`RegistryBuilder`] and shared read-only
//! afterwards; there is no global registry.

use crate::identity::VersionedId;
use crate::operator::{
    Detector, Operator, OperatorCategory, OperatorDescriptor, Parser, Translator, Validator,
};
use crate::representation::{is_narrower_or_equal, Language, Representation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Registered operators, per category, in registration order
#[derive(Clone, Default)]
pub struct Registry {
    detectors: Vec<Arc<dyn Detector>>,
    parsers: Vec<Arc<dyn Parser>>,
    validators: Vec<Arc<dyn Validator>>,
    translators: Vec<Arc<dyn Translator>>,
    /// Every descriptor, across categories, in registration order
    catalog: Vec<OperatorDescriptor>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn detectors(&self) -> &[Arc<dyn Detector>] {
        &self.detectors
    }

    pub fn parsers(&self) -> &[Arc<dyn Parser>] {
        &self.parsers
    }

    pub fn validators(&self) -> &[Arc<dyn Validator>] {
        &self.validators
    }

    pub fn translators(&self) -> &[Arc<dyn Translator>] {
        &self.translators
    }

    /// Descriptors matching `query`, in registration order
    pub fn list(&self, query: &OperatorQuery) -> Vec<OperatorDescriptor> {
        self.catalog
            .iter()
            .filter(|descriptor| query.matches(descriptor))
            .cloned()
            .collect()
    }

    pub fn find(&self, id: &VersionedId) -> Option<&OperatorDescriptor> {
        self.catalog.iter().find(|descriptor| &descriptor.id == id)
    }

    /// A copy of this registry without the operator `id`
    pub fn without_operator(&self, id: &VersionedId) -> Registry {
        Registry {
            detectors: retain_other(&self.detectors, id, |d| &d.descriptor().id),
            parsers: retain_other(&self.parsers, id, |p| &p.descriptor().id),
            validators: retain_other(&self.validators, id, |v| &v.descriptor().id),
            translators: retain_other(&self.translators, id, |t| &t.descriptor().id),
            catalog: self
                .catalog
                .iter()
                .filter(|descriptor| &descriptor.id != id)
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}

fn retain_other<T: ?Sized>(
    operators: &[Arc<T>],
    id: &VersionedId,
    id_of: impl Fn(&T) -> &VersionedId,
) -> Vec<Arc<T>> {
    operators
        .iter()
        .filter(|operator| id_of(operator) != id)
        .cloned()
        .collect()
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("operators", &self.catalog.iter().map(|d| &d.name).collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Registry`]
#[derive(Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detector(mut self, detector: impl Detector + 'static) -> Self {
        self.record(detector.descriptor(), OperatorCategory::Detector);
        self.registry.detectors.push(Arc::new(detector));
        self
    }

    pub fn with_parser(mut self, parser: impl Parser + 'static) -> Self {
        self.record(parser.descriptor(), OperatorCategory::Parser);
        self.registry.parsers.push(Arc::new(parser));
        self
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.record(validator.descriptor(), OperatorCategory::Validator);
        self.registry.validators.push(Arc::new(validator));
        self
    }

    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.record(translator.descriptor(), OperatorCategory::Translator);
        self.registry.translators.push(Arc::new(translator));
        self
    }

    pub fn build(self) -> Registry {
        self.registry
    }

    fn record(&mut self, descriptor: &OperatorDescriptor, slot: OperatorCategory) {
        if descriptor.category != slot {
            log::warn!(
                "Operator '{}' declares category {} but was registered as a {}",
                descriptor.name,
                descriptor.category,
                slot
            );
        }
        if self.registry.find(&descriptor.id).is_some() {
            log::warn!(
                "Operator '{}' ({}) registered twice; the first registration takes precedence",
                descriptor.name,
                descriptor.id
            );
        }
        let mut descriptor = descriptor.clone();
        descriptor.category = slot;
        self.registry.catalog.push(descriptor);
    }
}

/// Filter for [`Registry::list`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorQuery {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<OperatorCategory>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub from: Option<Representation>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub into: Option<Representation>,
}

impl OperatorQuery {
    /// Matches every operator
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: OperatorCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn language(mut self, language: impl Into<Language>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn accepting(mut self, representation: Representation) -> Self {
        self.from = Some(representation);
        self
    }

    pub fn producing(mut self, representation: Representation) -> Self {
        self.into = Some(representation);
        self
    }

    pub fn matches(&self, descriptor: &OperatorDescriptor) -> bool {
        if let Some(category) = self.category {
            if descriptor.category != category {
                return false;
            }
        }
        if let Some(language) = &self.language {
            if !descriptor.handles_language(Some(language)) {
                return false;
            }
        }
        if let Some(from) = &self.from {
            if !descriptor.supports(from) {
                return false;
            }
        }
        if let Some(into) = &self.into {
            if !descriptor
                .into
                .iter()
                .any(|produced| is_narrower_or_equal(produced, into))
            {
                return false;
            }
        }
        true
    }
}
