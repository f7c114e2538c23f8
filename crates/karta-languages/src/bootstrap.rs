//! Explicit wiring of the reference operators
//!
//! Nothing registers itself: the registry lists every operator in one place,
//! and registration order is the tie-break the dispatcher falls back on.

use crate::case::{CaseModel, CaseModelRules};
use crate::decision::{DecisionModel, DecisionModelRules};
use crate::detect::{DocumentDetector, XmlNamespaceDetector};
use crate::parser::DocumentParser;
use crate::plan::PlanDefinition;
use crate::translate::DecisionToPlan;
use crate::wellformed::WellFormedness;
use karta_core::{Kernel, Registry, RegistryBuilder};
use std::sync::Arc;

/// Add every reference operator to `builder`
pub fn register_defaults(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .with_detector(DocumentDetector::<DecisionModel>::new())
        .with_detector(DocumentDetector::<CaseModel>::new())
        .with_detector(DocumentDetector::<PlanDefinition>::new())
        .with_detector(XmlNamespaceDetector::new())
        .with_parser(DocumentParser::<DecisionModel>::new())
        .with_parser(DocumentParser::<CaseModel>::new())
        .with_parser(DocumentParser::<PlanDefinition>::new())
        .with_validator(WellFormedness::new())
        .with_validator(DecisionModelRules::new())
        .with_validator(CaseModelRules::new())
        .with_translator(DecisionToPlan::new())
}

pub fn default_registry() -> Registry {
    register_defaults(Registry::builder()).build()
}

pub fn default_kernel() -> Kernel {
    Kernel::new(Arc::new(default_registry()))
}
