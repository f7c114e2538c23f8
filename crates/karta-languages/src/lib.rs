//! Karta Languages - reference operators for decision, case and plan models
//!
//! This crate provides simplified JSON/YAML surface syntaxes for three
//! knowledge representation languages together with the operators that
//! handle them:
//!
//! - **decision-model**: decisions with inputs, rules and required decisions
//! - **case-model**: nested stages, typed tasks, sentries and a case file
//! - **plan-definition**: nested actions with timed related actions
//!
//! ## Operators
//!
//! - **Detectors**: `kind`-marker sniffing for JSON/YAML (plain or Base64),
//!   namespace sniffing for DMN/CMMN XML
//! - **Parsers**: one [`DocumentParser`] per language, all six transitions
//! - **Validators**: [`WellFormedness`] for any concrete tree, plus
//!   [`DecisionModelRules`] and [`CaseModelRules`]
//! - **Translators**: [`DecisionToPlan`]
//!
//! ## Quick Start
//!
//! ```rust
//! use karta_core::{Carrier, ParsingLevel, Properties};
//! use karta_languages::{default_kernel, DecisionModel};
//!
//! let kernel = default_kernel();
//! let bytes = b"kind: decision-model\nid: loan\ndecisions:\n  - id: risk\n    name: Risk\n".to_vec();
//!
//! let lifted = kernel.lift(Carrier::encoded(bytes), ParsingLevel::Abstract).unwrap();
//! let model = lifted.as_model::<DecisionModel>().unwrap();
//! assert_eq!(model.decisions[0].id, "risk");
//!
//! let answer = kernel.validate(&lifted, &Properties::new());
//! assert!(answer.is_success());
//! ```

pub mod bootstrap;
pub mod case;
pub mod decision;
pub mod detect;
pub mod document;
pub mod parser;
pub mod plan;
pub mod translate;
pub mod wellformed;

pub use bootstrap::{default_kernel, default_registry, register_defaults};
pub use case::{CaseModel, CaseModelRules, CASE_MODEL};
pub use decision::{DecisionModel, DecisionModelRules, DECISION_MODEL};
pub use detect::{DocumentDetector, XmlNamespaceDetector};
pub use document::Document;
pub use parser::DocumentParser;
pub use plan::{PlanDefinition, PLAN_DEFINITION};
pub use translate::DecisionToPlan;
pub use wellformed::WellFormedness;
