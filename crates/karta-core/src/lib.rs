//! Karta Core - representation algebra and operator dispatch for knowledge artifacts
//!
//! This crate provides the language-independent machinery of the Karta
//! pipeline: describing how an artifact is represented, moving it between
//! parsing levels, and choosing among competing pluggable operators.
//!
//! # Main Components
//!
//! - **Representation**: descriptors and their contrast (`EQUAL`, `NARROWER`,
//!   `BROADER`, `INCOMPARABLE`)
//! - **Parsing levels**: `Encoded < Serialized < Concrete < Abstract`
//! - **Carrier**: one artifact at one level, with its identities
//! - **Operators**: detector, parser, validator and translator contracts
//! - **Kernel**: capability-matching dispatch over a [`Registry`]
//! - **Answer**: mergeable diagnostics produced by validation
//! - **Walker**: generic traversal of hierarchical models
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use karta_core::{Carrier, Kernel, ParsingLevel, Registry, Result};
//!
//! fn example(registry: Registry, bytes: Vec<u8>) -> Result<()> {
//!     let kernel = Kernel::new(Arc::new(registry));
//!     let model = kernel.lift(Carrier::encoded(bytes), ParsingLevel::Abstract)?;
//!     println!("{}", model.representation());
//!     Ok(())
//! }
//! ```

pub mod answer;
pub mod carrier;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod level;
pub mod operator;
pub mod registry;
pub mod representation;
pub mod walker;

#[cfg(test)]
mod proptest_strategies;

// Re-export main types for convenience
pub use answer::{Answer, Explanation, FailureCause, Outcome};
pub use carrier::{Carrier, CarrierSummary, KnowledgeModel, Lineage, Payload};
pub use config::Properties;
pub use dispatch::Kernel;
pub use error::{Attempt, AttemptOutcome, Error, ResponseCode, Result, Severity};
pub use identity::VersionedId;
pub use level::{ParsingLevel, Transition};
pub use operator::{
    Detector, Operator, OperatorCategory, OperatorDescriptor, Parser, Step, Translator, Validator,
};
pub use registry::{OperatorQuery, Registry, RegistryBuilder};
pub use representation::{
    Charset, Contrast, Encoding, Format, Language, Lexicon, Profile, Representation, Serialization,
};
pub use walker::{ModelIndex, ModelNode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
