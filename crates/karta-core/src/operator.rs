//! The operator capability contract
//!
//! Every pluggable component is an [`Operator`]: it carries an
//! [`OperatorDescriptor`] stating which representations it accepts (`from`)
//! and which it can produce (`into`). The dispatcher selects operators by
//! looking at descriptors only; operators run once they are chosen.
//!
//! Transform methods return a [`Step`]:
//! - `Ok(Some(carrier))` - produced a result
//! - `Ok(None)` - not applicable to this input, try someone else
//! - `Err(_)` - tried and failed, usually [`Error::MalformedInput`](crate::Error::MalformedInput)

use crate::answer::Answer;
use crate::carrier::Carrier;
use crate::config::Properties;
use crate::error::Result;
use crate::identity::{VersionedId, INITIAL_VERSION};
use crate::level::{ParsingLevel, Transition};
use crate::representation::{is_broader_or_equal, is_narrower_or_equal, Language, Representation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Result of a single transform attempt
pub type Step = Result<Option<Carrier>>;

/// Namespace under which operator identities are derived from their names
pub const OPERATOR_NAMESPACE: Uuid = Uuid::from_u128(0x6b61_7274_615f_6f70_6572_6174_6f72_0001);

/// The four kinds of operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorCategory {
    Detector,
    Parser,
    Validator,
    Translator,
}

impl fmt::Display for OperatorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorCategory::Detector => write!(f, "detector"),
            OperatorCategory::Parser => write!(f, "parser"),
            OperatorCategory::Validator => write!(f, "validator"),
            OperatorCategory::Translator => write!(f, "translator"),
        }
    }
}

impl FromStr for OperatorCategory {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "detector" => Ok(OperatorCategory::Detector),
            "parser" => Ok(OperatorCategory::Parser),
            "validator" => Ok(OperatorCategory::Validator),
            "translator" => Ok(OperatorCategory::Translator),
            other => Err(crate::Error::configuration(
                format!("Unknown operator category '{}'", other),
                Some("category"),
            )),
        }
    }
}

/// What an operator is and what it can handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorDescriptor {
    pub id: VersionedId,
    pub name: String,
    pub category: OperatorCategory,
    /// `None` for language-agnostic operators
    pub supported_language: Option<Language>,
    pub from: Vec<Representation>,
    pub into: Vec<Representation>,
}

impl OperatorDescriptor {
    /// A descriptor whose identity is derived from its name
    pub fn new(name: impl Into<String>, category: OperatorCategory) -> Self {
        let name = name.into();
        Self {
            id: VersionedId::named(&OPERATOR_NAMESPACE, &name, INITIAL_VERSION),
            name,
            category,
            supported_language: None,
            from: Vec::new(),
            into: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: VersionedId) -> Self {
        self.id = id;
        self
    }

    pub fn for_language(mut self, language: impl Into<Language>) -> Self {
        self.supported_language = Some(language.into());
        self
    }

    pub fn accepting(mut self, representations: impl IntoIterator<Item = Representation>) -> Self {
        self.from.extend(representations);
        self
    }

    pub fn producing(mut self, representations: impl IntoIterator<Item = Representation>) -> Self {
        self.into.extend(representations);
        self
    }

    /// Whether some `from` entry covers `representation`
    pub fn supports(&self, representation: &Representation) -> bool {
        self.from
            .iter()
            .any(|accepted| is_broader_or_equal(accepted, representation))
    }

    /// Highest specificity among `into` entries at least as specific as
    /// `target`, or `None` if the operator cannot produce it
    pub fn produces(&self, target: &Representation) -> Option<usize> {
        self.into
            .iter()
            .filter(|produced| is_narrower_or_equal(produced, target))
            .map(Representation::specificity)
            .max()
    }

    /// Language-agnostic operators accept every language
    pub fn handles_language(&self, language: Option<&Language>) -> bool {
        match &self.supported_language {
            None => true,
            Some(supported) => language == Some(supported),
        }
    }
}

impl fmt::Display for OperatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.category, self.name, self.id)
    }
}

/// Common supertrait of every operator
pub trait Operator: Send + Sync {
    fn descriptor(&self) -> &OperatorDescriptor;
}

/// Infers the representation of a raw artifact
pub trait Detector: Operator {
    /// `None` if the carrier is not recognised
    fn detect(&self, carrier: &Carrier) -> Option<Representation>;
}

/// Moves carriers of one language between parsing levels
///
/// Every step defaults to not applicable, so a parser implements only the
/// steps it supports.
pub trait Parser: Operator {
    /// Encoded -> Serialized
    fn decode(&self, _carrier: &Carrier, _hint: &Representation, _config: &Properties) -> Step {
        Ok(None)
    }

    /// Serialized -> Concrete
    fn deserialize(&self, _carrier: &Carrier, _hint: &Representation, _config: &Properties) -> Step {
        Ok(None)
    }

    /// Concrete -> Abstract
    fn parse(&self, _carrier: &Carrier, _hint: &Representation, _config: &Properties) -> Step {
        Ok(None)
    }

    /// Abstract -> Concrete
    fn externalize(&self, _carrier: &Carrier, _hint: &Representation, _config: &Properties) -> Step {
        Ok(None)
    }

    /// Concrete -> Serialized
    fn serialize(&self, _carrier: &Carrier, _hint: &Representation, _config: &Properties) -> Step {
        Ok(None)
    }

    /// Serialized -> Encoded
    fn encode(&self, _carrier: &Carrier, _hint: &Representation, _config: &Properties) -> Step {
        Ok(None)
    }

    /// Jump straight to `target`, skipping intermediate levels
    ///
    /// The result must carry the same descriptor the step-by-step chain would
    /// have produced.
    fn shortcut(
        &self,
        _carrier: &Carrier,
        _target: ParsingLevel,
        _hint: &Representation,
        _config: &Properties,
    ) -> Step {
        Ok(None)
    }

    /// Run the single step named by `transition`
    fn step(&self, transition: Transition, carrier: &Carrier, hint: &Representation, config: &Properties) -> Step {
        match transition {
            Transition::Decode => self.decode(carrier, hint, config),
            Transition::Deserialize => self.deserialize(carrier, hint, config),
            Transition::Parse => self.parse(carrier, hint, config),
            Transition::Externalize => self.externalize(carrier, hint, config),
            Transition::Serialize => self.serialize(carrier, hint, config),
            Transition::Encode => self.encode(carrier, hint, config),
        }
    }
}

/// Checks a carrier against a set of rules
pub trait Validator: Operator {
    /// The level the validator inspects; the dispatcher converts the carrier
    /// before calling [`Validator::validate`]
    fn consumes(&self) -> ParsingLevel {
        ParsingLevel::Abstract
    }

    fn validate(&self, carrier: &Carrier, config: &Properties) -> Answer<()>;
}

/// Produces a carrier of another language at the same level
pub trait Translator: Operator {
    fn translate(&self, carrier: &Carrier, target: &Representation, config: &Properties) -> Step;
}
