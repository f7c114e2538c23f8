//! Knowledge carriers
//!
//! A [`Carrier`] wraps one artifact at one parsing level together with its
//! representation descriptor and identities. The level is not stored: it is
//! derived from the [`Payload`] variant, so a carrier cannot claim to be
//! abstract while holding bytes.

use crate::identity::VersionedId;
use crate::level::ParsingLevel;
use crate::representation::Representation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A typed abstract syntax tree produced by a parser
///
/// Implemented for every `PartialEq + Debug + Send + Sync + 'static` type,
/// so language crates only need to derive the usual traits on their models.
pub trait KnowledgeModel: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// Structural equality across the trait object boundary
    fn model_eq(&self, other: &dyn KnowledgeModel) -> bool;
}

impl<T> KnowledgeModel for T
where
    T: Any + fmt::Debug + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn model_eq(&self, other: &dyn KnowledgeModel) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// The content of a carrier at one of the four levels
#[derive(Debug, Clone)]
pub enum Payload {
    Encoded(Vec<u8>),
    Serialized(String),
    Concrete(Value),
    Abstract(Arc<dyn KnowledgeModel>),
}

impl Payload {
    /// Wrap a typed model
    pub fn model<M: KnowledgeModel>(model: M) -> Self {
        Payload::Abstract(Arc::new(model))
    }

    pub fn level(&self) -> ParsingLevel {
        match self {
            Payload::Encoded(_) => ParsingLevel::Encoded,
            Payload::Serialized(_) => ParsingLevel::Serialized,
            Payload::Concrete(_) => ParsingLevel::Concrete,
            Payload::Abstract(_) => ParsingLevel::Abstract,
        }
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Payload::Encoded(a), Payload::Encoded(b)) => a == b,
            (Payload::Serialized(a), Payload::Serialized(b)) => a == b,
            (Payload::Concrete(a), Payload::Concrete(b)) => a == b,
            (Payload::Abstract(a), Payload::Abstract(b)) => a.as_ref().model_eq(b.as_ref()),
            _ => false,
        }
    }
}

/// Where a translated carrier came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    pub source_asset: VersionedId,
    pub source_artifact: VersionedId,
    /// The translator that produced the carrier
    pub operator: VersionedId,
    pub derived_at: DateTime<Utc>,
}

/// One artifact at one parsing level
#[derive(Debug, Clone, PartialEq)]
pub struct Carrier {
    payload: Payload,
    representation: Representation,
    asset_id: VersionedId,
    artifact_id: VersionedId,
    label: Option<String>,
    components: Vec<Carrier>,
    lineage: Option<Lineage>,
}

impl Carrier {
    /// A carrier with freshly minted asset and artifact identities
    pub fn new(payload: Payload, representation: Representation) -> Self {
        Self {
            payload,
            representation,
            asset_id: VersionedId::mint(),
            artifact_id: VersionedId::mint(),
            label: None,
            components: Vec::new(),
            lineage: None,
        }
    }

    /// Raw bytes of unknown representation
    pub fn encoded(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(Payload::Encoded(bytes.into()), Representation::any())
    }

    pub fn serialized(text: impl Into<String>, representation: Representation) -> Self {
        Self::new(Payload::Serialized(text.into()), representation)
    }

    pub fn concrete(tree: Value, representation: Representation) -> Self {
        Self::new(Payload::Concrete(tree), representation)
    }

    pub fn from_model<M: KnowledgeModel>(model: M, representation: Representation) -> Self {
        Self::new(Payload::model(model), representation)
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    pub fn with_asset_id(mut self, asset_id: VersionedId) -> Self {
        self.asset_id = asset_id;
        self
    }

    pub fn with_artifact_id(mut self, artifact_id: VersionedId) -> Self {
        self.artifact_id = artifact_id;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_component(mut self, component: Carrier) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_components(mut self, components: impl IntoIterator<Item = Carrier>) -> Self {
        self.components.extend(components);
        self
    }

    pub fn without_components(mut self) -> Self {
        self.components.clear();
        self
    }

    /// The same artifact one step further: new payload and descriptor, same
    /// identities, label and components
    pub fn advance(&self, payload: Payload, representation: Representation) -> Carrier {
        Carrier {
            payload,
            representation,
            ..self.clone()
        }
    }

    /// A new asset derived from this one by `operator`
    ///
    /// The result gets `asset_id`, a fresh artifact identity and a lineage
    /// record pointing back at this carrier. Components are not carried over.
    pub fn derive(
        &self,
        payload: Payload,
        representation: Representation,
        asset_id: VersionedId,
        operator: &VersionedId,
    ) -> Carrier {
        Carrier {
            payload,
            representation,
            asset_id,
            artifact_id: VersionedId::mint(),
            label: self.label.clone(),
            components: Vec::new(),
            lineage: Some(Lineage {
                source_asset: self.asset_id.clone(),
                source_artifact: self.artifact_id.clone(),
                operator: operator.clone(),
                derived_at: Utc::now(),
            }),
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn level(&self) -> ParsingLevel {
        self.payload.level()
    }

    pub fn representation(&self) -> &Representation {
        &self.representation
    }

    pub fn asset_id(&self) -> &VersionedId {
        &self.asset_id
    }

    pub fn artifact_id(&self) -> &VersionedId {
        &self.artifact_id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn components(&self) -> &[Carrier] {
        &self.components
    }

    pub fn lineage(&self) -> Option<&Lineage> {
        self.lineage.as_ref()
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Encoded(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Serialized(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Concrete(tree) => Some(tree),
            _ => None,
        }
    }

    /// The abstract payload, if it is a `M`
    pub fn as_model<M: KnowledgeModel>(&self) -> Option<&M> {
        match &self.payload {
            Payload::Abstract(model) => model.as_ref().as_any().downcast_ref::<M>(),
            _ => None,
        }
    }

    /// A serializable description of the carrier without its payload
    pub fn summary(&self) -> CarrierSummary {
        CarrierSummary {
            level: self.level(),
            representation: self.representation.clone(),
            asset_id: self.asset_id.clone(),
            artifact_id: self.artifact_id.clone(),
            label: self.label.clone(),
            components: self.components.len(),
            lineage: self.lineage.clone(),
        }
    }
}

/// Metadata of a carrier, for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierSummary {
    pub level: ParsingLevel,
    pub representation: Representation,
    pub asset_id: VersionedId,
    pub artifact_id: VersionedId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub components: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineage: Option<Lineage>,
}
