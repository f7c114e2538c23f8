//! Decision models
//!
//! A decision model is a flat list of decisions. Each decision names its
//! inputs, lists `when`/`then` rules and may require other decisions to be
//! made first.
//!
//! ```yaml
//! kind: decision-model
//! id: loan-approval
//! decisions:
//!   - id: eligibility
//!     name: Eligibility
//!     inputs: [age, income]
//!     rules:
//!       - when: age >= 18
//!         then: eligible
//!     requires: [risk]
//! ```

pub mod rules;

pub use rules::DecisionModelRules;

use crate::document::Document;
use karta_core::walker::{self, ModelIndex, ModelNode};
use serde::{Deserialize, Serialize};

/// Language name and `kind` marker of decision models
pub const DECISION_MODEL: &str = "decision-model";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionModel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decisions: Vec<Decision>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    /// Decisions whose outcome this one depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub when: String,
    pub then: String,
}

impl Document for DecisionModel {
    const KIND: &'static str = DECISION_MODEL;
}

/// Walkable element of a decision model
#[derive(Debug, Clone, Copy)]
pub enum DecisionNode<'m> {
    Model(&'m DecisionModel),
    Decision(&'m Decision),
    Rule(&'m Rule),
}

impl<'m> ModelNode<'m> for DecisionNode<'m> {
    fn id(&self) -> Option<&'m str> {
        match *self {
            DecisionNode::Model(model) => Some(model.id.as_str()),
            DecisionNode::Decision(decision) => Some(decision.id.as_str()),
            DecisionNode::Rule(_) => None,
        }
    }

    fn children(&self) -> Vec<Self> {
        match *self {
            DecisionNode::Model(model) => model.decisions.iter().map(DecisionNode::Decision).collect(),
            DecisionNode::Decision(decision) => decision.rules.iter().map(DecisionNode::Rule).collect(),
            DecisionNode::Rule(_) => Vec::new(),
        }
    }

    fn references(&self) -> Vec<&'m str> {
        match *self {
            DecisionNode::Decision(decision) => decision.requires.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl DecisionModel {
    pub fn root(&self) -> DecisionNode<'_> {
        DecisionNode::Model(self)
    }

    pub fn index(&self) -> ModelIndex<'_, DecisionNode<'_>> {
        ModelIndex::build(self.root())
    }

    /// Every decision, in declaration order
    pub fn all_decisions(&self) -> Vec<&Decision> {
        walker::collect(self.root(), |node| match node {
            DecisionNode::Decision(decision) => Some(decision),
            _ => None,
        })
        .collect()
    }

    pub fn decision(&self, id: &str) -> Option<&Decision> {
        match walker::resolve(self.root(), id) {
            Some(DecisionNode::Decision(decision)) => Some(decision),
            _ => None,
        }
    }

    /// Decisions `id` depends on, directly or indirectly
    pub fn requirements_of(&self, id: &str) -> Vec<&Decision> {
        let index = self.index();
        let Some(start) = index.resolve(id) else {
            return Vec::new();
        };
        index
            .reachable(start)
            .into_iter()
            .filter_map(|node| match node {
                DecisionNode::Decision(decision) => Some(decision),
                _ => None,
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::loan_model;
    use super::*;

    #[test]
    fn test_all_decisions_in_order() {
        let model = loan_model();
        let ids: Vec<&str> = model.all_decisions().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["eligibility", "risk", "history"]);
    }

    #[test]
    fn test_requirements_are_transitive() {
        let model = loan_model();
        let ids: Vec<&str> = model
            .requirements_of("eligibility")
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(ids, vec!["risk", "history"]);
        assert!(model.requirements_of("nope").is_empty());
    }

    #[test]
    fn test_lookup() {
        let model = loan_model();
        assert_eq!(model.decision("risk").map(|d| d.inputs.len()), Some(1));
        assert!(model.decision("loan-approval").is_none());
        assert!(model.index().dangling().is_empty());
    }

    #[test]
    fn test_yaml_shape() {
        let yaml = "id: m\ndecisions:\n  - id: d\n    rules:\n      - when: x\n        then: y\n";
        let model: DecisionModel = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(model.decisions[0].rules[0].then, "y");
        assert!(model.decisions[0].requires.is_empty());
    }
}
