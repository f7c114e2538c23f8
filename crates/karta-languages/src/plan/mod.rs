//! Plan definitions
//!
//! A plan definition is a tree of actions. Actions may point at a definition
//! elsewhere in the plan (`definition`) and order themselves relative to
//! other actions through related-action entries.

use crate::document::Document;
use karta_core::walker::{self, ModelIndex, ModelNode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Language name and `kind` marker of plan definitions
pub const PLAN_DEFINITION: &str = "plan-definition";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Another element of the plan describing how to carry the action out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedAction {
    pub target: String,
    pub relationship: Relationship,
}

/// Timing of an action relative to a related one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    BeforeStart,
    Before,
    BeforeEnd,
    Concurrent,
    After,
    AfterStart,
    AfterEnd,
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Relationship::BeforeStart => "before-start",
            Relationship::Before => "before",
            Relationship::BeforeEnd => "before-end",
            Relationship::Concurrent => "concurrent",
            Relationship::After => "after",
            Relationship::AfterStart => "after-start",
            Relationship::AfterEnd => "after-end",
        };
        write!(f, "{}", name)
    }
}

impl Document for PlanDefinition {
    const KIND: &'static str = PLAN_DEFINITION;
}

#[derive(Debug, Clone, Copy)]
pub enum PlanNode<'m> {
    Plan(&'m PlanDefinition),
    Action(&'m Action),
}

impl<'m> ModelNode<'m> for PlanNode<'m> {
    fn id(&self) -> Option<&'m str> {
        match *self {
            PlanNode::Plan(plan) => Some(plan.id.as_str()),
            PlanNode::Action(action) => Some(action.id.as_str()),
        }
    }

    fn children(&self) -> Vec<Self> {
        match *self {
            PlanNode::Plan(plan) => plan.actions.iter().map(PlanNode::Action).collect(),
            PlanNode::Action(action) => action.actions.iter().map(PlanNode::Action).collect(),
        }
    }

    fn references(&self) -> Vec<&'m str> {
        match *self {
            PlanNode::Action(action) => action
                .related
                .iter()
                .map(|related| related.target.as_str())
                .chain(action.definition.as_deref())
                .collect(),
            PlanNode::Plan(_) => Vec::new(),
        }
    }
}

impl PlanDefinition {
    pub fn root(&self) -> PlanNode<'_> {
        PlanNode::Plan(self)
    }

    pub fn index(&self) -> ModelIndex<'_, PlanNode<'_>> {
        ModelIndex::build(self.root())
    }

    /// Every action at any depth, parents before their children
    pub fn nested_actions(&self) -> Vec<&Action> {
        walker::collect(self.root(), |node| match node {
            PlanNode::Action(action) => Some(action),
            PlanNode::Plan(_) => None,
        })
        .collect()
    }

    pub fn action(&self, id: &str) -> Option<&Action> {
        match walker::resolve(self.root(), id) {
            Some(PlanNode::Action(action)) => Some(action),
            _ => None,
        }
    }

    /// Actions `id` must wait for, directly or through other actions
    pub fn prerequisites_of(&self, id: &str) -> Vec<&Action> {
        let index = self.index();
        let Some(start) = index.resolve(id) else {
            return Vec::new();
        };
        index
            .reachable(start)
            .into_iter()
            .filter_map(|node| match node {
                PlanNode::Action(action) => Some(action),
                PlanNode::Plan(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PLAN: &str = r#"
id: onboarding
actions:
  - id: register
    title: Register
    actions:
      - id: verify
        related:
          - target: register-form
            relationship: after-end
  - id: register-form
    definition: verify
"#;

    #[test]
    fn test_nested_actions() {
        let plan: PlanDefinition = serde_yaml::from_str(PLAN).unwrap();
        let ids: Vec<&str> = plan.nested_actions().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["register", "verify", "register-form"]);
        assert_eq!(plan.action("verify").unwrap().related[0].relationship, Relationship::AfterEnd);
    }

    #[test]
    fn test_prerequisites_follow_cycles_once() {
        let plan: PlanDefinition = serde_yaml::from_str(PLAN).unwrap();
        let ids: Vec<&str> = plan.prerequisites_of("verify").iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["register-form"]);
        assert!(plan.index().dangling().is_empty());
    }

    #[test]
    fn test_relationship_names() {
        assert_eq!(Relationship::BeforeStart.to_string(), "before-start");
        assert_eq!(
            serde_json::to_string(&Relationship::AfterEnd).unwrap(),
            "\"after-end\""
        );
    }
}
