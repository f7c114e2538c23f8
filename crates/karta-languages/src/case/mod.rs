//! Case models
//!
//! A case model has one top-level stage (the case plan) holding nested
//! stages, tasks and sentries, plus the items of the case file. Sentries
//! watch a plan item (`on`) and enable others once it completes. Decision
//! tasks point at a decision of some decision model through `decision_ref`.

pub mod rules;

pub use rules::CaseModelRules;

use crate::document::Document;
use karta_core::walker::{self, ModelIndex, ModelNode};
use serde::{Deserialize, Serialize};

/// Language name and `kind` marker of case models
pub const CASE_MODEL: &str = "case-model";

/// Task types with a defined meaning
pub const TASK_TYPES: [&str; 4] = ["human", "process", "decision", "case"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseModel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub plan: Stage,
    #[serde(default, rename = "caseFile", skip_serializing_if = "Vec::is_empty")]
    pub case_file: Vec<CaseFileItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<Stage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sentries: Vec<Sentry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub task_type: String,
    /// Decision made by a `decision` task
    #[serde(default, rename = "decisionRef", skip_serializing_if = "Option::is_none")]
    pub decision_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
}

impl Task {
    pub fn is_decision(&self) -> bool {
        self.task_type == "decision"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentry {
    pub id: String,
    /// Plan item whose completion fires the sentry
    pub on: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFileItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplicity: Option<String>,
}

impl Document for CaseModel {
    const KIND: &'static str = CASE_MODEL;
}

#[derive(Debug, Clone, Copy)]
pub enum CaseNode<'m> {
    Model(&'m CaseModel),
    Stage(&'m Stage),
    Task(&'m Task),
    Sentry(&'m Sentry),
    FileItem(&'m CaseFileItem),
}

impl<'m> ModelNode<'m> for CaseNode<'m> {
    fn id(&self) -> Option<&'m str> {
        let id = match *self {
            CaseNode::Model(model) => &model.id,
            CaseNode::Stage(stage) => &stage.id,
            CaseNode::Task(task) => &task.id,
            CaseNode::Sentry(sentry) => &sentry.id,
            CaseNode::FileItem(item) => &item.id,
        };
        Some(id.as_str())
    }

    fn children(&self) -> Vec<Self> {
        match *self {
            CaseNode::Model(model) => std::iter::once(CaseNode::Stage(&model.plan))
                .chain(model.case_file.iter().map(CaseNode::FileItem))
                .collect(),
            CaseNode::Stage(stage) => stage
                .stages
                .iter()
                .map(CaseNode::Stage)
                .chain(stage.tasks.iter().map(CaseNode::Task))
                .chain(stage.sentries.iter().map(CaseNode::Sentry))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn references(&self) -> Vec<&'m str> {
        match *self {
            CaseNode::Sentry(sentry) => std::iter::once(sentry.on.as_str())
                .chain(sentry.enables.iter().map(String::as_str))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl CaseModel {
    pub fn root(&self) -> CaseNode<'_> {
        CaseNode::Model(self)
    }

    pub fn index(&self) -> ModelIndex<'_, CaseNode<'_>> {
        ModelIndex::build(self.root())
    }

    pub fn all_tasks(&self) -> Vec<&Task> {
        walker::collect(self.root(), |node| match node {
            CaseNode::Task(task) => Some(task),
            _ => None,
        })
        .collect()
    }

    /// Tasks of type `task_type`, at any depth
    pub fn tasks_by_kind(&self, task_type: &str) -> Vec<&Task> {
        self.all_tasks()
            .into_iter()
            .filter(|task| task.task_type == task_type)
            .collect()
    }

    /// Every stage including the case plan
    pub fn stages(&self) -> Vec<&Stage> {
        walker::collect(self.root(), |node| match node {
            CaseNode::Stage(stage) => Some(stage),
            _ => None,
        })
        .collect()
    }

    /// Decision tasks paired with the decision they reference
    pub fn decision_links(&self) -> Vec<(&Task, Option<&str>)> {
        self.all_tasks()
            .into_iter()
            .filter(|task| task.is_decision())
            .map(|task| (task, task.decision_ref.as_deref()))
            .collect()
    }

    /// Sentries that fire when `item` completes
    pub fn sentries_on(&self, item: &str) -> Vec<&Sentry> {
        walker::collect(self.root(), |node| match node {
            CaseNode::Sentry(sentry) if sentry.on == item => Some(sentry),
            _ => None,
        })
        .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::claims_case;
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a str> {
        tasks.into_iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_tasks_at_any_depth() {
        let case = claims_case();
        assert_eq!(ids(case.all_tasks()), vec!["approve", "collect", "assess"]);
        assert_eq!(ids(case.tasks_by_kind("human")), vec!["approve", "collect"]);
        assert!(case.tasks_by_kind("process").is_empty());
    }

    #[test]
    fn test_decision_links() {
        let case = claims_case();
        let links: Vec<(&str, Option<&str>)> = case
            .decision_links()
            .into_iter()
            .map(|(task, target)| (task.id.as_str(), target))
            .collect();
        assert_eq!(links, vec![("assess", Some("eligibility"))]);
    }

    #[test]
    fn test_sentries_resolve() {
        let case = claims_case();
        let index = case.index();
        assert!(index.dangling().is_empty());
        assert!(index.duplicates().is_empty());
        assert_eq!(case.sentries_on("assess").len(), 1);

        let sentry = index.resolve("assessed").unwrap();
        let followed: Vec<&str> = index.follow(sentry).iter().filter_map(|n| n.id()).collect();
        assert_eq!(followed, vec!["assess", "review"]);
    }

    #[test]
    fn test_json_field_names() {
        let json = r#"{
            "id": "c",
            "plan": {"id": "p", "tasks": [{"id": "t", "type": "decision", "decisionRef": "d"}]},
            "caseFile": [{"id": "f"}]
        }"#;
        let case: CaseModel = serde_json::from_str(json).unwrap();
        assert_eq!(case.plan.tasks[0].decision_ref.as_deref(), Some("d"));
        assert_eq!(case.case_file.len(), 1);
        assert_eq!(case.stages().len(), 1);
    }
}
