//! Consistency rules for decision models

use super::{DecisionModel, DECISION_MODEL};
use karta_core::{
    Answer, Carrier, ModelNode, Operator, OperatorCategory, OperatorDescriptor, Properties,
    Representation, ResponseCode, Severity, Validator, VersionedId,
};

pub const DECISION_NAMES: &str = "Decision Names";
pub const RULE_COVERAGE: &str = "Rule Coverage";
pub const REQUIRED_DECISIONS: &str = "Required Decisions";

/// Checks that decisions are named, have rules and only require decisions
/// that exist
#[derive(Debug, Clone)]
pub struct DecisionModelRules {
    descriptor: OperatorDescriptor,
}

impl DecisionModelRules {
    pub fn new() -> Self {
        Self {
            descriptor: OperatorDescriptor::new("decision-model-rules", OperatorCategory::Validator)
                .for_language(DECISION_MODEL)
                .accepting([Representation::of(DECISION_MODEL)]),
        }
    }
}

impl Default for DecisionModelRules {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator for DecisionModelRules {
    fn descriptor(&self) -> &OperatorDescriptor {
        &self.descriptor
    }
}

impl Validator for DecisionModelRules {
    fn validate(&self, carrier: &Carrier, _config: &Properties) -> Answer<()> {
        let Some(model) = carrier.as_model::<DecisionModel>() else {
            return Answer::failed(
                ResponseCode::Unprocessable,
                format!("{} is not a decision model", carrier.representation()),
            );
        };
        let subject = Some(carrier.asset_id());
        Answer::reduce([
            decision_names(model, subject),
            rule_coverage(model, subject),
            required_decisions(model, subject),
        ])
    }
}

fn decision_names(model: &DecisionModel, subject: Option<&VersionedId>) -> Answer<()> {
    let unnamed: Vec<&str> = model
        .all_decisions()
        .into_iter()
        .filter(|d| d.name.as_deref().map_or(true, |name| name.trim().is_empty()))
        .map(|d| d.id.as_str())
        .collect();
    let detail = if unnamed.is_empty() {
        "every decision has a name".to_string()
    } else {
        format!("unnamed decision(s): {}", unnamed.join(", "))
    };
    Answer::rule(DECISION_NAMES, unnamed.is_empty(), Severity::Error, detail, subject)
}

fn rule_coverage(model: &DecisionModel, subject: Option<&VersionedId>) -> Answer<()> {
    let empty: Vec<&str> = model
        .all_decisions()
        .into_iter()
        .filter(|d| d.rules.is_empty())
        .map(|d| d.id.as_str())
        .collect();
    let detail = if empty.is_empty() {
        "every decision has at least one rule".to_string()
    } else {
        format!("decision(s) without rules: {}", empty.join(", "))
    };
    Answer::rule(RULE_COVERAGE, empty.is_empty(), Severity::Info, detail, subject)
}

fn required_decisions(model: &DecisionModel, subject: Option<&VersionedId>) -> Answer<()> {
    let index = model.index();
    let dangling: Vec<String> = index
        .dangling()
        .into_iter()
        .map(|(node, reference)| format!("{} -> {}", node.id().unwrap_or("?"), reference))
        .collect();
    let detail = if dangling.is_empty() {
        "every required decision exists".to_string()
    } else {
        format!("unknown required decision(s): {}", dangling.join(", "))
    };
    Answer::rule(REQUIRED_DECISIONS, dangling.is_empty(), Severity::Error, detail, subject)
}
