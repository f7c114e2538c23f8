//! Consistency rules for case models
//!
//! Decision links are checked against the decision models attached to the
//! case carrier as components. The kernel lifts components alongside the
//! case, so attached files may be in any surface syntax; components in other
//! languages are ignored.

use super::{CaseModel, CASE_MODEL, TASK_TYPES};
use crate::decision::{DecisionModel, DECISION_MODEL};
use karta_core::{
    Answer, Carrier, Operator, OperatorCategory, OperatorDescriptor, Properties, Representation,
    ResponseCode, Severity, Validator, VersionedId,
};

pub const TASK_TYPES_RULE: &str = "Task Types";
pub const DECISION_LINKS: &str = "Decision Links";

#[derive(Debug, Clone)]
pub struct CaseModelRules {
    descriptor: OperatorDescriptor,
}

impl CaseModelRules {
    pub fn new() -> Self {
        Self {
            descriptor: OperatorDescriptor::new("case-model-rules", OperatorCategory::Validator)
                .for_language(CASE_MODEL)
                .accepting([Representation::of(CASE_MODEL)]),
        }
    }
}

impl Default for CaseModelRules {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator for CaseModelRules {
    fn descriptor(&self) -> &OperatorDescriptor {
        &self.descriptor
    }
}

impl Validator for CaseModelRules {
    fn validate(&self, carrier: &Carrier, _config: &Properties) -> Answer<()> {
        let Some(case) = carrier.as_model::<CaseModel>() else {
            return Answer::failed(
                ResponseCode::Unprocessable,
                format!("{} is not a case model", carrier.representation()),
            );
        };
        let decisions: Vec<&DecisionModel> = carrier
            .components()
            .iter()
            .filter_map(|component| component.as_model::<DecisionModel>())
            .collect();
        let subject = Some(carrier.asset_id());
        task_types(case, subject).merge(decision_links(case, &decisions, subject))
    }
}

/// Attach every decision model among `carriers` to every case model among
/// them, so a set of files is checked as one linked artifact
///
/// Carriers must already carry their language, usually from detection.
pub fn link_decision_models(carriers: Vec<Carrier>) -> Vec<Carrier> {
    let decisions: Vec<Carrier> = carriers
        .iter()
        .filter(|carrier| has_language(carrier, DECISION_MODEL))
        .cloned()
        .collect();
    if decisions.is_empty() {
        return carriers;
    }
    carriers
        .into_iter()
        .map(|carrier| {
            if has_language(&carrier, CASE_MODEL) {
                carrier.with_components(decisions.iter().cloned())
            } else {
                carrier
            }
        })
        .collect()
}

fn has_language(carrier: &Carrier, language: &str) -> bool {
    carrier
        .representation()
        .language()
        .is_some_and(|found| found.as_str() == language)
}

fn task_types(case: &CaseModel, subject: Option<&VersionedId>) -> Answer<()> {
    let unknown: Vec<String> = case
        .all_tasks()
        .into_iter()
        .filter(|task| !TASK_TYPES.contains(&task.task_type.as_str()))
        .map(|task| format!("{} ({})", task.id, task.task_type))
        .collect();
    let detail = if unknown.is_empty() {
        "every task has a known type".to_string()
    } else {
        format!("task(s) of unknown type: {}", unknown.join(", "))
    };
    Answer::rule(TASK_TYPES_RULE, unknown.is_empty(), Severity::Error, detail, subject)
}

fn decision_links(case: &CaseModel, models: &[&DecisionModel], subject: Option<&VersionedId>) -> Answer<()> {
    let links = case.decision_links();
    let unlinked: Vec<&str> = links
        .iter()
        .filter(|(_, target)| target.is_none())
        .map(|(task, _)| task.id.as_str())
        .collect();
    if !unlinked.is_empty() {
        return Answer::rule(
            DECISION_LINKS,
            false,
            Severity::Error,
            format!("decision task(s) without a decision: {}", unlinked.join(", ")),
            subject,
        );
    }
    if links.is_empty() {
        return Answer::rule(DECISION_LINKS, true, Severity::Ok, "no decision tasks", subject);
    }
    if models.is_empty() {
        return Answer::rule(
            DECISION_LINKS,
            false,
            Severity::Info,
            "decision references not checked, no decision model attached",
            subject,
        );
    }

    let unresolved: Vec<String> = links
        .iter()
        .filter_map(|(task, target)| target.map(|target| (task, target)))
        .filter(|(_, target)| models.iter().all(|model| model.decision(target).is_none()))
        .map(|(task, target)| format!("{} -> {}", task.id, target))
        .collect();
    let detail = if unresolved.is_empty() {
        format!("{} decision task(s) resolved", links.len())
    } else {
        format!("unknown decision(s): {}", unresolved.join(", "))
    };
    Answer::rule(DECISION_LINKS, unresolved.is_empty(), Severity::Error, detail, subject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::fixtures::{claims_case, task};
    use crate::decision::fixtures::loan_model;
    use karta_core::Explanation;
    use pretty_assertions::assert_eq;

    fn carrier(case: CaseModel) -> Carrier {
        Carrier::from_model(case, Representation::of(CASE_MODEL))
    }

    fn finding(answer: &Answer<()>, rule: &str) -> Explanation {
        answer
            .explanations()
            .iter()
            .find(|e| e.rule.as_deref() == Some(rule))
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_unchecked_links_are_informational() {
        let answer = CaseModelRules::new().validate(&carrier(claims_case()), &Properties::new());
        assert!(answer.is_success());
        assert_eq!(finding(&answer, TASK_TYPES_RULE).severity, Severity::Ok);
        assert_eq!(finding(&answer, DECISION_LINKS).severity, Severity::Info);
        assert_eq!(answer.severity(), Severity::Info);
    }

    #[test]
    fn test_links_checked_against_components() {
        let decisions = Carrier::from_model(loan_model(), Representation::of(DECISION_MODEL));
        let resolved = carrier(claims_case()).with_component(decisions.clone());
        let answer = CaseModelRules::new().validate(&resolved, &Properties::new());
        assert_eq!(finding(&answer, DECISION_LINKS).severity, Severity::Ok);

        let mut case = claims_case();
        case.plan.tasks.push(task("price", "decision", Some("pricing")));
        let broken = carrier(case).with_component(decisions);
        let answer = CaseModelRules::new().validate(&broken, &Properties::new());
        let links = finding(&answer, DECISION_LINKS);
        assert_eq!(links.severity, Severity::Error);
        assert_eq!(links.detail, "unknown decision(s): price -> pricing");
    }

    #[test]
    fn test_unknown_type_and_missing_reference() {
        let mut case = claims_case();
        case.plan.tasks.push(task("notify", "email", None));
        case.plan.tasks.push(task("decide", "decision", None));
        let answer = CaseModelRules::new().validate(&carrier(case), &Properties::new());

        let types = finding(&answer, TASK_TYPES_RULE);
        assert_eq!(types.severity, Severity::Error);
        assert_eq!(types.detail, "task(s) of unknown type: notify (email)");

        let links = finding(&answer, DECISION_LINKS);
        assert_eq!(links.severity, Severity::Error);
        assert_eq!(links.detail, "decision task(s) without a decision: decide");
    }

    #[test]
    fn test_link_decision_models() {
        let decisions = Carrier::from_model(loan_model(), Representation::of(DECISION_MODEL));
        let case = carrier(claims_case());
        let unknown = Carrier::encoded(b"notes".to_vec());

        let linked = link_decision_models(vec![case, decisions.clone(), unknown]);
        assert_eq!(linked[0].components().len(), 1);
        assert_eq!(linked[0].components()[0].asset_id(), decisions.asset_id());
        assert!(linked[1].components().is_empty());
        assert!(linked[2].components().is_empty());

        let alone = link_decision_models(vec![carrier(claims_case())]);
        assert!(alone[0].components().is_empty());
    }
}
