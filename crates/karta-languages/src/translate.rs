//! Decision model to plan definition
//!
//! Every decision becomes an action with the same identifier. A decision
//! that requires another becomes an action related to it with
//! `after-end` timing: it can only start once the required one is done.
//! The plan is a new asset whose identity is derived from the decision
//! model's, so translating the same model twice yields the same asset id.

use crate::decision::{Decision, DecisionModel, DECISION_MODEL};
use crate::plan::{Action, PlanDefinition, RelatedAction, Relationship, PLAN_DEFINITION};
use karta_core::{
    Carrier, Operator, OperatorCategory, OperatorDescriptor, ParsingLevel, Payload, Properties,
    Representation, Step, Translator,
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DecisionToPlan {
    descriptor: OperatorDescriptor,
}

impl DecisionToPlan {
    pub fn new() -> Self {
        Self {
            descriptor: OperatorDescriptor::new("decision-model-to-plan-definition", OperatorCategory::Translator)
                .for_language(DECISION_MODEL)
                .accepting([Representation::of(DECISION_MODEL)])
                .producing([Representation::of(PLAN_DEFINITION)]),
        }
    }

    pub fn plan_for(model: &DecisionModel) -> PlanDefinition {
        PlanDefinition {
            id: model.id.clone(),
            name: model.name.clone(),
            actions: model.all_decisions().into_iter().map(action_for).collect(),
        }
    }
}

impl Default for DecisionToPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator for DecisionToPlan {
    fn descriptor(&self) -> &OperatorDescriptor {
        &self.descriptor
    }
}

impl Translator for DecisionToPlan {
    fn translate(&self, carrier: &Carrier, _target: &Representation, _config: &Properties) -> Step {
        if carrier.level() != ParsingLevel::Abstract {
            return Ok(None);
        }
        let Some(model) = carrier.as_model::<DecisionModel>() else {
            return Ok(None);
        };
        let plan = Self::plan_for(model);
        debug!(decisions = model.decisions.len(), actions = plan.actions.len(), "translated decision model");
        let asset_id = carrier.asset_id().derive(PLAN_DEFINITION);
        Ok(Some(carrier.derive(
            Payload::model(plan),
            Representation::of(PLAN_DEFINITION),
            asset_id,
            &self.descriptor.id,
        )))
    }
}

fn action_for(decision: &Decision) -> Action {
    Action {
        id: decision.id.clone(),
        title: Some(decision.name.clone().unwrap_or_else(|| decision.id.clone())),
        description: (!decision.inputs.is_empty())
            .then(|| format!("Decide from {}", decision.inputs.join(", "))),
        definition: None,
        related: decision
            .requires
            .iter()
            .map(|required| RelatedAction {
                target: required.clone(),
                relationship: Relationship::AfterEnd,
            })
            .collect(),
        actions: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::fixtures::loan_model;
    use karta_core::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decisions_become_actions() {
        let plan = DecisionToPlan::plan_for(&loan_model());
        let eligibility = plan.action("eligibility").unwrap();
        assert_eq!(eligibility.title.as_deref(), Some("Eligibility"));
        assert_eq!(eligibility.description.as_deref(), Some("Decide from age, income"));
        assert_eq!(
            eligibility.related,
            vec![RelatedAction {
                target: "risk".to_string(),
                relationship: Relationship::AfterEnd,
            }]
        );
        let history = plan.action("history").unwrap();
        assert_eq!(history.title.as_deref(), Some("history"));
        assert_eq!(history.description, None);
        assert!(plan.index().dangling().is_empty());
    }

    #[test]
    fn test_translation_mints_derived_asset() {
        let source = Carrier::from_model(loan_model(), Representation::of(DECISION_MODEL));
        let translator = DecisionToPlan::new();
        let target = Representation::of(PLAN_DEFINITION);

        let first = translator
            .translate(&source, &target, &Properties::new())
            .unwrap()
            .unwrap();
        let again = translator
            .translate(&source, &target, &Properties::new())
            .unwrap()
            .unwrap();

        assert_ne!(first.asset_id(), source.asset_id());
        assert_eq!(first.asset_id(), again.asset_id());
        assert_ne!(first.artifact_id(), again.artifact_id());
        let lineage = first.lineage().unwrap();
        assert_eq!(&lineage.source_artifact, source.artifact_id());
        assert_eq!(&lineage.operator, &translator.descriptor().id);
        assert!(first.as_model::<PlanDefinition>().is_some());
    }

    #[test]
    fn test_only_abstract_models() {
        let source = Carrier::serialized("kind: decision-model\nid: m\n", Representation::of(DECISION_MODEL));
        let step: Result<Option<Carrier>, Error> =
            DecisionToPlan::new().translate(&source, &Representation::of(PLAN_DEFINITION), &Properties::new());
        assert!(step.unwrap().is_none());
    }
}
