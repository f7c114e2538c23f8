//! End-to-end tests of the reference languages through the default kernel:
//! detection, lifting and lowering in every surface syntax, validation and
//! translation.


use karta_core::{
    Answer, AttemptOutcome, Carrier, Encoding, Error, Explanation, Format, Outcome, ParsingLevel,
    Properties, Representation, ResponseCode, Severity,
};
use karta_languages::case::rules::{link_decision_models, DECISION_LINKS};
use karta_languages::decision::rules::DECISION_NAMES;
use karta_languages::plan::Relationship;
use karta_languages::wellformed::RESOLVABLE_REFERENCES;
use karta_languages::{
    CaseModel, DecisionModel, Document, PlanDefinition, CASE_MODEL, DECISION_MODEL, PLAN_DEFINITION,
};
use pretty_assertions::assert_eq;
use test_support::*;

fn finding(answer: &Answer<()>, rule: &str) -> Explanation {
    answer
        .explanations()
        .iter()
        .find(|e| e.rule.as_deref() == Some(rule))
        .cloned()
        .unwrap()
}

#[test]
fn test_detects_each_language() {
    let kernel = kernel();
    assert_eq!(
        kernel.detect(LOAN_YAML.as_bytes()),
        Some(DecisionModel::representation(Format::Yaml, Encoding::Identity))
    );
    assert_eq!(
        kernel.detect(LOAN_CASE_JSON.as_bytes()),
        Some(CaseModel::representation(Format::Json, Encoding::Identity))
    );
    assert_eq!(kernel.detect(b"no marker here"), None);
}

#[test]
fn test_lift_keeps_asset_identity() {
    let kernel = kernel();
    let raw = Carrier::encoded(LOAN_YAML.as_bytes().to_vec());
    let lifted = kernel.lift(raw.clone(), ParsingLevel::Abstract).unwrap();

    assert_eq!(lifted.level(), ParsingLevel::Abstract);
    assert_eq!(lifted.asset_id(), raw.asset_id());
    assert_eq!(lifted.representation(), &Representation::of(DECISION_MODEL));

    let model = lifted.as_model::<DecisionModel>().unwrap();
    assert_eq!(model.id, "loan-approval");
    assert_eq!(model.requirements_of("eligibility").len(), 1);
}

#[test]
fn test_lift_stops_at_requested_level() {
    let kernel = kernel();
    let tree = kernel
        .lift(Carrier::encoded(LOAN_CASE_JSON.as_bytes().to_vec()), ParsingLevel::Concrete)
        .unwrap();
    assert_eq!(tree.level(), ParsingLevel::Concrete);
    assert_eq!(tree.as_tree().unwrap()["plan"]["tasks"][1]["decisionRef"], "eligibility");
    assert_eq!(tree.representation().format(), Some(Format::Json));
}

#[test]
fn test_round_trip_through_every_surface() {
    let kernel = kernel();
    let cases: [(&str, Representation); 3] = [
        (LOAN_YAML, DecisionModel::representation(Format::Json, Encoding::Base64)),
        (LOAN_CASE_JSON, CaseModel::representation(Format::Yaml, Encoding::Identity)),
        (ONBOARDING_YAML, PlanDefinition::representation(Format::Yaml, Encoding::Base64)),
    ];

    for (text, surface) in cases {
        let original = lifted(text);
        let lowered = kernel
            .lower_to(original.clone(), ParsingLevel::Encoded, &surface, &Properties::new())
            .unwrap();
        assert_eq!(lowered.representation(), &surface);
        assert_eq!(lowered.asset_id(), original.asset_id());

        let bytes = lowered.as_bytes().unwrap().to_vec();
        assert_eq!(kernel.detect(&bytes), Some(surface.clone()));
        let again = kernel
            .lift(Carrier::encoded(bytes), ParsingLevel::Abstract)
            .unwrap();
        assert_eq!(again.payload(), original.payload());
    }
}

#[test]
fn test_lowering_defaults_to_json() {
    let kernel = kernel();
    let text = kernel
        .lower(lifted(ONBOARDING_YAML), ParsingLevel::Serialized)
        .unwrap();
    assert_eq!(text.representation().format(), Some(Format::Json));
    assert!(text.as_text().unwrap().trim_start().starts_with('{'));

    let compact = Properties::new().with("pretty", "false");
    let hint = Representation::of(PLAN_DEFINITION);
    let text = kernel
        .lower_to(lifted(ONBOARDING_YAML), ParsingLevel::Serialized, &hint, &compact)
        .unwrap();
    assert!(!text.as_text().unwrap().contains('\n'));
}

#[test]
fn test_malformed_document_reports_the_attempt() {
    let bad = "kind: decision-model\nid: m\ndecisions: 12\n";
    let result = kernel().lift(Carrier::encoded(bad.as_bytes().to_vec()), ParsingLevel::Abstract);
    match result {
        Err(Error::NoTransformation { attempts, .. }) => {
            assert_eq!(attempts.len(), 1);
            assert_eq!(attempts[0].name, "decision-model-parser");
            assert!(matches!(
                &attempts[0].outcome,
                AttemptOutcome::Failed(reason) if reason.contains("does not describe a decision-model")
            ));
        }
        other => panic!("expected NoTransformation, got {:?}", other.map(|c| c.summary())),
    }
}

#[test]
fn test_xml_is_recognised_but_not_lifted() {
    let kernel = kernel();
    let detected = kernel.detect(DMN_XML.as_bytes()).unwrap();
    assert_eq!(detected.language().map(|l| l.as_str()), Some(DECISION_MODEL));
    assert_eq!(detected.profile().map(|p| p.as_str()), Some("dmn-1.2"));

    // the decision model parser is asked, and declines XML surface syntax
    let result = kernel.lift(Carrier::encoded(DMN_XML.as_bytes().to_vec()), ParsingLevel::Abstract);
    match result {
        Err(Error::NoTransformation { attempts, .. }) => {
            assert_eq!(attempts.len(), 1);
            assert_eq!(attempts[0].name, "decision-model-parser");
            assert_eq!(attempts[0].outcome, AttemptOutcome::NotApplicable);
        }
        other => panic!("expected NoTransformation, got {:?}", other.map(|c| c.summary())),
    }
}

#[test]
fn test_annotated_documents_lift_and_lower() {
    let kernel = kernel();
    let tagged = [
        DecisionModel::representation(Format::Yaml, Encoding::Identity).with_lexicon("snomed"),
        DecisionModel::representation(Format::Yaml, Encoding::Identity).with_profile("simple"),
    ];

    for representation in tagged {
        let carrier = Carrier::encoded(LOAN_YAML.as_bytes().to_vec()).with_representation(representation.clone());
        let lifted = kernel.lift(carrier, ParsingLevel::Abstract).unwrap();
        assert_eq!(lifted.representation(), &representation.at_abstract_level());
        assert_eq!(lifted.as_model::<DecisionModel>().map(|m| m.id.as_str()), Some("loan-approval"));

        let surface = Representation::of(DECISION_MODEL).with_format(Format::Json);
        let lowered = kernel
            .lower_to(lifted, ParsingLevel::Encoded, &surface, &Properties::new())
            .unwrap();
        assert_eq!(lowered.representation().lexicons(), representation.lexicons());
        assert_eq!(lowered.representation().profile(), representation.profile());
        assert_eq!(lowered.representation().format(), Some(Format::Json));
    }
}

#[test]
fn test_validate_annotated_document() {
    let carrier = Carrier::encoded(LOAN_YAML.as_bytes().to_vec())
        .with_representation(DecisionModel::representation(Format::Yaml, Encoding::Identity).with_lexicon("snomed"));
    let answer = kernel().validate(&carrier, &Properties::new());
    assert_eq!(answer.outcome(), Outcome::Success);
    assert_eq!(answer.severity(), Severity::Ok);
    assert_eq!(answer.explanations().len(), 5);
}

#[test]
fn test_unrecognised_input_is_unsupported() {
    let result = kernel().lift(Carrier::encoded(b"plain words".to_vec()), ParsingLevel::Concrete);
    match result {
        Err(e) => assert_eq!(e.response_code(), ResponseCode::UnsupportedRepresentation),
        Ok(carrier) => panic!("lifted unrecognised input to {}", carrier.representation()),
    }
}

#[test]
fn test_validate_clean_decision_model() {
    let answer = kernel().validate(&lifted(LOAN_YAML), &Properties::new());
    assert_eq!(answer.outcome(), Outcome::Success);
    assert_eq!(answer.severity(), Severity::Ok);
    // two well-formedness rules and three decision rules
    assert_eq!(answer.explanations().len(), 5);
}

#[test]
fn test_validate_reports_rule_findings() {
    let text = LOAN_YAML.replace("    name: Risk\n", "").replace("[risk]", "[risk, credit]");
    let answer = kernel().validate(&lifted(&text), &Properties::new());

    assert!(answer.is_success());
    assert_eq!(answer.severity(), Severity::Error);
    let failing: Vec<&str> = answer
        .explanations()
        .iter()
        .filter(|e| e.severity == Severity::Error)
        .filter_map(|e| e.rule.as_deref())
        .collect();
    assert!(failing.contains(&DECISION_NAMES));
    assert!(failing.contains(&RESOLVABLE_REFERENCES));
}

#[test]
fn test_validate_unreadable_artifact_is_fatal() {
    let carrier = Carrier::encoded(b"\x00\x01 not a document".to_vec());
    let answer = kernel().validate(&carrier, &Properties::new());
    assert_eq!(answer.outcome(), Outcome::Failure);
    assert_eq!(answer.failure().map(|f| f.code), Some(ResponseCode::Unprocessable));
    assert_eq!(answer.severity(), Severity::Fatal);
    assert_eq!(answer.explanations()[0].subject.as_ref(), Some(carrier.asset_id()));
}

#[test]
fn test_unreadable_document_fails_once() {
    // both the concrete and the abstract validators need a readable document
    let carrier = Carrier::encoded(b"{ not: [valid".to_vec())
        .with_representation(DecisionModel::representation(Format::Yaml, Encoding::Identity));
    let answer = kernel().validate(&carrier, &Properties::new());
    assert_eq!(answer.outcome(), Outcome::Failure);
    assert_eq!(answer.explanations().len(), 1);
    assert_eq!(answer.explanations()[0].severity, Severity::Fatal);
}

#[test]
fn test_case_links_resolve_against_attached_decisions() {
    let kernel = kernel();
    let case = lifted(LOAN_CASE_JSON);

    let alone = kernel.validate(&case, &Properties::new());
    assert_eq!(alone.severity(), Severity::Info);

    let linked = case.with_component(lifted(LOAN_YAML));
    let answer = kernel.validate(&linked, &Properties::new());
    assert_eq!(answer.severity(), Severity::Ok);

    // attached documents are lifted alongside the case
    let raw = lifted(LOAN_CASE_JSON).with_component(Carrier::encoded(LOAN_YAML.as_bytes().to_vec()));
    let answer = kernel.validate(&raw, &Properties::new());
    assert_eq!(answer.severity(), Severity::Ok);
    assert_eq!(finding(&answer, DECISION_LINKS).severity, Severity::Ok);
}

#[test]
fn test_linked_files_check_decision_references() {
    let kernel = kernel();
    let files = |case: &str| -> Vec<Carrier> {
        let carriers = [case, LOAN_YAML]
            .iter()
            .map(|text| {
                let raw = Carrier::encoded(text.as_bytes().to_vec());
                let detected = kernel.detect_carrier(&raw).unwrap();
                raw.with_representation(detected)
            })
            .collect();
        link_decision_models(carriers)
    };

    let answer = kernel.validate_composite(&files(LOAN_CASE_JSON), &Properties::new());
    assert!(answer.is_success());
    assert_eq!(answer.severity(), Severity::Ok);
    assert_eq!(finding(&answer, DECISION_LINKS).detail, "1 decision task(s) resolved");

    let dangling = LOAN_CASE_JSON.replace("\"decisionRef\": \"eligibility\"", "\"decisionRef\": \"pricing\"");
    let answer = kernel.validate_composite(&files(dangling.as_str()), &Properties::new());
    assert!(answer.is_success());
    assert_eq!(answer.severity(), Severity::Error);
    let links = finding(&answer, DECISION_LINKS);
    assert_eq!(links.severity, Severity::Error);
    assert_eq!(links.detail, "unknown decision(s): assess -> pricing");
}

#[test]
fn test_composite_validation_merges_components() {
    let kernel = kernel();
    let components = vec![lifted(LOAN_CASE_JSON), lifted(LOAN_YAML)];
    let answer = kernel.validate_composite(&components, &Properties::new());
    assert!(answer.is_success());
    assert_eq!(answer.explanations().len(), 9);
    assert_eq!(answer.severity(), Severity::Info);

    let mut reversed = components;
    reversed.reverse();
    assert_eq!(kernel.validate_composite(&reversed, &Properties::new()), answer);

    reversed.push(Carrier::encoded(b"???".to_vec()));
    let broken = kernel.validate_composite(&reversed, &Properties::new());
    assert_eq!(broken.outcome(), Outcome::Failure);
    assert_eq!(broken.severity(), Severity::Fatal);
}

#[test]
fn test_translate_decisions_into_plan() {
    let kernel = kernel();
    let source = lifted(LOAN_YAML);
    let plan = kernel
        .translate(source.clone(), &Representation::of(PLAN_DEFINITION), &Properties::new())
        .unwrap();

    assert_eq!(plan.level(), ParsingLevel::Abstract);
    assert_eq!(plan.asset_id(), &source.asset_id().derive(PLAN_DEFINITION));
    assert_eq!(&plan.lineage().unwrap().source_artifact, source.artifact_id());

    let model = plan.as_model::<PlanDefinition>().unwrap();
    let eligibility = model.action("eligibility").unwrap();
    assert_eq!(eligibility.related[0].relationship, Relationship::AfterEnd);

    let hint = PlanDefinition::representation(Format::Yaml, Encoding::Identity).without_encoding();
    let text = kernel
        .lower_to(plan.clone(), ParsingLevel::Serialized, &hint, &Properties::new())
        .unwrap();
    let yaml = text.as_text().unwrap();
    assert!(yaml.contains("kind: plan-definition"));
    assert!(yaml.contains("relationship: after-end"));

    let answer = kernel.validate(&plan, &Properties::new());
    assert_eq!(answer.severity(), Severity::Ok);
}

#[test]
fn test_translation_ignores_target_surface() {
    let target = Representation::of(PLAN_DEFINITION).with_format(Format::Json);
    let plan = kernel()
        .translate(lifted(LOAN_YAML), &target, &Properties::new())
        .unwrap();
    assert_eq!(plan.representation(), &Representation::of(PLAN_DEFINITION));
    assert_eq!(plan.as_model::<PlanDefinition>().map(|p| p.actions.len()), Some(2));
}

#[test]
fn test_no_translation_out_of_case_models() {
    let result = kernel().translate(
        lifted(LOAN_CASE_JSON),
        &Representation::of(PLAN_DEFINITION),
        &Properties::new(),
    );
    match result {
        Err(Error::UnsupportedRepresentation { offered, .. }) => {
            assert_eq!(offered.language().map(|l| l.as_str()), Some(CASE_MODEL))
        }
        other => panic!("expected UnsupportedRepresentation, got {:?}", other.map(|c| c.summary())),
    }
}
