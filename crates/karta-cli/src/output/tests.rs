// Tests for output formatting
//
// Machine formats must stay parseable; human renderings are checked for
// the lines people rely on.

use super::*;
use karta_core::{
    Carrier, OperatorCategory, Representation, ResponseCode, VersionedId,
};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

/// A writer whose contents the test can read back
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn writer(format: OutputFormat) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, false, Box::new(buffer.clone()));
    (writer, buffer)
}

fn findings() -> Answer<()> {
    let subject = VersionedId::mint();
    Answer::rule("Decision Names", false, Severity::Error, "unnamed decision(s): history", Some(&subject))
        .merge(Answer::rule("Rule Coverage", true, Severity::Info, "every decision has rules", Some(&subject)))
}

#[test]
fn test_answer_human_lists_every_explanation() {
    let text = OutputFormat::Human.format_answer(&findings()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "❌ 1 finding(s) at ERROR");
    assert!(lines.iter().any(|l| l.ends_with("Decision Names: unnamed decision(s): history")));
    assert!(lines.iter().any(|l| l.ends_with("Rule Coverage: every decision has rules")));
}

#[test]
fn test_clean_answer_human() {
    let answer = Answer::rule("Unique Identifiers", true, Severity::Error, "3 identifier(s), all unique", None);
    let text = OutputFormat::Human.format_answer(&answer).unwrap();
    assert!(text.starts_with("✅ Valid (OK)"));
}

#[test]
fn test_failed_answer_human() {
    let answer = Answer::<()>::failed(ResponseCode::Unprocessable, "no detector recognised the artifact");
    let text = OutputFormat::Human.format_answer(&answer).unwrap();
    assert!(text.starts_with("💥 Validation could not run"));
    assert!(text.contains("no detector recognised the artifact"));
}

#[test]
fn test_answer_machine_formats_parse_back() {
    let answer = findings();

    let json = OutputFormat::Json.format_answer(&answer).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["explanations"].as_array().map(Vec::len), Some(2));
    assert_eq!(parsed.get("failure"), None);

    let yaml = OutputFormat::Yaml.format_answer(&answer).unwrap();
    let parsed: serde_json::Value = serde_yaml::from_str(&yaml).unwrap();
    let rules: Vec<&str> = parsed["explanations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["rule"].as_str())
        .collect();
    assert!(rules.contains(&"Decision Names"));
    assert!(rules.contains(&"Rule Coverage"));

    let pretty = OutputFormat::JsonPretty.format_answer(&answer).unwrap();
    assert!(pretty.contains("\n  \"explanations\""));
}

#[test]
fn test_summary_human() {
    let carrier = Carrier::encoded(b"kind: note".to_vec()).with_label("note.yaml");
    let text = OutputFormat::Human.format_summary(&carrier.summary()).unwrap();

    assert!(text.contains("Level:          encoded"));
    assert!(text.contains("Label:          note.yaml"));
    assert!(!text.contains("Components"));
    assert!(!text.contains("Derived from"));
}

#[test]
fn test_messages_only_in_human_mode() {
    let (mut human, buffer) = writer(OutputFormat::Human);
    human.info("Lifting").unwrap();
    human.warning("No parser for xml").unwrap();
    assert_eq!(buffer.contents(), "INFO: Lifting\nWARNING: No parser for xml\n");

    let (mut json, buffer) = writer(OutputFormat::Json);
    json.info("Lifting").unwrap();
    json.warning("No parser for xml").unwrap();
    json.data(&serde_json::json!({"level": "abstract"})).unwrap();
    assert_eq!(buffer.contents(), r#"{"level":"abstract"}"#);
}

#[test]
fn test_quiet_suppresses_info() {
    let buffer = SharedBuffer::default();
    let mut quiet = OutputWriter::with_writer(OutputFormat::Human, false, true, Box::new(buffer.clone()));
    quiet.info("Lifting").unwrap();
    quiet.success("done").unwrap();
    quiet.warning("No parser for xml").unwrap();
    assert_eq!(buffer.contents(), "WARNING: No parser for xml\n");
}

#[test]
fn test_operator_table() {
    let descriptors = vec![
        OperatorDescriptor::new("well-formedness", OperatorCategory::Validator)
            .accepting([Representation::any()]),
        OperatorDescriptor::new("decision-model-parser", OperatorCategory::Parser)
            .for_language("decision-model")
            .accepting([Representation::of("decision-model")]),
    ];

    let (mut human, buffer) = writer(OutputFormat::Human);
    human.operators(&descriptors).unwrap();
    let text = buffer.contents();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("CATEGORY"));
    assert!(lines[2].starts_with("validator"));
    assert!(lines[2].contains("│ *"));
    assert!(lines[3].contains("decision-model-parser"));

    let (mut json, buffer) = writer(OutputFormat::Json);
    json.operators(&descriptors).unwrap();
    let parsed: Vec<OperatorDescriptor> = serde_json::from_str(&buffer.contents()).unwrap();
    assert_eq!(parsed, descriptors);
}

#[test]
fn test_no_spinner_for_custom_writers() {
    let (writer, _) = writer(OutputFormat::Human);
    assert!(writer.spinner("working").is_none());
}
