//! Language-agnostic well-formedness checks on concrete trees
//!
//! Any object with a string `id` declares an identifier; any string (or list
//! of strings) under a reference key refers to one. Findings name the JSON
//! path where the problem sits, e.g. `$.plan.tasks[1].id`.
//!
//! Properties:
//! - `id_key`: field holding identifiers (default `id`)
//! - `reference_keys`: `|`-separated reference fields (default
//!   `requires|on|enables|target|definition`)

use karta_core::{
    Answer, Carrier, Operator, OperatorCategory, OperatorDescriptor, ParsingLevel, Properties,
    Representation, ResponseCode, Severity, Validator, VersionedId,
};
use serde_json::Value;
use std::collections::HashMap;

pub const UNIQUE_IDENTIFIERS: &str = "Unique Identifiers";
pub const RESOLVABLE_REFERENCES: &str = "Resolvable References";

pub const ID_KEY_PROPERTY: &str = "id_key";
pub const REFERENCE_KEYS_PROPERTY: &str = "reference_keys";

const DEFAULT_REFERENCE_KEYS: [&str; 5] = ["requires", "on", "enables", "target", "definition"];

#[derive(Debug, Clone)]
pub struct WellFormedness {
    descriptor: OperatorDescriptor,
}

impl WellFormedness {
    pub fn new() -> Self {
        Self {
            descriptor: OperatorDescriptor::new("well-formedness", OperatorCategory::Validator)
                .accepting([Representation::any()]),
        }
    }
}

impl Default for WellFormedness {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator for WellFormedness {
    fn descriptor(&self) -> &OperatorDescriptor {
        &self.descriptor
    }
}

impl Validator for WellFormedness {
    fn consumes(&self) -> ParsingLevel {
        ParsingLevel::Concrete
    }

    fn validate(&self, carrier: &Carrier, config: &Properties) -> Answer<()> {
        let Some(tree) = carrier.as_tree() else {
            return Answer::failed(
                ResponseCode::Unprocessable,
                format!("expected a concrete tree, got a {} carrier", carrier.level()),
            );
        };
        let reference_keys = config.get_list(REFERENCE_KEYS_PROPERTY).unwrap_or_else(|| {
            DEFAULT_REFERENCE_KEYS.iter().map(|key| key.to_string()).collect()
        });
        let mut scan = Scan {
            id_key: config.get_or(ID_KEY_PROPERTY, "id"),
            reference_keys: &reference_keys,
            declared: HashMap::new(),
            duplicates: Vec::new(),
            references: Vec::new(),
        };
        scan.visit(tree, &PathContext::root());

        let subject = Some(carrier.asset_id());
        unique_identifiers(&scan, subject).merge(resolvable_references(&scan, subject))
    }
}

/// JSON path of the value being visited
#[derive(Debug, Clone)]
struct PathContext {
    path: String,
}

impl PathContext {
    fn root() -> Self {
        Self {
            path: "$".to_string(),
        }
    }

    fn child(&self, segment: &str) -> Self {
        Self {
            path: format!("{}.{}", self.path, segment),
        }
    }

    fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
        }
    }
}

struct Scan<'t> {
    id_key: &'t str,
    reference_keys: &'t [String],
    /// identifier -> path of its first declaration
    declared: HashMap<&'t str, String>,
    duplicates: Vec<(&'t str, String)>,
    references: Vec<(&'t str, String)>,
}

impl<'t> Scan<'t> {
    fn visit(&mut self, value: &'t Value, context: &PathContext) {
        match value {
            Value::Object(fields) => {
                if let Some(Value::String(id)) = fields.get(self.id_key) {
                    let at = context.child(self.id_key).path;
                    if self.declared.contains_key(id.as_str()) {
                        self.duplicates.push((id.as_str(), at));
                    } else {
                        self.declared.insert(id.as_str(), at);
                    }
                }
                for (key, field) in fields {
                    let child = context.child(key);
                    if self.reference_keys.iter().any(|k| k == key) {
                        self.reference(field, &child);
                    }
                    self.visit(field, &child);
                }
            }
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.visit(item, &context.child_index(index));
                }
            }
            _ => {}
        }
    }

    fn reference(&mut self, value: &'t Value, context: &PathContext) {
        match value {
            Value::String(target) => self.references.push((target.as_str(), context.path.clone())),
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    if let Value::String(target) = item {
                        self.references
                            .push((target.as_str(), context.child_index(index).path));
                    }
                }
            }
            _ => {}
        }
    }
}

fn unique_identifiers(scan: &Scan<'_>, subject: Option<&VersionedId>) -> Answer<()> {
    let detail = if scan.duplicates.is_empty() {
        format!("{} identifier(s), all unique", scan.declared.len())
    } else {
        let listed: Vec<String> = scan
            .duplicates
            .iter()
            .map(|(id, path)| format!("'{}' at {}", id, path))
            .collect();
        format!("duplicate identifier(s): {}", listed.join(", "))
    };
    Answer::rule(UNIQUE_IDENTIFIERS, scan.duplicates.is_empty(), Severity::Error, detail, subject)
}

fn resolvable_references(scan: &Scan<'_>, subject: Option<&VersionedId>) -> Answer<()> {
    let unresolved: Vec<String> = scan
        .references
        .iter()
        .filter(|(target, _)| !scan.declared.contains_key(target))
        .map(|(target, path)| format!("'{}' at {}", target, path))
        .collect();
    let detail = if unresolved.is_empty() {
        format!("{} reference(s), all resolved", scan.references.len())
    } else {
        format!("unresolved reference(s): {}", unresolved.join(", "))
    };
    Answer::rule(RESOLVABLE_REFERENCES, unresolved.is_empty(), Severity::Error, detail, subject)
}
