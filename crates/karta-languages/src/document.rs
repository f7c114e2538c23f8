//! Shared plumbing for the JSON/YAML surface syntaxes
//!
//! Every reference language is a serde model whose documents carry a
//! top-level `kind` marker naming the language. The helpers here read and
//! write that marker and sniff format and transport encoding from raw input.
//!
//! Copyright (c) 2025 Karta Team
//! Licensed under the Apache-2.0 license

use base64::{engine::general_purpose, Engine as _};
use karta_core::{
    Charset, Encoding, Error, Format, KnowledgeModel, Language, Representation, Result,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the field holding the language marker
pub const KIND_FIELD: &str = "kind";

/// A model with a JSON/YAML surface syntax
pub trait Document: Serialize + DeserializeOwned + KnowledgeModel + Clone {
    /// Value of the `kind` marker, also used as the language name
    const KIND: &'static str;

    fn language() -> Language {
        Language::new(Self::KIND)
    }

    /// Name of the serialization in `format`, e.g. `decision-model+json`
    fn serialization(format: Format) -> String {
        format!("{}+{}", Self::KIND, format)
    }

    /// The descriptor of a UTF-8 document in `format` and `encoding`
    fn representation(format: Format, encoding: Encoding) -> Representation {
        Representation::of(Self::KIND)
            .with_serialization(Self::serialization(format))
            .with_format(format)
            .with_charset(Charset::utf_8())
            .with_encoding(encoding)
    }
}

/// A document together with its `kind` marker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tagged<M> {
    pub kind: String,
    #[serde(flatten)]
    pub model: M,
}

impl<M: Document> Tagged<M> {
    pub fn new(model: M) -> Self {
        Self {
            kind: M::KIND.to_string(),
            model,
        }
    }

    /// The model, provided the marker names `M`'s language
    pub fn into_model(self) -> Result<M> {
        if self.kind != M::KIND {
            return Err(Error::malformed(
                format!("expected a '{}' document, found '{}'", M::KIND, self.kind),
                Some(&M::language()),
            ));
        }
        Ok(self.model)
    }
}

/// The surface formats the reference parsers understand
pub fn is_document_format(format: Format) -> bool {
    matches!(format, Format::Json | Format::Yaml)
}

/// Guess JSON or YAML from the first significant character
pub fn sniff_format(text: &str) -> Format {
    match text.trim_start().chars().next() {
        Some('{') | Some('[') => Format::Json,
        _ => Format::Yaml,
    }
}

/// Parse text into a tree
pub fn read_tree(text: &str, format: Format, language: &Language) -> Result<Value> {
    match format {
        Format::Json => serde_json::from_str(text)
            .map_err(|e| Error::malformed_because("invalid JSON document", Some(language), e)),
        Format::Yaml => serde_yaml::from_str(text)
            .map_err(|e| Error::malformed_because("invalid YAML document", Some(language), e)),
        other => Err(Error::malformed(
            format!("{} is not a document format", other),
            Some(language),
        )),
    }
}

/// Parse text straight into a model, skipping the intermediate tree
pub fn read_model<M: Document>(text: &str, format: Format) -> Result<M> {
    let tagged: Tagged<M> = match format {
        Format::Json => serde_json::from_str(text)
            .map_err(|e| Error::malformed_because("invalid JSON document", Some(&M::language()), e))?,
        Format::Yaml => serde_yaml::from_str(text)
            .map_err(|e| Error::malformed_because("invalid YAML document", Some(&M::language()), e))?,
        other => {
            return Err(Error::malformed(
                format!("{} is not a document format", other),
                Some(&M::language()),
            ))
        }
    };
    tagged.into_model()
}

/// Render a tree as text
pub fn write_tree(tree: &Value, format: Format, pretty: bool) -> Result<String> {
    match format {
        Format::Json if pretty => Ok(serde_json::to_string_pretty(tree)?),
        Format::Json => Ok(serde_json::to_string(tree)?),
        Format::Yaml => Ok(serde_yaml::to_string(tree)?),
        other => Err(Error::configuration(
            format!("cannot write {} documents", other),
            Some("format"),
        )),
    }
}

/// The `kind` marker of a tree, if it has one
pub fn kind_of(tree: &Value) -> Option<&str> {
    tree.get(KIND_FIELD).and_then(Value::as_str)
}

/// Fail unless the tree is a `M` document
pub fn check_kind<M: Document>(tree: &Value) -> Result<()> {
    match kind_of(tree) {
        Some(kind) if kind == M::KIND => Ok(()),
        Some(kind) => Err(Error::malformed(
            format!("expected a '{}' document, found '{}'", M::KIND, kind),
            Some(&M::language()),
        )),
        None => Err(Error::malformed(
            format!("document has no '{}' marker", KIND_FIELD),
            Some(&M::language()),
        )),
    }
}

/// Undo a Base64 transport encoding
pub fn decode_base64(bytes: &[u8]) -> Result<Vec<u8>> {
    let trimmed: Vec<u8> = bytes
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    general_purpose::STANDARD
        .decode(trimmed)
        .map_err(|e| Error::malformed_because("invalid Base64 payload", None, e))
}

pub fn encode_base64(text: &str) -> Vec<u8> {
    general_purpose::STANDARD.encode(text.as_bytes()).into_bytes()
}

/// What sniffing raw input revealed
#[derive(Debug, Clone, PartialEq)]
pub struct Sniffed {
    pub kind: String,
    pub format: Format,
    pub encoding: Encoding,
}

/// Look for a JSON or YAML document with a `kind` marker, trying the bytes
/// as they are first and as Base64 second
pub fn sniff(bytes: &[u8]) -> Option<Sniffed> {
    if let Some((kind, format)) = std::str::from_utf8(bytes).ok().and_then(sniff_text) {
        return Some(Sniffed {
            kind,
            format,
            encoding: Encoding::Identity,
        });
    }
    let decoded = decode_base64(bytes).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    sniff_text(&text).map(|(kind, format)| Sniffed {
        kind,
        format,
        encoding: Encoding::Base64,
    })
}

/// The `kind` marker and format of a text document
pub fn sniff_text(text: &str) -> Option<(String, Format)> {
    let format = sniff_format(text);
    let tree: Value = match format {
        Format::Json => serde_json::from_str(text).ok()?,
        _ => serde_yaml::from_str(text).ok()?,
    };
    kind_of(&tree).map(|kind| (kind.to_string(), format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sniff_plain_and_base64() {
        let json = r#"{"kind": "decision-model", "id": "m"}"#;
        assert_eq!(
            sniff(json.as_bytes()),
            Some(Sniffed {
                kind: "decision-model".to_string(),
                format: Format::Json,
                encoding: Encoding::Identity,
            })
        );

        let yaml = "kind: case-model\nid: c\n";
        let encoded = encode_base64(yaml);
        assert_eq!(
            sniff(&encoded),
            Some(Sniffed {
                kind: "case-model".to_string(),
                format: Format::Yaml,
                encoding: Encoding::Base64,
            })
        );
    }

    #[test]
    fn test_sniff_rejects_unmarked_input() {
        assert_eq!(sniff(b"just some words"), None);
        assert_eq!(sniff(br#"{"id": "m"}"#), None);
        assert_eq!(sniff(&[0xff, 0xfe, 0x00]), None);
    }

    #[test]
    fn test_write_tree_formats() {
        let tree = json!({"kind": "x", "id": "a"});
        let compact = write_tree(&tree, Format::Json, false).unwrap();
        assert!(!compact.contains('\n'));
        assert_eq!(serde_json::from_str::<Value>(&compact).unwrap(), tree);
        assert!(write_tree(&tree, Format::Json, true).unwrap().contains('\n'));
        assert!(write_tree(&tree, Format::Yaml, false).unwrap().contains("kind: x"));
        assert!(write_tree(&tree, Format::Xml, false).is_err());
    }
}
