//! Generic parser for the JSON/YAML document languages
//!
//! One [`DocumentParser`] instance handles one language. It implements all
//! six level transitions for JSON and YAML surface syntax in UTF-8, with or
//! without a Base64 transport encoding, and can jump from serialized text
//! straight to the typed model.
//!
//! Lowering picks format and encoding from the hint first, then from the
//! `format` and `encoding` properties, then falls back to JSON without
//! transport encoding. The `pretty` property (default `true`) controls JSON
//! indentation.
//!
//! Copyright (c) 2025 Karta Team
//! Licensed under the Apache-2.0 license

use crate::document::{
    check_kind, decode_base64, encode_base64, is_document_format, read_model, read_tree, sniff,
    sniff_format, write_tree, Document, Tagged,
};
use karta_core::{
    Carrier, Charset, Encoding, Error, Format, Operator, OperatorCategory, OperatorDescriptor,
    ParsingLevel, Parser, Payload, Properties, Representation, Result, Step,
};
use std::marker::PhantomData;
use tracing::debug;

pub const FORMAT_PROPERTY: &str = "format";
pub const ENCODING_PROPERTY: &str = "encoding";
pub const PRETTY_PROPERTY: &str = "pretty";

const FORMATS: [Format; 2] = [Format::Json, Format::Yaml];
const ENCODINGS: [Encoding; 2] = [Encoding::Identity, Encoding::Base64];

pub struct DocumentParser<M> {
    descriptor: OperatorDescriptor,
    _model: PhantomData<fn() -> M>,
}

impl<M: Document> DocumentParser<M> {
    pub fn new() -> Self {
        let full = FORMATS
            .iter()
            .flat_map(|&format| ENCODINGS.iter().map(move |&encoding| M::representation(format, encoding)));
        Self {
            descriptor: OperatorDescriptor::new(format!("{}-parser", M::KIND), OperatorCategory::Parser)
                .for_language(M::KIND)
                .accepting([Representation::of(M::KIND)])
                .producing(std::iter::once(Representation::of(M::KIND)).chain(full)),
            _model: PhantomData,
        }
    }
}

impl<M: Document> Default for DocumentParser<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> std::fmt::Debug for DocumentParser<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentParser")
            .field("descriptor", &self.descriptor.name)
            .finish()
    }
}

impl<M: Document> Operator for DocumentParser<M> {
    fn descriptor(&self) -> &OperatorDescriptor {
        &self.descriptor
    }
}

impl<M: Document> Parser for DocumentParser<M> {
    fn decode(&self, carrier: &Carrier, _hint: &Representation, _config: &Properties) -> Step {
        let Some(bytes) = carrier.as_bytes() else {
            return Ok(None);
        };
        let representation = carrier.representation();
        if representation.charset().is_some_and(|charset| !is_utf_8(charset)) {
            return Ok(None);
        }

        let encoding = match representation.encoding() {
            Some(encoding) => encoding,
            None => sniff(bytes).map_or(Encoding::Identity, |sniffed| sniffed.encoding),
        };
        let raw = match encoding {
            Encoding::Identity => bytes.to_vec(),
            Encoding::Base64 => decode_base64(bytes)?,
        };
        let text = String::from_utf8(raw)
            .map_err(|e| Error::malformed_because("document is not valid UTF-8", Some(&M::language()), e))?;

        let format = representation.format().unwrap_or_else(|| sniff_format(&text));
        if !is_document_format(format) {
            return Ok(None);
        }
        debug!(language = M::KIND, %format, %encoding, "decoded document");
        let decoded = representation
            .clone()
            .without_encoding()
            .with_format(format)
            .with_serialization(M::serialization(format))
            .with_charset(Charset::utf_8());
        Ok(Some(carrier.advance(Payload::Serialized(text), decoded)))
    }

    fn deserialize(&self, carrier: &Carrier, _hint: &Representation, _config: &Properties) -> Step {
        let Some(text) = carrier.as_text() else {
            return Ok(None);
        };
        let representation = carrier.representation();
        let format = representation.format().unwrap_or_else(|| sniff_format(text));
        if !is_document_format(format) {
            return Ok(None);
        }
        let tree = read_tree(text, format, &M::language())?;
        check_kind::<M>(&tree)?;
        let described = representation
            .clone()
            .with_format(format)
            .with_serialization(M::serialization(format));
        Ok(Some(carrier.advance(Payload::Concrete(tree), described)))
    }

    fn parse(&self, carrier: &Carrier, _hint: &Representation, _config: &Properties) -> Step {
        let Some(tree) = carrier.as_tree() else {
            return Ok(None);
        };
        check_kind::<M>(tree)?;
        let tagged: Tagged<M> = serde_json::from_value(tree.clone()).map_err(|e| {
            Error::malformed_because(
                format!("document does not describe a {}", M::KIND),
                Some(&M::language()),
                e,
            )
        })?;
        let model = tagged.into_model()?;
        let representation = carrier.representation().at_abstract_level();
        Ok(Some(carrier.advance(Payload::model(model), representation)))
    }

    fn externalize(&self, carrier: &Carrier, hint: &Representation, config: &Properties) -> Step {
        let Some(model) = carrier.as_model::<M>() else {
            return Ok(None);
        };
        let format = target_format(hint, None, config)?;
        if !is_document_format(format) {
            return Ok(None);
        }
        let tree = serde_json::to_value(Tagged::new(model.clone()))?;
        let representation = carrier
            .representation()
            .clone()
            .with_format(format)
            .with_serialization(M::serialization(format));
        Ok(Some(carrier.advance(Payload::Concrete(tree), representation)))
    }

    fn serialize(&self, carrier: &Carrier, hint: &Representation, config: &Properties) -> Step {
        let Some(tree) = carrier.as_tree() else {
            return Ok(None);
        };
        if hint.charset().is_some_and(|charset| !is_utf_8(charset)) {
            return Ok(None);
        }
        let representation = carrier.representation();
        let format = target_format(hint, representation.format(), config)?;
        if !is_document_format(format) {
            return Ok(None);
        }
        let pretty = config.get_bool(PRETTY_PROPERTY)?.unwrap_or(true);
        let text = write_tree(tree, format, pretty)?;
        let serialized = representation
            .clone()
            .with_format(format)
            .with_serialization(M::serialization(format))
            .with_charset(Charset::utf_8());
        Ok(Some(carrier.advance(Payload::Serialized(text), serialized)))
    }

    fn encode(&self, carrier: &Carrier, hint: &Representation, config: &Properties) -> Step {
        let Some(text) = carrier.as_text() else {
            return Ok(None);
        };
        let encoding = match hint.encoding() {
            Some(encoding) => encoding,
            None => config
                .get_parsed::<Encoding>(ENCODING_PROPERTY)?
                .unwrap_or(Encoding::Identity),
        };
        let bytes = match encoding {
            Encoding::Identity => text.as_bytes().to_vec(),
            Encoding::Base64 => encode_base64(text),
        };
        let encoded = carrier.representation().clone().with_encoding(encoding);
        Ok(Some(carrier.advance(Payload::Encoded(bytes), encoded)))
    }

    fn shortcut(&self, carrier: &Carrier, target: ParsingLevel, _hint: &Representation, _config: &Properties) -> Step {
        if target != ParsingLevel::Abstract {
            return Ok(None);
        }
        let Some(text) = carrier.as_text() else {
            return Ok(None);
        };
        let format = carrier
            .representation()
            .format()
            .unwrap_or_else(|| sniff_format(text));
        if !is_document_format(format) {
            return Ok(None);
        }
        let model = read_model::<M>(text, format)?;
        let representation = carrier.representation().at_abstract_level();
        Ok(Some(carrier.advance(Payload::model(model), representation)))
    }
}

fn is_utf_8(charset: &Charset) -> bool {
    matches!(charset.as_str().to_ascii_lowercase().as_str(), "utf-8" | "utf8")
}

/// Hint first, then what the carrier already has, then configuration
fn target_format(hint: &Representation, current: Option<Format>, config: &Properties) -> Result<Format> {
    if let Some(format) = hint.format().or(current) {
        return Ok(format);
    }
    Ok(config
        .get_parsed::<Format>(FORMAT_PROPERTY)?
        .unwrap_or(Format::Json))
}
