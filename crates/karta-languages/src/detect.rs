//! Detectors
//!
//! [`DocumentDetector`] recognises the JSON/YAML documents of one language by
//! their `kind` marker, looking through a Base64 transport encoding if
//! needed. [`XmlNamespaceDetector`] recognises DMN and CMMN XML documents by
//! their namespace; no parser is registered for those, so they can be
//! identified but not lifted.

use crate::case::CASE_MODEL;
use crate::decision::DECISION_MODEL;
use crate::document::{sniff, sniff_text, Document};
use karta_core::{
    Carrier, Charset, Detector, Encoding, Format, Operator, OperatorCategory, OperatorDescriptor,
    Payload, Representation,
};
use regex::Regex;
use std::marker::PhantomData;
use std::sync::OnceLock;

pub struct DocumentDetector<M> {
    descriptor: OperatorDescriptor,
    _model: PhantomData<fn() -> M>,
}

impl<M: Document> DocumentDetector<M> {
    pub fn new() -> Self {
        Self {
            descriptor: OperatorDescriptor::new(format!("{}-detector", M::KIND), OperatorCategory::Detector)
                .accepting([Representation::any()])
                .producing([Representation::of(M::KIND)]),
            _model: PhantomData,
        }
    }
}

impl<M: Document> Default for DocumentDetector<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Document> Operator for DocumentDetector<M> {
    fn descriptor(&self) -> &OperatorDescriptor {
        &self.descriptor
    }
}

impl<M: Document> Detector for DocumentDetector<M> {
    fn detect(&self, carrier: &Carrier) -> Option<Representation> {
        match carrier.payload() {
            Payload::Encoded(bytes) => {
                let sniffed = sniff(bytes)?;
                (sniffed.kind == M::KIND).then(|| M::representation(sniffed.format, sniffed.encoding))
            }
            Payload::Serialized(text) => {
                let (kind, format) = sniff_text(text)?;
                (kind == M::KIND)
                    .then(|| M::representation(format, Encoding::Identity).without_encoding())
            }
            _ => None,
        }
    }
}

/// Known XML namespaces: namespace, language, profile
const NAMESPACES: [(&str, &str, &str); 3] = [
    ("http://www.omg.org/spec/DMN/20180521/MODEL/", DECISION_MODEL, "dmn-1.2"),
    ("https://www.omg.org/spec/DMN/20191111/MODEL/", DECISION_MODEL, "dmn-1.3"),
    ("http://www.omg.org/spec/CMMN/20151109/MODEL", CASE_MODEL, "cmmn-1.1"),
];

static XMLNS: OnceLock<Regex> = OnceLock::new();

fn xmlns() -> &'static Regex {
    XMLNS.get_or_init(|| {
        Regex::new(r#"xmlns(?::[\w.-]+)?\s*=\s*["']([^"']+)["']"#).expect("Valid regex pattern")
    })
}

#[derive(Debug, Clone)]
pub struct XmlNamespaceDetector {
    descriptor: OperatorDescriptor,
}

impl XmlNamespaceDetector {
    pub fn new() -> Self {
        Self {
            descriptor: OperatorDescriptor::new("xml-namespace-detector", OperatorCategory::Detector)
                .accepting([Representation::any()])
                .producing(
                    NAMESPACES
                        .iter()
                        .map(|(_, language, profile)| Representation::of(*language).with_profile(*profile)),
                ),
        }
    }

    /// Language and profile declared by the namespaces of an XML text
    pub fn classify(text: &str) -> Option<Representation> {
        let body = text.trim_start_matches('\u{feff}').trim_start();
        if !body.starts_with('<') {
            return None;
        }
        xmlns().captures_iter(body).find_map(|captures| {
            let namespace = captures.get(1)?.as_str();
            NAMESPACES
                .iter()
                .find(|(known, _, _)| *known == namespace)
                .map(|(_, language, profile)| {
                    Representation::of(*language)
                        .with_profile(*profile)
                        .with_format(Format::Xml)
                        .with_charset(Charset::utf_8())
                })
        })
    }
}

impl Default for XmlNamespaceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator for XmlNamespaceDetector {
    fn descriptor(&self) -> &OperatorDescriptor {
        &self.descriptor
    }
}

impl Detector for XmlNamespaceDetector {
    fn detect(&self, carrier: &Carrier) -> Option<Representation> {
        match carrier.payload() {
            Payload::Encoded(bytes) => {
                let text = std::str::from_utf8(bytes).ok()?;
                Self::classify(text).map(|found| found.with_encoding(Encoding::Identity))
            }
            Payload::Serialized(text) => Self::classify(text),
            _ => None,
        }
    }
}
