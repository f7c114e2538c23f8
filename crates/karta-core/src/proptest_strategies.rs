//! Property-based testing strategies for generating test data
//!
//! This module provides proptest strategies for generating random
//! but valid instances of core Karta types for property testing.

#![cfg(test)]

use crate::answer::{Answer, Explanation};
use crate::error::{ResponseCode, Severity};
use crate::identity::VersionedId;
use crate::representation::{Charset, Encoding, Format, Representation};
use proptest::collection::btree_set;
use proptest::option;
use proptest::prelude::*;
use uuid::Uuid;

/// Strategy for generating formats
pub fn format_strategy() -> impl Strategy<Value = Format> {
    prop_oneof![
        Just(Format::Txt),
        Just(Format::Xml),
        Just(Format::Json),
        Just(Format::Yaml),
        Just(Format::Binary),
    ]
}

/// Strategy for generating representation descriptors
///
/// Values are drawn from small alphabets so that equal and nested
/// descriptors come up often enough to be interesting.
pub fn representation_strategy() -> impl Strategy<Value = Representation> {
    (
        option::of(prop_oneof![Just("decision-model"), Just("case-model")]), // language
        option::of(prop_oneof![Just("simple"), Just("strict")]),             // profile
        option::of(Just("decision-model+json")),                             // serialization
        option::of(format_strategy()),                                       // format
        option::of(Just("UTF-8")),                                           // charset
        option::of(prop_oneof![Just(Encoding::Identity), Just(Encoding::Base64)]),
        btree_set(prop_oneof![Just("snomed"), Just("loinc"), Just("rxnorm")], 0..3),
    )
        .prop_map(|(language, profile, serialization, format, charset, encoding, lexicons)| {
            let mut rep = Representation::any();
            if let Some(language) = language {
                rep = rep.with_language(language);
            }
            if let Some(profile) = profile {
                rep = rep.with_profile(profile);
            }
            if let Some(serialization) = serialization {
                rep = rep.with_serialization(serialization);
            }
            if let Some(format) = format {
                rep = rep.with_format(format);
            }
            if let Some(charset) = charset {
                rep = rep.with_charset(Charset::new(charset));
            }
            if let Some(encoding) = encoding {
                rep = rep.with_encoding(encoding);
            }
            for lexicon in lexicons {
                rep = rep.with_lexicon(lexicon);
            }
            rep
        })
}

/// Strategy for generating severities
pub fn severity_strategy() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Ok),
        Just(Severity::Info),
        Just(Severity::Error),
        Just(Severity::Fatal),
    ]
}

/// Strategy for generating explanations
pub fn explanation_strategy() -> impl Strategy<Value = Explanation> {
    (
        option::of("[A-Z][a-z]{2,8}( [A-Z][a-z]{2,8})?"), // rule
        option::of(0u128..4),                            // subject
        severity_strategy(),
        "[a-z ]{0,20}", // detail
    )
        .prop_map(|(rule, subject, severity, detail)| Explanation {
            rule,
            subject: subject.map(|n| VersionedId::new(Uuid::from_u128(n), "1.0.0")),
            severity,
            detail,
        })
}

/// Strategy for generating answers without a value payload
pub fn answer_strategy() -> impl Strategy<Value = Answer<()>> {
    (
        option::of((
            prop_oneof![
                Just(ResponseCode::Unprocessable),
                Just(ResponseCode::UnsupportedRepresentation),
                Just(ResponseCode::MalformedInput),
            ],
            "[a-z ]{0,12}",
        )),
        proptest::collection::vec(explanation_strategy(), 0..4),
    )
        .prop_map(|(failure, explanations)| {
            let answer = match failure {
                Some((code, message)) => Answer::failed(code, message),
                None => Answer::ok(),
            };
            answer.with_explanations(explanations)
        })
}
