//! Representation descriptors
//!
//! A [`Representation`] says which language an artifact is written in, and
//! optionally the profile, serialization, format, character set, transport
//! encoding and lexicons. Absent fields act as wildcards, so the same type
//! describes both a concrete artifact and a query over artifacts.
//!
//! Descriptors are values: every `with_*` method returns a new descriptor.

pub mod contrast;

pub use contrast::{contrast, is_broader_or_equal, is_narrower_or_equal, Contrast};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Declares an open string identifier.
///
/// Operators introduce new languages, profiles and lexicons without central
/// coordination, so these are newtypes over `String` rather than enums.
macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&$name> for $name {
            fn from(value: &$name) -> Self {
                value.clone()
            }
        }
    };
}

identifier!(
    /// A knowledge representation language, e.g. `decision-model`
    Language
);
identifier!(
    /// A constrained subset or dialect of a language
    Profile
);
identifier!(
    /// A concrete surface syntax, e.g. `decision-model+json`
    Serialization
);
identifier!(
    /// A character set name, e.g. `UTF-8`
    Charset
);
identifier!(
    /// A controlled vocabulary referenced from the artifact
    Lexicon
);

impl Charset {
    pub fn utf_8() -> Self {
        Self::new("UTF-8")
    }
}

/// Generic surface format
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Txt,
    Xml,
    Json,
    Yaml,
    Binary,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Txt => "txt",
            Format::Xml => "xml",
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Binary => "binary",
        };
        f.write_str(name)
    }
}

impl FromStr for Format {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Format::Txt),
            "xml" => Ok(Format::Xml),
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "binary" | "bin" => Ok(Format::Binary),
            other => Err(crate::Error::configuration(
                format!("Unknown format '{}'", other),
                Some("format"),
            )),
        }
    }
}

/// Transport encoding applied on top of the serialized text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// The bytes are the text in its charset
    Identity,
    /// The text bytes are Base64 encoded
    Base64,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Identity => f.write_str("identity"),
            Encoding::Base64 => f.write_str("base64"),
        }
    }
}

impl FromStr for Encoding {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identity" | "none" => Ok(Encoding::Identity),
            "base64" => Ok(Encoding::Base64),
            other => Err(crate::Error::configuration(
                format!("Unknown encoding '{}'", other),
                Some("encoding"),
            )),
        }
    }
}

/// Describes how an artifact is represented
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Representation {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    profile: Option<Profile>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    serialization: Option<Serialization>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    format: Option<Format>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    charset: Option<Charset>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    encoding: Option<Encoding>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    lexicons: BTreeSet<Lexicon>,
}

impl Representation {
    /// The empty descriptor: matches anything
    pub fn any() -> Self {
        Self::default()
    }

    /// A descriptor naming only the language
    pub fn of(language: impl Into<Language>) -> Self {
        Self {
            language: Some(language.into()),
            ..Self::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<Language>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<Profile>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_serialization(mut self, serialization: impl Into<Serialization>) -> Self {
        self.serialization = Some(serialization.into());
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_charset(mut self, charset: impl Into<Charset>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn with_lexicon(mut self, lexicon: impl Into<Lexicon>) -> Self {
        self.lexicons.insert(lexicon.into());
        self
    }

    /// Drop the transport encoding, as happens once bytes are decoded
    pub fn without_encoding(mut self) -> Self {
        self.encoding = None;
        self
    }

    /// Keep only language, profile and lexicons
    ///
    /// Abstract syntax trees have no surface syntax, so operators producing
    /// `Abstract` carriers tag them with this projection.
    pub fn at_abstract_level(&self) -> Self {
        Self {
            language: self.language.clone(),
            profile: self.profile.clone(),
            lexicons: self.lexicons.clone(),
            ..Self::default()
        }
    }

    /// Keep only the language
    pub fn language_only(&self) -> Self {
        Self {
            language: self.language.clone(),
            ..Self::default()
        }
    }

    /// Drop profile and lexicons
    ///
    /// Both annotate the content without changing its grammar, so they take
    /// no part in choosing a parser.
    pub fn without_annotations(&self) -> Self {
        Self {
            profile: None,
            lexicons: BTreeSet::new(),
            ..self.clone()
        }
    }

    pub fn language(&self) -> Option<&Language> {
        self.language.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn serialization(&self) -> Option<&Serialization> {
        self.serialization.as_ref()
    }

    pub fn format(&self) -> Option<Format> {
        self.format
    }

    pub fn charset(&self) -> Option<&Charset> {
        self.charset.as_ref()
    }

    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    pub fn lexicons(&self) -> &BTreeSet<Lexicon> {
        &self.lexicons
    }

    /// True when no field is set
    pub fn is_wildcard(&self) -> bool {
        self.specificity() == 0
    }

    /// Number of present fields, counting each lexicon
    ///
    /// If `a` is narrower than `b`, `a.specificity() > b.specificity()`, which
    /// lets the dispatcher rank candidates with a plain sort.
    pub fn specificity(&self) -> usize {
        [
            self.language.is_some(),
            self.profile.is_some(),
            self.serialization.is_some(),
            self.format.is_some(),
            self.charset.is_some(),
            self.encoding.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
            + self.lexicons.len()
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.language {
            Some(language) => write!(f, "{}", language)?,
            None => write!(f, "*")?,
        }

        let mut details = Vec::new();
        if let Some(profile) = &self.profile {
            details.push(format!("profile={}", profile));
        }
        if let Some(serialization) = &self.serialization {
            details.push(format!("serialization={}", serialization));
        }
        if let Some(format) = self.format {
            details.push(format!("format={}", format));
        }
        if let Some(charset) = &self.charset {
            details.push(format!("charset={}", charset));
        }
        if let Some(encoding) = self.encoding {
            details.push(format!("encoding={}", encoding));
        }
        if !self.lexicons.is_empty() {
            let names: Vec<&str> = self.lexicons.iter().map(Lexicon::as_str).collect();
            details.push(format!("lexicons={}", names.join("+")));
        }

        if !details.is_empty() {
            write!(f, " [{}]", details.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_are_pure() {
        let base = Representation::of("decision-model");
        let json = base.clone().with_format(Format::Json);
        assert_eq!(base.format(), None);
        assert_eq!(json.format(), Some(Format::Json));
        assert_eq!(json.language(), base.language());
    }

    #[test]
    fn test_specificity_counts_fields_and_lexicons() {
        assert_eq!(Representation::any().specificity(), 0);
        let rep = Representation::of("case-model")
            .with_format(Format::Yaml)
            .with_charset(Charset::utf_8())
            .with_lexicon("snomed")
            .with_lexicon("loinc");
        assert_eq!(rep.specificity(), 5);
    }

    #[test]
    fn test_abstract_projection() {
        let rep = Representation::of("decision-model")
            .with_profile("simple")
            .with_serialization("decision-model+json")
            .with_format(Format::Json)
            .with_charset(Charset::utf_8())
            .with_encoding(Encoding::Base64)
            .with_lexicon("snomed");
        let projected = rep.at_abstract_level();
        assert_eq!(
            projected,
            Representation::of("decision-model")
                .with_profile("simple")
                .with_lexicon("snomed")
        );

        assert_eq!(rep.language_only(), Representation::of("decision-model"));
        let bare = rep.without_annotations();
        assert_eq!(bare.profile(), None);
        assert!(bare.lexicons().is_empty());
        assert_eq!(bare.format(), Some(Format::Json));
        assert_eq!(bare.encoding(), Some(Encoding::Base64));
    }

    #[test]
    fn test_display() {
        assert_eq!(Representation::any().to_string(), "*");
        assert_eq!(
            Representation::of("decision-model").with_format(Format::Json).to_string(),
            "decision-model [format=json]"
        );
    }

    #[test]
    fn test_serde_skips_absent_fields() {
        let rep = Representation::of("plan-definition").with_encoding(Encoding::Base64);
        let json = serde_json::to_value(&rep).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"language": "plan-definition", "encoding": "base64"})
        );
        let back: Representation = serde_json::from_value(json).unwrap();
        assert_eq!(back, rep);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("YML".parse::<Format>().unwrap(), Format::Yaml);
        assert!("csv".parse::<Format>().is_err());
        assert_eq!("base64".parse::<Encoding>().unwrap(), Encoding::Base64);
    }
}
