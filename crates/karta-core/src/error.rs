//! Error types for the Karta core library
//!
//! This module defines the error handling system for the transformation
//! pipeline, using thiserror for ergonomic error definitions and anyhow for
//! flexible error contexts. Validation findings are not errors: they travel
//! as [`Explanation`](crate::answer::Explanation)s inside an
//! [`Answer`](crate::answer::Answer).

use crate::identity::VersionedId;
use crate::level::ParsingLevel;
use crate::representation::{Language, Representation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for Karta operations
#[derive(Error, Debug)]
pub enum Error {
    /// No registered operator declares a capability matching the request
    #[error("Unsupported representation: {message}")]
    UnsupportedRepresentation {
        message: String,
        offered: Representation,
        requested: Option<Representation>,
    },

    /// Candidates existed, but none of them produced a result
    #[error("No transformation succeeded from {offered}: {} operator(s) attempted", attempts.len())]
    NoTransformation {
        offered: Representation,
        requested: Option<Representation>,
        attempts: Vec<Attempt>,
    },

    /// The payload did not conform to the shape an operator expected
    #[error("Malformed input: {message}")]
    MalformedInput {
        message: String,
        language: Option<Language>,
        #[source]
        cause: Option<anyhow::Error>,
    },

    /// Lift towards a lower level, or lower towards a higher one
    #[error("Invalid transition from {from} to {to}: {message}")]
    InvalidTransition {
        from: ParsingLevel,
        to: ParsingLevel,
        message: String,
    },

    /// Operator or application configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        key: Option<String>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing and serialization errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a malformed-input error without an underlying cause
    pub fn malformed(message: impl Into<String>, language: Option<&Language>) -> Self {
        Error::MalformedInput {
            message: message.into(),
            language: language.cloned(),
            cause: None,
        }
    }

    /// Create a malformed-input error wrapping the parser's own error
    pub fn malformed_because<E>(message: impl Into<String>, language: Option<&Language>, cause: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Error::MalformedInput {
            message: message.into(),
            language: language.cloned(),
            cause: Some(cause.into()),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>, key: Option<&str>) -> Self {
        Error::Configuration {
            message: message.into(),
            key: key.map(str::to_string),
        }
    }

    /// The response code a caller would surface for this error
    pub fn response_code(&self) -> ResponseCode {
        match self {
            Error::UnsupportedRepresentation { .. } => ResponseCode::UnsupportedRepresentation,
            Error::MalformedInput { .. } | Error::Json { .. } | Error::Yaml { .. } => {
                ResponseCode::MalformedInput
            }
            _ => ResponseCode::Unprocessable,
        }
    }
}

/// One operator the dispatcher tried while resolving a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// Identity of the operator
    pub operator: VersionedId,
    /// Human-readable operator name
    pub name: String,
    /// Why the operator did not produce a result
    pub outcome: AttemptOutcome,
}

/// Reason an attempted operator did not produce a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The operator declined: it cannot produce this specific variant
    NotApplicable,
    /// The operator tried and failed
    Failed(String),
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            AttemptOutcome::NotApplicable => write!(f, "{} ({}): not applicable", self.name, self.operator),
            AttemptOutcome::Failed(reason) => write!(f, "{} ({}): {}", self.name, self.operator, reason),
        }
    }
}

/// Severity levels for diagnostic explanations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// The rule passed
    Ok,
    /// Informational, no action required
    Info,
    /// The artifact violates a rule
    Error,
    /// The artifact is unusable
    Fatal,
}

/// Outcome codes carried by a failed [`Answer`](crate::answer::Answer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCode {
    /// The artifact could not even be loaded or parsed
    Unprocessable,
    /// No operator handles the artifact's representation
    UnsupportedRepresentation,
    /// The payload did not conform to its declared representation
    MalformedInput,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Ok => write!(f, "OK"),
            Severity::Info => write!(f, "INFO"),
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::Unprocessable => write!(f, "Unprocessable"),
            ResponseCode::UnsupportedRepresentation => write!(f, "Unsupported Representation"),
            ResponseCode::MalformedInput => write!(f, "Malformed Input"),
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed("missing decisions", None);
        assert_eq!(err.to_string(), "Malformed input: missing decisions");
    }

    #[test]
    fn test_no_transformation_counts_attempts() {
        let err = Error::NoTransformation {
            offered: Representation::of("decision-model"),
            requested: None,
            attempts: vec![Attempt {
                operator: VersionedId::mint(),
                name: "parser".to_string(),
                outcome: AttemptOutcome::NotApplicable,
            }],
        };
        assert!(err.to_string().contains("1 operator(s) attempted"));
        assert_eq!(err.response_code(), ResponseCode::Unprocessable);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Ok < Severity::Info);
        assert!(Severity::Info < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Fatal.to_string(), "FATAL");
        assert_eq!(ResponseCode::Unprocessable.to_string(), "Unprocessable");
    }
}
