//! The diagnostic accumulator
//!
//! An [`Answer`] pairs an optional value with the explanations gathered while
//! producing it and, if the request could not be processed at all, a
//! [`FailureCause`]. Rule violations are explanations inside a successful
//! answer; only an artifact that cannot be loaded or handled makes the answer
//! itself fail.
//!
//! Answers compose with [`Answer::merge`]. Explanations are kept in a
//! canonical order, so merging is associative and commutative and composite
//! validation gives the same result however its components were scheduled.

use crate::error::{ResponseCode, Severity};
use crate::identity::VersionedId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// One finding attached to an answer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Explanation {
    /// Name of the rule that produced the finding
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rule: Option<String>,
    /// The artifact the finding is about
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subject: Option<VersionedId>,
    pub severity: Severity,
    /// One-line human readable detail
    pub detail: String,
}

impl Explanation {
    /// A finding not tied to a named rule
    pub fn new(severity: Severity, detail: impl Into<String>) -> Self {
        Self {
            rule: None,
            subject: None,
            severity,
            detail: detail.into(),
        }
    }

    /// Start an explanation for a named rule
    pub fn for_rule(rule: impl Into<String>, subject: Option<&VersionedId>) -> ExplanationBuilder {
        ExplanationBuilder {
            rule: rule.into(),
            subject: subject.cloned(),
        }
    }
}

/// Completes an [`Explanation`] for a named rule
#[derive(Debug, Clone)]
pub struct ExplanationBuilder {
    rule: String,
    subject: Option<VersionedId>,
}

impl ExplanationBuilder {
    /// The rule passed
    pub fn pass(self, detail: impl Into<String>) -> Explanation {
        self.fail(Severity::Ok, detail)
    }

    /// The rule reported a finding of the given severity
    pub fn fail(self, severity: Severity, detail: impl Into<String>) -> Explanation {
        Explanation {
            rule: Some(self.rule),
            subject: self.subject,
            severity,
            detail: detail.into(),
        }
    }
}

// Most severe first, then by rule, subject and detail.
impl Ord for Explanation {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .severity
            .cmp(&self.severity)
            .then_with(|| self.rule.cmp(&other.rule))
            .then_with(|| self.subject.cmp(&other.subject))
            .then_with(|| self.detail.cmp(&other.detail))
    }
}

impl PartialOrd for Explanation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.severity)?;
        if let Some(rule) = &self.rule {
            write!(f, " {}", rule)?;
        }
        if let Some(subject) = &self.subject {
            write!(f, " ({})", subject)?;
        }
        write!(f, ": {}", self.detail)
    }
}

/// Why an answer failed
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FailureCause {
    pub code: ResponseCode,
    pub message: String,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Whether an answer carries a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

/// A value plus everything learned while producing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer<T> {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    value: Option<T>,
    #[serde(default)]
    explanations: Vec<Explanation>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    failure: Option<FailureCause>,
}

impl<T> Answer<T> {
    /// A successful answer without explanations
    pub fn success(value: T) -> Self {
        Self {
            value: Some(value),
            explanations: Vec::new(),
            failure: None,
        }
    }

    /// A failed answer
    pub fn failed(code: ResponseCode, message: impl Into<String>) -> Self {
        Self {
            value: None,
            explanations: Vec::new(),
            failure: Some(FailureCause {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn with_explanation(self, explanation: Explanation) -> Self {
        self.with_explanations(std::iter::once(explanation))
    }

    pub fn with_explanations(mut self, explanations: impl IntoIterator<Item = Explanation>) -> Self {
        self.explanations.extend(explanations);
        self.explanations.sort();
        self
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    /// Explanations in canonical order: most severe first
    pub fn explanations(&self) -> &[Explanation] {
        &self.explanations
    }

    pub fn failure(&self) -> Option<&FailureCause> {
        self.failure.as_ref()
    }

    pub fn outcome(&self) -> Outcome {
        if self.failure.is_some() {
            Outcome::Failure
        } else {
            Outcome::Success
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome() == Outcome::Success
    }

    /// The highest severity among the explanations, `Ok` when there are none
    pub fn severity(&self) -> Severity {
        self.explanations
            .iter()
            .map(|e| e.severity)
            .max()
            .unwrap_or(Severity::Ok)
    }

    /// Transform the value, keeping explanations and failure
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Answer<U> {
        Answer {
            value: self.value.map(f),
            explanations: self.explanations,
            failure: self.failure,
        }
    }

    /// Combine two answers
    ///
    /// The result fails if either side failed; when both did, the smaller
    /// cause is kept. A value is present only if both sides have one.
    pub fn merge_with<U, R>(self, other: Answer<U>, combine: impl FnOnce(T, U) -> R) -> Answer<R> {
        let value = match (self.value, other.value) {
            (Some(left), Some(right)) => Some(combine(left, right)),
            _ => None,
        };
        let failure = match (self.failure, other.failure) {
            (Some(left), Some(right)) => Some(left.min(right)),
            (Some(cause), None) | (None, Some(cause)) => Some(cause),
            (None, None) => None,
        };
        let mut explanations = self.explanations;
        explanations.extend(other.explanations);
        explanations.sort();

        Answer {
            value,
            explanations,
            failure,
        }
    }
}

impl Answer<()> {
    /// The neutral element of [`Answer::merge`]
    pub fn ok() -> Self {
        Self::success(())
    }

    /// Exactly one explanation for a named rule
    pub fn rule(
        name: &str,
        passed: bool,
        severity_on_failure: Severity,
        detail: impl Into<String>,
        subject: Option<&VersionedId>,
    ) -> Self {
        let builder = Explanation::for_rule(name, subject);
        let explanation = if passed {
            builder.pass(detail)
        } else {
            builder.fail(severity_on_failure, detail)
        };
        Self::ok().with_explanation(explanation)
    }

    pub fn merge(self, other: Answer<()>) -> Self {
        self.merge_with(other, |_, _| ())
    }

    /// Merge any number of answers; an empty input yields [`Answer::ok`]
    pub fn reduce(answers: impl IntoIterator<Item = Answer<()>>) -> Self {
        answers.into_iter().fold(Self::ok(), Self::merge)
    }
}

impl<T> fmt::Display for Answer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failure {
            Some(cause) => write!(f, "failure ({})", cause)?,
            None => write!(f, "success ({})", self.severity())?,
        }
        for explanation in &self.explanations {
            write!(f, "\n  {}", explanation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proptest_strategies::answer_strategy;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_rule_produces_one_explanation() {
        let subject = VersionedId::mint();
        let answer = Answer::rule("Decision Names", false, Severity::Error, "d2 has no name", Some(&subject));
        assert!(answer.is_success());
        assert_eq!(answer.severity(), Severity::Error);
        assert_eq!(
            answer.explanations(),
            &[Explanation {
                rule: Some("Decision Names".to_string()),
                subject: Some(subject),
                severity: Severity::Error,
                detail: "d2 has no name".to_string(),
            }]
        );
    }

    #[test]
    fn test_merge_keeps_failure() {
        let failed = Answer::<()>::failed(ResponseCode::Unprocessable, "cannot load");
        let merged = Answer::ok().merge(failed.clone());
        assert_eq!(merged.outcome(), Outcome::Failure);
        assert_eq!(merged.failure(), failed.failure());
        assert_eq!(merged.value(), None);
    }

    #[test]
    fn test_merge_orders_most_severe_first() {
        let a = Answer::rule("B", true, Severity::Error, "fine", None);
        let b = Answer::rule("A", false, Severity::Fatal, "broken", None);
        let merged = a.merge(b);
        assert_eq!(merged.explanations()[0].severity, Severity::Fatal);
        assert_eq!(merged.explanations()[1].severity, Severity::Ok);
        assert_eq!(merged.severity(), Severity::Fatal);
    }

    #[test]
    fn test_empty_answer_is_ok() {
        assert_eq!(Answer::ok().severity(), Severity::Ok);
        assert_eq!(Answer::reduce(Vec::new()), Answer::ok());
    }

    #[test]
    fn test_merge_with_combines_values() {
        let merged = Answer::success(2).merge_with(Answer::success(3), |a, b| a * b);
        assert_eq!(merged.into_value(), Some(6));
    }

    proptest! {
        #[test]
        fn prop_merge_is_commutative(a in answer_strategy(), b in answer_strategy()) {
            prop_assert_eq!(a.clone().merge(b.clone()), b.merge(a));
        }

        #[test]
        fn prop_merge_is_associative(
            a in answer_strategy(),
            b in answer_strategy(),
            c in answer_strategy(),
        ) {
            let left = a.clone().merge(b.clone()).merge(c.clone());
            let right = a.merge(b.merge(c));
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_fatal_absorbs(a in answer_strategy(), b in answer_strategy()) {
            let fatal = a.merge(Answer::rule("Sentinel", false, Severity::Fatal, "fatal", None));
            prop_assert_eq!(fatal.merge(b).severity(), Severity::Fatal);
        }

        #[test]
        fn prop_ok_is_neutral(a in answer_strategy()) {
            prop_assert_eq!(a.clone().merge(Answer::ok()), a);
        }
    }
}
