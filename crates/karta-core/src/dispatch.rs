//! The dispatcher
//!
//! [`Kernel`] answers requests against a shared [`Registry`]: it detects
//! representations, walks carriers up and down the parsing levels, translates
//! and validates. For every transform it ranks the registered candidates and
//! tries them in order until one produces a result:
//!
//! 1. the operator handles the source language (or is language-agnostic)
//! 2. some `from` entry is broader than or equal to the source descriptor
//! 3. some `into` entry is narrower than or equal to the requested target
//! 4. narrowest matching `into` first; ties keep registration order
//!
//! Profiles and lexicons annotate content without changing its grammar, so
//! they are left out when parsers are matched against the hint. Translators
//! are matched on the language pair alone.
//!
//! Nothing is cached, every request is resolved afresh. Operators that break
//! the carrier invariants (wrong level, lost identity, missing language or
//! lineage) are programming errors and make the kernel panic.

use crate::answer::{Answer, Explanation};
use crate::carrier::Carrier;
use crate::config::Properties;
use crate::error::{Attempt, AttemptOutcome, Error, ResponseCode, Result, Severity};
use crate::level::{ParsingLevel, Transition};
use crate::operator::{Operator, OperatorDescriptor, Parser, Step, Translator};
use crate::registry::{OperatorQuery, Registry};
use crate::representation::{Language, Representation};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Entry point for every request against a registry
#[derive(Debug, Clone)]
pub struct Kernel {
    registry: Arc<Registry>,
}

impl Kernel {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Infer the representation of raw bytes
    pub fn detect(&self, bytes: &[u8]) -> Option<Representation> {
        self.detect_carrier(&Carrier::encoded(bytes))
    }

    /// Ask every detector; the most specific answer wins, ties go to the
    /// detector registered first
    #[instrument(skip_all, fields(artifact = %carrier.artifact_id()))]
    pub fn detect_carrier(&self, carrier: &Carrier) -> Option<Representation> {
        let mut best: Option<(Representation, &str)> = None;
        for detector in self.registry.detectors() {
            let Some(found) = detector.detect(carrier) else {
                continue;
            };
            debug!(detector = %detector.descriptor().name, representation = %found, "detector matched");
            let better = best
                .as_ref()
                .map_or(true, |(current, _)| found.specificity() > current.specificity());
            if better {
                best = Some((found, detector.descriptor().name.as_str()));
            }
        }
        best.map(|(representation, name)| {
            debug!(detector = name, %representation, "detected");
            representation
        })
    }

    /// Lift towards `target` with the carrier's own language as hint
    pub fn lift(&self, carrier: Carrier, target: ParsingLevel) -> Result<Carrier> {
        let hint = default_hint(&carrier);
        self.lift_to(carrier, target, &hint, &Properties::new())
    }

    /// Lift towards `target`
    ///
    /// An encoded carrier without a language is run through detection first.
    #[instrument(skip_all, fields(from = %carrier.level(), to = %target))]
    pub fn lift_to(
        &self,
        carrier: Carrier,
        target: ParsingLevel,
        hint: &Representation,
        config: &Properties,
    ) -> Result<Carrier> {
        if target < carrier.level() {
            return Err(Error::InvalidTransition {
                from: carrier.level(),
                to: target,
                message: "cannot lift to a lower level".to_string(),
            });
        }
        if target == carrier.level() {
            return Ok(carrier);
        }
        let carrier = self.described(carrier)?;
        self.walk(carrier, target, hint, config)
    }

    /// Lower towards `target` with the carrier's own language as hint
    pub fn lower(&self, carrier: Carrier, target: ParsingLevel) -> Result<Carrier> {
        let hint = default_hint(&carrier);
        self.lower_to(carrier, target, &hint, &Properties::new())
    }

    /// Lower towards `target`; the hint selects format, charset and encoding
    #[instrument(skip_all, fields(from = %carrier.level(), to = %target))]
    pub fn lower_to(
        &self,
        carrier: Carrier,
        target: ParsingLevel,
        hint: &Representation,
        config: &Properties,
    ) -> Result<Carrier> {
        if target > carrier.level() {
            return Err(Error::InvalidTransition {
                from: carrier.level(),
                to: target,
                message: "cannot lower to a higher level".to_string(),
            });
        }
        if target == carrier.level() {
            return Ok(carrier);
        }
        self.walk(carrier, target, hint, config)
    }

    /// Produce a carrier of the `target` language at the same level
    #[instrument(skip_all, fields(from = %carrier.representation(), into = %target))]
    pub fn translate(&self, carrier: Carrier, target: &Representation, config: &Properties) -> Result<Carrier> {
        let source = carrier.representation().clone();
        let candidates = rank_translators(self.registry.translators(), source.language(), target.language());
        if candidates.is_empty() {
            return Err(Error::UnsupportedRepresentation {
                message: format!("no translator from {} into {}", source, target),
                offered: source,
                requested: Some(target.clone()),
            });
        }

        let mut attempts = Vec::new();
        for translator in candidates {
            let descriptor = translator.descriptor();
            debug!(translator = %descriptor.name, "trying translator");
            match translator.translate(&carrier, target, config) {
                Ok(Some(translated)) => {
                    check_translation(&carrier, &translated, descriptor);
                    return Ok(translated);
                }
                outcome => attempts.push(attempt(descriptor, outcome)),
            }
        }

        Err(Error::NoTransformation {
            offered: source,
            requested: Some(target.clone()),
            attempts,
        })
    }

    /// Run every compatible validator and merge their answers
    ///
    /// Each validator sees the carrier, components included, at the level it
    /// consumes; conversions are shared between validators of the same level.
    /// A carrier that cannot be brought to a level yields one failed answer,
    /// however many levels are affected.
    #[instrument(skip_all, fields(artifact = %carrier.artifact_id()))]
    pub fn validate(&self, carrier: &Carrier, config: &Properties) -> Answer<()> {
        let carrier = &self
            .described(carrier.clone())
            .unwrap_or_else(|_| carrier.clone());
        let representation = carrier.representation();
        let validators: Vec<_> = self
            .registry
            .validators()
            .iter()
            .filter(|v| {
                let d = v.descriptor();
                d.handles_language(representation.language()) && d.supports(representation)
            })
            .collect();

        if validators.is_empty() {
            return Answer::failed(
                ResponseCode::UnsupportedRepresentation,
                format!("no validator accepts {}", representation),
            );
        }

        let mut views: BTreeMap<ParsingLevel, Option<Carrier>> = BTreeMap::new();
        let mut answers = Vec::with_capacity(validators.len());
        let mut unloadable = false;

        for validator in validators {
            let level = validator.consumes();
            if !views.contains_key(&level) {
                let view = match self.view(carrier, level, config) {
                    Ok(view) => Some(view),
                    Err(e) => {
                        warn!(%level, error = %e, "cannot load artifact for validation");
                        if !unloadable {
                            unloadable = true;
                            answers.push(load_failure(carrier, level, &e));
                        }
                        None
                    }
                };
                views.insert(level, view);
            }
            if let Some(Some(view)) = views.get(&level) {
                debug!(validator = %validator.descriptor().name, "running validator");
                answers.push(validator.validate(view, config));
            }
        }

        Answer::reduce(answers)
    }

    /// Validate several carriers and merge the answers
    ///
    /// With the `parallel` feature the components are validated on the rayon
    /// pool; the merge is order-insensitive so the result is the same.
    pub fn validate_composite(&self, components: &[Carrier], config: &Properties) -> Answer<()> {
        #[cfg(feature = "parallel")]
        {
            components
                .par_iter()
                .map(|component| self.validate(component, config))
                .reduce(Answer::ok, Answer::merge)
        }
        #[cfg(not(feature = "parallel"))]
        {
            Answer::reduce(components.iter().map(|component| self.validate(component, config)))
        }
    }

    /// Registered operators matching `query`, in registration order
    pub fn list_operators(&self, query: &OperatorQuery) -> Vec<OperatorDescriptor> {
        self.registry.list(query)
    }

    /// Parsers that would be tried for `source`, in the order they would be
    /// tried
    pub fn parser_candidates(&self, source: &Representation, hint: &Representation) -> Vec<OperatorDescriptor> {
        rank(self.registry.parsers(), source, Some(&hint.without_annotations()))
            .into_iter()
            .map(|parser| parser.descriptor().clone())
            .collect()
    }

    fn described(&self, carrier: Carrier) -> Result<Carrier> {
        if carrier.representation().language().is_some() {
            return Ok(carrier);
        }
        match self.detect_carrier(&carrier) {
            Some(detected) => Ok(carrier.with_representation(detected)),
            None => Err(Error::UnsupportedRepresentation {
                message: "no detector recognises the artifact".to_string(),
                offered: carrier.representation().clone(),
                requested: None,
            }),
        }
    }

    /// `carrier` and each of its components brought to `level`
    fn view(&self, carrier: &Carrier, level: ParsingLevel, config: &Properties) -> Result<Carrier> {
        let converted = self.convert(carrier.clone(), level, &default_hint(carrier), config)?;
        if carrier.components().is_empty() {
            return Ok(converted);
        }
        let components = carrier
            .components()
            .iter()
            .map(|component| {
                let component = self.described(component.clone())?;
                let hint = default_hint(&component);
                self.convert(component, level, &hint, config)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(converted.without_components().with_components(components))
    }

    fn convert(&self, carrier: Carrier, level: ParsingLevel, hint: &Representation, config: &Properties) -> Result<Carrier> {
        if level >= carrier.level() {
            self.lift_to(carrier, level, hint, config)
        } else {
            self.lower_to(carrier, level, hint, config)
        }
    }

    fn walk(&self, mut carrier: Carrier, target: ParsingLevel, hint: &Representation, config: &Properties) -> Result<Carrier> {
        while carrier.level() != target {
            carrier = self.advance(&carrier, target, hint, config)?;
        }
        Ok(carrier)
    }

    /// One dispatch round: reach `target` by a shortcut or move one level
    fn advance(&self, carrier: &Carrier, target: ParsingLevel, hint: &Representation, config: &Properties) -> Result<Carrier> {
        let source = carrier.representation();
        let Some(next) = carrier.level().next_towards(target) else {
            return Ok(carrier.clone());
        };
        let Some(transition) = Transition::between(carrier.level(), next) else {
            return Err(Error::InvalidTransition {
                from: carrier.level(),
                to: next,
                message: "levels are not adjacent".to_string(),
            });
        };

        let wanted = hint.without_annotations();
        let candidates = rank(self.registry.parsers(), source, Some(&wanted));
        if candidates.is_empty() {
            return Err(Error::UnsupportedRepresentation {
                message: format!("no parser can {} {} into {}", transition, source, wanted),
                offered: source.clone(),
                requested: Some(hint.clone()),
            });
        }

        let skips = carrier.level().distance(target) > 1;
        let mut attempts = Vec::new();
        for parser in candidates {
            let descriptor = parser.descriptor();
            if skips {
                match parser.shortcut(carrier, target, hint, config) {
                    Ok(Some(produced)) => {
                        check_step(carrier, &produced, target, descriptor);
                        debug!(parser = %descriptor.name, %target, "shortcut taken");
                        return Ok(produced);
                    }
                    Ok(None) => {}
                    Err(e) => debug!(parser = %descriptor.name, error = %e, "shortcut failed"),
                }
            }
            match parser.step(transition, carrier, hint, config) {
                Ok(Some(produced)) => {
                    check_step(carrier, &produced, next, descriptor);
                    debug!(parser = %descriptor.name, %transition, representation = %produced.representation(), "step taken");
                    return Ok(produced);
                }
                outcome => attempts.push(attempt(descriptor, outcome)),
            }
        }

        Err(Error::NoTransformation {
            offered: source.clone(),
            requested: Some(hint.clone()),
            attempts,
        })
    }
}

/// Only the language: the parser chooses the surface, the carrier keeps its
/// annotations
fn default_hint(carrier: &Carrier) -> Representation {
    carrier.representation().language_only()
}

fn load_failure(carrier: &Carrier, level: ParsingLevel, error: &Error) -> Answer<()> {
    let message = format!("cannot load artifact at {} level: {}", level, error);
    let mut explanation = Explanation::new(Severity::Fatal, message.clone());
    explanation.subject = Some(carrier.asset_id().clone());
    Answer::failed(ResponseCode::Unprocessable, message).with_explanation(explanation)
}

/// Filter and order candidates for a request
fn rank<'r, O>(operators: &'r [Arc<O>], source: &Representation, target: Option<&Representation>) -> Vec<&'r Arc<O>>
where
    O: Operator + ?Sized,
{
    let mut ranked: Vec<(usize, &Arc<O>)> = operators
        .iter()
        .filter_map(|operator| {
            let descriptor = operator.descriptor();
            if !descriptor.handles_language(source.language()) || !descriptor.supports(source) {
                return None;
            }
            let score = match target {
                Some(target) => descriptor.produces(target)?,
                None => descriptor.into.iter().map(Representation::specificity).max().unwrap_or(0),
            };
            Some((score, operator))
        })
        .collect();
    // Stable: equal scores keep registration order
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked.into_iter().map(|(_, operator)| operator).collect()
}

/// Translators whose declared language pair covers `from` and `into`
///
/// Surface fields and levels play no part. Translators naming both languages
/// come before wildcard ones; ties keep registration order.
fn rank_translators<'r>(
    translators: &'r [Arc<dyn Translator>],
    from: Option<&Language>,
    into: Option<&Language>,
) -> Vec<&'r Arc<dyn Translator>> {
    let mut ranked: Vec<(usize, &Arc<dyn Translator>)> = translators
        .iter()
        .filter_map(|translator| {
            let descriptor = translator.descriptor();
            if !descriptor.handles_language(from) {
                return None;
            }
            let source = descriptor.from.iter().filter_map(|r| language_score(r, from)).max()?;
            let target = descriptor.into.iter().filter_map(|r| language_score(r, into)).max()?;
            Some((source + target, translator))
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked.into_iter().map(|(_, translator)| translator).collect()
}

/// 1 for an exact language match, 0 for a language-agnostic declaration
fn language_score(declared: &Representation, wanted: Option<&Language>) -> Option<usize> {
    match declared.language() {
        None => Some(0),
        Some(language) if Some(language) == wanted => Some(1),
        Some(_) => None,
    }
}

fn attempt(descriptor: &OperatorDescriptor, outcome: Step) -> Attempt {
    let outcome = match outcome {
        Ok(_) => AttemptOutcome::NotApplicable,
        Err(e) => {
            warn!(operator = %descriptor.name, error = %e, "operator failed");
            AttemptOutcome::Failed(e.to_string())
        }
    };
    Attempt {
        operator: descriptor.id.clone(),
        name: descriptor.name.clone(),
        outcome,
    }
}

fn check_step(input: &Carrier, output: &Carrier, expected: ParsingLevel, operator: &OperatorDescriptor) {
    assert_eq!(
        output.level(),
        expected,
        "operator '{}' produced a {} carrier where {} was expected",
        operator.name,
        output.level(),
        expected
    );
    assert_eq!(
        output.asset_id(),
        input.asset_id(),
        "operator '{}' changed the asset identity while changing level",
        operator.name
    );
    check_language(output, operator);
}

fn check_translation(input: &Carrier, output: &Carrier, operator: &OperatorDescriptor) {
    assert_eq!(
        output.level(),
        input.level(),
        "translator '{}' changed the parsing level",
        operator.name
    );
    if output.asset_id() != input.asset_id() {
        let lineage = output.lineage().unwrap_or_else(|| {
            panic!(
                "translator '{}' minted a new asset identity without lineage",
                operator.name
            )
        });
        assert_eq!(
            &lineage.source_artifact,
            input.artifact_id(),
            "translator '{}' recorded lineage to the wrong artifact",
            operator.name
        );
    }
    check_language(output, operator);
}

fn check_language(output: &Carrier, operator: &OperatorDescriptor) {
    if output.level() > ParsingLevel::Encoded {
        assert!(
            output.representation().language().is_some(),
            "operator '{}' produced a {} carrier without a language",
            operator.name,
            output.level()
        );
    }
}
