//! Validation command handler

use super::utils::read_artifact;
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use karta_core::{Answer, Carrier, Kernel, OperatorCategory, Outcome, Severity};
use karta_languages::case::rules::link_decision_models;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Handle the validate command
///
/// A single file is validated on its own; several files are validated as
/// the components of one composite artifact and their answers merged.
/// Decision models given next to a case model are attached to it, so the
/// case's decision links are checked against them.
#[instrument(skip(kernel, config, output), fields(files = args.files.len(), fail_on = ?args.fail_on))]
pub fn handle_validate(
    args: ValidateArgs,
    kernel: &Kernel,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &format!("{} file(s)", args.files.len()));
    let properties = config.operator_properties(OperatorCategory::Validator, &args.properties)?;

    let carriers = args
        .files
        .iter()
        .map(|path| described_artifact(kernel, path))
        .collect::<Result<Vec<_>>>()?;
    let carriers = link_decision_models(carriers);

    let spinner = output.spinner(&format!("Validating {} artifact(s)...", carriers.len()));
    let answer = match carriers.as_slice() {
        [single] => kernel.validate(single, &properties),
        components => kernel.validate_composite(components, &properties),
    };
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    info!(
        outcome = ?answer.outcome(),
        severity = %answer.severity(),
        explanations = answer.explanations().len(),
        "validation finished"
    );
    output.answer(&answer)?;

    check_threshold(&answer, args.fail_on.into())
}

/// Read a file and tag it with its detected representation, if any
///
/// Unrecognised files stay untagged; validating them reports why they
/// cannot be loaded.
fn described_artifact(kernel: &Kernel, path: &Path) -> Result<Carrier> {
    let carrier = read_artifact(path)?;
    match kernel.detect_carrier(&carrier) {
        Some(detected) => Ok(carrier.with_representation(detected)),
        None => {
            debug!(path = %path.display(), "no detector recognises the file");
            Ok(carrier)
        }
    }
}

/// Fail when the answer failed outright or reached `threshold`
fn check_threshold(answer: &Answer<()>, threshold: Severity) -> Result<()> {
    let severity = answer.severity();
    if answer.outcome() == Outcome::Failure || severity >= threshold {
        warn!(%severity, %threshold, "validation threshold reached");
        return Err(Error::ValidationFailed { severity });
    }
    Ok(())
}
