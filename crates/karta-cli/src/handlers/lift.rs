//! Lift command handler

use super::utils::{lift_artifact, payload_value};
use crate::cli::LiftArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use karta_core::{Kernel, OperatorCategory, ParsingLevel};
use serde_json::json;
use tracing::{info, instrument};

/// Handle the lift command
#[instrument(skip(kernel, config, output), fields(file = %args.file.display(), level = ?args.level))]
pub fn handle_lift(args: LiftArgs, kernel: &Kernel, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("lift_command", &args.file.display().to_string());
    let properties = config.operator_properties(OperatorCategory::Parser, &args.properties)?;
    let target = ParsingLevel::from(args.level);

    let spinner = output.spinner(&format!("Lifting {} to {}...", args.file.display(), target));
    let lifted = lift_artifact(kernel, &args.file, target, &properties);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let lifted = lifted?;
    info!(representation = %lifted.representation(), "lifted");

    let payload = payload_value(kernel, &lifted)?;
    if !output.is_human() {
        return output.data(&json!({ "carrier": lifted.summary(), "payload": payload }));
    }

    output.success(&format!("✓ Lifted {} to {}", args.file.display(), target))?;
    output.section("Carrier")?;
    output.carrier_summary(&lifted.summary())?;
    output.section(if target == ParsingLevel::Abstract { "Model" } else { "Payload" })?;
    match payload.as_str() {
        Some(text) => output.writeln(text.trim_end()),
        None => output.data(&payload),
    }
}
