//! Lower command handler
//!
//! The artifact is lifted to its model first, then lowered into the
//! requested surface syntax, so lowering doubles as format conversion.

use super::utils::{lift_artifact, write_artifact};
use crate::cli::LowerArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use karta_core::{Encoding, Format, Kernel, OperatorCategory, ParsingLevel};
use tracing::{info, instrument};

/// Handle the lower command
#[instrument(skip(kernel, config, output), fields(file = %args.file.display(), level = ?args.level))]
pub fn handle_lower(args: LowerArgs, kernel: &Kernel, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("lower_command", &args.file.display().to_string());
    let target = ParsingLevel::from(args.level);
    if target == ParsingLevel::Abstract {
        return Err(Error::invalid_args("cannot lower to the abstract level"));
    }
    if args.encoding.is_some() && target != ParsingLevel::Encoded {
        return Err(Error::invalid_args("--encoding only applies at the encoded level"));
    }

    let properties = config.operator_properties(OperatorCategory::Parser, &args.properties)?;
    let model = lift_artifact(kernel, &args.file, ParsingLevel::Abstract, &properties)?;

    let mut hint = model.representation().clone();
    if let Some(format) = args.format {
        hint = hint.with_format(Format::from(format));
    }
    if let Some(encoding) = args.encoding {
        hint = hint.with_encoding(Encoding::from(encoding));
    }

    let lowered = kernel.lower_to(model, target, &hint, &properties)?;
    info!(representation = %lowered.representation(), "lowered");
    write_artifact(output, &lowered, args.save_to.as_deref())
}
