//! Translate command handler

use super::utils::{lift_artifact, write_artifact};
use crate::cli::TranslateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use karta_core::{Format, Kernel, OperatorCategory, ParsingLevel, Representation};
use tracing::{info, instrument};

/// Handle the translate command
///
/// The translated model is written in the source's surface syntax
/// unless `--format` says otherwise.
#[instrument(skip(kernel, config, output), fields(file = %args.file.display(), into = %args.into))]
pub fn handle_translate(
    args: TranslateArgs,
    kernel: &Kernel,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("translate_command", &format!("{} -> {}", args.file.display(), args.into));
    let parsing = config.operator_properties(OperatorCategory::Parser, &args.properties)?;
    let translating = config.operator_properties(OperatorCategory::Translator, &args.properties)?;

    let source = lift_artifact(kernel, &args.file, ParsingLevel::Serialized, &parsing)?;
    let source_format = source.representation().format();
    let abstract_hint = source.representation().language_only();
    let source = kernel.lift_to(source, ParsingLevel::Abstract, &abstract_hint, &parsing)?;

    let target = Representation::of(args.into.as_str());
    let translated = kernel.translate(source, &target, &translating)?;
    info!(asset = %translated.asset_id(), "translated");

    let mut hint = translated.representation().language_only();
    if let Some(format) = args.format.map(Format::from).or(source_format) {
        hint = hint.with_format(format);
    }
    let text = kernel.lower_to(translated, ParsingLevel::Serialized, &hint, &parsing)?;
    write_artifact(output, &text, args.save_to.as_deref())
}
