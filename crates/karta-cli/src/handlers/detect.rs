//! Detect command handler

use super::utils::read_artifact;
use crate::cli::DetectArgs;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use karta_core::Kernel;
use tracing::{info, instrument};

/// Handle the detect command
#[instrument(skip(kernel, output), fields(file = %args.file.display()))]
pub fn handle_detect(args: DetectArgs, kernel: &Kernel, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("detect_command", &args.file.display().to_string());
    let carrier = read_artifact(&args.file)?;

    let representation = kernel.detect_carrier(&carrier).ok_or_else(|| Error::Unrecognized {
        path: args.file.clone(),
    })?;
    info!(%representation, "artifact recognised");

    if !output.is_human() {
        return output.data(&representation);
    }

    output.success(&format!("✓ {}", representation))?;
    let fields = [
        ("Language", representation.language().map(|v| v.to_string())),
        ("Profile", representation.profile().map(|v| v.to_string())),
        ("Serialization", representation.serialization().map(|v| v.to_string())),
        ("Format", representation.format().map(|v| v.to_string())),
        ("Charset", representation.charset().map(|v| v.to_string())),
        ("Encoding", representation.encoding().map(|v| v.to_string())),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            output.writeln(&format!("  {:<14} {}", format!("{}:", name), value))?;
        }
    }
    Ok(())
}
