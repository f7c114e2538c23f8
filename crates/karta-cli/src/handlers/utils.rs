//! Shared utilities for command handlers

use crate::error::{Error, Result};
use crate::output::OutputWriter;
use karta_core::{Carrier, Kernel, ParsingLevel, Payload, Properties};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a file as an encoded carrier labelled with its path
pub fn read_artifact(path: &Path) -> Result<Carrier> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "read artifact");
    Ok(Carrier::encoded(bytes).with_label(path.display().to_string()))
}

/// Read a file and lift it to `target`
///
/// Input no detector recognises is reported against the file rather than
/// as a dispatch failure.
pub fn lift_artifact(kernel: &Kernel, path: &Path, target: ParsingLevel, properties: &Properties) -> Result<Carrier> {
    let carrier = detected_artifact(kernel, path)?;
    let hint = carrier.representation().language_only();
    Ok(kernel.lift_to(carrier, target, &hint, properties)?)
}

/// Read a file and tag it with the detected representation
pub fn detected_artifact(kernel: &Kernel, path: &Path) -> Result<Carrier> {
    let carrier = read_artifact(path)?;
    let detected = kernel.detect_carrier(&carrier).ok_or_else(|| Error::Unrecognized {
        path: path.to_path_buf(),
    })?;
    Ok(carrier.with_representation(detected))
}

/// A JSON rendering of a carrier's payload
///
/// Bytes are reported by size; a model is lowered to its document tree.
pub fn payload_value(kernel: &Kernel, carrier: &Carrier) -> Result<Value> {
    Ok(match carrier.payload() {
        Payload::Encoded(bytes) => json!({ "bytes": bytes.len() }),
        Payload::Serialized(text) => Value::String(text.clone()),
        Payload::Concrete(tree) => tree.clone(),
        Payload::Abstract(_) => {
            let tree = kernel.lower(carrier.clone(), ParsingLevel::Concrete)?;
            tree.as_tree().cloned().unwrap_or(Value::Null)
        }
    })
}

/// Write a lowered artifact to `save_to`, or to the output
pub fn write_artifact(output: &mut OutputWriter, carrier: &Carrier, save_to: Option<&Path>) -> Result<()> {
    let content: Vec<u8> = match carrier.payload() {
        Payload::Encoded(bytes) => bytes.clone(),
        Payload::Serialized(text) => text.clone().into_bytes(),
        Payload::Concrete(tree) => serde_json::to_vec_pretty(tree)?,
        Payload::Abstract(_) => {
            return Err(Error::invalid_args(
                "an abstract model has no surface syntax; lower it first",
            ))
        }
    };

    match save_to {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &content)?;
            output.success(&format!(
                "✓ Wrote {} ({}) to {}",
                carrier.representation(),
                carrier.level(),
                path.display()
            ))
        }
        None => {
            output.write_bytes(&content)?;
            if !content.ends_with(b"\n") && carrier.level() != ParsingLevel::Encoded {
                output.write("\n")?;
            }
            Ok(())
        }
    }
}
