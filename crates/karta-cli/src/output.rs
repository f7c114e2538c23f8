//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), with dedicated
//! renderings for validation answers, carrier summaries and operator
//! listings.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use karta_core::{Answer, CarrierSummary, Explanation, OperatorDescriptor, Outcome, Severity};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tracing::trace;

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a validation answer with its explanations
    fn format_answer(&self, answer: &Answer<()>) -> Result<String>;

    /// Format the metadata of a carrier
    fn format_summary(&self, summary: &CarrierSummary) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // No dedicated rendering: fall back to pretty JSON
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_answer(&self, answer: &Answer<()>) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_answer_human(answer)),
            _ => self.format(answer),
        }
    }

    fn format_summary(&self, summary: &CarrierSummary) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_summary_human(summary)),
            _ => self.format(summary),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: progress && !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            writer,
        }
    }

    /// Whether results are rendered for people rather than machines
    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write raw bytes, e.g. an encoded artifact
    pub fn write_bytes(&mut self, content: &[u8]) -> Result<()> {
        self.writer.write_all(content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");

        if self.is_human() {
            self.writeln(&formatted)
        } else {
            // For machine formats, write as-is
            self.write(&formatted)
        }
    }

    /// Write a validation answer
    pub fn answer(&mut self, answer: &Answer<()>) -> Result<()> {
        let formatted = self.format.format_answer(answer)?;
        if self.is_human() && self.use_color {
            return self.writeln(&colorize_answer(&formatted, answer));
        }
        self.writeln(formatted.trim_end())
    }

    /// Write the metadata of a carrier
    pub fn carrier_summary(&mut self, summary: &CarrierSummary) -> Result<()> {
        let formatted = self.format.format_summary(summary)?;
        self.writeln(formatted.trim_end())
    }

    /// Write operator descriptors: a table for people, data otherwise
    pub fn operators(&mut self, descriptors: &[OperatorDescriptor]) -> Result<()> {
        if !self.is_human() {
            return self.data(&descriptors);
        }
        let rows = descriptors
            .iter()
            .map(|d| {
                vec![
                    d.category.to_string(),
                    d.name.clone(),
                    d.supported_language
                        .as_ref()
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "*".to_string()),
                    d.from.len().to_string(),
                    d.into.len().to_string(),
                ]
            })
            .collect();
        self.table(&["CATEGORY", "NAME", "LANGUAGE", "FROM", "INTO"], rows)
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        // Calculate column widths
        let mut widths = headers.iter().map(|h| h.len()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i < widths.len() {
                        format!("{:width$}", cell, width = widths[i])
                    } else {
                        cell.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Ok => "✅",
        Severity::Info => "ℹ️",
        Severity::Error => "❌",
        Severity::Fatal => "💥",
    }
}

/// Format a validation answer for human reading
fn format_answer_human(answer: &Answer<()>) -> String {
    let mut output = String::new();

    let failing = answer
        .explanations()
        .iter()
        .filter(|e| e.severity >= Severity::Error)
        .count();
    match answer.outcome() {
        Outcome::Success if failing == 0 => {
            output.push_str(&format!("{} Valid ({})\n", severity_icon(answer.severity()), answer.severity()));
        }
        Outcome::Success => {
            output.push_str(&format!("❌ {} finding(s) at {}\n", failing, answer.severity()));
        }
        Outcome::Failure => {
            let cause = answer
                .failure()
                .map(|f| f.to_string())
                .unwrap_or_else(|| "unknown failure".to_string());
            output.push_str(&format!("💥 Validation could not run: {}\n", cause));
        }
    }

    if !answer.explanations().is_empty() {
        output.push('\n');
    }
    for explanation in answer.explanations() {
        output.push_str(&format_explanation_human(explanation));
        output.push('\n');
    }

    output
}

fn format_explanation_human(explanation: &Explanation) -> String {
    let mut line = format!("  {} ", severity_icon(explanation.severity));
    if let Some(rule) = &explanation.rule {
        line.push_str(&format!("{}: ", rule));
    }
    line.push_str(&explanation.detail);
    line
}

/// Color the headline of an already formatted answer
fn colorize_answer(formatted: &str, answer: &Answer<()>) -> String {
    let (headline, rest) = formatted.split_once('\n').unwrap_or((formatted, ""));
    let headline = match answer.severity() {
        Severity::Ok | Severity::Info => headline.green().bold(),
        Severity::Error => headline.red().bold(),
        Severity::Fatal => headline.red().bold().underline(),
    };
    format!("{}\n{}", headline, rest.trim_end())
}

/// Format a carrier summary for human reading
fn format_summary_human(summary: &CarrierSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("  Level:          {}\n", summary.level));
    output.push_str(&format!("  Representation: {}\n", summary.representation));
    output.push_str(&format!("  Asset:          {}\n", summary.asset_id));
    output.push_str(&format!("  Artifact:       {}\n", summary.artifact_id));
    if let Some(label) = &summary.label {
        output.push_str(&format!("  Label:          {}\n", label));
    }
    if summary.components > 0 {
        output.push_str(&format!("  Components:     {}\n", summary.components));
    }
    if let Some(lineage) = &summary.lineage {
        output.push_str(&format!("  Derived from:   {}\n", lineage.source_artifact));
        output.push_str(&format!("  Operator:       {}\n", lineage.operator));
    }

    output
}

#[cfg(test)]
mod tests {
    include!("output/tests.rs");
}
