//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use karta_core::{Encoding, Format, OperatorCategory, ParsingLevel};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Karta CLI - move knowledge artifacts between representations
///
/// Detects what an artifact is, lifts it from raw bytes to a typed model,
/// lowers it back to any supported surface syntax, translates it into
/// other languages and validates it.
#[derive(Parser, Debug)]
#[command(
    name = "karta",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "KARTA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results (defaults to the configured format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Identify the language, format and encoding of an artifact
    Detect(DetectArgs),

    /// Lift an artifact towards its abstract model
    Lift(LiftArgs),

    /// Lift an artifact and lower it again into a chosen surface syntax
    Lower(LowerArgs),

    /// Translate an artifact into another language
    Translate(TranslateArgs),

    /// Validate one artifact, or several as one composite
    Validate(ValidateArgs),

    /// List the registered operators
    Operators(OperatorsArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the detect command
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Path to the artifact
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for the lift command
#[derive(Parser, Debug)]
pub struct LiftArgs {
    /// Path to the artifact
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Level to lift to
    #[arg(short, long, value_enum, default_value = "abstract")]
    pub level: Level,

    /// Operator property as key=value (repeatable)
    #[arg(short = 'P', long = "property", value_name = "KEY=VALUE")]
    pub properties: Vec<String>,
}

/// Arguments for the lower command
#[derive(Parser, Debug)]
pub struct LowerArgs {
    /// Path to the artifact
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Level to lower to
    #[arg(short, long, value_enum, default_value = "serialized")]
    pub level: Level,

    /// Surface syntax of the result
    #[arg(short, long, value_enum)]
    pub format: Option<SurfaceFormat>,

    /// Transport encoding of the result (encoded level only)
    #[arg(short, long, value_enum)]
    pub encoding: Option<TransportEncoding>,

    /// Operator property as key=value (repeatable)
    #[arg(short = 'P', long = "property", value_name = "KEY=VALUE")]
    pub properties: Vec<String>,

    /// Write the lowered artifact to a file instead of stdout
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the translate command
#[derive(Parser, Debug)]
pub struct TranslateArgs {
    /// Path to the artifact
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Target language, e.g. plan-definition
    #[arg(short, long, value_name = "LANGUAGE")]
    pub into: String,

    /// Surface syntax of the translated artifact
    #[arg(short, long, value_enum)]
    pub format: Option<SurfaceFormat>,

    /// Operator property as key=value (repeatable)
    #[arg(short = 'P', long = "property", value_name = "KEY=VALUE")]
    pub properties: Vec<String>,

    /// Write the translated artifact to a file instead of stdout
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Artifacts to validate; several files are validated as one composite
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Lowest finding severity that makes the command fail
    #[arg(long, value_enum, default_value = "error")]
    pub fail_on: FailOn,

    /// Operator property as key=value (repeatable)
    #[arg(short = 'P', long = "property", value_name = "KEY=VALUE")]
    pub properties: Vec<String>,
}

/// Arguments for the operators command
#[derive(Parser, Debug)]
pub struct OperatorsArgs {
    /// Only list operators of this category
    #[arg(long, value_enum)]
    pub category: Option<Category>,

    /// Only list operators handling this language (agnostic ones included)
    #[arg(long, value_name = "LANGUAGE")]
    pub language: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// Write a configuration file with default values
    Init(ConfigInitArgs),

    /// Print the configuration file locations that are searched
    Path,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file (defaults to the user config directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Parsing levels
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Level {
    /// Raw bytes
    Encoded,
    /// Text
    Serialized,
    /// Document tree
    Concrete,
    /// Typed model
    Abstract,
}

/// Surface syntaxes the reference parsers write
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SurfaceFormat {
    Json,
    Yaml,
}

/// Transport encodings
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TransportEncoding {
    Identity,
    Base64,
}

/// Operator categories
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Category {
    Detector,
    Parser,
    Validator,
    Translator,
}

/// Severity threshold for the validate command
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    /// Fail on informational findings and worse
    Info,
    /// Fail on rule violations and worse
    Error,
    /// Fail only when an artifact is unusable
    Fatal,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl From<Level> for ParsingLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Encoded => ParsingLevel::Encoded,
            Level::Serialized => ParsingLevel::Serialized,
            Level::Concrete => ParsingLevel::Concrete,
            Level::Abstract => ParsingLevel::Abstract,
        }
    }
}

impl From<SurfaceFormat> for Format {
    fn from(format: SurfaceFormat) -> Self {
        match format {
            SurfaceFormat::Json => Format::Json,
            SurfaceFormat::Yaml => Format::Yaml,
        }
    }
}

impl From<TransportEncoding> for Encoding {
    fn from(encoding: TransportEncoding) -> Self {
        match encoding {
            TransportEncoding::Identity => Encoding::Identity,
            TransportEncoding::Base64 => Encoding::Base64,
        }
    }
}

impl From<Category> for OperatorCategory {
    fn from(category: Category) -> Self {
        match category {
            Category::Detector => OperatorCategory::Detector,
            Category::Parser => OperatorCategory::Parser,
            Category::Validator => OperatorCategory::Validator,
            Category::Translator => OperatorCategory::Translator,
        }
    }
}

impl From<FailOn> for karta_core::Severity {
    fn from(threshold: FailOn) -> Self {
        match threshold {
            FailOn::Info => karta_core::Severity::Info,
            FailOn::Error => karta_core::Severity::Error,
            FailOn::Fatal => karta_core::Severity::Fatal,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["karta", "-vv", "detect", "loan.yaml"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["karta", "--quiet", "detect", "loan.yaml"]);
        assert_eq!(cli.verbosity_level(), 0);

        let result = Cli::try_parse_from(["karta", "-v", "-q", "detect", "loan.yaml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_lower_arguments() {
        let cli = Cli::parse_from([
            "karta", "lower", "loan.yaml", "--level", "encoded", "--format", "yaml", "--encoding", "base64",
            "-P", "pretty=false",
        ]);
        match cli.command {
            Commands::Lower(args) => {
                assert_eq!(ParsingLevel::from(args.level), ParsingLevel::Encoded);
                assert_eq!(args.format.map(Format::from), Some(Format::Yaml));
                assert_eq!(args.encoding.map(Encoding::from), Some(Encoding::Base64));
                assert_eq!(args.properties, vec!["pretty=false".to_string()]);
            }
            other => panic!("expected lower, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_takes_several_files() {
        let cli = Cli::parse_from(["karta", "-o", "json", "validate", "case.json", "loan.yaml"]);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.fail_on, FailOn::Error);
            }
            other => panic!("expected validate, got {:?}", other),
        }

        assert!(Cli::try_parse_from(["karta", "validate"]).is_err());
    }

    #[test]
    fn test_translate_requires_target() {
        assert!(Cli::try_parse_from(["karta", "translate", "loan.yaml"]).is_err());
        let cli = Cli::parse_from(["karta", "translate", "loan.yaml", "--into", "plan-definition"]);
        assert!(matches!(cli.command, Commands::Translate(args) if args.into == "plan-definition"));
    }
}
