//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Environment variables
//! - Command-line arguments

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::logging::LogFormat;
use clap::ValueEnum;
use karta_core::{OperatorCategory, Properties};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LogSettings,

    /// Default properties handed to operators, per category
    pub operators: OperatorDefaults,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format: human, json, json-pretty or yaml
    pub format: String,

    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration as written in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log level filter, used when no `-v` is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Log format (compact, full, json)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<LogFormat>,

    /// Log file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Include timestamps
    pub timestamps: bool,

    /// Include thread IDs
    pub thread_ids: bool,

    /// Per-module levels, e.g. `karta_core: debug`
    pub modules: BTreeMap<String, String>,
}

/// Operator properties applied before any `-P key=value` on the command line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorDefaults {
    pub parser: Properties,
    pub validator: Properties,
    pub translator: Properties,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
            progress: true,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: None,
            format: None,
            file: None,
            timestamps: true,
            thread_ids: false,
            modules: BTreeMap::new(),
        }
    }
}

/// Serialization of a configuration file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Yaml,
    Toml,
}

impl FileFormat {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("toml") => FileFormat::Toml,
            _ => FileFormat::Json,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match FileFormat::of(path) {
            FileFormat::Yaml => serde_yaml::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)?,
            FileFormat::Json => serde_json::from_str(&content)?,
        };

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Every existing file is read, lowest precedence first, and merged
    /// over the defaults: project files win over user files.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        for path in Self::default_config_paths().into_iter().rev() {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(found) => {
                    tracing::debug!(path = %path.display(), "Loaded configuration");
                    config.merge(found);
                }
                Err(e) => {
                    eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                }
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file or default locations,
    /// then apply environment overrides
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = file {
            Self::from_file(path)?
        } else {
            Self::load()?
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Default configuration file paths, highest precedence first
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".karta.yaml"),
            PathBuf::from(".karta.toml"),
            PathBuf::from(".karta.json"),
        ];

        if let Some(path) = Self::user_config_path() {
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            paths.push(path);
            paths.push(dir.join("config.toml"));
            paths.push(dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".karta.yaml"));
        }

        paths
    }

    /// The user-level configuration file, `~/.config/karta/config.yaml` on Linux
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("karta").join("config.yaml"))
    }

    /// Override settings from `KARTA_*` variables
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(format) = lookup("KARTA_OUTPUT") {
            self.output.format = format;
        }
        if lookup("NO_COLOR").is_some() {
            self.output.color = false;
        }
        if let Some(level) = lookup("KARTA_LOG_LEVEL") {
            self.logging.level = Some(level);
        }
    }

    /// Merge with another config (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        self.output = other.output;
        self.logging.level = other.logging.level.or(self.logging.level.take());
        self.logging.format = other.logging.format.or(self.logging.format);
        self.logging.file = other.logging.file.or(self.logging.file.take());
        self.logging.timestamps = other.logging.timestamps;
        self.logging.thread_ids = other.logging.thread_ids;
        self.logging.modules.extend(other.logging.modules);

        self.operators.parser = self.operators.parser.clone().merge(&other.operators.parser);
        self.operators.validator = self.operators.validator.clone().merge(&other.operators.validator);
        self.operators.translator = self.operators.translator.clone().merge(&other.operators.translator);
    }

    /// The configured output format
    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::from_str(&self.output.format, true).map_err(|_| {
            Error::config(format!(
                "Unknown output format '{}' (expected human, json, json-pretty or yaml)",
                self.output.format
            ))
        })
    }

    /// Properties for operators of `category`: configured defaults, then
    /// each `key=value` argument in order
    pub fn operator_properties(&self, category: OperatorCategory, arguments: &[String]) -> Result<Properties> {
        let mut properties = match category {
            OperatorCategory::Parser => self.operators.parser.clone(),
            OperatorCategory::Validator => self.operators.validator.clone(),
            OperatorCategory::Translator => self.operators.translator.clone(),
            OperatorCategory::Detector => Properties::new(),
        };
        for argument in arguments {
            let parsed = Properties::parse(argument)
                .map_err(|e| Error::invalid_args(format!("-P {}: {}", argument, e)))?;
            properties = properties.merge(&parsed);
        }
        Ok(properties)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match FileFormat::of(path) {
            FileFormat::Yaml => serde_yaml::to_string(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)?,
            FileFormat::Json => serde_json::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Builder for creating configurations programmatically
#[allow(dead_code)]
pub struct ConfigBuilder {
    config: Config,
}

#[allow(dead_code)]
impl ConfigBuilder {
    /// Create a new config builder
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the default output format
    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.config.output.format = format.into();
        self
    }

    /// Add a default operator property for a category
    pub fn operator_property(
        mut self,
        category: OperatorCategory,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let slot = match category {
            OperatorCategory::Parser => &mut self.config.operators.parser,
            OperatorCategory::Validator => &mut self.config.operators.validator,
            OperatorCategory::Translator => &mut self.config.operators.translator,
            OperatorCategory::Detector => return self,
        };
        *slot = std::mem::take(slot).with(key, value);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
