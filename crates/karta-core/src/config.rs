//! Operator configuration
//!
//! Operators receive their settings as [`Properties`], a flat string map
//! usually written as `key=value;key2=value2`. Commas and newlines are
//! accepted as separators too, so the same string can come from a command
//! line flag or a small config file section.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Flat key/value configuration handed to every operator call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value` pairs separated by `;`, `,` or newlines
    ///
    /// Blank segments are skipped. Keys and values are trimmed; a later
    /// occurrence of a key replaces an earlier one.
    pub fn parse(input: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for segment in input.split([';', ',', '\n']) {
            let segment = segment.trim();
            if segment.is_empty() || segment.starts_with('#') {
                continue;
            }
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                Error::configuration(format!("Expected 'key=value', found '{}'", segment), None)
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::configuration(
                    format!("Empty key in '{}'", segment),
                    None,
                ));
            }
            entries.insert(key.to_string(), value.trim().to_string());
        }
        Ok(Self { entries })
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Interpret a value as a boolean
    ///
    /// Accepts `true/false`, `yes/no`, `on/off` and `1/0`. Absent keys are
    /// `Ok(None)`; anything else is a configuration error naming the key.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Some(true)),
            "false" | "no" | "off" | "0" => Ok(Some(false)),
            _ => Err(Error::configuration(
                format!("Value '{}' is not a boolean", raw),
                Some(key),
            )),
        }
    }

    /// Parse a value into any `FromStr` type
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>().map_err(|e| {
                    Error::configuration(format!("Invalid value '{}': {}", raw, e), Some(key))
                })
            })
            .transpose()
    }

    /// A `|`-separated list value
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|raw| {
            raw.split('|')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    /// Overlay `other` on top of `self`
    pub fn merge(mut self, other: &Properties) -> Self {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromStr for Properties {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        f.write_str(&pairs.join(";"))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
