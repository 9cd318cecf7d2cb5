//! Flat key-value configuration.
//!
//! The daemon reads a properties-style file (`key = value`, `#` comments)
//! and exposes typed accessors over it. Submodules:
//! - [`keys`]: the [`Key`] enum naming every recognized property
//! - [`defaults`]: the commented template written on first run
//! - [`validation`]: collect-all validation run before connecting

mod defaults;
mod keys;
mod validation;

pub use defaults::DEFAULT_CONFIG;
pub use keys::Key;
pub use validation::{validate, ValidationError};

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing configuration key: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// An immutable snapshot of the configuration file.
#[derive(Debug, Clone)]
pub struct Config {
    values: HashMap<String, String>,
}

impl Config {
    /// Load the file, or write the default template and return `None` if
    /// it does not exist yet (first run; the caller exits cleanly so the
    /// operator can edit the template).
    pub fn bootstrap(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            std::fs::write(path, DEFAULT_CONFIG)?;
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Load and parse an existing configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse_str(&text))
    }

    /// Parse configuration text. Unparseable lines are skipped; validation
    /// reports anything that is missing afterwards.
    pub fn parse_str(text: &str) -> Self {
        let mut values = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                values.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Self { values }
    }

    fn raw(&self, key: Key) -> Result<&str, ConfigError> {
        self.values
            .get(key.name())
            .map(String::as_str)
            .ok_or(ConfigError::Missing(key.name()))
    }

    /// String accessor.
    pub fn str(&self, key: Key) -> Result<&str, ConfigError> {
        self.raw(key)
    }

    /// Integer accessor (covers both the int- and long-sized settings).
    pub fn int(&self, key: Key) -> Result<i64, ConfigError> {
        let value = self.raw(key)?;
        value.parse().map_err(|_| ConfigError::Invalid {
            key: key.name(),
            value: value.to_string(),
            reason: "expected an integer".into(),
        })
    }

    /// Boolean accessor; accepts `true` / `false` in any case.
    pub fn flag(&self, key: Key) -> Result<bool, ConfigError> {
        let value = self.raw(key)?;
        if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ConfigError::Invalid {
                key: key.name(),
                value: value.to_string(),
                reason: "expected true or false".into(),
            })
        }
    }

    /// Comma-separated string list, entries trimmed, empties dropped.
    pub fn list(&self, key: Key) -> Result<Vec<String>, ConfigError> {
        Ok(self
            .raw(key)?
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Comma-separated id list. A list whose first element is `-1`
    /// normalizes to the empty list, the "no restriction" convention for
    /// bypass rules.
    pub fn ids(&self, key: Key) -> Result<Vec<i64>, ConfigError> {
        let mut ids = Vec::new();
        for part in self.list(key)? {
            let id = part.parse().map_err(|_| ConfigError::Invalid {
                key: key.name(),
                value: part.clone(),
                reason: "expected an integer list".into(),
            })?;
            ids.push(id);
        }
        if ids.first() == Some(&-1) {
            ids.clear();
        }
        Ok(ids)
    }
}
