//! Typed access to the host configuration.
//!
//! The host hands restkit a [`ConfigProvider`] exposing raw JSON sections.
//! Sections are deserialized on demand:
//!
//! 1. **Lenient loading** ([`section_or_default`]): a missing or `null` section
//!    yields `T::default()`.
//! 2. **Strict loading** ([`section_required`]): the section must be present.
//!
//! In both cases a section that exists but does not deserialize is an error.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::de::DeserializeOwned;

/// Environment variables with this prefix override file values;
/// `__` separates nesting levels (`RESTKIT__RESTKIT__EXCEPTION_MAP`).
pub const ENV_PREFIX: &str = "RESTKIT__";

/// Configuration error for typed config operations
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing config section '{key}'")]
    MissingSection { key: String },
    #[error("invalid config for section '{key}': {source}")]
    InvalidConfig {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// Provider of raw configuration sections.
pub trait ConfigProvider: Send + Sync {
    /// Returns the raw JSON section stored under `key`, if any.
    fn get_section(&self, key: &str) -> Option<&serde_json::Value>;
}

/// Lenient configuration loader that falls back to defaults.
///
/// # Errors
/// Returns `ConfigError::InvalidConfig` if the section exists but cannot be deserialized.
pub fn section_or_default<T: DeserializeOwned + Default>(
    provider: &dyn ConfigProvider,
    key: &str,
) -> Result<T, ConfigError> {
    match provider.get_section(key) {
        None | Some(serde_json::Value::Null) => Ok(T::default()),
        Some(raw) => parse_section(raw, key),
    }
}

/// Strict configuration loader that requires the section to be present.
///
/// # Errors
/// Returns `ConfigError::MissingSection` if the section is absent and
/// `ConfigError::InvalidConfig` if it cannot be deserialized.
pub fn section_required<T: DeserializeOwned>(
    provider: &dyn ConfigProvider,
    key: &str,
) -> Result<T, ConfigError> {
    let raw = provider
        .get_section(key)
        .ok_or_else(|| ConfigError::MissingSection {
            key: key.to_owned(),
        })?;
    parse_section(raw, key)
}

fn parse_section<T: DeserializeOwned>(raw: &serde_json::Value, key: &str) -> Result<T, ConfigError> {
    serde_json::from_value(raw.clone()).map_err(|e| ConfigError::InvalidConfig {
        key: key.to_owned(),
        source: e,
    })
}

/// Configuration provider over an in-memory JSON document.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    root: serde_json::Value,
}

impl StaticConfig {
    #[must_use]
    pub fn new(root: serde_json::Value) -> Self {
        Self { root }
    }

    /// Snapshots an already assembled figment.
    ///
    /// # Errors
    /// Returns `ConfigError::Load` if the figment cannot be extracted.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let root: serde_json::Value = figment.extract().map_err(Box::new)?;
        Ok(Self::new(root))
    }

    /// Loads a YAML file and applies [`ENV_PREFIX`] environment overrides.
    ///
    /// # Errors
    /// Returns `ConfigError::Load` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        tracing::debug!(path = %path.display(), "loading restkit configuration");
        Self::from_figment(&figment)
    }
}

impl ConfigProvider for StaticConfig {
    fn get_section(&self, key: &str) -> Option<&serde_json::Value> {
        self.root.get(key)
    }
}
