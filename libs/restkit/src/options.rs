//! restkit module options.

use std::collections::HashMap;

use restkit_errors::HttpErrorKind;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigProvider, section_or_default};

/// Configuration section holding the module options.
pub const CONFIG_KEY: &str = "restkit";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleOptions {
    /// Domain error key -> HTTP error kind used by the exception listener.
    pub exception_map: HashMap<String, HttpErrorKind>,
    pub register_http_method_override_listener: bool,
}

impl ModuleOptions {
    #[must_use]
    pub fn exception_map(&self) -> &HashMap<String, HttpErrorKind> {
        &self.exception_map
    }

    #[must_use]
    pub fn register_http_method_override_listener(&self) -> bool {
        self.register_http_method_override_listener
    }
}

/// Builds [`ModuleOptions`] from the host configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleOptionsFactory;

impl ModuleOptionsFactory {
    /// Reads the [`CONFIG_KEY`] section. A missing section yields default options.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidConfig` if the section cannot be deserialized.
    pub fn create(provider: &dyn ConfigProvider) -> Result<ModuleOptions, ConfigError> {
        let options: ModuleOptions = section_or_default(provider, CONFIG_KEY)?;
        tracing::debug!(
            mapped_errors = options.exception_map.len(),
            method_override = options.register_http_method_override_listener,
            "restkit module options loaded"
        );
        Ok(options)
    }
}
