//! # Singleton Configuration
//!
//! Diagnostic naming and reporting switches. Loaded once at startup, usually
//! from a TOML table:
//!
//! ```toml
//! name_suffix = " (Singleton)"
//! report_post_shutdown_access = true
//! report_duplicates = true
//! ```

use serde::Deserialize;

use crate::error::{SingletonError, SingletonResult};

/// Suffix appended to the type name of objects created on demand.
pub const DEFAULT_NAME_SUFFIX: &str = " (Singleton)";

/// Accessor configuration shared by every slot of a registry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SingletonConfig {
    /// Appended to the behaviour type name when naming created objects.
    pub name_suffix: String,
    /// Emit a warning each time the accessor is used after shutdown.
    pub report_post_shutdown_access: bool,
    /// Emit an error when lookup finds more than one live instance.
    pub report_duplicates: bool,
}

impl Default for SingletonConfig {
    fn default() -> Self {
        Self {
            name_suffix: DEFAULT_NAME_SUFFIX.to_owned(),
            report_post_shutdown_access: true,
            report_duplicates: true,
        }
    }
}

impl SingletonConfig {
    /// Parses a configuration from TOML text. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SingletonError::InvalidConfig`] if the text is not valid TOML
    /// or contains unknown keys.
    pub fn from_toml_str(text: &str) -> SingletonResult<Self> {
        toml::from_str(text).map_err(|e| SingletonError::InvalidConfig(e.to_string()))
    }

    /// Diagnostic name for an object created for `type_name`.
    #[must_use]
    pub fn object_name(&self, type_name: &str) -> String {
        format!("{type_name}{}", self.name_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SingletonConfig::default();
        assert_eq!(config.object_name("Foo"), "Foo (Singleton)");
        assert!(config.report_post_shutdown_access);
        assert!(config.report_duplicates);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SingletonConfig::from_toml_str("report_duplicates = false").unwrap();
        assert!(!config.report_duplicates);
        assert_eq!(config.name_suffix, DEFAULT_NAME_SUFFIX);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let err = SingletonConfig::from_toml_str("name_suffix = 3").unwrap_err();
        assert!(matches!(err, SingletonError::InvalidConfig(_)));

        let err = SingletonConfig::from_toml_str("bogus = true").unwrap_err();
        assert!(matches!(err, SingletonError::InvalidConfig(_)));
    }
}
