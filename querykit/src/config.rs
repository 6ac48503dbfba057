//! Client configuration loaded from TOML.
//!
//! ```toml
//! [query]
//! warn_on_registry_miss = true
//!
//! [endpoints]
//! Game = "games"
//! Artwork = "${ARTWORK_ENDPOINT}"
//! ```
//!
//! Endpoint values of the form `${VAR}` are replaced by the environment
//! variable's value when the config is loaded.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, RegistryMiss};
use crate::types::Queryable;

static WARN_ON_REGISTRY_MISS: AtomicBool = AtomicBool::new(true);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub query: QueryConfig,
    /// Endpoint overrides keyed by model type name.
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Log registry misses at `warn` level; `debug` otherwise.
    #[serde(default = "default_warn_on_registry_miss")]
    pub warn_on_registry_miss: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            warn_on_registry_miss: default_warn_on_registry_miss(),
        }
    }
}

fn default_warn_on_registry_miss() -> bool {
    true
}

impl QueryConfig {
    /// Apply these settings process-wide.
    pub fn install(&self) {
        WARN_ON_REGISTRY_MISS.store(self.warn_on_registry_miss, Ordering::Relaxed);
    }

    /// The settings currently installed.
    pub fn installed() -> Self {
        Self {
            warn_on_registry_miss: WARN_ON_REGISTRY_MISS.load(Ordering::Relaxed),
        }
    }
}

impl ClientConfig {
    /// Parse a config document and expand `${VAR}` endpoint values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: ClientConfig = toml::from_str(content)?;
        for value in config.endpoints.values_mut() {
            *value = expand_env(value)?;
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("loading client config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Override the endpoint for the model named `model`.
    pub fn with_endpoint(mut self, model: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.endpoints.insert(model.into(), endpoint.into());
        self
    }

    /// Endpoint for `M`: the configured override, else the one declared on the model.
    pub fn endpoint_for<M: Queryable>(&self) -> Option<&str> {
        let descriptor = M::descriptor();
        self.endpoints
            .get(descriptor.model)
            .map(String::as_str)
            .or(descriptor.endpoint)
    }
}

/// Expand a value of the form `${VAR}`; anything else is returned unchanged.
fn expand_env(value: &str) -> Result<String, ConfigError> {
    match value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        Some(var) => std::env::var(var).map_err(|_| ConfigError::MissingEnv { var: var.to_string() }),
        None => Ok(value.to_string()),
    }
}

pub(crate) fn report_registry_miss(miss: &RegistryMiss) {
    if WARN_ON_REGISTRY_MISS.load(Ordering::Relaxed) {
        log::warn!("{miss}; the clause fragment will be omitted");
    } else {
        log::debug!("{miss}; the clause fragment will be omitted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_sections_are_missing() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert!(config.query.warn_on_registry_miss);
        assert!(config.endpoints.is_empty());
    }

    #[test]
    fn parses_query_settings_and_endpoints() {
        let config = ClientConfig::from_toml_str(
            r#"
            [query]
            warn_on_registry_miss = false

            [endpoints]
            Game = "games/v2"
            "#,
        )
        .unwrap();
        assert!(!config.query.warn_on_registry_miss);
        assert_eq!(config.endpoints.get("Game").map(String::as_str), Some("games/v2"));
    }

    #[test]
    fn expands_environment_variables() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("QUERYKIT_TEST_ARTWORK_ENDPOINT", "artworks_mirror") };
        let config = ClientConfig::from_toml_str(
            r#"
            [endpoints]
            Artwork = "${QUERYKIT_TEST_ARTWORK_ENDPOINT}"
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoints["Artwork"], "artworks_mirror");
    }

    #[test]
    fn missing_environment_variable_is_an_error() {
        let err = ClientConfig::from_toml_str(
            r#"
            [endpoints]
            Artwork = "${QUERYKIT_TEST_UNSET_VARIABLE}"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv { ref var } if var == "QUERYKIT_TEST_UNSET_VARIABLE"));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = ClientConfig::from_toml_str("[endpoints\nGame = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn config_serialization() {
        let config = ClientConfig::default().with_endpoint("Game", "games");
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("warn_on_registry_miss"));
        assert!(toml_str.contains("Game = \"games\""));
    }
}
