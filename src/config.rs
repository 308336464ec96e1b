use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_DEPLOYMENT: &str = "gpt-35-turbo";
pub const DEFAULT_API_VERSION: &str = "2024-05-01-preview";
pub const DEFAULT_PORT: u16 = 3000;

/// An access key. Never printed, never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Everything the completion gateway needs to reach the hosted service and
/// the search index it grounds against.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub deployment: String,
    pub api_version: String,
    pub api_key: Secret,
    pub search_endpoint: String,
    pub search_index: String,
    pub search_key: Secret,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub gateway: GatewayConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Blank
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let timeout = match get("GATEWAY_TIMEOUT_MS") {
            Some(value) => Some(Duration::from_millis(value.parse::<u64>().map_err(|_| {
                ConfigError::Invalid {
                    name: "GATEWAY_TIMEOUT_MS",
                    value,
                }
            })?)),
            None => None,
        };

        let gateway = GatewayConfig {
            endpoint: require("ENDPOINT_URL")?,
            deployment: get("DEPLOYMENT_NAME").unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string()),
            api_version: get("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            api_key: Secret::new(require("AZURE_OPENAI_API_KEY")?),
            search_endpoint: require("SEARCH_ENDPOINT")?,
            search_index: require("SEARCH_INDEX_NAME")?,
            search_key: Secret::new(require("SEARCH_KEY")?),
            timeout,
        };

        Ok(Self { port, gateway })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("ENDPOINT_URL", "https://example.openai.azure.com/"),
            ("AZURE_OPENAI_API_KEY", "service-key"),
            ("SEARCH_ENDPOINT", "https://example.search.windows.net"),
            ("SEARCH_INDEX_NAME", "docs"),
            ("SEARCH_KEY", "search-key"),
        ]
    }

    #[test]
    fn loads_required_values_and_defaults() {
        let env = vars(&required());
        let cfg = AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap();

        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.gateway.deployment, DEFAULT_DEPLOYMENT);
        assert_eq!(cfg.gateway.api_version, DEFAULT_API_VERSION);
        assert_eq!(cfg.gateway.search_index, "docs");
        assert_eq!(cfg.gateway.api_key.expose(), "service-key");
        assert_eq!(cfg.gateway.timeout, None);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let mut pairs = required();
        pairs.retain(|(k, _)| *k != "SEARCH_KEY");
        let env = vars(&pairs);

        let err = AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SEARCH_KEY"));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut pairs = required();
        pairs.push(("AZURE_OPENAI_API_KEY", "   "));
        let env = vars(&pairs);

        let err = AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert_eq!(err, ConfigError::Missing("AZURE_OPENAI_API_KEY"));
    }

    #[test]
    fn parses_port_and_timeout() {
        let mut pairs = required();
        pairs.push(("PORT", "8081"));
        pairs.push(("GATEWAY_TIMEOUT_MS", "2500"));
        let env = vars(&pairs);

        let cfg = AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.gateway.timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn rejects_unparsable_port() {
        let mut pairs = required();
        pairs.push(("PORT", "eighty"));
        let env = vars(&pairs);

        let err = AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn debug_output_hides_keys() {
        let env = vars(&required());
        let cfg = AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap();

        let printed = format!("{cfg:?}");
        assert!(!printed.contains("service-key"));
        assert!(!printed.contains("search-key"));
        assert!(printed.contains("[redacted]"));
    }
}
