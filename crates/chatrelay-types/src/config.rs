//! Server configuration, deserialized from `config.toml` with environment
//! overrides applied by the infra loader.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the relay server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Comma-separated list of allowed CORS origins, or `*` for any.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default)]
    pub openrouter: OpenRouterConfig,
}

/// Upstream completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    #[serde(default = "default_openrouter_base_url")]
    pub base_url: String,

    /// API key; usually supplied via the OPENROUTER_API_KEY environment
    /// variable rather than the config file.
    #[serde(default)]
    pub api_key: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            database_url: default_database_url(),
            openrouter: OpenRouterConfig::default(),
        }
    }
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: default_openrouter_base_url(),
            api_key: String::new(),
        }
    }
}

impl RelayConfig {
    /// Split `allowed_origins` into trimmed entries.
    pub fn origins_list(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> String {
    "http://localhost:5173,http://localhost:3000".to_string()
}

fn default_database_url() -> String {
    "sqlite://chatrelay.db?mode=rwc".to_string()
}

fn default_openrouter_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.openrouter.base_url, "https://openrouter.ai/api/v1");
        assert!(config.openrouter.api_key.is_empty());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
port = 9000

[openrouter]
api_key = "sk-or-test"
"#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.openrouter.api_key, "sk-or-test");
        assert_eq!(config.openrouter.base_url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn test_origins_list_trims_and_splits() {
        let config = RelayConfig {
            allowed_origins: "http://a.test, http://b.test ,".to_string(),
            ..RelayConfig::default()
        };
        assert_eq!(config.origins_list(), vec!["http://a.test", "http://b.test"]);
    }
}
