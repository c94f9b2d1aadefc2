//! Configuration loader for Chatrelay.
//!
//! Reads `config.toml` from the given path and deserializes it into
//! [`RelayConfig`], falling back to defaults when the file is missing or
//! malformed. Environment variables override file values so deployments can
//! configure the server without touching disk.

use std::path::Path;

use chatrelay_types::config::RelayConfig;

/// Load configuration from a `config.toml` file.
///
/// - If the file does not exist, returns [`RelayConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the
///   default.
/// - Environment overrides are applied on top in both cases.
pub async fn load_config(config_path: &Path) -> RelayConfig {
    let mut config = read_config_file(config_path).await;
    apply_env_overrides(&mut config);
    config
}

async fn read_config_file(config_path: &Path) -> RelayConfig {
    let content = match tokio::fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return RelayConfig::default();
        }
        Err(err) => {
            tracing::warn!(
                "Failed to read {}: {err}, using defaults",
                config_path.display()
            );
            return RelayConfig::default();
        }
    };

    match toml::from_str::<RelayConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            RelayConfig::default()
        }
    }
}

/// Apply environment variable overrides.
///
/// `CHATRELAY_HOST`, `CHATRELAY_PORT`, `CHATRELAY_DATABASE_URL` and
/// `CHATRELAY_ALLOWED_ORIGINS` override the server section;
/// `OPENROUTER_API_KEY` and `OPENROUTER_BASE_URL` override the upstream
/// section.
fn apply_env_overrides(config: &mut RelayConfig) {
    if let Ok(host) = std::env::var("CHATRELAY_HOST") {
        config.host = host;
    }
    if let Ok(port) = std::env::var("CHATRELAY_PORT") {
        match port.parse::<u16>() {
            Ok(port) => config.port = port,
            Err(_) => tracing::warn!("Ignoring non-numeric CHATRELAY_PORT: {port}"),
        }
    }
    if let Ok(url) = std::env::var("CHATRELAY_DATABASE_URL") {
        config.database_url = url;
    }
    if let Ok(origins) = std::env::var("CHATRELAY_ALLOWED_ORIGINS") {
        config.allowed_origins = origins;
    }
    if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
        config.openrouter.api_key = key;
    }
    if let Ok(base_url) = std::env::var("OPENROUTER_BASE_URL") {
        config.openrouter.base_url = base_url;
    }
}
