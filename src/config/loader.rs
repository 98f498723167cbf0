use super::AppConfig;
use super::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use std::time::Duration;
use tracing::debug;

const CONFIG_PATH: &str = "assistant.toml";

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML. Every field is
/// optional; missing ones fall back to the built-in defaults.
#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    endpoint: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    system_prompt: Option<String>,
    max_tool_rounds: Option<usize>,
    catalog_ttl_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

/// Loads environment variables from a local .env once per process.
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

/// Load configuration. An explicit path must exist; the default path is
/// optional and its absence means "use the defaults".
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    match path {
        Some(path) => read_config(path),
        None => {
            let default_path = Path::new(CONFIG_PATH);
            if default_path.exists() {
                read_config(default_path)
            } else {
                debug!("No configuration file, using defaults");
                Ok(AppConfig::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(build(parsed))
}

fn build(raw: RawConfig) -> AppConfig {
    let defaults = AppConfig::default();
    AppConfig {
        endpoint: raw.endpoint.unwrap_or(defaults.endpoint),
        model: raw.model.unwrap_or(defaults.model),
        api_key: raw.api_key,
        system_prompt: raw.system_prompt.unwrap_or(defaults.system_prompt),
        max_tool_rounds: raw.max_tool_rounds.unwrap_or(defaults.max_tool_rounds),
        catalog_ttl: raw
            .catalog_ttl_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.catalog_ttl),
        request_timeout: raw
            .request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_ENDPOINT, DEFAULT_MODEL};

    #[test]
    fn empty_config_uses_defaults() {
        let config = build(RawConfig::default());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tool_rounds, 10);
        assert_eq!(config.catalog_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn configured_fields_override_defaults() {
        let raw: RawConfig = toml::from_str(
            r#"
            endpoint = "http://localhost:9000/mcp"
            model = "gemini-2.5-pro"
            max_tool_rounds = 4
            catalog_ttl_secs = 60
            request_timeout_secs = 5
            "#,
        )
        .expect("parse raw config");
        let config = build(raw);
        assert_eq!(config.endpoint, "http://localhost:9000/mcp");
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.max_tool_rounds, 4);
        assert_eq!(config.catalog_ttl, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/assistant.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }
}
