mod error;
mod loader;

pub use error::ConfigError;
pub use loader::{ensure_env_loaded, load_config};

use std::env;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://mcp.data.gouv.fr/mcp";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

pub const DEFAULT_SYSTEM_PROMPT: &str = "Tu es un assistant expert en données publiques \
françaises. Tu utilises les outils data.gouv.fr pour rechercher et analyser des jeux de \
données officiels. Réponds en français, de façon claire et structurée. Quand tu trouves des \
datasets pertinents, présente-les avec leurs caractéristiques principales (titre, \
organisation productrice, formats disponibles, date de mise à jour).";

/// Resolved application configuration. Every field has a default; only the
/// Gemini API key must come from the environment or the config file.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub system_prompt: String,
    pub max_tool_rounds: usize,
    pub catalog_ttl: Duration,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tool_rounds: crate::application::agent::DEFAULT_MAX_TOOL_ROUNDS,
            catalog_ttl: crate::application::tooling::DEFAULT_CATALOG_TTL,
            request_timeout: crate::infrastructure::mcp::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Config file value first, then the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| env::var(GEMINI_API_KEY_VAR).ok())
            .filter(|key| !key.trim().is_empty())
    }
}
