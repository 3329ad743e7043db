use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FreddoError, Result};

/// Recipes the assistant knows about, in matching order.
pub const DEFAULT_RECIPES: &[&str] = &[
    "Black Bean Sweet Potato Hash",
    "Matcha Green Tea Oatmeal",
    "Bacon and Egg Breakfast Burrito",
    "Nutella French Toast",
    "Mediterranean Breakfast Plate",
    "Chocolate Mousse",
    "Crème brûlée",
    "Lemon Tart",
    "Tiramisu",
];

/// Top-level configuration for the Freddo backend.
///
/// Loaded from `./freddo.toml` by default. Each section corresponds to one
/// collaborator of the chat service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreddoConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub toolbox: ToolboxConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

impl FreddoConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FreddoConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FreddoError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Listen port. `PORT` and `--port` take precedence.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
        }
    }
}

/// Conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Session key used when a request does not name one.
    pub default_session_key: String,
    /// Idle time after which a session is evicted. 0 disables expiry.
    pub session_ttl_secs: u64,
    /// How often the background sweeper looks for idle sessions.
    pub sweep_interval_secs: u64,
    /// Maximum utterance length in characters.
    pub max_message_chars: usize,
    /// Check agent replies against the listing formats.
    pub validate_format: bool,
    /// Recipe catalog, in matching order.
    pub recipes: Vec<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_session_key: "user-thread-1".to_string(),
            session_ttl_secs: 3600,
            sweep_interval_secs: 60,
            max_message_chars: 4000,
            validate_format: true,
            recipes: DEFAULT_RECIPES.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Hosted chat model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// OpenAI-compatible chat completions endpoint.
    pub endpoint: String,
    /// Model name sent with every request.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Upper bound for one full agent turn, tool calls included.
    pub timeout_secs: u64,
    /// Maximum model/tool round trips per turn.
    pub max_tool_rounds: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
                .to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "FREDDO_MODEL_API_KEY".to_string(),
            timeout_secs: 60,
            max_tool_rounds: 8,
        }
    }
}

/// Remote tool server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolboxConfig {
    /// Base URL of the toolbox server.
    pub url: String,
    /// Named toolset to load. Empty loads the default toolset.
    pub toolset: String,
}

impl Default for ToolboxConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5000".to_string(),
            toolset: String::new(),
        }
    }
}

/// Recipe image collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Root directory of the collection.
    pub dir: String,
    /// Sub-path under `dir` holding the images.
    pub prefix: String,
    /// Maximum number of recipes returned by `/random-recipes`.
    pub sample_size: usize,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            dir: "./data".to_string(),
            prefix: "images/".to_string(),
            sample_size: 10,
        }
    }
}
