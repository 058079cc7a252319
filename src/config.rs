//! Configuration - loaded from .toolbelt.yml or ~/.config/toolbelt/toolbelt.yml

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::agent::DEFAULT_MAX_TURNS;
use crate::genai::gemini::{DEFAULT_API_KEY_FILE, DEFAULT_BASE_URL};
use crate::genai::{DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_MODEL, GeminiClient, GeminiConfig, GenerativeClient};
use crate::tools::{DEFAULT_MAX_TREE_DEPTH, ToolContext};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub genai: GenAiConfig,
    pub tools: ToolsConfig,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenAiConfig {
    pub base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub api_key_file: PathBuf,
    pub timeout_ms: u64,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            api_key_file: PathBuf::from(DEFAULT_API_KEY_FILE),
            timeout_ms: 300_000, // 5 minutes
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Base directory for relative tool paths; the working directory when unset
    pub root: Option<PathBuf>,
    pub max_tree_depth: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            root: None,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub max_turns: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .toolbelt.yml in current directory
    /// 3. ~/.config/toolbelt/toolbelt.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(".toolbelt.yml");
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from .toolbelt.yml");
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load .toolbelt.yml: {}", e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("toolbelt").join("toolbelt.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.agent.max_turns == 0 {
            eyre::bail!("agent.max_turns must be > 0");
        }
        if self.genai.timeout_ms == 0 {
            eyre::bail!("genai.timeout_ms must be > 0");
        }
        if self.genai.chat_model.trim().is_empty() {
            eyre::bail!("genai.chat_model must not be empty");
        }
        if self.genai.image_model.trim().is_empty() {
            eyre::bail!("genai.image_model must not be empty");
        }
        Ok(())
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            base_url: self.genai.base_url.clone(),
            model: self.genai.chat_model.clone(),
            api_key_file: self.genai.api_key_file.clone(),
            timeout: Duration::from_millis(self.genai.timeout_ms),
        }
    }

    /// Gemini client with the configured key, model and timeout
    pub fn gemini_client(&self) -> Result<Arc<dyn GenerativeClient>> {
        let client = GeminiClient::new(self.gemini_config()).context("Failed to create Gemini client")?;
        Ok(Arc::new(client))
    }

    /// Tool context rooted at `tools.root` (or the working directory), without a client
    pub fn tool_context(&self) -> Result<ToolContext> {
        let root = match &self.tools.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };

        Ok(ToolContext::new(root)
            .with_image_model(&self.genai.image_model)
            .with_max_tree_depth(self.tools.max_tree_depth))
    }
}
