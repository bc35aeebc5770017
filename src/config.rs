//! Configuration for rtlgen.
//!
//! Loaded from YAML with a fallback chain:
//! 1. Explicit path if provided
//! 2. .rtlgen.yml in current directory (project config)
//! 3. ~/.config/rtlgen/rtlgen.yml (user config)
//! 4. Defaults
//!
//! The system and reflection directives are externally supplied and have
//! no built-in defaults; validation fails fast when they are missing.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Prompt directives fed to the model.
    pub prompts: PromptsConfig,

    /// LLM settings.
    pub llm: LlmSettings,

    /// Tool service settings.
    pub service: ServiceConfig,

    /// Retrieval settings.
    pub rag: RagConfig,
}

impl Config {
    /// Load configuration with the fallback chain.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(".rtlgen.yml");
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from .rtlgen.yml");
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load .rtlgen.yml: {}", e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("rtlgen").join("rtlgen.yml");
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
        Ok(config)
    }

    /// Validate the prompt directives needed by the generation modes.
    pub fn validate_prompts(&self) -> Result<()> {
        if self.prompts.system.trim().is_empty() {
            eyre::bail!("prompts.system must be set");
        }
        if self.prompts.reflection.trim().is_empty() {
            eyre::bail!("prompts.reflection must be set");
        }
        Ok(())
    }
}

/// Externally supplied prompt directives.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// System directive seeding every conversation.
    pub system: String,

    /// Reflection directive prefixed to failure output.
    pub reflection: String,
}

/// LLM settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Model name.
    pub model: String,

    /// Max tokens per completion.
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Timeout per LLM call in milliseconds.
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 8192,
            timeout_ms: 300_000,
        }
    }
}

/// Tool service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the service listens on / clients connect to.
    pub addr: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:7171".to_string(),
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RagConfig {
    /// Path of the reference-design store.
    #[serde(rename = "store-path")]
    pub store_path: PathBuf,

    /// Embedding model name.
    #[serde(rename = "embedding-model")]
    pub embedding_model: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("rag/designs.db"),
            embedding_model: "text-embedding-3-small".to_string(),
        }
    }
}
