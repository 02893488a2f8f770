//! Configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Tracker (Jira) configuration
    pub jira: JiraConfig,

    /// Router behavior configuration
    pub router: RouterConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        if std::env::var(&self.jira.api_token_env).is_err() {
            return Err(eyre::eyre!(
                "Jira API token not found. Set the {} environment variable.",
                self.jira.api_token_env
            ));
        }
        if self.jira.base_url.is_empty() {
            return Err(eyre::eyre!("Jira base URL is not configured"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .issuepilot.yml
        let local_config = PathBuf::from(".issuepilot.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/issuepilot/issuepilot.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("issuepilot").join("issuepilot.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("anthropic" or "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .map_err(|_| eyre::eyre!("Environment variable {} is not set", self.api_key_env))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

/// Tracker (Jira) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Base URL of the Jira instance
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable containing the API token
    #[serde(rename = "api-token-env")]
    pub api_token_env: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl JiraConfig {
    /// Read the API token from the configured environment variable
    pub fn get_api_token(&self) -> Result<String> {
        std::env::var(&self.api_token_env)
            .map_err(|_| eyre::eyre!("Environment variable {} is not set", self.api_token_env))
    }
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token_env: "JIRA_API_TOKEN".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Router behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Recognized project key prefixes (e.g. ["PROJ", "OPS"])
    pub projects: Vec<String>,

    /// Conversation window size in turns; history is cleared at 2x this
    #[serde(rename = "max-history")]
    pub max_history: usize,

    /// Questions at or under this word count are classified with history
    #[serde(rename = "followup-word-limit")]
    pub followup_word_limit: usize,

    /// Classifications scoring below this are treated as read-only insight
    #[serde(rename = "confidence-threshold")]
    pub confidence_threshold: f64,

    /// Allow posting generated comments to the tracker
    #[serde(rename = "write-comments")]
    pub write_comments: bool,

    /// Require an explicit yes before posting a generated comment
    #[serde(rename = "require-confirmation")]
    pub require_confirmation: bool,

    /// Directory of prompt template overrides (falls back to embedded)
    #[serde(rename = "prompt-dir")]
    pub prompt_dir: Option<PathBuf>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            projects: Vec::new(),
            max_history: 10,
            followup_word_limit: 5,
            confidence_threshold: 0.6,
            write_comments: false,
            require_confirmation: true,
            prompt_dir: None,
        }
    }
}
