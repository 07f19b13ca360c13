//! Settings for renter-aid.
//!
//! Defaults, then an optional YAML file, then environment overrides.
//! The environment names match what OpenAI-compatible tooling already
//! exports (`OPENAI_API_KEY`, `OPENAI_API_BASE`, `OPENAI_MODEL`), plus
//! `LLM_MODE` to switch between the HTTP provider and the offline stub.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors from loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid LLM mode '{0}' (expected 'http' or 'stub')")]
    InvalidMode(String),
}

/// How chat completions are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    /// OpenAI-compatible `/chat/completions` endpoint.
    Http,
    /// Deterministic canned replies, no network.
    Stub,
}

impl FromStr for LlmMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "stub" => Ok(Self::Stub),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// Chat provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub mode: LlmMode,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Whole-request timeout for a chat completion.
    pub request_timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            mode: LlmMode::Http,
            api_key: None,
            base_url: "http://127.0.0.1:1234/v1".into(),
            model: "gpt-4o-mini".into(),
            request_timeout_secs: 60,
            max_tokens: 800,
        }
    }
}

/// Retrieval defaults.
/// Results returned when a caller does not ask for a count.
pub const DEFAULT_TOP_K: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub default_top_k: usize,
    /// Upper bound on the query-expansion call; on expiry the synonym table is used.
    pub expansion_timeout_secs: u64,
    pub expansion_temperature: f32,
    /// Characters kept from the first line of an expansion reply.
    pub max_expansion_chars: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            default_top_k: DEFAULT_TOP_K,
            expansion_timeout_secs: 10,
            expansion_temperature: 0.2,
            max_expansion_chars: 200,
        }
    }
}

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmSettings,
    pub retrieval: RetrievalSettings,
}

impl Settings {
    /// Parse settings from a YAML string. Missing fields take defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load settings from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        debug!("loaded settings from {}", path.display());
        Self::from_yaml(&content)
    }

    /// Resolve settings: optional file, then process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        settings.apply_env_overrides()?;
        Ok(settings)
    }

    /// Apply `OPENAI_*` / `LLM_MODE` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(base) = get("OPENAI_API_BASE") {
            self.llm.base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.llm.model = model;
        }
        if let Some(mode) = get("LLM_MODE") {
            self.llm.mode = mode.parse()?;
        }
        Ok(())
    }
}
