//! Agent configuration record.
//!
//! The core only consumes [`AgentConfig`]; loading from the environment or a
//! YAML file is offered here for binaries and never happens implicitly.

use crate::error::{Error, ErrorContext};
use crate::Result;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const KEYRING_SERVICE: &str = "ai-api-agent";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub llm: LlmConfig,
    pub api: ApiConfig,
}

/// Language-model provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider id: `openai` or `anthropic`.
    pub provider: String,
    pub model: String,
    pub api_key: String,
    /// Overrides the provider's default endpoint root.
    pub api_base: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4".to_string(),
            api_key: String::new(),
            api_base: None,
            max_tokens: 4096,
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Target REST API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Retries after the first attempt; only timeouts are retried.
    pub retry_attempts: u32,
    pub retry_delay_secs: u64,
    /// Sub-second overrides for `timeout_secs` / `retry_delay_secs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.yoursoftware.com".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            retry_attempts: 3,
            retry_delay_secs: 2,
            timeout_ms: None,
            retry_delay_ms: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        self.timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_secs(self.retry_delay_secs))
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl AgentConfig {
    /// Build the configuration from process environment variables.
    ///
    /// Unparsable numbers fall back to defaults. When `LLM_API_KEY` is not
    /// set, the key is looked up in the OS keyring under
    /// `ai-api-agent/<provider>`.
    pub fn from_env() -> Self {
        let d = AgentConfig::default();
        let provider = env_string("LLM_PROVIDER").unwrap_or(d.llm.provider);
        let api_key = env_string("LLM_API_KEY")
            .or_else(|| keyring_secret(&provider))
            .unwrap_or_default();

        let llm = LlmConfig {
            model: env_string("LLM_MODEL").unwrap_or(d.llm.model),
            api_key,
            api_base: env_string("LLM_API_BASE"),
            max_tokens: env_or("LLM_MAX_TOKENS", d.llm.max_tokens),
            temperature: env_or("LLM_TEMPERATURE", d.llm.temperature),
            timeout_secs: env_or("LLM_TIMEOUT", d.llm.timeout_secs),
            provider,
        };

        let api = ApiConfig {
            base_url: env_string("API_BASE_URL").unwrap_or(d.api.base_url),
            api_key: env_string("API_KEY").unwrap_or_default(),
            timeout_secs: env_or("API_TIMEOUT", d.api.timeout_secs),
            retry_attempts: env_or("API_RETRY_ATTEMPTS", d.api.retry_attempts),
            retry_delay_secs: env_or("API_RETRY_DELAY", d.api.retry_delay_secs),
            timeout_ms: None,
            retry_delay_ms: None,
        };

        Self { llm, api }
    }

    /// Load the configuration from a YAML file; absent fields take defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config file: {}", e),
                ErrorContext::new().with_field_path(path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid config: {}", e),
                ErrorContext::new().with_source("config"),
            )
        })
    }
}

fn keyring_secret(provider: &str) -> Option<String> {
    Entry::new(KEYRING_SERVICE, provider)
        .ok()
        .and_then(|entry| entry.get_password().ok())
}
