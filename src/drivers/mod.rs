//! Provider drivers: per-provider request shape and response extraction.
//!
//! Drivers are pure translators. They never touch the network; the
//! [`HttpModelBackend`](crate::gateway::HttpModelBackend) sends what they
//! build. Adding a provider means adding a driver and a line in
//! [`create_driver`], nothing else.

pub mod anthropic;

use serde_json::Value;
use std::collections::HashMap;

use crate::types::message::Message;

pub use anthropic::AnthropicDriver;

/// Everything a driver needs to render one model call.
#[derive(Debug, Clone)]
pub struct PromptRequest<'a> {
    pub system_prompt: &'a str,
    pub context: &'a [Message],
    pub user_input: &'a str,
    pub model: &'a str,
    pub temperature: f64,
    pub max_tokens: u32,
    pub api_key: &'a str,
}

/// Provider-specific HTTP request (always POST).
#[derive(Debug, Clone)]
pub struct DriverRequest {
    /// Path appended to the provider base URL.
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Value,
}

pub trait ProviderDriver: Send + Sync + std::fmt::Debug {
    /// Provider identifier as used in configuration.
    fn provider_id(&self) -> &str;

    /// Endpoint root used when the configuration does not override it.
    fn default_base_url(&self) -> &str;

    fn build_request(&self, prompt: &PromptRequest<'_>) -> DriverRequest;

    /// The assistant's text from a decoded provider response.
    fn extract_content(&self, body: &Value) -> Option<String>;
}

/// OpenAI chat-completions driver; also fits OpenAI-compatible providers.
#[derive(Debug, Default)]
pub struct OpenAiDriver;

impl ProviderDriver for OpenAiDriver {
    fn provider_id(&self) -> &str {
        "openai"
    }

    fn default_base_url(&self) -> &str {
        "https://api.openai.com/v1"
    }

    fn build_request(&self, prompt: &PromptRequest<'_>) -> DriverRequest {
        let mut messages = Vec::with_capacity(prompt.context.len() + 2);
        messages.push(serde_json::json!({ "role": "system", "content": prompt.system_prompt }));
        for m in prompt.context {
            messages.push(serde_json::json!({ "role": m.role.as_str(), "content": m.content }));
        }
        messages.push(serde_json::json!({ "role": "user", "content": prompt.user_input }));

        let mut headers = HashMap::new();
        headers.insert("authorization".into(), format!("Bearer {}", prompt.api_key));

        DriverRequest {
            path: "/chat/completions".into(),
            headers,
            body: serde_json::json!({
                "model": prompt.model,
                "messages": messages,
                "temperature": prompt.temperature,
                "max_tokens": prompt.max_tokens,
            }),
        }
    }

    fn extract_content(&self, body: &Value) -> Option<String> {
        body.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(String::from)
    }
}

/// Driver for a configured provider id, or `None` when unsupported.
pub fn create_driver(provider: &str) -> Option<Box<dyn ProviderDriver>> {
    match provider.trim().to_ascii_lowercase().as_str() {
        "openai" => Some(Box::new(OpenAiDriver)),
        "anthropic" => Some(Box::new(AnthropicDriver)),
        _ => None,
    }
}
