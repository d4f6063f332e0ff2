//! Model gateway: sends the user's text plus conversation context to the
//! configured language model and normalizes its reply into a structured
//! payload.
//!
//! The gateway never fails outward. Network, provider and parse failures
//! all come back as [`ModelResponse::Error`].

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::LlmConfig;
use crate::drivers::{create_driver, PromptRequest, ProviderDriver};
use crate::error::{Error, ErrorContext};
use crate::types::Message;
use crate::Result;

/// Fixed instruction describing the output schema the model must follow.
pub const SYSTEM_PROMPT: &str = r#"You are an assistant that turns natural-language instructions into software API calls.
Work out what the user wants to do and extract the operation, its parameters and their values.
Reply with a single JSON object containing exactly these fields:
- action: the name of the operation to perform
- parameters: an object with the parameters the operation needs
- confidence: how confident you are that you understood correctly, from 0 to 1
- clarification_questions: a list of questions to ask when more information is needed (empty otherwise)
The action should be one of: login, logout, get_user, create_user, update_user, delete_user,
list_projects, get_project, create_project, update_project, delete_project, list_files,
upload_file, download_file, delete_file, run_analysis, get_analysis_result, export_report,
get_system_status, get_usage_statistics."#;

pub const PARSE_FAILURE: &str = "could not parse model response";

/// Normalized model output.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    /// A decoded JSON object; expected to carry `action`, `parameters`,
    /// `confidence` and `clarification_questions`, but not yet validated.
    Payload(Map<String, Value>),
    /// The call failed or the reply could not be decoded.
    Error {
        error: String,
        raw_response: Option<String>,
    },
}

impl ModelResponse {
    fn error(error: impl Into<String>) -> Self {
        ModelResponse::Error {
            error: error.into(),
            raw_response: None,
        }
    }

    /// Wrap a decoded object; one that carries its own `error` key becomes an error.
    fn from_object(obj: Map<String, Value>) -> Self {
        match obj.get("error") {
            Some(err) => ModelResponse::Error {
                error: match err {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
                raw_response: Some(Value::Object(obj.clone()).to_string()),
            },
            None => ModelResponse::Payload(obj),
        }
    }

    /// JSON form, as kept in `raw_response` fields downstream.
    pub fn to_value(&self) -> Value {
        match self {
            ModelResponse::Payload(obj) => Value::Object(obj.clone()),
            ModelResponse::Error {
                error,
                raw_response,
            } => {
                let mut obj = Map::new();
                obj.insert("error".into(), Value::String(error.clone()));
                if let Some(raw) = raw_response {
                    obj.insert("raw_response".into(), Value::String(raw.clone()));
                }
                Value::Object(obj)
            }
        }
    }
}

/// Decode the model's text into a JSON object.
///
/// Tries the whole text first, then the span from the first `{` to the last
/// `}` (models often wrap JSON in prose or markdown fences).
pub fn parse_model_output(text: &str) -> ModelResponse {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(text.trim()) {
        return ModelResponse::from_object(obj);
    }

    warn!("direct JSON decoding failed, scanning model output for an embedded object");
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(&text[start..=end]) {
                return ModelResponse::from_object(obj);
            }
        }
    }

    error!("no valid JSON object in model output");
    ModelResponse::Error {
        error: PARSE_FAILURE.to_string(),
        raw_response: Some(text.to_string()),
    }
}

/// The one capability the gateway needs from a model: text in, text out.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn send(&self, prompt: &str, context: &[Message]) -> Result<String>;
}

/// Model backend speaking a provider's HTTP API through a [`ProviderDriver`].
pub struct HttpModelBackend {
    provider: String,
    driver: Option<Box<dyn ProviderDriver>>,
    base_url: String,
    http: reqwest::Client,
    config: LlmConfig,
}

impl HttpModelBackend {
    /// An unsupported provider is not an error here; every call then fails
    /// without touching the network.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let driver = create_driver(&config.provider);
        if driver.is_none() {
            warn!(provider = config.provider.as_str(), "unsupported LLM provider configured");
        }
        let base_url = config
            .api_base
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| driver.as_ref().map(|d| d.default_base_url().to_string()))
            .unwrap_or_default();

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::configuration(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            provider: config.provider.clone(),
            driver,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl ModelBackend for HttpModelBackend {
    async fn send(&self, prompt: &str, context: &[Message]) -> Result<String> {
        let driver = self.driver.as_ref().ok_or_else(|| {
            Error::configuration_with_context(
                format!("unsupported provider: {}", self.provider),
                ErrorContext::new().with_field_path("llm.provider"),
            )
        })?;

        let request = driver.build_request(&PromptRequest {
            system_prompt: SYSTEM_PROMPT,
            context,
            user_input: prompt,
            model: &self.config.model,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            api_key: &self.config.api_key,
        });
        let url = format!("{}{}", self.base_url, request.path);

        debug!(provider = driver.provider_id(), model = self.config.model.as_str(), "calling model provider");
        let mut req = self.http.post(&url).json(&request.body);
        for (k, v) in &request.headers {
            req = req.header(k.as_str(), v.as_str());
        }

        let resp = req.send().await.map_err(|e| {
            error!(provider = driver.provider_id(), error = %e, "model request failed");
            Error::provider(format!("model request failed: {}", e))
        })?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::provider(format!("model request failed: {}", e)))?;

        if !status.is_success() {
            error!(provider = driver.provider_id(), status = status.as_u16(), "model provider returned an error");
            return Err(Error::provider_with_context(
                format!("model provider returned HTTP {}", status.as_u16()),
                ErrorContext::new()
                    .with_details(text)
                    .with_source(driver.provider_id().to_string()),
            ));
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| Error::provider(format!("malformed provider response: {}", e)))?;
        driver
            .extract_content(&body)
            .ok_or_else(|| Error::provider("provider response contained no message content"))
    }
}

/// Front door to the model: one call, one normalized [`ModelResponse`].
#[derive(Clone)]
pub struct ModelGateway {
    backend: Arc<dyn ModelBackend>,
}

impl ModelGateway {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpModelBackend::new(config)?)))
    }

    pub async fn process_input(&self, text: &str, context: &[Message]) -> ModelResponse {
        match self.backend.send(text, context).await {
            Ok(raw) => parse_model_output(&raw),
            Err(e) => {
                error!(error = %e, "model gateway call failed");
                ModelResponse::error(e.message())
            }
        }
    }
}
