//! Mock HTTP server standing in for both the model provider and the target API

use ai_api_agent::{AgentConfig, ApiConfig, LlmConfig};
use mockito::{Mock, Server, ServerGuard};
use serde_json::{json, Value};

pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// API settings pointing at the mock, with short timeouts.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            api_key: "api-test-key".into(),
            timeout_ms: Some(2_000),
            retry_attempts: 1,
            retry_delay_ms: Some(10),
            ..ApiConfig::default()
        }
    }

    /// OpenAI-format provider served from the same mock.
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            provider: "openai".into(),
            model: "gpt-4".into(),
            api_key: "sk-test".into(),
            api_base: Some(self.base_url.clone()),
            timeout_secs: 5,
            ..LlmConfig::default()
        }
    }

    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            llm: self.llm_config(),
            api: self.api_config(),
        }
    }

    /// The model replies with `content` as its message text.
    pub async fn mock_model_reply(&mut self, content: &str) -> Mock {
        let body = json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        });
        self.server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// The model replies with the given intent payload serialized as JSON.
    pub async fn mock_model_intent(&mut self, intent: Value) -> Mock {
        self.mock_model_reply(&intent.to_string()).await
    }

    pub async fn mock_model_error(&mut self, status: usize) -> Mock {
        self.server
            .mock("POST", "/chat/completions")
            .with_status(status)
            .with_body(r#"{"error":{"message":"upstream failure"}}"#)
            .create_async()
            .await
    }

    pub async fn mock_api(&mut self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}
