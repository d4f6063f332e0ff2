//! Anthropic Messages API driver. Differs from OpenAI in that:
//! - The system instruction is a top-level `system` field, not a message.
//! - Auth uses `x-api-key` plus a pinned `anthropic-version` header.
//! - The reply text lives at `content[0].text`.

use serde_json::Value;
use std::collections::HashMap;

use super::{DriverRequest, PromptRequest, ProviderDriver};

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Default)]
pub struct AnthropicDriver;

impl ProviderDriver for AnthropicDriver {
    fn provider_id(&self) -> &str {
        "anthropic"
    }

    fn default_base_url(&self) -> &str {
        "https://api.anthropic.com/v1"
    }

    fn build_request(&self, prompt: &PromptRequest<'_>) -> DriverRequest {
        let mut messages: Vec<Value> = prompt
            .context
            .iter()
            .map(|m| serde_json::json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();
        messages.push(serde_json::json!({ "role": "user", "content": prompt.user_input }));

        let mut headers = HashMap::new();
        headers.insert("x-api-key".into(), prompt.api_key.to_string());
        headers.insert("anthropic-version".into(), API_VERSION.into());

        DriverRequest {
            path: "/messages".into(),
            headers,
            body: serde_json::json!({
                "model": prompt.model,
                "system": prompt.system_prompt,
                "messages": messages,
                "temperature": prompt.temperature,
                "max_tokens": prompt.max_tokens,
            }),
        }
    }

    fn extract_content(&self, body: &Value) -> Option<String> {
        body.pointer("/content/0/text")
            .and_then(|v| v.as_str())
            .map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn system_prompt_is_top_level() {
        let ctx = vec![Message::assistant("earlier")];
        let req = AnthropicDriver.build_request(&PromptRequest {
            system_prompt: "SYS",
            context: &ctx,
            user_input: "now",
            model: "claude-3-haiku",
            temperature: 0.2,
            max_tokens: 100,
            api_key: "k",
        });
        assert_eq!(req.path, "/messages");
        assert_eq!(req.body["system"], "SYS");
        assert_eq!(req.headers["x-api-key"], "k");
        assert_eq!(req.headers["anthropic-version"], API_VERSION);
        let msgs = req.body["messages"].as_array().unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0]["role"], "assistant");
        assert_eq!(msgs[1]["content"], "now");
    }

    #[test]
    fn extracts_first_text_block() {
        let body = serde_json::json!({
            "content": [{"type": "text", "text": "hello"}],
            "stop_reason": "end_turn"
        });
        assert_eq!(AnthropicDriver.extract_content(&body).as_deref(), Some("hello"));
    }
}
