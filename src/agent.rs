//! Top-level entry point: text in, reply out.
//!
//! Wires the model gateway, intent resolver, operation registry and
//! transport together. [`Agent::process_text`] never panics outward; any
//! unexpected failure in the chain becomes a generic error reply.

use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use tracing::{error, info};

use crate::config::AgentConfig;
use crate::conversation::ConversationStore;
use crate::gateway::ModelGateway;
use crate::intent::{ActionTable, IntentResolution, IntentResolver};
use crate::registry::OperationRegistry;
use crate::render::{render_clarification, render_message};
use crate::transport::ApiTransport;
use crate::types::{Message, Parameters};
use crate::Result;

pub const INTERNAL_ERROR_MESSAGE: &str = "an error occurred while processing the request";

/// Reply to one natural-language request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentReply {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub requires_clarification: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl AgentReply {
    fn failure(message: String, error: String) -> Self {
        Self {
            success: false,
            message,
            action: None,
            parameters: None,
            confidence: None,
            requires_clarification: false,
            error: Some(error),
            data: None,
        }
    }

    fn internal_error(detail: impl Into<String>) -> Self {
        Self::failure(INTERNAL_ERROR_MESSAGE.to_string(), detail.into())
    }
}

pub struct Agent {
    resolver: IntentResolver,
    registry: OperationRegistry,
    transport: ApiTransport,
}

impl Agent {
    /// Standard catalog, HTTP model backend and API transport from `config`.
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let registry = OperationRegistry::standard();
        let actions = ActionTable::standard()
            .with_canonical_ids(registry.list().iter().map(|op| op.id.clone()));
        let resolver = IntentResolver::with_actions(ModelGateway::from_config(&config.llm)?, actions);
        let transport = ApiTransport::new(&config.api)?;
        Ok(Self::with_parts(resolver, registry, transport))
    }

    pub fn with_parts(
        resolver: IntentResolver,
        registry: OperationRegistry,
        transport: ApiTransport,
    ) -> Self {
        Self {
            resolver,
            registry,
            transport,
        }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub async fn parse_intent(&self, text: &str, context: &[Message]) -> IntentResolution {
        self.resolver.parse_intent(text, context).await
    }

    /// Validate, plan and send one operation.
    pub async fn execute(&self, action: &str, parameters: &Parameters) -> Result<Value> {
        let plan = self.registry.build_request(action, parameters)?;
        info!(
            action,
            method = plan.method.as_str(),
            endpoint = plan.url.as_str(),
            "executing operation"
        );
        Ok(self.transport.execute(&plan).await?)
    }

    pub async fn process_text(&self, text: &str, context: &[Message]) -> AgentReply {
        match AssertUnwindSafe(self.run(text, context)).catch_unwind().await {
            Ok(reply) => reply,
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "internal failure".to_string());
                error!(detail = detail.as_str(), "request processing panicked");
                AgentReply::internal_error(detail)
            }
        }
    }

    /// Like [`process_text`](Self::process_text), reading and extending the
    /// history of `conversation_id` in `store`.
    pub async fn process_in_conversation(
        &self,
        store: &dyn ConversationStore,
        conversation_id: &str,
        text: &str,
    ) -> AgentReply {
        let context = store.get(conversation_id).await.unwrap_or_default();
        let reply = self.process_text(text, &context).await;
        store
            .append(
                conversation_id,
                vec![Message::user(text), Message::assistant(reply.message.clone())],
            )
            .await;
        reply
    }

    async fn run(&self, text: &str, context: &[Message]) -> AgentReply {
        let resolution = self.resolver.parse_intent(text, context).await;

        if !resolution.success {
            if resolution.clarification_needed {
                let confidence = resolution.confidence.unwrap_or(0.0);
                return AgentReply {
                    success: true,
                    message: render_clarification(&resolution.clarification_questions),
                    action: None,
                    parameters: None,
                    confidence: Some(confidence),
                    requires_clarification: true,
                    error: None,
                    data: Some(serde_json::json!({
                        "requires_clarification": true,
                        "confidence": confidence,
                    })),
                };
            }
            let err = resolution.error.unwrap_or_else(|| "unknown error".to_string());
            return AgentReply::failure(
                format!("sorry, I could not understand your request: {}", err),
                err,
            );
        }

        let (Some(action), Some(parameters)) = (resolution.action, resolution.parameters) else {
            return AgentReply::internal_error("resolution succeeded without an action");
        };

        match self.execute(&action, &parameters).await {
            Ok(result) => AgentReply {
                success: true,
                message: render_message(&action, &result),
                action: Some(action.clone()),
                parameters: Some(parameters),
                confidence: resolution.confidence,
                requires_clarification: false,
                error: None,
                data: Some(serde_json::json!({ "action": action, "result": result })),
            },
            Err(e) => {
                error!(action = action.as_str(), error = %e, "operation failed");
                let details = e.details();
                let msg = e.message();
                AgentReply {
                    action: Some(action),
                    parameters: Some(parameters),
                    confidence: resolution.confidence,
                    data: details,
                    ..AgentReply::failure(format!("failed to execute operation: {}", msg), msg)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::gateway::ModelBackend;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Scripted(&'static str);

    #[async_trait]
    impl ModelBackend for Scripted {
        async fn send(&self, _prompt: &str, _context: &[Message]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Exploding;

    #[async_trait]
    impl ModelBackend for Exploding {
        async fn send(&self, _prompt: &str, _context: &[Message]) -> Result<String> {
            panic!("backend blew up");
        }
    }

    fn agent(backend: Arc<dyn ModelBackend>) -> Agent {
        Agent::with_parts(
            IntentResolver::new(ModelGateway::new(backend)),
            OperationRegistry::standard(),
            ApiTransport::new(&ApiConfig {
                base_url: "http://127.0.0.1:9".into(),
                ..ApiConfig::default()
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn clarification_is_a_successful_reply() {
        let a = agent(Arc::new(Scripted(
            r#"{"action":"get_project","parameters":{},"confidence":0.4,"clarification_questions":["Which project?"]}"#,
        )));
        let reply = a.process_text("show me the project", &[]).await;
        assert!(reply.success);
        assert!(reply.requires_clarification);
        assert_eq!(reply.message, "I need more information to help you:\n1. Which project?");
        assert_eq!(reply.confidence, Some(0.4));
    }

    #[tokio::test]
    async fn unmappable_action_is_a_failed_reply() {
        let a = agent(Arc::new(Scripted(
            r#"{"action":"brew_coffee","parameters":{},"confidence":0.99}"#,
        )));
        let reply = a.process_text("make me coffee", &[]).await;
        assert!(!reply.success);
        assert!(!reply.requires_clarification);
        assert_eq!(reply.error.as_deref(), Some("unsupported operation: brew_coffee"));
        assert_eq!(
            reply.message,
            "sorry, I could not understand your request: unsupported operation: brew_coffee"
        );
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_transport() {
        let a = agent(Arc::new(Scripted(
            r#"{"action":"get_project","parameters":{},"confidence":0.9}"#,
        )));
        let reply = a.process_text("get project", &[]).await;
        assert!(!reply.success);
        assert_eq!(reply.action.as_deref(), Some("get_project"));
        assert_eq!(
            reply.message,
            "failed to execute operation: missing required parameter: project_id"
        );
    }

    #[tokio::test]
    async fn panics_become_generic_errors() {
        let a = agent(Arc::new(Exploding));
        let reply = a.process_text("anything", &[]).await;
        assert!(!reply.success);
        assert_eq!(reply.message, INTERNAL_ERROR_MESSAGE);
        assert_eq!(reply.error.as_deref(), Some("backend blew up"));
    }
}
