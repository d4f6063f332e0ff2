//! Intent resolver: validates the model's payload, applies the confidence
//! gate, and maps the free-text action onto a canonical operation id.
//!
//! Callers branch on [`IntentResolution::clarification_needed`] first (ask
//! the user again), then on [`IntentResolution::error`] (hard failure).

pub mod actions;

pub use actions::{ActionTable, STANDARD_PHRASES};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::gateway::{ModelGateway, ModelResponse};
use crate::types::{Message, Parameters};

/// Minimum model confidence for an intent to be acted on.
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Outcome of resolving one user input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentResolution {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub clarification_needed: bool,
    pub clarification_questions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The model payload this resolution was derived from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,
}

impl IntentResolution {
    fn failure(error: impl Into<String>, raw_response: Value) -> Self {
        Self {
            success: false,
            action: None,
            parameters: None,
            confidence: None,
            clarification_needed: false,
            clarification_questions: Vec::new(),
            error: Some(error.into()),
            raw_response: Some(raw_response),
        }
    }
}

pub struct IntentResolver {
    gateway: ModelGateway,
    actions: ActionTable,
}

impl IntentResolver {
    pub fn new(gateway: ModelGateway) -> Self {
        Self::with_actions(gateway, ActionTable::standard())
    }

    pub fn with_actions(gateway: ModelGateway, actions: ActionTable) -> Self {
        Self { gateway, actions }
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    pub async fn parse_intent(&self, text: &str, context: &[Message]) -> IntentResolution {
        let response = self.gateway.process_input(text, context).await;
        resolve(&self.actions, &response)
    }
}

/// Deterministic part of intent parsing: model payload in, resolution out.
pub fn resolve(actions: &ActionTable, response: &ModelResponse) -> IntentResolution {
    let raw = response.to_value();
    let payload = match response {
        ModelResponse::Error { error, .. } => {
            warn!(error = error.as_str(), "model gateway returned an error");
            return IntentResolution::failure(error.clone(), raw);
        }
        ModelResponse::Payload(obj) => obj,
    };

    let missing: Vec<&str> = ["action", "parameters"]
        .into_iter()
        .filter(|k| !payload.contains_key(*k))
        .collect();
    if !missing.is_empty() {
        warn!(?missing, "model payload is missing required fields");
        return IntentResolution::failure(
            format!("model response is missing fields: {}", missing.join(", ")),
            raw,
        );
    }

    let confidence = read_confidence(payload.get("confidence"));
    if confidence < CONFIDENCE_THRESHOLD {
        let questions = read_questions(payload.get("clarification_questions"));
        info!(confidence, ?questions, "low confidence, clarification needed");
        return IntentResolution {
            success: false,
            action: None,
            parameters: None,
            confidence: Some(confidence),
            clarification_needed: true,
            clarification_questions: questions,
            error: Some("insufficient confidence".to_string()),
            raw_response: Some(raw),
        };
    }

    let action_text = match &payload["action"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let Some(canonical) = actions.resolve(&action_text) else {
        warn!(action = action_text.as_str(), "could not map action to an operation");
        return IntentResolution::failure(format!("unsupported operation: {}", action_text), raw);
    };

    let parameters = match &payload["parameters"] {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        _ => {
            return IntentResolution::failure("invalid parameters: expected an object", raw);
        }
    };

    IntentResolution {
        success: true,
        action: Some(canonical.to_string()),
        parameters: Some(parameters),
        confidence: Some(confidence),
        clarification_needed: false,
        clarification_questions: Vec::new(),
        error: None,
        raw_response: Some(raw),
    }
}

/// Numbers, or strings holding a number; anything else counts as zero.
fn read_confidence(v: Option<&Value>) -> f64 {
    match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn read_questions(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items
            .iter()
            .map(|q| match q {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}
