use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for logging and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Parameter or configuration key that caused the error (e.g., "parameters.email", "llm.provider")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., raw model output, expected values)
    pub details: Option<String>,
    /// Component that produced the error (e.g., "model_gateway", "operation_registry")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Unified error type for the agent.
///
/// Each variant is one failure domain; layers return these as values and
/// never let them escape as panics.
#[derive(Debug, Error)]
pub enum Error {
    /// Model call or model output parsing failed.
    #[error("{message}{}", format_context(.context))]
    Provider {
        message: String,
        context: ErrorContext,
    },

    /// Missing or malformed parameters, or an action that cannot be mapped.
    #[error("{message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    /// Unsupported provider, unknown HTTP method, unreadable config.
    #[error("{message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn provider(msg: impl Into<String>) -> Self {
        Error::Provider {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn provider_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Provider {
            message: msg.into(),
            context,
        }
    }

    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// The bare human-readable message, without the context suffix.
    pub fn message(&self) -> String {
        match self {
            Error::Provider { message, .. }
            | Error::Validation { message, .. }
            | Error::Configuration { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Extract error context if available.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Provider { context, .. }
            | Error::Validation { context, .. }
            | Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Structured details for callers that log or display them.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Transport(e) => e.details(),
            _ => self
                .context()
                .and_then(|c| c.details.clone())
                .map(serde_json::Value::String),
        }
    }
}
