//! Transport client for the target REST API.

pub mod http;

pub use http::ApiTransport;

use serde_json::Value;

/// Outcome of one logical request, retries already collapsed.
pub type TransportResult = std::result::Result<Value, TransportError>;

/// Normalized transport and application failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// Every allowed attempt timed out.
    #[error("request timed out")]
    Timeout { attempts: u32 },

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        /// Parsed error body, or `{status_code, text}` when it is not JSON.
        details: Value,
    },

    /// A 2xx response whose body is not valid JSON.
    #[error("invalid response body")]
    InvalidBody { text: String },

    /// Connection, DNS, TLS or protocol failure. Never retried.
    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    pub fn details(&self) -> Option<Value> {
        match self {
            TransportError::Status { details, .. } => Some(details.clone()),
            TransportError::InvalidBody { text } => Some(serde_json::json!({ "text": text })),
            TransportError::Timeout { attempts } => {
                Some(serde_json::json!({ "attempts": attempts }))
            }
            TransportError::Request(_) => None,
        }
    }
}
