//! Core data types shared across the pipeline.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | One conversation turn (role + text) |
//! | [`MessageRole`] | `user` or `assistant` |
//! | [`ConversationContext`] | Ordered prior turns passed to the model |
//! | [`Parameters`] | Operation parameters as a JSON object |

pub mod message;

pub use message::{ConversationContext, Message, MessageRole};

/// Operation parameters, keyed by parameter name.
pub type Parameters = serde_json::Map<String, serde_json::Value>;
