//! # ai-api-agent
//!
//! Turns free-form natural-language commands into validated calls against a
//! fixed REST API surface.
//!
//! ## Pipeline
//!
//! ```text
//! text + context ─▶ ModelGateway ─▶ IntentResolver ─▶ OperationRegistry ─▶ ApiTransport
//!                   (LLM call,      (confidence gate,  (param checks,       (timeout,
//!                    JSON rescue)    action mapping)    path/query/body)     retry)
//! ```
//!
//! Every stage returns a tagged value instead of failing outward, and
//! [`Agent::process_text`] turns any unexpected failure into a generic
//! error reply.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_api_agent::{Agent, AgentConfig};
//!
//! #[tokio::main]
//! async fn main() -> ai_api_agent::Result<()> {
//!     let agent = Agent::new(&AgentConfig::from_env())?;
//!     let reply = agent.process_text("list all my projects", &[]).await;
//!     println!("{}", reply.message);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`gateway`] | Model calls and reply normalization |
//! | [`drivers`] | Per-provider request/response shapes |
//! | [`intent`] | Confidence gate and action-name mapping |
//! | [`registry`] | Operation catalog and request planning |
//! | [`transport`] | HTTP execution against the target API |
//! | [`resilience`] | Timeout-only fixed-delay retry |
//! | [`conversation`] | Conversation history store |
//! | [`agent`] | End-to-end entry point |

pub mod agent;
pub mod config;
pub mod conversation;
pub mod drivers;
pub mod gateway;
pub mod intent;
pub mod registry;
pub mod render;
pub mod resilience;
pub mod transport;
pub mod types;

pub use agent::{Agent, AgentReply};
pub use config::{AgentConfig, ApiConfig, LlmConfig};
pub use conversation::{ConversationStore, InMemoryConversationStore};
pub use gateway::{ModelBackend, ModelGateway, ModelResponse};
pub use intent::{IntentResolution, IntentResolver, CONFIDENCE_THRESHOLD};
pub use registry::{HttpMethod, Operation, OperationRegistry, RequestPlan};
pub use transport::{ApiTransport, TransportError, TransportResult};
pub use types::{Message, MessageRole, Parameters};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

pub mod error;
pub use error::{Error, ErrorContext};
