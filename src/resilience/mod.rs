//! Retry policy for outbound API calls.
//!
//! Only client-side timeouts are retried. Each retry waits a fixed delay
//! (no exponential backoff, no jitter) and re-issues the identical request,
//! so callers must only route operations that are safe to repeat.
//!
//! ```rust
//! use ai_api_agent::resilience::{RetryConfig, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(RetryConfig {
//!     max_retries: 2,
//!     delay: Duration::from_millis(10),
//! });
//! assert_eq!(policy.max_attempts(), 3);
//! ```

pub mod retry;

pub use retry::{AttemptFailure, ResiliencePolicy, RetryConfig, RetryPolicy};
