//! Fixed-delay, timeout-only retry.

use std::time::Duration;

/// Configuration for retry logic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait between attempts.
    pub delay: Duration,
}

impl From<&crate::config::ApiConfig> for RetryConfig {
    fn from(cfg: &crate::config::ApiConfig) -> Self {
        Self {
            max_retries: cfg.retry_attempts,
            delay: cfg.retry_delay(),
        }
    }
}

/// How a single HTTP attempt failed before any response was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The attempt exceeded the client timeout.
    Timeout,
    /// Connection refused, DNS failure, TLS error and the like.
    Connect,
    /// Anything else reported by the HTTP stack.
    Other,
}

impl AttemptFailure {
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            AttemptFailure::Timeout
        } else if err.is_connect() {
            AttemptFailure::Connect
        } else {
            AttemptFailure::Other
        }
    }
}

/// Decides whether a failed attempt is repeated and after how long.
pub trait ResiliencePolicy: Send + Sync {
    /// `attempt` is the zero-based index of the attempt that just failed.
    fn should_retry(&self, attempt: u32, failure: AttemptFailure) -> Option<Duration>;
}

pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Total attempts this policy allows, first one included.
    pub fn max_attempts(&self) -> u32 {
        self.config.max_retries.saturating_add(1)
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl ResiliencePolicy for RetryPolicy {
    fn should_retry(&self, attempt: u32, failure: AttemptFailure) -> Option<Duration> {
        if attempt >= self.config.max_retries {
            return None;
        }
        match failure {
            AttemptFailure::Timeout => Some(self.config.delay),
            AttemptFailure::Connect | AttemptFailure::Other => None,
        }
    }
}
