//! Resilience layer for calls to flaky upstream dependencies (the LLM API).
//!
//! # Data Flow
//! ```text
//! Guarded call:
//!     → circuit_breaker.rs (fail fast while the upstream is assumed down)
//!     → retry.rs (per-attempt timeout, exponential backoff + jitter)
//!     → the wrapped operation
//! ```
//!
//! Retryability is decided by the [`Retryable`] trait, implemented by each
//! upstream error type (see `llm_client::classify`). Timeouts are always
//! retryable; an open circuit is never retried by the layer that hit it.

pub mod circuit_breaker;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot, CircuitState};
pub use retry::{with_retry, with_timeout, RetryPolicy};

use std::time::Duration;

use thiserror::Error;

/// Decides whether an upstream error is worth retrying.
///
/// Implementations must be pure: same error, same answer. Rate limits,
/// transient server errors and timeouts are retryable; client errors are not.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Error surface of the resilience layer.
///
/// `Timeout` and `CircuitOpen` are synthetic: they are raised by the wrappers
/// themselves, never by the wrapped operation. `Upstream` carries whichever
/// error caused the final attempt to fail.
#[derive(Debug, Error)]
pub enum ResilienceError<E> {
    #[error("operation timed out after {}ms", .waited.as_millis())]
    Timeout { waited: Duration },

    #[error("circuit open, retry in {}s", .retry_in.as_secs().max(1))]
    CircuitOpen { retry_in: Duration },

    #[error("{0}")]
    Upstream(E),
}

impl<E: Retryable> ResilienceError<E> {
    /// Timeouts are retryable by definition; an open circuit is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ResilienceError::Timeout { .. } => true,
            ResilienceError::CircuitOpen { .. } => false,
            ResilienceError::Upstream(e) => e.is_retryable(),
        }
    }
}
