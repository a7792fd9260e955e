//! Circuit breaker guarding one upstream dependency (the LLM API).
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count reaches failure_threshold
//! Open → HalfOpen: first call after reset_timeout has elapsed
//! HalfOpen → Closed: probe call succeeds
//! HalfOpen → Open: probe call fails
//! ```
//!
//! The probe runs through the same [`RetryPolicy`] as a normal call, so a
//! flaky-but-recovering upstream can reopen the circuit if the probe itself
//! exhausts its retries. While open, calls are rejected without invoking the
//! operation at all.

use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::resilience::retry::{with_retry, RetryPolicy};
use crate::resilience::{ResilienceError, Retryable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that flip the circuit open.
    pub failure_threshold: u32,
    /// How long the circuit stays open before a half-open probe is allowed.
    pub reset_timeout: Duration,
    /// Policy applied to every guarded call, probes included.
    pub retry: RetryPolicy,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Read-only view of the breaker, for logging and the health endpoint.
#[derive(Debug, Clone, Copy)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub failure_count: u32,
    pub since_last_failure: Option<Duration>,
}

/// One breaker instance guards exactly one upstream call site. Multiple
/// request handlers share it through `AppState`, so the read-modify-write
/// transitions sit behind a mutex. The lock is never held across an await.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        // Recover from poisoning: breaker state is a plain counter/enum and
        // stays coherent even if a holder panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `operation` through the retry policy unless the circuit is open.
    ///
    /// Any failure after retries are exhausted counts against the threshold;
    /// any success closes the circuit and zeroes the failure count.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, ResilienceError<E>>
    where
        E: Retryable + fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        {
            let mut inner = self.lock();
            if inner.state == CircuitState::Open {
                let elapsed = inner
                    .last_failure
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::MAX);
                if elapsed < self.config.reset_timeout {
                    return Err(ResilienceError::CircuitOpen {
                        retry_in: self.config.reset_timeout - elapsed,
                    });
                }
                info!("circuit reset timeout elapsed, probing upstream");
                inner.state = CircuitState::HalfOpen;
            }
        }

        let result = with_retry(operation, &self.config.retry).await;

        let mut inner = self.lock();
        match &result {
            Ok(_) => {
                inner.failure_count = 0;
                if inner.state != CircuitState::Closed {
                    info!("upstream recovered, closing circuit");
                }
                inner.state = CircuitState::Closed;
            }
            Err(_) => {
                inner.failure_count += 1;
                inner.last_failure = Some(Instant::now());
                if inner.failure_count >= self.config.failure_threshold {
                    if inner.state != CircuitState::Open {
                        warn!(
                            failures = inner.failure_count,
                            threshold = self.config.failure_threshold,
                            "failure threshold reached, opening circuit"
                        );
                    }
                    inner.state = CircuitState::Open;
                }
            }
        }
        result
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let inner = self.lock();
        CircuitSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            since_last_failure: inner.last_failure.map(|t| t.elapsed()),
        }
    }

    /// Forces the breaker back to a pristine closed state.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.last_failure = None;
    }
}
