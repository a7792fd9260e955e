use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::resilience::{ResilienceError, Retryable};

/// Hook invoked before each retry sleep with the 1-based attempt number and
/// the error that caused it.
pub type RetryHook = Arc<dyn Fn(u32, &str) + Send + Sync>;

/// Retry behavior for one logical upstream call.
///
/// Defaults match the production LLM call site: 3 retries, 1s initial delay
/// doubling up to 30s, each attempt bounded by a 60s timeout.
#[derive(Clone)]
pub struct RetryPolicy {
    /// Retry attempts after the first try.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Multiplier applied per attempt; must be > 1 for the delay to grow.
    pub backoff_factor: f64,
    /// Bound on each individual attempt. `None` disables the bound.
    pub timeout: Option<Duration>,
    pub on_retry: Option<RetryHook>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            backoff_factor: 2.0,
            timeout: Some(Duration::from_millis(60_000)),
            on_retry: None,
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("backoff_factor", &self.backoff_factor)
            .field("timeout", &self.timeout)
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

impl RetryPolicy {
    /// Jittered backoff delay for the 0-indexed attempt:
    /// `min(initial * factor^attempt, max)` scaled by ±25% uniformly.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64 * self.backoff_factor.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);
        let jittered = capped * rand::thread_rng().gen_range(0.75..=1.25);
        Duration::from_millis(jittered.max(0.0) as u64)
    }
}

/// Races `future` against a timer. If the timer wins, the future is dropped
/// and the caller gets a timeout error carrying the configured bound.
pub async fn with_timeout<T, E, Fut>(future: Fut, bound: Duration) -> Result<T, ResilienceError<E>>
where
    Fut: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(bound, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ResilienceError::Upstream(e)),
        Err(_) => Err(ResilienceError::Timeout { waited: bound }),
    }
}

/// Runs `operation` up to `max_retries + 1` times, sleeping a jittered
/// exponential backoff between attempts.
///
/// The factory is invoked fresh per attempt and attempts strictly serialize.
/// A non-retryable error propagates immediately without sleeping; otherwise
/// the error from the last attempt is the one surfaced.
pub async fn with_retry<T, E, F, Fut>(
    mut operation: F,
    policy: &RetryPolicy,
) -> Result<T, ResilienceError<E>>
where
    E: Retryable + fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u32 = 0;
    loop {
        let result = match policy.timeout {
            Some(bound) => with_timeout(operation(), bound).await,
            None => operation().await.map_err(ResilienceError::Upstream),
        };

        let err = match result {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if attempt >= policy.max_retries || !err.is_retryable() {
            return Err(err);
        }

        let delay = policy.backoff_delay(attempt);
        warn!(
            attempt = attempt + 1,
            max_retries = policy.max_retries,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "upstream call failed, retrying"
        );
        if let Some(hook) = &policy.on_retry {
            hook(attempt + 1, &err.to_string());
        }
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
