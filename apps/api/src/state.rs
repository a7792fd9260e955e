use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::resilience::CircuitBreaker;

/// Shared application state injected into all route handlers via Axum
/// extractors. Everything here is explicitly constructed in `main` — no
/// module-global singletons, so tests can build their own.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// One breaker guarding the one upstream call site (the LLM API).
    pub breaker: Arc<CircuitBreaker>,
    pub config: Config,
}
