use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::resilience::CircuitState;
use crate::state::AppState;

/// GET /health
/// Returns a status object with service version and the LLM circuit state.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.breaker.snapshot();
    let circuit = match snapshot.state {
        CircuitState::Closed => "closed",
        CircuitState::Open => "open",
        CircuitState::HalfOpen => "half-open",
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "profile-api",
        "llm_circuit": circuit,
    }))
}
