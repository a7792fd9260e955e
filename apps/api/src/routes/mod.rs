pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::profile::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile API
        .route("/api/v1/profiles", post(handlers::handle_create_profile))
        .route(
            "/api/v1/uploads/validate",
            post(handlers::handle_validate_upload),
        )
        .with_state(state)
}
