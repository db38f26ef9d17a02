pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::audit::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Single-page UI
        .route("/", get(handlers::handle_index))
        .route("/audit", post(handlers::handle_submit))
        .route("/audit/cancel", post(handlers::handle_cancel))
        .route("/audit/reset", post(handlers::handle_reset))
        .route("/input/upload", post(handlers::handle_upload))
        .route("/report/json-ld", get(handlers::handle_json_ld))
        // JSON API
        .route("/api/v1/audits", post(handlers::handle_api_audit))
        .route("/api/v1/session", get(handlers::handle_api_session))
        .with_state(state)
}
