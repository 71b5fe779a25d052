//! Route definitions for the feedback API

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::handlers::*;

/// Feedback routes, mounted under /deald-feedback
pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/deald-feedback/user/:username",
            get(list_user_feedback).post(create_feedback),
        )
        .route(
            "/deald-feedback/user/:username/summary",
            get(user_feedback_summary),
        )
        .route(
            "/deald-feedback/:id",
            get(get_feedback).delete(delete_feedback),
        )
        .route("/deald-feedback/:id/dispute", post(dispute_feedback))
        .route("/deald-feedback/:id/resolve", post(resolve_feedback))
}

/// Assemble the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(feedback_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> &'static str {
    "Deald Feedback API"
}

async fn health_check() -> &'static str {
    "OK"
}
