pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::submission::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Submission API
        .route(
            "/api/v1/resumes",
            post(handlers::handle_submit).get(handlers::handle_list_resumes),
        )
        .route("/api/v1/resumes/:id", get(handlers::handle_get_resume))
        // Stored artifacts
        .route("/api/v1/files/*path", get(handlers::handle_get_file))
        .with_state(state)
}
