use axum::routing::{get, post};
use axum::Router;

use crate::handlers::submissions;
use crate::state::AppState;

/// Mounted at `/submissions`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pending", get(submissions::list_pending))
        .route("/{id}/approve", post(submissions::approve_submission))
        .route("/{id}/reject", post(submissions::reject_submission))
}
