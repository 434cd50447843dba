use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{submissions, tasks};
use crate::state::AppState;

/// Mounted at `/tasks`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route("/mine", get(tasks::list_company_tasks))
        .route("/{id}", put(tasks::update_task).delete(tasks::delete_task))
        .route("/{id}/claim", post(tasks::claim_task))
        .route("/{id}/submit", post(tasks::submit_task))
        .route("/{id}/approve", post(tasks::approve_task))
        .route("/{id}/cancel", post(tasks::cancel_task))
        .route("/{id}/submissions", get(submissions::list_for_task))
}
