//! Handlers for the review queue.

use appbee_core::submission::{RejectInput, ReviewInput};
use appbee_core::types::DbId;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/submissions/pending
pub async fn list_pending(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let pending = state
        .marketplace
        .list_pending_submissions(&auth.actor())
        .await?;
    Ok(Json(DataResponse { data: pending }))
}

/// GET /api/v1/tasks/{id}/submissions
pub async fn list_for_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let submissions = state
        .marketplace
        .get_submissions_for_task(&auth.actor(), task_id)
        .await?;
    Ok(Json(DataResponse { data: submissions }))
}

/// POST /api/v1/submissions/{id}/approve
pub async fn approve_submission(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<ReviewInput>>,
) -> AppResult<impl IntoResponse> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    let submission = state
        .marketplace
        .approve_submission(&auth.actor(), id, input)
        .await?;
    Ok(Json(DataResponse { data: submission }))
}

/// POST /api/v1/submissions/{id}/reject
pub async fn reject_submission(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<RejectInput>>,
) -> AppResult<impl IntoResponse> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    let submission = state
        .marketplace
        .reject_submission(&auth.actor(), id, input)
        .await?;
    Ok(Json(DataResponse { data: submission }))
}
