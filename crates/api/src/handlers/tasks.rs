//! Handlers for the task lifecycle.

use appbee_core::roles::UserRole;
use appbee_core::submission::{ReviewInput, SubmitWork};
use appbee_core::task::{CreateTask, UpdateTask};
use appbee_core::types::DbId;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/tasks
///
/// Engineers get the published board merged with their own tasks, annotated
/// with claim and submit flags. Everyone else gets the published board.
pub async fn list_tasks(auth: AuthUser, State(state): State<AppState>) -> AppResult<Response> {
    if auth.role == UserRole::Engineer {
        let views = state
            .marketplace
            .list_tasks_for_engineer(&auth.actor())
            .await?;
        return Ok(Json(DataResponse { data: views }).into_response());
    }
    let tasks = state.marketplace.list_published_tasks().await?;
    Ok(Json(DataResponse { data: tasks }).into_response())
}

/// GET /api/v1/tasks/mine
pub async fn list_company_tasks(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let tasks = state
        .marketplace
        .list_tasks_for_company(&auth.actor())
        .await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// POST /api/v1/tasks
pub async fn create_task(
    auth: AuthUser,
    State(state): State<AppState>,
    input: Result<Json<CreateTask>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let task = state.marketplace.create_task(&auth.actor(), input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// PUT /api/v1/tasks/{id}
pub async fn update_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    patch: Result<Json<UpdateTask>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(patch) = patch?;
    let task = state
        .marketplace
        .update_task(&auth.actor(), id, patch)
        .await?;
    Ok(Json(DataResponse { data: task }))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.marketplace.delete_task(&auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tasks/{id}/cancel
pub async fn cancel_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let task = state.marketplace.cancel_task(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: task }))
}

/// POST /api/v1/tasks/{id}/claim
pub async fn claim_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let progress = state.marketplace.claim_task(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: progress }))
}

/// POST /api/v1/tasks/{id}/submit
pub async fn submit_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    work: Result<Json<SubmitWork>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(work) = work?;
    let progress = state
        .marketplace
        .submit_task(&auth.actor(), id, work)
        .await?;
    Ok(Json(DataResponse { data: progress }))
}

/// POST /api/v1/tasks/{id}/approve
///
/// Approves every pending submission of the task. The body is optional.
pub async fn approve_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<ReviewInput>>,
) -> AppResult<impl IntoResponse> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    let approval = state
        .marketplace
        .approve_task(&auth.actor(), id, input)
        .await?;
    Ok(Json(DataResponse { data: approval }))
}
