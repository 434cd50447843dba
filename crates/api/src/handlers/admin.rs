//! Handlers for the `/admin` resource (company administration).
//!
//! The admin role is checked by the marketplace service.

use appbee_core::company::{CreateCompanyFor, UpsertCompany};
use appbee_core::types::DbId;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/admin/companies
pub async fn create_company(
    auth: AuthUser,
    State(state): State<AppState>,
    input: Result<Json<CreateCompanyFor>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let company = state
        .marketplace
        .create_company_for(&auth.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: company })))
}

/// PUT /api/v1/admin/companies/{id}
pub async fn update_company(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Result<Json<UpsertCompany>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let company = state
        .marketplace
        .update_company(&auth.actor(), id, input)
        .await?;
    Ok(Json(DataResponse { data: company }))
}

/// DELETE /api/v1/admin/companies/{id}
///
/// Removes the company with its open tasks and their submissions.
pub async fn delete_company(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.marketplace.delete_company(&auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
