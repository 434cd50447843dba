use appbee_core::company::UpsertCompany;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/companies
///
/// Also served at `/api/v1/admin/companies`.
pub async fn list_companies(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let companies = state.marketplace.list_companies(&auth.actor()).await?;
    Ok(Json(DataResponse { data: companies }))
}

/// GET /api/v1/companies/me
pub async fn get_my_company(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let company = state.marketplace.get_my_company(&auth.actor()).await?;
    Ok(Json(DataResponse { data: company }))
}

/// PUT /api/v1/companies/me
pub async fn upsert_my_company(
    auth: AuthUser,
    State(state): State<AppState>,
    input: Result<Json<UpsertCompany>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let company = state
        .marketplace
        .upsert_my_company(&auth.actor(), input)
        .await?;
    Ok(Json(DataResponse { data: company }))
}
