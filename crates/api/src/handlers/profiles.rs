use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/profile/me
pub async fn get_my_profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let profile = state.marketplace.get_profile(&auth.actor()).await?;
    Ok(Json(DataResponse { data: profile }))
}

/// GET /api/v1/leaderboard?limit=N
///
/// Public; `limit` defaults to 10 and is clamped to 1..=100.
pub async fn leaderboard(
    State(state): State<AppState>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = params?;
    let entries = state.marketplace.leaderboard(params.limit).await?;
    Ok(Json(DataResponse { data: entries }))
}
