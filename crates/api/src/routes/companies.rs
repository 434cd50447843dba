use axum::routing::get;
use axum::Router;

use crate::handlers::companies;
use crate::state::AppState;

/// Mounted at `/companies`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(companies::list_companies))
        .route(
            "/me",
            get(companies::get_my_company).put(companies::upsert_my_company),
        )
}
