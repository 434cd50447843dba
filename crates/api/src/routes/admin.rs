//! Route definitions for the `/admin` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{admin, companies};
use crate::state::AppState;

/// Routes mounted at `/admin`. Every operation requires the `admin` role.
///
/// ```text
/// GET    /companies               -> list_companies
/// POST   /companies               -> create_company
/// PUT    /companies/{id}          -> update_company
/// DELETE /companies/{id}          -> delete_company
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/companies",
            get(companies::list_companies).post(admin::create_company),
        )
        .route(
            "/companies/{id}",
            put(admin::update_company).delete(admin::delete_company),
        )
}
