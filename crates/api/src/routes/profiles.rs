use axum::routing::get;
use axum::Router;

use crate::handlers::profiles;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile/me", get(profiles::get_my_profile))
        .route("/leaderboard", get(profiles::leaderboard))
}
