pub mod admin;
pub mod companies;
pub mod health;
pub mod profiles;
pub mod submissions;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /tasks                          list (GET), create (POST)
/// /tasks/mine                     company's own tasks (GET)
/// /tasks/{id}                     update (PUT), delete (DELETE)
/// /tasks/{id}/claim               claim (POST)
/// /tasks/{id}/submit              submit work (POST)
/// /tasks/{id}/approve             approve all pending (POST)
/// /tasks/{id}/cancel              cancel (POST)
/// /tasks/{id}/submissions         submissions of a task (GET)
///
/// /submissions/pending            review queue (GET)
/// /submissions/{id}/approve       approve one (POST)
/// /submissions/{id}/reject        reject one (POST)
///
/// /companies                      all companies (GET)
/// /companies/me                   get (GET), create or update (PUT)
///
/// /admin/companies                list (GET), create for a user (POST)
/// /admin/companies/{id}           update (PUT), delete (DELETE)
///
/// /profile/me                     own profile (GET)
/// /leaderboard                    top profiles by XP (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/tasks", tasks::router())
        .nest("/submissions", submissions::router())
        .nest("/companies", companies::router())
        .nest("/admin", admin::router())
        .merge(profiles::router())
}
