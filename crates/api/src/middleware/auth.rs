//! Bearer-token extractor resolving the acting user.

use appbee_core::error::CoreError;
use appbee_core::roles::{Actor, UserRole};
use appbee_core::types::DbId;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the `Authorization: Bearer` header.
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user_id, role = %auth.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: UserRole,
    pub email: Option<String>,
}

impl AuthUser {
    /// The identity in the form marketplace operations take.
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            role: self.role,
            email: self.email.clone(),
        }
    }
}

fn unauthenticated(msg: &str) -> AppError {
    AppError::Core(CoreError::NotAuthenticated(msg.to_string()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthenticated("Missing Authorization header"))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            unauthenticated("Invalid Authorization format. Expected: Bearer <token>")
        })?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthenticated("Invalid or expired token"))?;

        let role = claims
            .role
            .to_ascii_lowercase()
            .parse::<UserRole>()
            .map_err(|_| unauthenticated("Token carries an unknown role"))?;

        Ok(AuthUser {
            user_id: claims.sub,
            role,
            email: claims.email,
        })
    }
}
