//! User roles and the resolved acting user.
//!
//! Role names must match the values stored in `users.role` and carried in
//! identity tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_ENGINEER: &str = "engineer";
pub const ROLE_COMPANY: &str = "company";
pub const ROLE_MENTOR: &str = "mentor";
pub const ROLE_ADMIN: &str = "admin";

/// Closed set of marketplace roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Engineer,
    Company,
    Mentor,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Engineer => ROLE_ENGINEER,
            UserRole::Company => ROLE_COMPANY,
            UserRole::Mentor => ROLE_MENTOR,
            UserRole::Admin => ROLE_ADMIN,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = CoreError;

    /// Parse a role name. Matching is exact; callers normalise case at the
    /// identity boundary.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ENGINEER => Ok(UserRole::Engineer),
            ROLE_COMPANY => Ok(UserRole::Company),
            ROLE_MENTOR => Ok(UserRole::Mentor),
            ROLE_ADMIN => Ok(UserRole::Admin),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

/// The user on whose behalf an operation runs, as resolved by the identity
/// provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: UserRole,
    pub email: Option<String>,
}

impl Actor {
    pub fn new(user_id: DbId, role: UserRole) -> Self {
        Self {
            user_id,
            role,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Fail with `NotAuthorized` unless the actor holds `role`.
    pub fn require_role(&self, role: UserRole, action: &str) -> Result<(), CoreError> {
        if self.role == role {
            Ok(())
        } else {
            Err(CoreError::NotAuthorized(format!(
                "{action} requires the {role} role, user {} is {}",
                self.user_id, self.role
            )))
        }
    }
}
