//! Read-only view of the identity record owned by the auth service.

use serde::Serialize;

use crate::roles::UserRole;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
}
