//! Company entity: the posting side of the marketplace, one per owner.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Company {
    pub fn is_owned_by(&self, user_id: DbId) -> bool {
        self.owner_id == user_id
    }
}

/// DTO for creating or updating the caller's company.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertCompany {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// DTO for an administrator creating a company on behalf of a user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCompanyFor {
    pub owner_id: DbId,
    #[serde(flatten)]
    #[validate(nested)]
    pub company: UpsertCompany,
}

impl UpsertCompany {
    /// Placeholder used when a company is provisioned implicitly.
    pub fn provisioned_for(owner_id: DbId, email: Option<&str>) -> Self {
        let name = match email {
            Some(email) => format!("{email}'s company"),
            None => format!("Company of user {owner_id}"),
        };
        Self {
            name,
            description: None,
        }
    }
}
