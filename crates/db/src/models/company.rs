//! Row model for the `companies` table.

use appbee_core::company::Company;
use appbee_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `companies` table.
#[derive(Debug, Clone, FromRow)]
pub struct CompanyRow {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
