//! Row models for the `profiles` table and the leaderboard query.

use appbee_core::profile::{level_for_xp, LeaderEntry, Profile};
use appbee_core::roles::UserRole;
use appbee_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `profiles` table. There is no level column.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub user_id: DbId,
    pub xp_points: i64,
    pub honey_drops: i64,
    pub reputation_score: f64,
    pub github_handle: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            user_id: row.user_id,
            xp_points: row.xp_points,
            level: level_for_xp(row.xp_points),
            honey_drops: row.honey_drops,
            reputation_score: row.reputation_score,
            github_handle: row.github_handle,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A profile joined with its user record.
#[derive(Debug, Clone, FromRow)]
pub struct LeaderRow {
    pub user_id: DbId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub xp_points: i64,
}

impl From<LeaderRow> for LeaderEntry {
    fn from(row: LeaderRow) -> Self {
        LeaderEntry {
            user_id: row.user_id,
            full_name: row.full_name,
            email: row.email,
            // An unrecognised role only affects display.
            role: row.role.and_then(|r| r.parse::<UserRole>().ok()),
            xp: row.xp_points,
            level: level_for_xp(row.xp_points),
        }
    }
}
