//! Repository for the `profiles` table.

use appbee_core::profile::ProfileCredit;
use appbee_core::types::{DbId, Timestamp};
use sqlx::PgConnection;

use crate::models::profile::{LeaderRow, ProfileRow};

/// Column list for profiles queries.
const COLUMNS: &str =
    "user_id, xp_points, honey_drops, reputation_score, github_handle, created_at, updated_at";

pub struct ProfileRepo;

impl ProfileRepo {
    /// Get or create the profile for a user.
    ///
    /// Uses `ON CONFLICT (user_id) DO UPDATE` so the existing row is returned.
    pub async fn ensure(
        conn: &mut PgConnection,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<ProfileRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (user_id, created_at, updated_at) \
             VALUES ($1, $2, $2) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = profiles.user_id \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProfileRow>(&query)
            .bind(user_id)
            .bind(now)
            .fetch_one(conn)
            .await
    }

    /// Add a credit in a single statement, creating the profile if needed.
    /// Concurrent credits to the same user serialize on the row lock.
    pub async fn credit(
        conn: &mut PgConnection,
        credit: &ProfileCredit,
        now: Timestamp,
    ) -> Result<ProfileRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles \
                (user_id, xp_points, honey_drops, reputation_score, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
                xp_points = profiles.xp_points + EXCLUDED.xp_points, \
                honey_drops = profiles.honey_drops + EXCLUDED.honey_drops, \
                reputation_score = profiles.reputation_score + EXCLUDED.reputation_score, \
                updated_at = EXCLUDED.updated_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProfileRow>(&query)
            .bind(credit.user_id)
            .bind(credit.xp)
            .bind(credit.honey_drops)
            .bind(credit.reputation)
            .bind(now)
            .fetch_one(conn)
            .await
    }

    /// Top profiles by XP with user display data, ties broken by user id.
    pub async fn leaderboard(
        conn: &mut PgConnection,
        limit: i64,
    ) -> Result<Vec<LeaderRow>, sqlx::Error> {
        sqlx::query_as::<_, LeaderRow>(
            "SELECT p.user_id, u.full_name, u.email, u.role, p.xp_points \
             FROM profiles p \
             LEFT JOIN users u ON u.id = p.user_id \
             ORDER BY p.xp_points DESC, p.user_id ASC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(conn)
        .await
    }
}
