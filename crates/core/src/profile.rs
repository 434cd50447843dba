//! Per-user gamification state and the leveling curve.

use serde::Serialize;

use crate::error::CoreError;
use crate::roles::UserRole;
use crate::types::{DbId, Timestamp};

/// XP needed per level step: 0-499 is level 1, 500-999 level 2, ...
pub const XP_PER_LEVEL: i64 = 500;

/// Default number of leaderboard entries.
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

/// Maximum number of leaderboard entries.
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

/// Level for a cumulative XP total. Monotonic, never below 1.
pub fn level_for_xp(xp: i64) -> i32 {
    let steps = xp.max(0) / XP_PER_LEVEL;
    i32::try_from(steps.saturating_add(1)).unwrap_or(i32::MAX)
}

/// Clamp a requested leaderboard size into `1..=MAX_LEADERBOARD_LIMIT`.
pub fn clamp_leaderboard_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT)
}

/// A user's profile. `level` is always `level_for_xp(xp_points)`; it is
/// derived on construction and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub user_id: DbId,
    pub xp_points: i64,
    pub level: i32,
    /// Spendable honey drops.
    pub honey_drops: i64,
    /// Mentor review credit.
    pub reputation_score: f64,
    pub github_handle: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Profile {
    pub fn new(user_id: DbId, now: Timestamp) -> Self {
        Self {
            user_id,
            xp_points: 0,
            level: level_for_xp(0),
            honey_drops: 0,
            reputation_score: 0.0,
            github_handle: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a credit in place, keeping `level` in step with XP.
    pub fn apply(&mut self, credit: &ProfileCredit, now: Timestamp) {
        self.xp_points += credit.xp;
        self.honey_drops += credit.honey_drops;
        self.reputation_score += credit.reputation;
        self.level = level_for_xp(self.xp_points);
        self.updated_at = now;
    }
}

/// An increment applied atomically to one profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCredit {
    pub user_id: DbId,
    pub xp: i64,
    pub honey_drops: i64,
    pub reputation: f64,
}

impl ProfileCredit {
    /// Build a credit; every component must be non-negative so XP and
    /// balances never decrease through the reward path.
    pub fn new(user_id: DbId, xp: i64, honey_drops: i64, reputation: f64) -> Result<Self, CoreError> {
        if xp < 0 || honey_drops < 0 || reputation < 0.0 {
            return Err(CoreError::Internal(format!(
                "Negative profile credit for user {user_id}: xp={xp}, honey_drops={honey_drops}, reputation={reputation}"
            )));
        }
        Ok(Self {
            user_id,
            xp,
            honey_drops,
            reputation,
        })
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderEntry {
    pub user_id: DbId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub xp: i64,
    pub level: i32,
}
