//! Task entity, difficulty table, and task input DTOs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::status::TaskStatus;
use crate::types::{DbId, Timestamp};

/// Maximum length of a task title.
pub const MAX_TITLE_LENGTH: u64 = 200;

/// Maximum length of a task description.
pub const MAX_DESCRIPTION_LENGTH: u64 = 4_000;

/// Base XP for an `Easy` task that carries no explicit base XP.
pub const EASY_BASE_XP: i64 = 50;
/// Base XP for a `Medium` task that carries no explicit base XP.
pub const MEDIUM_BASE_XP: i64 = 100;
/// Base XP for a `Hard` task that carries no explicit base XP.
pub const HARD_BASE_XP: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Fallback base XP; strictly increasing with difficulty.
    pub fn default_base_xp(self) -> i64 {
        match self {
            Difficulty::Easy => EASY_BASE_XP,
            Difficulty::Medium => MEDIUM_BASE_XP,
            Difficulty::Hard => HARD_BASE_XP,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(CoreError::Validation(format!(
                "Invalid difficulty '{other}'. Must be one of: easy, medium, hard"
            ))),
        }
    }
}

/// A unit of work posted by a company.
///
/// `company_id`, `budget` and `base_xp` are fixed at creation; lifecycle
/// operations only ever touch `status`, `assignee_id` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    /// Reward budget in honey drops.
    pub budget: i64,
    /// Explicit base XP; `None` falls back to the difficulty table.
    pub base_xp: Option<i64>,
    pub deadline_at: Option<Timestamp>,
    pub company_id: DbId,
    /// First engineer to claim the task. Display only.
    pub assignee_id: Option<DbId>,
    pub status: TaskStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// Base XP used by the reward engine.
    pub fn effective_base_xp(&self) -> i64 {
        self.base_xp
            .unwrap_or_else(|| self.difficulty.default_base_xp())
    }
}

/// DTO for creating a task.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH))]
    pub title: String,
    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description: Option<String>,
    pub difficulty: Difficulty,
    #[validate(range(min = 0))]
    pub budget: i64,
    #[validate(range(min = 0))]
    pub base_xp: Option<i64>,
    pub deadline_at: Option<Timestamp>,
}

/// DTO for editing a task. Status, company, budget and base XP are not editable.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH))]
    pub title: Option<String>,
    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description: Option<String>,
    pub deadline_at: Option<Timestamp>,
}

impl UpdateTask {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.deadline_at.is_none()
    }
}

/// A task as seen by one engineer, with their own progress flags.
#[derive(Debug, Clone, Serialize)]
pub struct EngineerTaskView {
    #[serde(flatten)]
    pub task: Task,
    pub claimed_by_me: bool,
    pub submitted_by_me: bool,
}
