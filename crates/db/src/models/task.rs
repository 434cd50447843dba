//! Row model for the `tasks` table.

use appbee_core::error::CoreError;
use appbee_core::status::{StatusId, TaskStatus};
use appbee_core::task::{Difficulty, Task};
use appbee_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::undecodable;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub budget: i64,
    pub base_xp: Option<i64>,
    pub deadline_at: Option<Timestamp>,
    pub company_id: DbId,
    pub assignee_id: Option<DbId>,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<TaskRow> for Task {
    type Error = CoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = TaskStatus::from_id(row.status_id)
            .ok_or_else(|| undecodable("tasks", "status_id", row.status_id))?;
        let difficulty = row
            .difficulty
            .parse::<Difficulty>()
            .map_err(|_| undecodable("tasks", "difficulty", &row.difficulty))?;
        Ok(Task {
            id: row.id,
            title: row.title,
            description: row.description,
            difficulty,
            budget: row.budget,
            base_xp: row.base_xp,
            deadline_at: row.deadline_at,
            company_id: row.company_id,
            assignee_id: row.assignee_id,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
