//! Repository for the `tasks` table.

use appbee_core::status::StatusId;
use appbee_core::task::{CreateTask, Task};
use appbee_core::types::{DbId, Timestamp};
use sqlx::PgConnection;

use crate::models::task::TaskRow;

/// Column list for tasks queries.
const COLUMNS: &str = "id, title, description, difficulty, budget, base_xp, deadline_at, \
    company_id, assignee_id, status_id, created_at, updated_at";

pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task with the given initial status.
    pub async fn create(
        conn: &mut PgConnection,
        company_id: DbId,
        input: &CreateTask,
        status_id: StatusId,
        now: Timestamp,
    ) -> Result<TaskRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks \
                (title, description, difficulty, budget, base_xp, deadline_at, \
                 company_id, status_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.difficulty.as_str())
            .bind(input.budget)
            .bind(input.base_xp)
            .bind(input.deadline_at)
            .bind(company_id)
            .bind(status_id)
            .bind(now)
            .fetch_one(conn)
            .await
    }

    /// Find a task and lock its row until the transaction ends.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<TaskRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List tasks in a status, oldest first.
    pub async fn list_by_status(
        conn: &mut PgConnection,
        status_id: StatusId,
    ) -> Result<Vec<TaskRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE status_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(status_id)
            .fetch_all(conn)
            .await
    }

    pub async fn list_by_company(
        conn: &mut PgConnection,
        company_id: DbId,
    ) -> Result<Vec<TaskRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE company_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(company_id)
            .fetch_all(conn)
            .await
    }

    /// List tasks the engineer holds a submission for.
    pub async fn list_for_engineer(
        conn: &mut PgConnection,
        engineer_id: DbId,
    ) -> Result<Vec<TaskRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks t \
             WHERE EXISTS ( \
                SELECT 1 FROM submissions s \
                WHERE s.task_id = t.id AND s.engineer_id = $1 \
             ) \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(engineer_id)
            .fetch_all(conn)
            .await
    }

    /// Write the mutable fields of a task. `None` if the row is gone.
    pub async fn update(
        conn: &mut PgConnection,
        task: &Task,
    ) -> Result<Option<TaskRow>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET \
                title = $2, description = $3, deadline_at = $4, \
                status_id = $5, assignee_id = $6, updated_at = $7 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.deadline_at)
            .bind(task.status.id())
            .bind(task.assignee_id)
            .bind(task.updated_at)
            .fetch_optional(conn)
            .await
    }

    /// Delete a task; its submissions go with it via `ON DELETE CASCADE`.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
