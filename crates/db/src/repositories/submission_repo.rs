//! Repository for the `submissions` table.

use appbee_core::status::StatusId;
use appbee_core::submission::{NewSubmission, Submission};
use appbee_core::types::{DbId, Timestamp};
use sqlx::PgConnection;

use crate::models::submission::SubmissionRow;

/// Column list for submissions queries.
const COLUMNS: &str = "id, task_id, engineer_id, notes, attachment_url, claimed_at, \
    submitted_at, status_id, approved_at, approved_by, xp_awarded, quality_score, \
    review_comment, created_at, updated_at";

/// Column list qualified with the `s` alias, for joins.
const S_COLUMNS: &str = "s.id, s.task_id, s.engineer_id, s.notes, s.attachment_url, \
    s.claimed_at, s.submitted_at, s.status_id, s.approved_at, s.approved_by, s.xp_awarded, \
    s.quality_score, s.review_comment, s.created_at, s.updated_at";

pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Insert a submission. Fails on `uq_submissions_task_engineer` when the
    /// engineer already has one for the task.
    pub async fn create(
        conn: &mut PgConnection,
        input: &NewSubmission,
        now: Timestamp,
    ) -> Result<SubmissionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO submissions \
                (task_id, engineer_id, notes, attachment_url, claimed_at, submitted_at, \
                 status_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(input.task_id)
            .bind(input.engineer_id)
            .bind(&input.notes)
            .bind(&input.attachment_url)
            .bind(input.claimed_at)
            .bind(input.submitted_at)
            .bind(input.status.id())
            .bind(now)
            .fetch_one(conn)
            .await
    }

    /// Owning task of a submission, without locking the row.
    pub async fn find_task_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT task_id FROM submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Find a submission and lock its row until the transaction ends.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<SubmissionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Find the submission of one engineer on one task, locking it.
    pub async fn find_for_pair_for_update(
        conn: &mut PgConnection,
        task_id: DbId,
        engineer_id: DbId,
    ) -> Result<Option<SubmissionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM submissions \
             WHERE task_id = $1 AND engineer_id = $2 \
             FOR UPDATE"
        );
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(task_id)
            .bind(engineer_id)
            .fetch_optional(conn)
            .await
    }

    /// List a task's submissions, locking them for review.
    pub async fn list_by_task(
        conn: &mut PgConnection,
        task_id: DbId,
    ) -> Result<Vec<SubmissionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM submissions WHERE task_id = $1 ORDER BY id ASC FOR UPDATE"
        );
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(task_id)
            .fetch_all(conn)
            .await
    }

    pub async fn list_by_engineer(
        conn: &mut PgConnection,
        engineer_id: DbId,
    ) -> Result<Vec<SubmissionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM submissions WHERE engineer_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(engineer_id)
            .fetch_all(conn)
            .await
    }

    /// List submissions in a status, optionally only those on one company's
    /// tasks. Oldest first.
    pub async fn list_by_status(
        conn: &mut PgConnection,
        status_id: StatusId,
        company_id: Option<DbId>,
    ) -> Result<Vec<SubmissionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {S_COLUMNS} FROM submissions s \
             JOIN tasks t ON t.id = s.task_id \
             WHERE s.status_id = $1 \
               AND ($2::BIGINT IS NULL OR t.company_id = $2) \
             ORDER BY s.id ASC"
        );
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(status_id)
            .bind(company_id)
            .fetch_all(conn)
            .await
    }

    /// Write every mutable column of a submission. `None` if the row is gone.
    pub async fn update(
        conn: &mut PgConnection,
        submission: &Submission,
    ) -> Result<Option<SubmissionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE submissions SET \
                engineer_id = $2, notes = $3, attachment_url = $4, claimed_at = $5, \
                submitted_at = $6, status_id = $7, approved_at = $8, approved_by = $9, \
                xp_awarded = $10, quality_score = $11, review_comment = $12, updated_at = $13 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(submission.id)
            .bind(submission.engineer_id)
            .bind(&submission.notes)
            .bind(&submission.attachment_url)
            .bind(submission.claimed_at)
            .bind(submission.submitted_at)
            .bind(submission.status.id())
            .bind(submission.approved_at)
            .bind(submission.approved_by)
            .bind(submission.xp_awarded)
            .bind(submission.quality_score)
            .bind(&submission.review_comment)
            .bind(submission.updated_at)
            .fetch_optional(conn)
            .await
    }
}
