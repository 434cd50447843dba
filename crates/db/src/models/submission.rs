//! Row model for the `submissions` table.

use appbee_core::error::CoreError;
use appbee_core::status::{StatusId, SubmissionStatus};
use appbee_core::submission::Submission;
use appbee_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::undecodable;

/// A row from the `submissions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    pub id: DbId,
    pub task_id: DbId,
    pub engineer_id: Option<DbId>,
    pub notes: Option<String>,
    pub attachment_url: Option<String>,
    pub claimed_at: Option<Timestamp>,
    pub submitted_at: Option<Timestamp>,
    pub status_id: StatusId,
    pub approved_at: Option<Timestamp>,
    pub approved_by: Option<DbId>,
    pub xp_awarded: Option<i64>,
    pub quality_score: Option<f64>,
    pub review_comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = CoreError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let status = SubmissionStatus::from_id(row.status_id)
            .ok_or_else(|| undecodable("submissions", "status_id", row.status_id))?;
        Ok(Submission {
            id: row.id,
            task_id: row.task_id,
            engineer_id: row.engineer_id,
            notes: row.notes,
            attachment_url: row.attachment_url,
            claimed_at: row.claimed_at,
            submitted_at: row.submitted_at,
            status,
            approved_at: row.approved_at,
            approved_by: row.approved_by,
            xp_awarded: row.xp_awarded,
            quality_score: row.quality_score,
            review_comment: row.review_comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
