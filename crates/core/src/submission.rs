//! Submission entity: one engineer's work record against one task.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::status::SubmissionStatus;
use crate::types::{DbId, Timestamp};

/// Lowest reviewer quality score.
pub const MIN_QUALITY_SCORE: f64 = 1.0;
/// Highest reviewer quality score.
pub const MAX_QUALITY_SCORE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: DbId,
    pub task_id: DbId,
    /// `None` only when the engineer's user record has been removed.
    pub engineer_id: Option<DbId>,
    pub notes: Option<String>,
    pub attachment_url: Option<String>,
    pub claimed_at: Option<Timestamp>,
    pub submitted_at: Option<Timestamp>,
    pub status: SubmissionStatus,
    pub approved_at: Option<Timestamp>,
    pub approved_by: Option<DbId>,
    pub xp_awarded: Option<i64>,
    pub quality_score: Option<f64>,
    pub review_comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Submission {
    pub fn is_approved(&self) -> bool {
        self.status == SubmissionStatus::Approved
    }

    /// Whether the engineer has handed in work at least once.
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }

    /// Record new work. Approved submissions are frozen.
    pub fn record_work(&mut self, work: &SubmitWork, now: Timestamp) -> Result<(), CoreError> {
        if self.is_approved() {
            return Err(CoreError::invalid_state(
                "Submission",
                self.id,
                "draft, pending or rejected",
                self.status,
            ));
        }
        self.notes = work.notes.clone();
        self.attachment_url = work.attachment_url.clone();
        self.submitted_at = Some(now);
        self.status = SubmissionStatus::Pending;
        self.quality_score = None;
        self.review_comment = None;
        self.updated_at = now;
        Ok(())
    }

    /// Stamp the approval fields. Callers check `Pending` first.
    pub fn mark_approved(
        &mut self,
        reviewer_id: DbId,
        review: &ReviewInput,
        xp_awarded: i64,
        now: Timestamp,
    ) {
        self.status = SubmissionStatus::Approved;
        self.approved_at = Some(now);
        self.approved_by = Some(reviewer_id);
        self.xp_awarded = Some(xp_awarded);
        self.quality_score = review.quality_score;
        self.review_comment = review.comment.clone();
        self.updated_at = now;
    }

    pub fn mark_rejected(&mut self, comment: Option<String>, now: Timestamp) {
        self.status = SubmissionStatus::Rejected;
        self.review_comment = comment;
        self.updated_at = now;
    }
}

/// Insert payload for a new submission row.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub task_id: DbId,
    pub engineer_id: DbId,
    pub notes: Option<String>,
    pub attachment_url: Option<String>,
    pub claimed_at: Option<Timestamp>,
    pub submitted_at: Option<Timestamp>,
    pub status: SubmissionStatus,
}

impl NewSubmission {
    /// Row created by a claim: nothing submitted yet.
    pub fn claim(task_id: DbId, engineer_id: DbId, now: Timestamp) -> Self {
        Self {
            task_id,
            engineer_id,
            notes: None,
            attachment_url: None,
            claimed_at: Some(now),
            submitted_at: None,
            status: SubmissionStatus::Draft,
        }
    }

    /// Row created by a submit that was never preceded by a claim.
    pub fn direct_submit(
        task_id: DbId,
        engineer_id: DbId,
        work: &SubmitWork,
        now: Timestamp,
    ) -> Self {
        Self {
            task_id,
            engineer_id,
            notes: work.notes.clone(),
            attachment_url: work.attachment_url.clone(),
            claimed_at: None,
            submitted_at: Some(now),
            status: SubmissionStatus::Pending,
        }
    }
}

/// Request body for submitting work on a task.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SubmitWork {
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
    #[validate(length(max = 2000))]
    pub attachment_url: Option<String>,
}

/// Reviewer input attached to an approval.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReviewInput {
    #[validate(range(min = 1.0, max = 5.0))]
    pub quality_score: Option<f64>,
    #[validate(length(max = 4000))]
    pub comment: Option<String>,
}

/// Request body for rejecting a submission.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RejectInput {
    #[validate(length(max = 4000))]
    pub comment: Option<String>,
}
