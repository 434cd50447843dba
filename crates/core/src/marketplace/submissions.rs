//! Submission ledger: review queue, approval, rejection, and per-task listing.

use validator::Validate;

use crate::error::CoreError;
use crate::reward::grant_rewards;
use crate::roles::{Actor, UserRole};
use crate::status::SubmissionStatus;
use crate::submission::{RejectInput, ReviewInput, Submission};
use crate::types::DbId;

use super::{
    ensure_not_cancelled, ensure_task_owner, load_submission_with_task, load_task, now,
    require_company, Marketplace, Review,
};

impl Marketplace {
    /// Submissions awaiting review that the actor may review. Company owners
    /// see their own tasks only; mentors see everything.
    pub async fn list_pending_submissions(
        &self,
        actor: &Actor,
    ) -> Result<Vec<Submission>, CoreError> {
        self.policy.review.authorize_role(actor)?;

        let mut tx = self.store.begin().await?;
        let company_id = match actor.role {
            UserRole::Company => Some(require_company(tx.as_mut(), actor).await?.id),
            _ => None,
        };
        let pending = tx
            .list_submissions_by_status(SubmissionStatus::Pending, company_id)
            .await?;
        tx.commit().await?;
        Ok(pending)
    }

    /// Approve one pending submission, granting its reward and completing the
    /// task if it was still open.
    ///
    /// Approving an already approved submission returns it unchanged.
    pub async fn approve_submission(
        &self,
        actor: &Actor,
        submission_id: DbId,
        input: ReviewInput,
    ) -> Result<Submission, CoreError> {
        input.validate()?;

        let now = now();
        let mut tx = self.store.begin().await?;
        let (task, submission) = load_submission_with_task(tx.as_mut(), submission_id).await?;
        let mentor_id = self.authorize_review(tx.as_mut(), actor, &task).await?;

        if submission.is_approved() {
            tracing::debug!(submission_id, "Submission already approved, nothing to do");
            return Ok(submission);
        }
        ensure_not_cancelled(&task)?;

        let review = Review {
            reviewer: actor,
            mentor_id,
            input: &input,
        };
        let (approved, breakdown) = self
            .approve_pending(tx.as_mut(), &task, submission, &review, now)
            .await?;
        grant_rewards(tx.as_mut(), &[breakdown], now).await?;
        self.complete_task(tx.as_mut(), task, now).await?;
        tx.commit().await?;
        Ok(approved)
    }

    /// Send a pending submission back to its engineer, who may resubmit.
    pub async fn reject_submission(
        &self,
        actor: &Actor,
        submission_id: DbId,
        input: RejectInput,
    ) -> Result<Submission, CoreError> {
        input.validate()?;

        let mut tx = self.store.begin().await?;
        let (task, mut submission) = load_submission_with_task(tx.as_mut(), submission_id).await?;
        self.authorize_review(tx.as_mut(), actor, &task).await?;

        if submission.status != SubmissionStatus::Pending {
            return Err(CoreError::invalid_state(
                "Submission",
                submission.id,
                SubmissionStatus::Pending.as_str(),
                submission.status,
            ));
        }
        submission.mark_rejected(input.comment, now());
        let submission = tx.save_submission(&submission).await?;
        tx.commit().await?;

        tracing::info!(
            submission_id,
            task_id = task.id,
            reviewer_id = actor.user_id,
            "Submission rejected"
        );
        Ok(submission)
    }

    /// Submissions of a task. The owning company, mentors and admins see all
    /// of them; an engineer sees only their own.
    pub async fn get_submissions_for_task(
        &self,
        actor: &Actor,
        task_id: DbId,
    ) -> Result<Vec<Submission>, CoreError> {
        let mut tx = self.store.begin().await?;
        let task = load_task(tx.as_mut(), task_id).await?;
        if actor.role == UserRole::Company {
            ensure_task_owner(tx.as_mut(), actor, &task).await?;
        }
        let mut submissions = tx.list_submissions_by_task(task.id).await?;
        tx.commit().await?;

        if actor.role == UserRole::Engineer {
            submissions.retain(|s| s.engineer_id == Some(actor.user_id));
        }
        Ok(submissions)
    }
}
