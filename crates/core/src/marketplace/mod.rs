//! The marketplace service: every task, submission, profile and company
//! operation, each running in exactly one unit of work.
//!
//! Operations take an already resolved [`Actor`]; turning credentials into an
//! actor is the caller's job.

mod accounts;
mod submissions;
mod tasks;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::company::Company;
use crate::error::CoreError;
use crate::policy::MarketplacePolicy;
use crate::reward::{compute_reward, RewardBreakdown};
use crate::roles::{Actor, UserRole};
use crate::status::{SubmissionStatus, TaskStatus};
use crate::store::{Store, StoreTx};
use crate::submission::{ReviewInput, Submission};
use crate::task::Task;
use crate::types::{DbId, Timestamp};

/// A task together with the acting engineer's submission.
#[derive(Debug, Clone, Serialize)]
pub struct TaskProgress {
    pub task: Task,
    pub submission: Submission,
}

/// Result of a task-level approval.
#[derive(Debug, Clone, Serialize)]
pub struct TaskApproval {
    pub task: Task,
    /// Submissions approved by this call.
    pub approved: Vec<Submission>,
    /// Pending submissions left untouched because their engineer is gone.
    pub skipped: Vec<DbId>,
}

pub struct Marketplace {
    store: Arc<dyn Store>,
    policy: MarketplacePolicy,
}

impl Marketplace {
    /// Build the service. Fails if the reward policy is inconsistent.
    pub fn new(store: Arc<dyn Store>, policy: MarketplacePolicy) -> Result<Self, CoreError> {
        policy.reward.validate()?;
        Ok(Self { store, policy })
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }
}

fn now() -> Timestamp {
    Utc::now()
}

// ---------------------------------------------------------------------------
// Shared lookups and guards
// ---------------------------------------------------------------------------

async fn load_task(tx: &mut dyn StoreTx, id: DbId) -> Result<Task, CoreError> {
    tx.find_task(id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Task", id })
}

async fn load_submission(tx: &mut dyn StoreTx, id: DbId) -> Result<Submission, CoreError> {
    tx.find_submission(id).await?.ok_or(CoreError::NotFound {
        entity: "Submission",
        id,
    })
}

/// Lock a submission together with its task, task first.
async fn load_submission_with_task(
    tx: &mut dyn StoreTx,
    submission_id: DbId,
) -> Result<(Task, Submission), CoreError> {
    let missing = CoreError::NotFound {
        entity: "Submission",
        id: submission_id,
    };
    let Some(task_id) = tx.submission_task_id(submission_id).await? else {
        return Err(missing);
    };
    let task = load_task(tx, task_id).await?;
    let submission = load_submission(tx, submission_id).await?;
    if submission.task_id != task.id {
        return Err(missing);
    }
    Ok((task, submission))
}

async fn require_company(tx: &mut dyn StoreTx, actor: &Actor) -> Result<Company, CoreError> {
    tx.find_company_by_owner(actor.user_id)
        .await?
        .ok_or(CoreError::CompanyNotFound {
            owner_id: actor.user_id,
        })
}

/// Load a task and check that the actor owns its company.
async fn load_owned_task(
    tx: &mut dyn StoreTx,
    actor: &Actor,
    id: DbId,
) -> Result<Task, CoreError> {
    let task = load_task(tx, id).await?;
    ensure_task_owner(tx, actor, &task).await?;
    Ok(task)
}

async fn ensure_task_owner(
    tx: &mut dyn StoreTx,
    actor: &Actor,
    task: &Task,
) -> Result<(), CoreError> {
    let owned = tx
        .find_company(task.company_id)
        .await?
        .is_some_and(|c| c.is_owned_by(actor.user_id));
    if owned {
        Ok(())
    } else {
        Err(CoreError::NotAuthorized(format!(
            "User {} does not own task {}",
            actor.user_id, task.id
        )))
    }
}

/// Reject operations on a cancelled task.
fn ensure_not_cancelled(task: &Task) -> Result<(), CoreError> {
    if task.status == TaskStatus::Cancelled {
        return Err(CoreError::invalid_state(
            "Task",
            task.id,
            "not cancelled",
            task.status,
        ));
    }
    Ok(())
}

/// An authorized reviewer and their input.
struct Review<'a> {
    reviewer: &'a Actor,
    /// Set when the reviewer is a mentor, who then earns the mentor cut.
    mentor_id: Option<DbId>,
    input: &'a ReviewInput,
}

impl Marketplace {
    /// Authorize `actor` to review submissions on `task`. Returns the mentor
    /// to pay when the reviewer is a mentor.
    async fn authorize_review(
        &self,
        tx: &mut dyn StoreTx,
        actor: &Actor,
        task: &Task,
    ) -> Result<Option<DbId>, CoreError> {
        self.policy.review.authorize_role(actor)?;
        match actor.role {
            UserRole::Company => {
                ensure_task_owner(tx, actor, task).await?;
                Ok(None)
            }
            UserRole::Mentor => Ok(Some(actor.user_id)),
            UserRole::Engineer | UserRole::Admin => Err(CoreError::NotAuthorized(format!(
                "Role {} may not review submissions",
                actor.role
            ))),
        }
    }

    /// Approve one pending submission inside `tx`. The returned breakdown
    /// still has to be granted with [`grant_rewards`](crate::reward::grant_rewards).
    async fn approve_pending(
        &self,
        tx: &mut dyn StoreTx,
        task: &Task,
        mut submission: Submission,
        review: &Review<'_>,
        now: Timestamp,
    ) -> Result<(Submission, RewardBreakdown), CoreError> {
        if submission.status != SubmissionStatus::Pending {
            return Err(CoreError::invalid_state(
                "Submission",
                submission.id,
                SubmissionStatus::Pending.as_str(),
                submission.status,
            ));
        }
        submission.quality_score = review.input.quality_score;
        let breakdown =
            compute_reward(task, &submission, review.mentor_id, &self.policy.reward)?;

        submission.mark_approved(review.reviewer.user_id, review.input, breakdown.junior_xp, now);
        let saved = tx.save_submission(&submission).await?;

        tracing::info!(
            submission_id = saved.id,
            task_id = task.id,
            reviewer_id = review.reviewer.user_id,
            xp_awarded = breakdown.junior_xp,
            "Submission approved"
        );
        Ok((saved, breakdown))
    }

    /// Flip a task to `Completed` unless it already is.
    async fn complete_task(
        &self,
        tx: &mut dyn StoreTx,
        mut task: Task,
        now: Timestamp,
    ) -> Result<Task, CoreError> {
        if task.status == TaskStatus::Completed {
            return Ok(task);
        }
        if !task.status.can_transition_to(TaskStatus::Completed) {
            return Err(CoreError::invalid_state(
                "Task",
                task.id,
                "open",
                task.status,
            ));
        }
        task.status = TaskStatus::Completed;
        task.updated_at = now;
        let task = tx.save_task(&task).await?;
        tracing::info!(task_id = task.id, "Task completed");
        Ok(task)
    }
}
