//! Task lifecycle operations.

use std::collections::{BTreeMap, HashMap};

use validator::Validate;

use crate::company::UpsertCompany;
use crate::error::CoreError;
use crate::reward::grant_rewards;
use crate::roles::{Actor, UserRole};
use crate::status::{SubmissionStatus, TaskStatus};
use crate::submission::{NewSubmission, ReviewInput, SubmitWork};
use crate::task::{CreateTask, EngineerTaskView, Task, UpdateTask};
use crate::types::DbId;

use super::{
    ensure_not_cancelled, load_owned_task, load_task, now, require_company, Marketplace, Review,
    TaskApproval, TaskProgress,
};

impl Marketplace {
    /// Post a new task for the actor's company. The task starts `Published`.
    pub async fn create_task(&self, actor: &Actor, input: CreateTask) -> Result<Task, CoreError> {
        actor.require_role(UserRole::Company, "Creating a task")?;
        input.validate()?;

        let now = now();
        let mut tx = self.store.begin().await?;
        let company = match tx.find_company_by_owner(actor.user_id).await? {
            Some(company) => company,
            None if self.policy.auto_provision_company => {
                let provisioned =
                    UpsertCompany::provisioned_for(actor.user_id, actor.email.as_deref());
                let company = tx.insert_company(actor.user_id, &provisioned, now).await?;
                tracing::info!(
                    company_id = company.id,
                    owner_id = actor.user_id,
                    "Company provisioned"
                );
                company
            }
            None => {
                return Err(CoreError::CompanyNotFound {
                    owner_id: actor.user_id,
                })
            }
        };

        let task = tx.insert_task(company.id, &input, now).await?;
        tx.commit().await?;

        tracing::info!(
            task_id = task.id,
            company_id = company.id,
            user_id = actor.user_id,
            budget = task.budget,
            "Task created"
        );
        Ok(task)
    }

    pub async fn list_published_tasks(&self) -> Result<Vec<Task>, CoreError> {
        let mut tx = self.store.begin().await?;
        let tasks = tx.list_tasks_by_status(TaskStatus::Published).await?;
        tx.commit().await?;
        Ok(tasks)
    }

    /// Published tasks plus every task the engineer has a submission for,
    /// deduplicated and ordered by id.
    pub async fn list_tasks_for_engineer(
        &self,
        actor: &Actor,
    ) -> Result<Vec<EngineerTaskView>, CoreError> {
        actor.require_role(UserRole::Engineer, "Listing engineer tasks")?;

        let mut tx = self.store.begin().await?;
        let published = tx.list_tasks_by_status(TaskStatus::Published).await?;
        let mine = tx.list_tasks_for_engineer(actor.user_id).await?;
        let submissions = tx.list_submissions_by_engineer(actor.user_id).await?;
        tx.commit().await?;

        let submitted: HashMap<DbId, bool> = submissions
            .iter()
            .map(|s| (s.task_id, s.is_submitted()))
            .collect();
        let tasks: BTreeMap<DbId, Task> = published
            .into_iter()
            .chain(mine)
            .map(|t| (t.id, t))
            .collect();

        Ok(tasks
            .into_values()
            .map(|task| {
                let own = submitted.get(&task.id).copied();
                EngineerTaskView {
                    task,
                    claimed_by_me: own.is_some(),
                    submitted_by_me: own.unwrap_or(false),
                }
            })
            .collect())
    }

    /// Tasks of the actor's company.
    pub async fn list_tasks_for_company(&self, actor: &Actor) -> Result<Vec<Task>, CoreError> {
        let mut tx = self.store.begin().await?;
        let company = require_company(tx.as_mut(), actor).await?;
        let tasks = tx.list_tasks_by_company(company.id).await?;
        tx.commit().await?;
        Ok(tasks)
    }

    /// Edit the descriptive fields of an open task. Only the owner may edit.
    pub async fn update_task(
        &self,
        actor: &Actor,
        task_id: DbId,
        patch: UpdateTask,
    ) -> Result<Task, CoreError> {
        patch.validate()?;

        let mut tx = self.store.begin().await?;
        let mut task = load_owned_task(tx.as_mut(), actor, task_id).await?;
        if task.status.is_terminal() {
            return Err(CoreError::invalid_state("Task", task.id, "open", task.status));
        }
        if patch.is_empty() {
            return Ok(task);
        }

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = Some(description);
        }
        if let Some(deadline_at) = patch.deadline_at {
            task.deadline_at = Some(deadline_at);
        }
        task.updated_at = now();

        let task = tx.save_task(&task).await?;
        tx.commit().await?;

        tracing::info!(task_id = task.id, user_id = actor.user_id, "Task updated");
        Ok(task)
    }

    /// Delete a task and its submissions. Completed tasks carry paid rewards
    /// and cannot be deleted.
    pub async fn delete_task(&self, actor: &Actor, task_id: DbId) -> Result<(), CoreError> {
        let mut tx = self.store.begin().await?;
        let task = load_owned_task(tx.as_mut(), actor, task_id).await?;
        if task.status == TaskStatus::Completed {
            return Err(CoreError::invalid_state(
                "Task",
                task.id,
                "not completed",
                task.status,
            ));
        }
        if !tx.delete_task(task.id).await? {
            return Err(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            });
        }
        tx.commit().await?;

        tracing::info!(task_id, user_id = actor.user_id, "Task deleted");
        Ok(())
    }

    /// Withdraw an open task.
    pub async fn cancel_task(&self, actor: &Actor, task_id: DbId) -> Result<Task, CoreError> {
        let mut tx = self.store.begin().await?;
        let mut task = load_owned_task(tx.as_mut(), actor, task_id).await?;
        if !task.status.can_transition_to(TaskStatus::Cancelled) {
            return Err(CoreError::invalid_state("Task", task.id, "open", task.status));
        }
        task.status = TaskStatus::Cancelled;
        task.updated_at = now();

        let task = tx.save_task(&task).await?;
        tx.commit().await?;

        tracing::info!(task_id = task.id, user_id = actor.user_id, "Task cancelled");
        Ok(task)
    }

    /// Claim a task. Claiming twice is a no-op; any number of engineers may
    /// claim the same task.
    pub async fn claim_task(&self, actor: &Actor, task_id: DbId) -> Result<TaskProgress, CoreError> {
        actor.require_role(UserRole::Engineer, "Claiming a task")?;

        let now = now();
        let mut tx = self.store.begin().await?;
        let mut task = load_task(tx.as_mut(), task_id).await?;
        ensure_not_cancelled(&task)?;
        if task.status.is_terminal() {
            return Err(CoreError::invalid_state("Task", task.id, "open", task.status));
        }

        let submission = match tx.find_submission_for(task.id, actor.user_id).await? {
            Some(existing) => {
                tracing::debug!(
                    task_id,
                    engineer_id = actor.user_id,
                    "Task already claimed by engineer"
                );
                existing
            }
            None => {
                tx.insert_submission(&NewSubmission::claim(task.id, actor.user_id, now), now)
                    .await?
            }
        };

        if task.status == TaskStatus::Published {
            task.status = TaskStatus::Claimed;
            task.assignee_id.get_or_insert(actor.user_id);
            task.updated_at = now;
            task = tx.save_task(&task).await?;
        }
        tx.commit().await?;

        tracing::info!(
            task_id,
            submission_id = submission.id,
            engineer_id = actor.user_id,
            "Task claimed"
        );
        Ok(TaskProgress { task, submission })
    }

    /// Hand in work. Creates the submission when the engineer never claimed
    /// and returns a rejected submission to review.
    pub async fn submit_task(
        &self,
        actor: &Actor,
        task_id: DbId,
        work: SubmitWork,
    ) -> Result<TaskProgress, CoreError> {
        actor.require_role(UserRole::Engineer, "Submitting work")?;
        work.validate()?;

        let now = now();
        let mut tx = self.store.begin().await?;
        let mut task = load_task(tx.as_mut(), task_id).await?;
        ensure_not_cancelled(&task)?;
        if task.status.is_terminal() {
            return Err(CoreError::invalid_state("Task", task.id, "open", task.status));
        }

        let submission = match tx.find_submission_for(task.id, actor.user_id).await? {
            Some(mut existing) => {
                existing.record_work(&work, now)?;
                tx.save_submission(&existing).await?
            }
            None => {
                let new = NewSubmission::direct_submit(task.id, actor.user_id, &work, now);
                tx.insert_submission(&new, now).await?
            }
        };

        if !task.status.has_reached(TaskStatus::Submitted) {
            task.status = TaskStatus::Submitted;
            task.assignee_id.get_or_insert(actor.user_id);
            task.updated_at = now;
            task = tx.save_task(&task).await?;
        }
        tx.commit().await?;

        tracing::info!(
            task_id,
            submission_id = submission.id,
            engineer_id = actor.user_id,
            "Work submitted"
        );
        Ok(TaskProgress { task, submission })
    }

    /// Approve every pending submission of a task and complete it.
    ///
    /// Already approved submissions are never rewarded again, so repeating
    /// the call is harmless. Submissions whose engineer no longer exists are
    /// skipped and reported.
    pub async fn approve_task(
        &self,
        actor: &Actor,
        task_id: DbId,
        input: ReviewInput,
    ) -> Result<TaskApproval, CoreError> {
        input.validate()?;

        let now = now();
        let mut tx = self.store.begin().await?;
        let task = load_task(tx.as_mut(), task_id).await?;
        let mentor_id = self.authorize_review(tx.as_mut(), actor, &task).await?;
        ensure_not_cancelled(&task)?;

        let review = Review {
            reviewer: actor,
            mentor_id,
            input: &input,
        };
        let mut approved = Vec::new();
        let mut rewards = Vec::new();
        let mut skipped = Vec::new();
        let mut any_approved = false;
        for submission in tx.list_submissions_by_task(task.id).await? {
            match submission.status {
                SubmissionStatus::Approved => any_approved = true,
                SubmissionStatus::Pending => {
                    let submission_id = submission.id;
                    match self
                        .approve_pending(tx.as_mut(), &task, submission, &review, now)
                        .await
                    {
                        Ok((saved, breakdown)) => {
                            any_approved = true;
                            approved.push(saved);
                            rewards.push(breakdown);
                        }
                        Err(CoreError::EngineerMissing { .. }) => {
                            tracing::warn!(
                                task_id,
                                submission_id,
                                "Skipping approval of submission without engineer"
                            );
                            skipped.push(submission_id);
                        }
                        Err(e) => return Err(e),
                    }
                }
                SubmissionStatus::Draft | SubmissionStatus::Rejected => {}
            }
        }

        grant_rewards(tx.as_mut(), &rewards, now).await?;

        let task = if any_approved {
            self.complete_task(tx.as_mut(), task, now).await?
        } else {
            task
        };
        tx.commit().await?;

        tracing::info!(
            task_id,
            reviewer_id = actor.user_id,
            approved = approved.len(),
            skipped = skipped.len(),
            "Task approval processed"
        );
        Ok(TaskApproval {
            task,
            approved,
            skipped,
        })
    }
}
