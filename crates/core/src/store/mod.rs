//! Persistence seam for the marketplace service.
//!
//! A [`Store`] hands out units of work ([`StoreTx`]). Rows loaded through the
//! `find_task` / `find_submission*` / `list_submissions_by_task` methods are
//! locked against concurrent writers until the unit of work commits or is
//! dropped; dropping without [`StoreTx::commit`] discards every change.
//!
//! Callers lock a task before any of its submissions, and profiles last.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::company::{Company, UpsertCompany};
use crate::error::CoreError;
use crate::profile::{LeaderEntry, Profile, ProfileCredit};
use crate::status::{SubmissionStatus, TaskStatus};
use crate::submission::{NewSubmission, Submission};
use crate::task::{CreateTask, Task};
use crate::types::{DbId, Timestamp};

#[async_trait]
pub trait Store: Send + Sync {
    /// Open a unit of work.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, CoreError>;

    /// Cheap liveness check for the health endpoint.
    async fn ping(&self) -> Result<(), CoreError>;
}

#[async_trait]
pub trait StoreTx: Send {
    // -- Companies --

    async fn find_company(&mut self, id: DbId) -> Result<Option<Company>, CoreError>;

    async fn find_company_by_owner(&mut self, owner_id: DbId)
        -> Result<Option<Company>, CoreError>;

    /// Insert a company. `Conflict` if the owner already has one.
    async fn insert_company(
        &mut self,
        owner_id: DbId,
        input: &UpsertCompany,
        now: Timestamp,
    ) -> Result<Company, CoreError>;

    async fn save_company(&mut self, company: &Company) -> Result<Company, CoreError>;

    /// Every company, by id.
    async fn list_companies(&mut self) -> Result<Vec<Company>, CoreError>;

    /// Remove a company with its tasks and their submissions. Returns `false`
    /// if it did not exist.
    async fn delete_company(&mut self, id: DbId) -> Result<bool, CoreError>;

    // -- Tasks --

    /// Insert a task in `Published` status.
    async fn insert_task(
        &mut self,
        company_id: DbId,
        input: &CreateTask,
        now: Timestamp,
    ) -> Result<Task, CoreError>;

    /// Load and lock a task.
    async fn find_task(&mut self, id: DbId) -> Result<Option<Task>, CoreError>;

    /// Tasks in `status`, oldest first.
    async fn list_tasks_by_status(&mut self, status: TaskStatus) -> Result<Vec<Task>, CoreError>;

    async fn list_tasks_by_company(&mut self, company_id: DbId) -> Result<Vec<Task>, CoreError>;

    /// Tasks the engineer holds a submission for, oldest first.
    async fn list_tasks_for_engineer(&mut self, engineer_id: DbId)
        -> Result<Vec<Task>, CoreError>;

    /// Persist the mutable fields of a task: title, description, deadline,
    /// status, assignee, and `updated_at`.
    async fn save_task(&mut self, task: &Task) -> Result<Task, CoreError>;

    /// Remove a task and its submissions. Returns `false` if it did not exist.
    async fn delete_task(&mut self, id: DbId) -> Result<bool, CoreError>;

    // -- Submissions --

    /// The task a submission belongs to, read without taking a lock.
    async fn submission_task_id(&mut self, id: DbId) -> Result<Option<DbId>, CoreError>;

    /// Load and lock a submission.
    async fn find_submission(&mut self, id: DbId) -> Result<Option<Submission>, CoreError>;

    /// Load and lock the submission for one (task, engineer) pair.
    async fn find_submission_for(
        &mut self,
        task_id: DbId,
        engineer_id: DbId,
    ) -> Result<Option<Submission>, CoreError>;

    async fn list_submissions_by_task(&mut self, task_id: DbId)
        -> Result<Vec<Submission>, CoreError>;

    async fn list_submissions_by_engineer(
        &mut self,
        engineer_id: DbId,
    ) -> Result<Vec<Submission>, CoreError>;

    /// Submissions in `status`, optionally restricted to one company's tasks.
    async fn list_submissions_by_status(
        &mut self,
        status: SubmissionStatus,
        company_id: Option<DbId>,
    ) -> Result<Vec<Submission>, CoreError>;

    /// Insert a submission. `Conflict` if the pair already has one.
    async fn insert_submission(
        &mut self,
        new: &NewSubmission,
        now: Timestamp,
    ) -> Result<Submission, CoreError>;

    async fn save_submission(&mut self, submission: &Submission)
        -> Result<Submission, CoreError>;

    // -- Profiles --

    /// Load the profile, creating an empty one if the user has none.
    async fn ensure_profile(&mut self, user_id: DbId, now: Timestamp)
        -> Result<Profile, CoreError>;

    /// Atomically add a credit to a profile, creating it when missing.
    async fn credit_profile(
        &mut self,
        credit: &ProfileCredit,
        now: Timestamp,
    ) -> Result<Profile, CoreError>;

    /// Top profiles by XP, ties broken by user id.
    async fn leaderboard(&mut self, limit: i64) -> Result<Vec<LeaderEntry>, CoreError>;

    /// Make every change of this unit of work visible.
    async fn commit(self: Box<Self>) -> Result<(), CoreError>;
}
