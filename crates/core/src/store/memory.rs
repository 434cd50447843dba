//! In-process [`Store`] used by tests and local tooling.
//!
//! One async mutex guards the whole state. A unit of work holds the lock for
//! its lifetime and mutates a private copy, which `commit` swaps in.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::company::{Company, UpsertCompany};
use crate::error::CoreError;
use crate::profile::{level_for_xp, LeaderEntry, Profile, ProfileCredit};
use crate::status::{SubmissionStatus, TaskStatus};
use crate::submission::{NewSubmission, Submission};
use crate::task::{CreateTask, Task};
use crate::types::{DbId, Timestamp};
use crate::user::User;

use super::{Store, StoreTx};

#[derive(Debug, Clone, Default)]
struct State {
    last_id: DbId,
    users: BTreeMap<DbId, User>,
    companies: BTreeMap<DbId, Company>,
    tasks: BTreeMap<DbId, Task>,
    submissions: BTreeMap<DbId, Submission>,
    profiles: BTreeMap<DbId, Profile>,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    fn profile_entry(&mut self, user_id: DbId, now: Timestamp) -> &mut Profile {
        self.profiles
            .entry(user_id)
            .or_insert_with(|| Profile::new(user_id, now))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user record. Users are owned by the identity service, so
    /// there is no write path for them through [`StoreTx`].
    pub async fn seed_user(&self, user: User) {
        let mut state = self.state.lock().await;
        state.last_id = state.last_id.max(user.id);
        state.users.insert(user.id, user);
    }

    /// Committed profile of a user, if any.
    pub async fn profile(&self, user_id: DbId) -> Option<Profile> {
        self.state.lock().await.profiles.get(&user_id).cloned()
    }

    /// Committed submissions of a task.
    pub async fn submissions_for_task(&self, task_id: DbId) -> Vec<Submission> {
        self.state
            .lock()
            .await
            .submissions
            .values()
            .filter(|s| s.task_id == task_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, CoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(MemoryTx { guard, work }))
    }

    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    work: State,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_company(&mut self, id: DbId) -> Result<Option<Company>, CoreError> {
        Ok(self.work.companies.get(&id).cloned())
    }

    async fn find_company_by_owner(
        &mut self,
        owner_id: DbId,
    ) -> Result<Option<Company>, CoreError> {
        Ok(self
            .work
            .companies
            .values()
            .find(|c| c.owner_id == owner_id)
            .cloned())
    }

    async fn insert_company(
        &mut self,
        owner_id: DbId,
        input: &UpsertCompany,
        now: Timestamp,
    ) -> Result<Company, CoreError> {
        if self.work.companies.values().any(|c| c.owner_id == owner_id) {
            return Err(CoreError::Conflict(format!(
                "User {owner_id} already owns a company"
            )));
        }
        let company = Company {
            id: self.work.next_id(),
            owner_id,
            name: input.name.clone(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };
        self.work.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn save_company(&mut self, company: &Company) -> Result<Company, CoreError> {
        let slot = self
            .work
            .companies
            .get_mut(&company.id)
            .ok_or(CoreError::NotFound {
                entity: "Company",
                id: company.id,
            })?;
        *slot = company.clone();
        Ok(company.clone())
    }

    async fn list_companies(&mut self) -> Result<Vec<Company>, CoreError> {
        Ok(self.work.companies.values().cloned().collect())
    }

    async fn delete_company(&mut self, id: DbId) -> Result<bool, CoreError> {
        if self.work.companies.remove(&id).is_none() {
            return Ok(false);
        }
        let tasks: Vec<DbId> = self
            .work
            .tasks
            .values()
            .filter(|t| t.company_id == id)
            .map(|t| t.id)
            .collect();
        for task_id in tasks {
            self.work.tasks.remove(&task_id);
            self.work.submissions.retain(|_, s| s.task_id != task_id);
        }
        Ok(true)
    }

    async fn insert_task(
        &mut self,
        company_id: DbId,
        input: &CreateTask,
        now: Timestamp,
    ) -> Result<Task, CoreError> {
        let task = Task {
            id: self.work.next_id(),
            title: input.title.clone(),
            description: input.description.clone(),
            difficulty: input.difficulty,
            budget: input.budget,
            base_xp: input.base_xp,
            deadline_at: input.deadline_at,
            company_id,
            assignee_id: None,
            status: TaskStatus::Published,
            created_at: now,
            updated_at: now,
        };
        self.work.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&mut self, id: DbId) -> Result<Option<Task>, CoreError> {
        Ok(self.work.tasks.get(&id).cloned())
    }

    async fn list_tasks_by_status(&mut self, status: TaskStatus) -> Result<Vec<Task>, CoreError> {
        Ok(self
            .work
            .tasks
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect())
    }

    async fn list_tasks_by_company(&mut self, company_id: DbId) -> Result<Vec<Task>, CoreError> {
        Ok(self
            .work
            .tasks
            .values()
            .filter(|t| t.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn list_tasks_for_engineer(
        &mut self,
        engineer_id: DbId,
    ) -> Result<Vec<Task>, CoreError> {
        let work = &self.work;
        Ok(work
            .tasks
            .values()
            .filter(|t| {
                work.submissions
                    .values()
                    .any(|s| s.task_id == t.id && s.engineer_id == Some(engineer_id))
            })
            .cloned()
            .collect())
    }

    async fn save_task(&mut self, task: &Task) -> Result<Task, CoreError> {
        let slot = self.work.tasks.get_mut(&task.id).ok_or(CoreError::NotFound {
            entity: "Task",
            id: task.id,
        })?;
        slot.title = task.title.clone();
        slot.description = task.description.clone();
        slot.deadline_at = task.deadline_at;
        slot.status = task.status;
        slot.assignee_id = task.assignee_id;
        slot.updated_at = task.updated_at;
        Ok(slot.clone())
    }

    async fn delete_task(&mut self, id: DbId) -> Result<bool, CoreError> {
        if self.work.tasks.remove(&id).is_none() {
            return Ok(false);
        }
        self.work.submissions.retain(|_, s| s.task_id != id);
        Ok(true)
    }

    async fn submission_task_id(&mut self, id: DbId) -> Result<Option<DbId>, CoreError> {
        Ok(self.work.submissions.get(&id).map(|s| s.task_id))
    }

    async fn find_submission(&mut self, id: DbId) -> Result<Option<Submission>, CoreError> {
        Ok(self.work.submissions.get(&id).cloned())
    }

    async fn find_submission_for(
        &mut self,
        task_id: DbId,
        engineer_id: DbId,
    ) -> Result<Option<Submission>, CoreError> {
        Ok(self
            .work
            .submissions
            .values()
            .find(|s| s.task_id == task_id && s.engineer_id == Some(engineer_id))
            .cloned())
    }

    async fn list_submissions_by_task(
        &mut self,
        task_id: DbId,
    ) -> Result<Vec<Submission>, CoreError> {
        Ok(self
            .work
            .submissions
            .values()
            .filter(|s| s.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn list_submissions_by_engineer(
        &mut self,
        engineer_id: DbId,
    ) -> Result<Vec<Submission>, CoreError> {
        Ok(self
            .work
            .submissions
            .values()
            .filter(|s| s.engineer_id == Some(engineer_id))
            .cloned()
            .collect())
    }

    async fn list_submissions_by_status(
        &mut self,
        status: SubmissionStatus,
        company_id: Option<DbId>,
    ) -> Result<Vec<Submission>, CoreError> {
        let work = &self.work;
        Ok(work
            .submissions
            .values()
            .filter(|s| s.status == status)
            .filter(|s| match company_id {
                Some(company_id) => work
                    .tasks
                    .get(&s.task_id)
                    .is_some_and(|t| t.company_id == company_id),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn insert_submission(
        &mut self,
        new: &NewSubmission,
        now: Timestamp,
    ) -> Result<Submission, CoreError> {
        if !self.work.tasks.contains_key(&new.task_id) {
            return Err(CoreError::NotFound {
                entity: "Task",
                id: new.task_id,
            });
        }
        let duplicate = self
            .work
            .submissions
            .values()
            .any(|s| s.task_id == new.task_id && s.engineer_id == Some(new.engineer_id));
        if duplicate {
            return Err(CoreError::Conflict(format!(
                "Engineer {} already has a submission for task {}",
                new.engineer_id, new.task_id
            )));
        }
        let submission = Submission {
            id: self.work.next_id(),
            task_id: new.task_id,
            engineer_id: Some(new.engineer_id),
            notes: new.notes.clone(),
            attachment_url: new.attachment_url.clone(),
            claimed_at: new.claimed_at,
            submitted_at: new.submitted_at,
            status: new.status,
            approved_at: None,
            approved_by: None,
            xp_awarded: None,
            quality_score: None,
            review_comment: None,
            created_at: now,
            updated_at: now,
        };
        self.work.submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn save_submission(
        &mut self,
        submission: &Submission,
    ) -> Result<Submission, CoreError> {
        let slot = self
            .work
            .submissions
            .get_mut(&submission.id)
            .ok_or(CoreError::NotFound {
                entity: "Submission",
                id: submission.id,
            })?;
        *slot = submission.clone();
        Ok(submission.clone())
    }

    async fn ensure_profile(
        &mut self,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Profile, CoreError> {
        Ok(self.work.profile_entry(user_id, now).clone())
    }

    async fn credit_profile(
        &mut self,
        credit: &ProfileCredit,
        now: Timestamp,
    ) -> Result<Profile, CoreError> {
        let profile = self.work.profile_entry(credit.user_id, now);
        profile.apply(credit, now);
        Ok(profile.clone())
    }

    async fn leaderboard(&mut self, limit: i64) -> Result<Vec<LeaderEntry>, CoreError> {
        let mut profiles: Vec<&Profile> = self.work.profiles.values().collect();
        profiles.sort_by(|a, b| {
            b.xp_points
                .cmp(&a.xp_points)
                .then(a.user_id.cmp(&b.user_id))
        });
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(profiles
            .into_iter()
            .take(limit)
            .map(|p| {
                let user = self.work.users.get(&p.user_id);
                LeaderEntry {
                    user_id: p.user_id,
                    full_name: user.and_then(|u| u.full_name.clone()),
                    email: user.map(|u| u.email.clone()),
                    role: user.map(|u| u.role),
                    xp: p.xp_points,
                    level: level_for_xp(p.xp_points),
                }
            })
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        let MemoryTx { mut guard, work } = *self;
        *guard = work;
        Ok(())
    }
}
