//! PostgreSQL implementation of the core `Store` seam.
//!
//! A unit of work is one `sqlx` transaction. Rows loaded through `find_*`
//! are taken `FOR UPDATE`, so the check-then-act guards in the service run
//! without races; dropping the transaction without commit rolls it back.

use appbee_core::company::{Company, UpsertCompany};
use appbee_core::error::CoreError;
use appbee_core::profile::{LeaderEntry, Profile, ProfileCredit};
use appbee_core::status::{SubmissionStatus, TaskStatus};
use appbee_core::store::{Store, StoreTx};
use appbee_core::submission::{NewSubmission, Submission};
use appbee_core::task::{CreateTask, Task};
use appbee_core::types::{DbId, Timestamp};
use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use crate::error::db_error;
use crate::repositories::{CompanyRepo, ProfileRepo, SubmissionRepo, TaskRepo};
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, CoreError> {
        let tx = self.pool.begin().await.map_err(db_error)?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(db_error)
    }
}

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

/// Decode a batch of rows into domain entities.
fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, CoreError>
where
    T: TryFrom<R, Error = CoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// A row that was locked or inserted earlier in the same transaction has gone.
fn vanished(entity: &'static str, id: DbId) -> CoreError {
    CoreError::NotFound { entity, id }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn find_company(&mut self, id: DbId) -> Result<Option<Company>, CoreError> {
        let row = CompanyRepo::find_by_id(&mut self.tx, id)
            .await
            .map_err(db_error)?;
        Ok(row.map(Company::from))
    }

    async fn find_company_by_owner(
        &mut self,
        owner_id: DbId,
    ) -> Result<Option<Company>, CoreError> {
        let row = CompanyRepo::find_by_owner(&mut self.tx, owner_id)
            .await
            .map_err(db_error)?;
        Ok(row.map(Company::from))
    }

    async fn insert_company(
        &mut self,
        owner_id: DbId,
        input: &UpsertCompany,
        now: Timestamp,
    ) -> Result<Company, CoreError> {
        let row = CompanyRepo::create(&mut self.tx, owner_id, input, now)
            .await
            .map_err(db_error)?;
        Ok(row.into())
    }

    async fn save_company(&mut self, company: &Company) -> Result<Company, CoreError> {
        CompanyRepo::update(&mut self.tx, company)
            .await
            .map_err(db_error)?
            .map(Company::from)
            .ok_or_else(|| vanished("Company", company.id))
    }

    async fn list_companies(&mut self) -> Result<Vec<Company>, CoreError> {
        let rows = CompanyRepo::list_all(&mut self.tx)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(Company::from).collect())
    }

    async fn delete_company(&mut self, id: DbId) -> Result<bool, CoreError> {
        CompanyRepo::delete(&mut self.tx, id).await.map_err(db_error)
    }

    async fn insert_task(
        &mut self,
        company_id: DbId,
        input: &CreateTask,
        now: Timestamp,
    ) -> Result<Task, CoreError> {
        let row = TaskRepo::create(
            &mut self.tx,
            company_id,
            input,
            TaskStatus::Published.id(),
            now,
        )
        .await
        .map_err(db_error)?;
        Task::try_from(row)
    }

    async fn find_task(&mut self, id: DbId) -> Result<Option<Task>, CoreError> {
        TaskRepo::find_for_update(&mut self.tx, id)
            .await
            .map_err(db_error)?
            .map(Task::try_from)
            .transpose()
    }

    async fn list_tasks_by_status(&mut self, status: TaskStatus) -> Result<Vec<Task>, CoreError> {
        let rows = TaskRepo::list_by_status(&mut self.tx, status.id())
            .await
            .map_err(db_error)?;
        decode_all(rows)
    }

    async fn list_tasks_by_company(&mut self, company_id: DbId) -> Result<Vec<Task>, CoreError> {
        let rows = TaskRepo::list_by_company(&mut self.tx, company_id)
            .await
            .map_err(db_error)?;
        decode_all(rows)
    }

    async fn list_tasks_for_engineer(
        &mut self,
        engineer_id: DbId,
    ) -> Result<Vec<Task>, CoreError> {
        let rows = TaskRepo::list_for_engineer(&mut self.tx, engineer_id)
            .await
            .map_err(db_error)?;
        decode_all(rows)
    }

    async fn save_task(&mut self, task: &Task) -> Result<Task, CoreError> {
        let row = TaskRepo::update(&mut self.tx, task)
            .await
            .map_err(db_error)?
            .ok_or_else(|| vanished("Task", task.id))?;
        Task::try_from(row)
    }

    async fn delete_task(&mut self, id: DbId) -> Result<bool, CoreError> {
        TaskRepo::delete(&mut self.tx, id).await.map_err(db_error)
    }

    async fn submission_task_id(&mut self, id: DbId) -> Result<Option<DbId>, CoreError> {
        SubmissionRepo::find_task_id(&mut self.tx, id)
            .await
            .map_err(db_error)
    }

    async fn find_submission(&mut self, id: DbId) -> Result<Option<Submission>, CoreError> {
        SubmissionRepo::find_for_update(&mut self.tx, id)
            .await
            .map_err(db_error)?
            .map(Submission::try_from)
            .transpose()
    }

    async fn find_submission_for(
        &mut self,
        task_id: DbId,
        engineer_id: DbId,
    ) -> Result<Option<Submission>, CoreError> {
        SubmissionRepo::find_for_pair_for_update(&mut self.tx, task_id, engineer_id)
            .await
            .map_err(db_error)?
            .map(Submission::try_from)
            .transpose()
    }

    async fn list_submissions_by_task(
        &mut self,
        task_id: DbId,
    ) -> Result<Vec<Submission>, CoreError> {
        let rows = SubmissionRepo::list_by_task(&mut self.tx, task_id)
            .await
            .map_err(db_error)?;
        decode_all(rows)
    }

    async fn list_submissions_by_engineer(
        &mut self,
        engineer_id: DbId,
    ) -> Result<Vec<Submission>, CoreError> {
        let rows = SubmissionRepo::list_by_engineer(&mut self.tx, engineer_id)
            .await
            .map_err(db_error)?;
        decode_all(rows)
    }

    async fn list_submissions_by_status(
        &mut self,
        status: SubmissionStatus,
        company_id: Option<DbId>,
    ) -> Result<Vec<Submission>, CoreError> {
        let rows = SubmissionRepo::list_by_status(&mut self.tx, status.id(), company_id)
            .await
            .map_err(db_error)?;
        decode_all(rows)
    }

    async fn insert_submission(
        &mut self,
        new: &NewSubmission,
        now: Timestamp,
    ) -> Result<Submission, CoreError> {
        let row = SubmissionRepo::create(&mut self.tx, new, now)
            .await
            .map_err(db_error)?;
        Submission::try_from(row)
    }

    async fn save_submission(
        &mut self,
        submission: &Submission,
    ) -> Result<Submission, CoreError> {
        let row = SubmissionRepo::update(&mut self.tx, submission)
            .await
            .map_err(db_error)?
            .ok_or_else(|| vanished("Submission", submission.id))?;
        Submission::try_from(row)
    }

    async fn ensure_profile(
        &mut self,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Profile, CoreError> {
        let row = ProfileRepo::ensure(&mut self.tx, user_id, now)
            .await
            .map_err(db_error)?;
        Ok(row.into())
    }

    async fn credit_profile(
        &mut self,
        credit: &ProfileCredit,
        now: Timestamp,
    ) -> Result<Profile, CoreError> {
        let row = ProfileRepo::credit(&mut self.tx, credit, now)
            .await
            .map_err(db_error)?;
        Ok(row.into())
    }

    async fn leaderboard(&mut self, limit: i64) -> Result<Vec<LeaderEntry>, CoreError> {
        let rows = ProfileRepo::leaderboard(&mut self.tx, limit)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(LeaderEntry::from).collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        self.tx.commit().await.map_err(db_error)
    }
}
