//! Profiles, leaderboard, company management and company administration.

use validator::Validate;

use crate::company::{Company, CreateCompanyFor, UpsertCompany};
use crate::error::CoreError;
use crate::profile::{clamp_leaderboard_limit, LeaderEntry, Profile};
use crate::roles::{Actor, UserRole};
use crate::status::TaskStatus;
use crate::types::DbId;

use super::{load_task, now, require_company, Marketplace};

impl Marketplace {
    /// The actor's profile, created empty on first read.
    pub async fn get_profile(&self, actor: &Actor) -> Result<Profile, CoreError> {
        let mut tx = self.store.begin().await?;
        let profile = tx.ensure_profile(actor.user_id, now()).await?;
        tx.commit().await?;
        Ok(profile)
    }

    /// Top profiles by XP. `limit` defaults to 10 and is clamped to 1..=100.
    pub async fn leaderboard(&self, limit: Option<i64>) -> Result<Vec<LeaderEntry>, CoreError> {
        let mut tx = self.store.begin().await?;
        let entries = tx.leaderboard(clamp_leaderboard_limit(limit)).await?;
        tx.commit().await?;
        Ok(entries)
    }

    pub async fn get_my_company(&self, actor: &Actor) -> Result<Company, CoreError> {
        actor.require_role(UserRole::Company, "Viewing a company")?;

        let mut tx = self.store.begin().await?;
        let company = require_company(tx.as_mut(), actor).await?;
        tx.commit().await?;
        Ok(company)
    }

    /// Create the actor's company, or rename and redescribe the existing one.
    pub async fn upsert_my_company(
        &self,
        actor: &Actor,
        input: UpsertCompany,
    ) -> Result<Company, CoreError> {
        actor.require_role(UserRole::Company, "Managing a company")?;
        input.validate()?;

        let now = now();
        let mut tx = self.store.begin().await?;
        let company = match tx.find_company_by_owner(actor.user_id).await? {
            Some(mut company) => {
                company.name = input.name;
                company.description = input.description;
                company.updated_at = now;
                tx.save_company(&company).await?
            }
            None => tx.insert_company(actor.user_id, &input, now).await?,
        };
        tx.commit().await?;

        tracing::info!(
            company_id = company.id,
            owner_id = actor.user_id,
            "Company saved"
        );
        Ok(company)
    }

    /// Every company. Open to any authenticated user.
    pub async fn list_companies(&self, _actor: &Actor) -> Result<Vec<Company>, CoreError> {
        let mut tx = self.store.begin().await?;
        let companies = tx.list_companies().await?;
        tx.commit().await?;
        Ok(companies)
    }

    // -- Administration --

    /// Create a company for `input.owner_id`. `Conflict` if that user already
    /// owns one.
    pub async fn create_company_for(
        &self,
        actor: &Actor,
        input: CreateCompanyFor,
    ) -> Result<Company, CoreError> {
        actor.require_role(UserRole::Admin, "Creating a company for another user")?;
        input.validate()?;

        let mut tx = self.store.begin().await?;
        let company = tx
            .insert_company(input.owner_id, &input.company, now())
            .await?;
        tx.commit().await?;

        tracing::info!(
            company_id = company.id,
            owner_id = company.owner_id,
            admin_id = actor.user_id,
            "Company created by admin"
        );
        Ok(company)
    }

    /// Rename and redescribe any company.
    pub async fn update_company(
        &self,
        actor: &Actor,
        company_id: DbId,
        input: UpsertCompany,
    ) -> Result<Company, CoreError> {
        actor.require_role(UserRole::Admin, "Updating a company")?;
        input.validate()?;

        let mut tx = self.store.begin().await?;
        let mut company = tx
            .find_company(company_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Company",
                id: company_id,
            })?;
        company.name = input.name;
        company.description = input.description;
        company.updated_at = now();
        let company = tx.save_company(&company).await?;
        tx.commit().await?;

        tracing::info!(company_id, admin_id = actor.user_id, "Company updated by admin");
        Ok(company)
    }

    /// Delete a company together with its tasks and their submissions.
    /// `InvalidState` while any of its tasks is completed.
    pub async fn delete_company(&self, actor: &Actor, company_id: DbId) -> Result<(), CoreError> {
        actor.require_role(UserRole::Admin, "Deleting a company")?;

        let mut tx = self.store.begin().await?;
        if tx.find_company(company_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Company",
                id: company_id,
            });
        }
        let task_ids: Vec<DbId> = tx
            .list_tasks_by_company(company_id)
            .await?
            .iter()
            .map(|t| t.id)
            .collect();
        for task_id in task_ids {
            let task = load_task(tx.as_mut(), task_id).await?;
            if task.status == TaskStatus::Completed {
                return Err(CoreError::invalid_state(
                    "Task",
                    task.id,
                    "not completed",
                    task.status,
                ));
            }
        }
        if !tx.delete_company(company_id).await? {
            return Err(CoreError::NotFound {
                entity: "Company",
                id: company_id,
            });
        }
        tx.commit().await?;

        tracing::info!(company_id, admin_id = actor.user_id, "Company deleted by admin");
        Ok(())
    }
}
