//! Repository for the `companies` table.

use appbee_core::company::{Company, UpsertCompany};
use appbee_core::types::{DbId, Timestamp};
use sqlx::PgConnection;

use crate::models::company::CompanyRow;

/// Column list for companies queries.
const COLUMNS: &str = "id, owner_id, name, description, created_at, updated_at";

pub struct CompanyRepo;

impl CompanyRepo {
    /// Insert a company for `owner_id`. Fails on `uq_companies_owner` when
    /// the owner already has one.
    pub async fn create(
        conn: &mut PgConnection,
        owner_id: DbId,
        input: &UpsertCompany,
        now: Timestamp,
    ) -> Result<CompanyRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO companies (owner_id, name, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CompanyRow>(&query)
            .bind(owner_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(now)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<CompanyRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        sqlx::query_as::<_, CompanyRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn find_by_owner(
        conn: &mut PgConnection,
        owner_id: DbId,
    ) -> Result<Option<CompanyRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE owner_id = $1");
        sqlx::query_as::<_, CompanyRow>(&query)
            .bind(owner_id)
            .fetch_optional(conn)
            .await
    }

    pub async fn list_all(conn: &mut PgConnection) -> Result<Vec<CompanyRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies ORDER BY id");
        sqlx::query_as::<_, CompanyRow>(&query).fetch_all(conn).await
    }

    /// Delete a company. Its tasks and their submissions go with it through
    /// `ON DELETE CASCADE`.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Write name, description and `updated_at`. `None` if the row is gone.
    pub async fn update(
        conn: &mut PgConnection,
        company: &Company,
    ) -> Result<Option<CompanyRow>, sqlx::Error> {
        let query = format!(
            "UPDATE companies SET name = $2, description = $3, updated_at = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CompanyRow>(&query)
            .bind(company.id)
            .bind(&company.name)
            .bind(&company.description)
            .bind(company.updated_at)
            .fetch_optional(conn)
            .await
    }
}
