//! Shared fixtures for the PostgreSQL integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use appbee_core::company::UpsertCompany;
use appbee_core::policy::MarketplacePolicy;
use appbee_core::roles::{Actor, UserRole};
use appbee_core::submission::SubmitWork;
use appbee_core::task::{CreateTask, Difficulty};
use appbee_core::types::DbId;
use appbee_core::Marketplace;
use appbee_db::PgStore;
use sqlx::PgPool;

pub const COMPANY: DbId = 1;
pub const ENGINEER: DbId = 2;
pub const MENTOR: DbId = 3;
pub const OTHER_ENGINEER: DbId = 4;
pub const ADMIN: DbId = 5;
pub const OTHER_COMPANY: DbId = 6;

/// Insert the fixed set of users. The identity service owns this table, so
/// the store has no write path for it.
pub async fn seed_users(pool: &PgPool) {
    for (id, role, name) in [
        (COMPANY, "company", "Acme Owner"),
        (ENGINEER, "engineer", "Jun Ior"),
        (MENTOR, "mentor", "Men Tor"),
        (OTHER_ENGINEER, "engineer", "Sec Ond"),
        (ADMIN, "admin", "Ad Min"),
        (OTHER_COMPANY, "company", "Globex Owner"),
    ] {
        sqlx::query("INSERT INTO users (id, email, full_name, role) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(format!("user{id}@appbee.dev"))
            .bind(name)
            .bind(role)
            .execute(pool)
            .await
            .unwrap();
    }
}

/// Seed users and build the service over a `PgStore`.
pub async fn marketplace(pool: &PgPool) -> Arc<Marketplace> {
    seed_users(pool).await;
    let store = PgStore::new(pool.clone());
    Arc::new(Marketplace::new(Arc::new(store), MarketplacePolicy::default()).unwrap())
}

pub fn company() -> Actor {
    Actor::new(COMPANY, UserRole::Company)
}

pub fn other_company() -> Actor {
    Actor::new(OTHER_COMPANY, UserRole::Company)
}

pub fn engineer() -> Actor {
    Actor::new(ENGINEER, UserRole::Engineer)
}

pub fn other_engineer() -> Actor {
    Actor::new(OTHER_ENGINEER, UserRole::Engineer)
}

pub fn mentor() -> Actor {
    Actor::new(MENTOR, UserRole::Mentor)
}

pub fn admin() -> Actor {
    Actor::new(ADMIN, UserRole::Admin)
}

pub fn named(name: &str) -> UpsertCompany {
    UpsertCompany {
        name: name.to_string(),
        description: None,
    }
}

pub fn new_task(budget: i64, base_xp: i64) -> CreateTask {
    CreateTask {
        title: "Fix the login form".to_string(),
        description: Some("Postgres backed".to_string()),
        difficulty: Difficulty::Medium,
        budget,
        base_xp: Some(base_xp),
        deadline_at: None,
    }
}

pub fn work(notes: &str) -> SubmitWork {
    SubmitWork {
        notes: Some(notes.to_string()),
        attachment_url: None,
    }
}
