//! Scalar aliases shared by every marketplace entity.

/// Identifier of a user, company, task or submission (PostgreSQL `BIGINT`).
pub type DbId = i64;

/// Instants are stored and compared in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
