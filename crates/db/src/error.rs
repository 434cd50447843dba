//! Translation of sqlx errors into domain errors.

use appbee_core::error::CoreError;

/// PostgreSQL SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// PostgreSQL SQLSTATE for check constraint violations.
const CHECK_VIOLATION: &str = "23514";

/// Classify a sqlx error.
///
/// - Unique violations on `uq_*` constraints become `Conflict`.
/// - Foreign key and check violations become `Validation`.
/// - Everything else is logged and becomes a sanitized `Internal`.
pub fn db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) if constraint.starts_with("uq_") => {
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return CoreError::Validation(format!(
                    "Referenced record does not exist: {constraint}"
                ));
            }
            Some(CHECK_VIOLATION) => {
                return CoreError::Validation(format!("Value violates constraint: {constraint}"));
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal("A database error occurred".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn unexpected_errors_are_sanitized() {
        let err = db_error(sqlx::Error::PoolTimedOut);
        assert_matches!(err, CoreError::Internal(ref msg) if msg == "A database error occurred");
    }

    #[test]
    fn missing_row_is_internal() {
        assert_matches!(db_error(sqlx::Error::RowNotFound), CoreError::Internal(_));
    }
}
