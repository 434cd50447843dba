use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("No company is registered for user {owner_id}")]
    CompanyNotFound { owner_id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("{entity} {id} is {actual}, expected {expected}")]
    InvalidState {
        entity: &'static str,
        id: DbId,
        expected: String,
        actual: String,
    },

    #[error("Submission {submission_id} has no engineer assigned")]
    EngineerMissing { submission_id: DbId },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for an [`CoreError::InvalidState`] built from displayable states.
    pub fn invalid_state(
        entity: &'static str,
        id: DbId,
        expected: impl Into<String>,
        actual: impl std::fmt::Display,
    ) -> Self {
        CoreError::InvalidState {
            entity,
            id,
            expected: expected.into(),
            actual: actual.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_message_names_both_states() {
        let err = CoreError::invalid_state("Task", 7, "published", "cancelled");
        assert_eq!(err.to_string(), "Task 7 is cancelled, expected published");
    }

    #[test]
    fn engineer_missing_names_submission() {
        let err = CoreError::EngineerMissing { submission_id: 3 };
        assert!(err.to_string().contains("Submission 3"));
    }
}
