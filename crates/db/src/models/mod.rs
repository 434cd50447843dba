//! Row models for the marketplace tables.
//!
//! Each row converts into its core entity with `TryFrom`, failing with
//! `CoreError::Internal` when a stored value does not decode.

pub mod company;
pub mod profile;
pub mod submission;
pub mod task;

use appbee_core::error::CoreError;

/// Error for a column value that does not map onto a domain value.
pub(crate) fn undecodable(table: &str, column: &str, value: impl std::fmt::Display) -> CoreError {
    CoreError::Internal(format!("Unknown {column} '{value}' in {table}"))
}
