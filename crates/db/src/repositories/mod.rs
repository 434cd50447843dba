//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! `&mut PgConnection` as the first argument, so callers decide the
//! transaction they run in.

pub mod company_repo;
pub mod profile_repo;
pub mod submission_repo;
pub mod task_repo;

pub use company_repo::CompanyRepo;
pub use profile_repo::ProfileRepo;
pub use submission_repo::SubmissionRepo;
pub use task_repo::TaskRepo;
