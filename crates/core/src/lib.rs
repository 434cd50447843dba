//! Domain core of the Appbee task marketplace.
//!
//! Pure types and rules (task and submission state machines, reward engine,
//! leveling) plus the [`Marketplace`] service that runs every operation
//! against a [`Store`]. No HTTP and no SQL live here.

pub mod company;
pub mod error;
pub mod marketplace;
pub mod policy;
pub mod profile;
pub mod reward;
pub mod roles;
pub mod status;
pub mod store;
pub mod submission;
pub mod task;
pub mod types;
pub mod user;

pub use error::CoreError;
pub use marketplace::{Marketplace, TaskApproval, TaskProgress};
pub use store::{MemoryStore, Store, StoreTx};
