//! Query-string parameter types shared by handlers.

use serde::Deserialize;

/// `?limit=` for ranked listings. Clamping happens in the service.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}
