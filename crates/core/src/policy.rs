//! Tunable marketplace policies: reward rates, review permissions, and
//! company provisioning.

use chrono::Duration;

use crate::error::CoreError;
use crate::roles::{Actor, UserRole};

/// Denominator for basis-point rates.
pub const BPS_DENOMINATOR: i64 = 10_000;

/// Reward engine parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardPolicy {
    /// Platform share of a task budget, in basis points.
    pub platform_fee_bps: i64,
    /// Mentor share of a task budget when a mentor reviewed, in basis points.
    pub mentor_fee_bps: i64,
    /// XP surcharge for fast work, in basis points.
    pub speed_bonus_bps: i64,
    /// Maximum claim-to-submit time that still earns the speed bonus.
    pub speed_bonus_window: Duration,
    /// Reputation credited to a mentor per approved review.
    pub mentor_reputation_credit: f64,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            platform_fee_bps: 2_000,
            mentor_fee_bps: 1_500,
            speed_bonus_bps: 1_000,
            speed_bonus_window: Duration::hours(24),
            mentor_reputation_credit: 10.0,
        }
    }
}

impl RewardPolicy {
    /// Reject rate combinations that could leave the junior a negative share.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.platform_fee_bps < 0 || self.mentor_fee_bps < 0 || self.speed_bonus_bps < 0 {
            return Err(CoreError::Validation(
                "Reward rates must not be negative".to_string(),
            ));
        }
        if self.platform_fee_bps + self.mentor_fee_bps > BPS_DENOMINATOR {
            return Err(CoreError::Validation(format!(
                "Platform ({}) and mentor ({}) fees exceed {BPS_DENOMINATOR} basis points",
                self.platform_fee_bps, self.mentor_fee_bps
            )));
        }
        if self.speed_bonus_window <= Duration::zero() {
            return Err(CoreError::Validation(
                "Speed bonus window must be positive".to_string(),
            ));
        }
        if self.mentor_reputation_credit < 0.0 {
            return Err(CoreError::Validation(
                "Mentor reputation credit must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Who may review submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewPolicy {
    /// Company owners may approve submissions on their own tasks.
    pub company_may_approve: bool,
    /// Mentors may approve submissions on any task.
    pub mentor_may_approve: bool,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            company_may_approve: true,
            mentor_may_approve: true,
        }
    }
}

impl ReviewPolicy {
    /// Check the role half of review authorization. Ownership of the task's
    /// company is checked separately by the caller for company reviewers.
    pub fn authorize_role(&self, actor: &Actor) -> Result<(), CoreError> {
        let allowed = match actor.role {
            UserRole::Company => self.company_may_approve,
            UserRole::Mentor => self.mentor_may_approve,
            UserRole::Engineer | UserRole::Admin => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(CoreError::NotAuthorized(format!(
                "Role {} may not review submissions",
                actor.role
            )))
        }
    }
}

/// All policies the marketplace service runs with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketplacePolicy {
    pub reward: RewardPolicy,
    pub review: ReviewPolicy,
    /// Create a company on the fly when a company user posts their first
    /// task instead of failing with `CompanyNotFound`.
    pub auto_provision_company: bool,
}
