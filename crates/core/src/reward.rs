//! Reward engine: converts an approved submission into XP and a split of the
//! task budget between engineer, mentor, and platform.
//!
//! [`compute_reward`] is pure. [`grant_rewards`] applies computed breakdowns
//! to the profiles inside the caller's unit of work.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::policy::{RewardPolicy, BPS_DENOMINATOR};
use crate::profile::ProfileCredit;
use crate::store::StoreTx;
use crate::submission::{Submission, MAX_QUALITY_SCORE, MIN_QUALITY_SCORE};
use crate::task::Task;
use crate::types::{DbId, Timestamp};

/// Outcome of one reward computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardBreakdown {
    pub task_id: DbId,
    pub submission_id: DbId,
    pub engineer_id: DbId,
    pub mentor_id: Option<DbId>,
    pub base_xp: i64,
    pub quality_multiplier: f64,
    pub speed_bonus: bool,
    pub junior_xp: i64,
    pub junior_honey_drops: i64,
    pub mentor_honey_drops: i64,
    pub platform_honey_drops: i64,
    pub mentor_reputation: f64,
}

impl RewardBreakdown {
    /// Profile increments for the engineer and, when present, the mentor.
    pub fn credits(&self) -> Result<Vec<ProfileCredit>, CoreError> {
        let mut credits = vec![ProfileCredit::new(
            self.engineer_id,
            self.junior_xp,
            self.junior_honey_drops,
            0.0,
        )?];
        if let Some(mentor_id) = self.mentor_id {
            credits.push(ProfileCredit::new(
                mentor_id,
                0,
                self.mentor_honey_drops,
                self.mentor_reputation,
            )?);
        }
        Ok(credits)
    }
}

/// Floor of `amount * bps / 10_000`, computed without overflow.
fn basis_points_of(amount: i64, bps: i64) -> i64 {
    let cut = i128::from(amount) * i128::from(bps) / i128::from(BPS_DENOMINATOR);
    i64::try_from(cut).unwrap_or(i64::MAX)
}

/// Whether the claim-to-submit time falls inside the bonus window.
///
/// Submissions without a claim timestamp never qualify.
pub fn qualifies_for_speed_bonus(submission: &Submission, policy: &RewardPolicy) -> bool {
    match (submission.claimed_at, submission.submitted_at) {
        (Some(claimed), Some(submitted)) => submitted - claimed <= policy.speed_bonus_window,
        _ => false,
    }
}

/// Compute the reward for `submission` on `task`.
///
/// `mentor_id` is the reviewing mentor, if any; without one the mentor cut is
/// zero and the junior receives the remainder. Fails with `EngineerMissing`
/// when the submission lost its engineer.
pub fn compute_reward(
    task: &Task,
    submission: &Submission,
    mentor_id: Option<DbId>,
    policy: &RewardPolicy,
) -> Result<RewardBreakdown, CoreError> {
    let engineer_id = submission
        .engineer_id
        .ok_or(CoreError::EngineerMissing {
            submission_id: submission.id,
        })?;

    let base_xp = task.effective_base_xp();

    let quality_multiplier = submission.quality_score.unwrap_or(1.0);
    if !(MIN_QUALITY_SCORE..=MAX_QUALITY_SCORE).contains(&quality_multiplier) {
        return Err(CoreError::Validation(format!(
            "Quality score {quality_multiplier} outside {MIN_QUALITY_SCORE}-{MAX_QUALITY_SCORE}"
        )));
    }

    let speed_bonus = qualifies_for_speed_bonus(submission, policy);
    let bonus_fraction = if speed_bonus {
        policy.speed_bonus_bps as f64 / BPS_DENOMINATOR as f64
    } else {
        0.0
    };
    let junior_xp = (base_xp as f64 * quality_multiplier * (1.0 + bonus_fraction)).round() as i64;

    let budget = task.budget;
    let platform_honey_drops = basis_points_of(budget, policy.platform_fee_bps);
    let mentor_honey_drops = if mentor_id.is_some() {
        basis_points_of(budget, policy.mentor_fee_bps)
    } else {
        0
    };
    let junior_honey_drops = budget - platform_honey_drops - mentor_honey_drops;
    if junior_honey_drops < 0 {
        return Err(CoreError::Internal(format!(
            "Reward configuration leaves a negative junior share for task {}: budget={budget}, platform={platform_honey_drops}, mentor={mentor_honey_drops}",
            task.id
        )));
    }

    Ok(RewardBreakdown {
        task_id: task.id,
        submission_id: submission.id,
        engineer_id,
        mentor_id,
        base_xp,
        quality_multiplier,
        speed_bonus,
        junior_xp,
        junior_honey_drops,
        mentor_honey_drops,
        platform_honey_drops,
        mentor_reputation: if mentor_id.is_some() {
            policy.mentor_reputation_credit
        } else {
            0.0
        },
    })
}

/// Fold the credits of several breakdowns into one per user, ordered by
/// user id.
pub fn merge_credits(breakdowns: &[RewardBreakdown]) -> Result<Vec<ProfileCredit>, CoreError> {
    let mut merged: BTreeMap<DbId, ProfileCredit> = BTreeMap::new();
    for breakdown in breakdowns {
        for credit in breakdown.credits()? {
            match merged.get_mut(&credit.user_id) {
                Some(total) => {
                    total.xp += credit.xp;
                    total.honey_drops += credit.honey_drops;
                    total.reputation += credit.reputation;
                }
                None => {
                    merged.insert(credit.user_id, credit);
                }
            }
        }
    }
    Ok(merged.into_values().collect())
}

/// Credit the profiles named by `breakdowns` inside `tx`, in ascending user
/// order so concurrent grants lock profile rows in the same sequence. The
/// platform cut is logged only; there is no platform wallet.
pub async fn grant_rewards(
    tx: &mut dyn StoreTx,
    breakdowns: &[RewardBreakdown],
    now: Timestamp,
) -> Result<(), CoreError> {
    for credit in merge_credits(breakdowns)? {
        tx.credit_profile(&credit, now).await?;
    }
    for breakdown in breakdowns {
        tracing::info!(
            task_id = breakdown.task_id,
            submission_id = breakdown.submission_id,
            engineer_id = breakdown.engineer_id,
            mentor_id = ?breakdown.mentor_id,
            junior_xp = breakdown.junior_xp,
            junior_honey_drops = breakdown.junior_honey_drops,
            mentor_honey_drops = breakdown.mentor_honey_drops,
            platform_honey_drops = breakdown.platform_honey_drops,
            speed_bonus = breakdown.speed_bonus,
            "Reward granted"
        );
    }
    Ok(())
}
