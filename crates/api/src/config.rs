use std::str::FromStr;

use appbee_core::policy::{MarketplacePolicy, ReviewPolicy, RewardPolicy};
use chrono::Duration;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Reward rates, review permissions and company provisioning.
    pub policy: MarketplacePolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    ///
    /// JWT settings come from [`JwtConfig::from_env`] and policies from
    /// [`policy_from_lookup`].
    ///
    /// # Panics
    ///
    /// Panics on malformed values so a misconfigured server never starts.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        let policy = policy_from_lookup(|key| std::env::var(key).ok())
            .unwrap_or_else(|e| panic!("Invalid marketplace policy: {e}"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            policy,
        }
    }
}

/// Read a typed value, falling back to `default` when the key is unset.
fn read<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, String> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

/// Build the marketplace policy from a key lookup.
///
/// | Env Var                      | Default |
/// |------------------------------|---------|
/// | `REWARD_PLATFORM_FEE_BPS`    | `2000`  |
/// | `REWARD_MENTOR_FEE_BPS`      | `1500`  |
/// | `REWARD_SPEED_BONUS_BPS`     | `1000`  |
/// | `REWARD_SPEED_WINDOW_HOURS`  | `24`    |
/// | `REWARD_MENTOR_REPUTATION`   | `10`    |
/// | `REVIEW_COMPANY_MAY_APPROVE` | `true`  |
/// | `REVIEW_MENTOR_MAY_APPROVE`  | `true`  |
/// | `AUTO_PROVISION_COMPANY`     | `false` |
pub fn policy_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<MarketplacePolicy, String> {
    let defaults = MarketplacePolicy::default();

    let reward = RewardPolicy {
        platform_fee_bps: read(
            &lookup,
            "REWARD_PLATFORM_FEE_BPS",
            defaults.reward.platform_fee_bps,
        )?,
        mentor_fee_bps: read(
            &lookup,
            "REWARD_MENTOR_FEE_BPS",
            defaults.reward.mentor_fee_bps,
        )?,
        speed_bonus_bps: read(
            &lookup,
            "REWARD_SPEED_BONUS_BPS",
            defaults.reward.speed_bonus_bps,
        )?,
        speed_bonus_window: Duration::hours(read(
            &lookup,
            "REWARD_SPEED_WINDOW_HOURS",
            defaults.reward.speed_bonus_window.num_hours(),
        )?),
        mentor_reputation_credit: read(
            &lookup,
            "REWARD_MENTOR_REPUTATION",
            defaults.reward.mentor_reputation_credit,
        )?,
    };
    reward.validate().map_err(|e| e.to_string())?;

    let review = ReviewPolicy {
        company_may_approve: read(
            &lookup,
            "REVIEW_COMPANY_MAY_APPROVE",
            defaults.review.company_may_approve,
        )?,
        mentor_may_approve: read(
            &lookup,
            "REVIEW_MENTOR_MAY_APPROVE",
            defaults.review.mentor_may_approve,
        )?,
    };

    Ok(MarketplacePolicy {
        reward,
        review,
        auto_provision_company: read(
            &lookup,
            "AUTO_PROVISION_COMPANY",
            defaults.auto_provision_company,
        )?,
    })
}
