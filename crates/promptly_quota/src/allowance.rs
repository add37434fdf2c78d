//! Remaining-allowance computation for the daily generation cap.

use crate::window::window_is_stale;
use chrono::{DateTime, Utc};
use promptly_core::Plan;
use serde::{Deserialize, Serialize};

/// Daily generation cap for free-plan profiles.
pub const FREE_DAILY_GENERATIONS: i32 = 2;

/// The quota-relevant slice of a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    /// Subscription plan
    pub plan: Plan,
    /// Generations recorded in the current window
    pub generation_count: i32,
    /// When the current window started, if any
    pub period_start: Option<DateTime<Utc>>,
}

/// How many generations remain for the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationAllowance {
    /// Pro plans are never capped.
    Unlimited,
    /// Remaining generations today, never negative.
    Remaining(i32),
}

impl GenerationAllowance {
    /// True when no further generation may be accepted.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, GenerationAllowance::Remaining(0))
    }

    /// Wire representation: `-1` denotes unlimited.
    pub fn as_api_value(&self) -> i64 {
        match self {
            GenerationAllowance::Unlimited => -1,
            GenerationAllowance::Remaining(n) => i64::from(*n),
        }
    }
}

/// Compute the remaining allowance for "today".
///
/// Pro plans are unlimited regardless of the stored counter. For free plans
/// the stored counter only applies while the stored window start falls within
/// the current UTC day; a stale window means an effective used-count of zero
/// (the physical reset happens in the generation endpoint, not here).
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use promptly_core::Plan;
/// use promptly_quota::{GenerationAllowance, QuotaState, remaining_today, start_of_day};
///
/// let now = Utc::now();
/// let state = QuotaState {
///     plan: Plan::Free,
///     generation_count: 1,
///     period_start: Some(start_of_day(now)),
/// };
/// assert_eq!(remaining_today(&state, now), GenerationAllowance::Remaining(1));
/// ```
#[tracing::instrument(level = "debug")]
pub fn remaining_today(state: &QuotaState, now: DateTime<Utc>) -> GenerationAllowance {
    if state.plan.is_pro() {
        return GenerationAllowance::Unlimited;
    }

    let used = if window_is_stale(state.period_start, now) {
        0
    } else {
        state.generation_count.max(0)
    };

    GenerationAllowance::Remaining((FREE_DAILY_GENERATIONS - used).max(0))
}
