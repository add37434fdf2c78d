//! Tests for daily quota arithmetic and lazy-reset semantics.

use chrono::{Duration, Utc};
use promptly_core::Plan;
use promptly_quota::{
    FREE_DAILY_GENERATIONS, GenerationAllowance, QuotaState, remaining_today, start_of_day,
    window_is_stale,
};

#[test]
fn test_pro_is_unlimited_regardless_of_counter() {
    let now = Utc::now();
    let state = QuotaState {
        plan: Plan::Pro,
        generation_count: 10_000,
        period_start: Some(start_of_day(now)),
    };
    assert_eq!(remaining_today(&state, now), GenerationAllowance::Unlimited);
    assert_eq!(remaining_today(&state, now).as_api_value(), -1);
}

#[test]
fn test_free_remaining_is_cap_minus_used() {
    let now = Utc::now();
    let state = QuotaState {
        plan: Plan::Free,
        generation_count: 1,
        period_start: Some(start_of_day(now)),
    };
    assert_eq!(
        remaining_today(&state, now),
        GenerationAllowance::Remaining(FREE_DAILY_GENERATIONS - 1)
    );
}

#[test]
fn test_free_remaining_never_negative() {
    let now = Utc::now();
    let state = QuotaState {
        plan: Plan::Free,
        generation_count: FREE_DAILY_GENERATIONS + 5,
        period_start: Some(now),
    };
    assert_eq!(remaining_today(&state, now), GenerationAllowance::Remaining(0));
    assert!(remaining_today(&state, now).is_exhausted());
}

#[test]
fn test_stale_window_means_zero_used() {
    // Counter is maxed out but the window started yesterday, so today's
    // effective used-count is zero and the full cap is available again.
    let now = Utc::now();
    let state = QuotaState {
        plan: Plan::Free,
        generation_count: FREE_DAILY_GENERATIONS,
        period_start: Some(start_of_day(now) - Duration::days(1)),
    };
    assert_eq!(
        remaining_today(&state, now),
        GenerationAllowance::Remaining(FREE_DAILY_GENERATIONS)
    );
}

#[test]
fn test_missing_window_means_zero_used() {
    let now = Utc::now();
    let state = QuotaState {
        plan: Plan::Free,
        generation_count: 2,
        period_start: None,
    };
    assert_eq!(
        remaining_today(&state, now),
        GenerationAllowance::Remaining(FREE_DAILY_GENERATIONS)
    );
}

#[test]
fn test_window_staleness() {
    let now = Utc::now();
    assert!(window_is_stale(None, now));
    assert!(window_is_stale(
        Some(start_of_day(now) - Duration::seconds(1)),
        now
    ));
    assert!(!window_is_stale(Some(start_of_day(now)), now));
    assert!(!window_is_stale(Some(now), now));
}

#[test]
fn test_negative_counter_is_clamped() {
    let now = Utc::now();
    let state = QuotaState {
        plan: Plan::Free,
        generation_count: -3,
        period_start: Some(now),
    };
    assert_eq!(
        remaining_today(&state, now),
        GenerationAllowance::Remaining(FREE_DAILY_GENERATIONS)
    );
}
