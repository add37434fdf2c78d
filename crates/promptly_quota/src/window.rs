//! Day-window arithmetic for the lazy quota reset.

use chrono::{DateTime, Utc};

/// Truncate a timestamp to the start of its UTC day.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(now)
}

/// True when a stored window start no longer covers the current day.
///
/// A missing window start counts as stale, so a fresh profile gets a window
/// assigned on its first generation attempt.
pub fn window_is_stale(period_start: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match period_start {
        Some(start) => start < start_of_day(now),
        None => true,
    }
}
