//! Daily generation quota tracking.
//!
//! Free-plan users get a fixed number of copy generations per UTC day. The
//! counter is reset lazily: nothing runs at midnight, instead a stored window
//! start older than the current day means the stored count no longer applies.

mod allowance;
mod window;

pub use allowance::{FREE_DAILY_GENERATIONS, GenerationAllowance, QuotaState, remaining_today};
pub use window::{start_of_day, window_is_stale};
