//! Diesel models for user profiles.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use promptly_core::Plan;
use promptly_quota::QuotaState;
use serde::Serialize;

/// Database row for the profiles table.
///
/// One per user, created on first access. Holds the subscription plan and
/// the daily generation counter with its window start.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProfileRow {
    pub id: i32,
    pub user_id: String,
    pub plan: String,
    pub generation_count: i32,
    pub generation_period_start: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRow {
    /// Parse the stored plan, treating anything unknown as free.
    pub fn plan(&self) -> Plan {
        self.plan.parse().unwrap_or_default()
    }

    /// The quota-relevant view of this profile.
    pub fn quota_state(&self) -> QuotaState {
        QuotaState {
            plan: self.plan(),
            generation_count: self.generation_count,
            period_start: self.generation_period_start,
        }
    }
}

/// Insertable struct for creating a profile on first access.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::profiles)]
pub struct NewProfileRow {
    pub user_id: String,
    pub plan: String,
    pub generation_count: i32,
    pub generation_period_start: Option<DateTime<Utc>>,
}

impl NewProfileRow {
    /// A fresh free-plan profile with a window starting now.
    pub fn free(user_id: impl Into<String>, window_start: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            plan: Plan::Free.to_string(),
            generation_count: 0,
            generation_period_start: Some(window_start),
        }
    }
}
