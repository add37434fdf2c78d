//! Diesel models for drafts, deliveries, tracking events, and the waitlist.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use promptly_core::{DeliveryStatus, DraftStatus, EventType};
use serde::Serialize;
use uuid::Uuid;

/// Database row for the drafts table.
///
/// A saved, editable subject/body pair. The id is stable across edits.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::drafts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DraftRow {
    pub id: Uuid,
    pub user_id: String,
    pub subject: String,
    pub body: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DraftRow {
    /// Parse the stored status, treating anything unknown as draft.
    pub fn status(&self) -> DraftStatus {
        self.status.parse().unwrap_or_default()
    }
}

/// Insertable struct for a new draft.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::drafts)]
pub struct NewDraftRow {
    pub id: Uuid,
    pub user_id: String,
    pub subject: String,
    pub body: String,
    pub status: String,
}

impl NewDraftRow {
    /// A new draft owned by the given user.
    pub fn new(user_id: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            subject: subject.into(),
            body: body.into(),
            status: DraftStatus::Draft.to_string(),
        }
    }
}

/// Database row for the deliveries table.
///
/// One per send attempt, test or live. Retained permanently as an audit
/// trail except when a transport failure rolls back the provisional row.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::deliveries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeliveryRow {
    pub id: Uuid,
    pub draft_id: Uuid,
    pub user_id: String,
    pub status: String,
    pub is_test: bool,
    pub recipient_count: i32,
    pub recipients: Option<Vec<String>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub provider_message_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DeliveryRow {
    /// Parse the stored status.
    pub fn status(&self) -> Option<DeliveryStatus> {
        self.status.parse().ok()
    }
}

/// Insertable struct for a new delivery.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::deliveries)]
pub struct NewDeliveryRow {
    pub id: Uuid,
    pub draft_id: Uuid,
    pub user_id: String,
    pub status: String,
    pub is_test: bool,
    pub recipient_count: i32,
    pub recipients: Option<Vec<String>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl NewDeliveryRow {
    /// A provisional row for an immediate send, created before the transport
    /// call so the id can key the tracking rewrite.
    pub fn sent(
        draft_id: Uuid,
        user_id: impl Into<String>,
        recipient_count: i32,
        is_test: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            draft_id,
            user_id: user_id.into(),
            status: DeliveryStatus::Sent.to_string(),
            is_test,
            recipient_count,
            recipients: None,
            scheduled_at: None,
            sent_at: Some(now),
        }
    }

    /// A deferred delivery, including the recipient list so the scheduler
    /// can execute it later. The test flag is persisted so execution keeps
    /// test-mode semantics.
    pub fn scheduled(
        draft_id: Uuid,
        user_id: impl Into<String>,
        recipients: Vec<String>,
        is_test: bool,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            draft_id,
            user_id: user_id.into(),
            status: DeliveryStatus::Scheduled.to_string(),
            is_test,
            recipient_count: recipients.len() as i32,
            recipients: Some(recipients),
            scheduled_at: Some(scheduled_at),
            sent_at: None,
        }
    }
}

/// Database row for the events table. Append-only.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventRow {
    pub id: i32,
    pub delivery_id: Uuid,
    pub event_type: String,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for a tracking event.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::events)]
pub struct NewEventRow {
    pub delivery_id: Uuid,
    pub event_type: String,
    pub url: Option<String>,
}

impl NewEventRow {
    /// A new event of the given type.
    pub fn new(delivery_id: Uuid, event_type: EventType, url: Option<String>) -> Self {
        Self {
            delivery_id,
            event_type: event_type.to_string(),
            url,
        }
    }
}

/// Insertable struct for a waitlist signup.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::waitlist)]
pub struct NewWaitlistRow {
    pub email: String,
}

/// Aggregate counts backing the analytics dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DeliverySummary {
    /// Sent deliveries inside the window
    pub sends: i64,
    /// OPEN events attributed to those deliveries
    pub opens: i64,
    /// CLICK events attributed to those deliveries
    pub clicks: i64,
}
