//! In-memory implementation of [`Store`] for testing.
//!
//! This module provides a simple HashMap-based store so dispatcher and route
//! logic can be exercised without a database. Semantics mirror the Postgres
//! implementation, including owner scoping and atomic schedule claims.

use crate::campaign_models::{DeliveryRow, DeliverySummary, DraftRow, NewDeliveryRow};
use crate::profile_models::ProfileRow;
use crate::{DatabaseResult, Store};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use promptly_core::{DeliveryStatus, DraftStatus, EventType, Plan};
use promptly_error::{DatabaseError, DatabaseErrorKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredEvent {
    delivery_id: Uuid,
    event_type: EventType,
    url: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    profiles: HashMap<String, ProfileRow>,
    drafts: HashMap<Uuid, DraftRow>,
    deliveries: HashMap<Uuid, DeliveryRow>,
    events: Vec<StoredEvent>,
    waitlist: Vec<String>,
    next_profile_id: i32,
}

/// In-memory store for tests.
///
/// All data is lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
    /// When set, `record_event` fails; used to exercise best-effort paths.
    fail_event_writes: bool,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose event writes always fail (for testing the recorder).
    pub fn with_failing_event_writes() -> Self {
        Self {
            inner: Arc::default(),
            fail_event_writes: true,
        }
    }

    /// Number of delivery rows currently stored (for testing).
    pub async fn delivery_count(&self) -> usize {
        self.inner.read().await.deliveries.len()
    }

    /// Fetch a delivery row by id (for testing).
    pub async fn delivery(&self, delivery_id: Uuid) -> Option<DeliveryRow> {
        self.inner.read().await.deliveries.get(&delivery_id).cloned()
    }

    /// Recorded events as `(delivery_id, type, url)` tuples (for testing).
    pub async fn events(&self) -> Vec<(Uuid, EventType, Option<String>)> {
        self.inner
            .read()
            .await
            .events
            .iter()
            .map(|e| (e.delivery_id, e.event_type, e.url.clone()))
            .collect()
    }

    /// Waitlist entries (for testing).
    pub async fn waitlist(&self) -> Vec<String> {
        self.inner.read().await.waitlist.clone()
    }

    fn profile_row(inner: &mut Inner, user_id: &str, window_start: DateTime<Utc>) -> ProfileRow {
        if let Some(profile) = inner.profiles.get(user_id) {
            return profile.clone();
        }
        inner.next_profile_id += 1;
        let now = Utc::now();
        let profile = ProfileRow {
            id: inner.next_profile_id,
            user_id: user_id.to_string(),
            plan: Plan::Free.to_string(),
            generation_count: 0,
            generation_period_start: Some(window_start),
            created_at: now,
            updated_at: now,
        };
        inner.profiles.insert(user_id.to_string(), profile.clone());
        profile
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn ensure_profile(
        &self,
        user_id: &str,
        window_start: DateTime<Utc>,
    ) -> DatabaseResult<ProfileRow> {
        let mut inner = self.inner.write().await;
        Ok(Self::profile_row(&mut inner, user_id, window_start))
    }

    async fn find_profile(&self, user_id: &str) -> DatabaseResult<Option<ProfileRow>> {
        Ok(self.inner.read().await.profiles.get(user_id).cloned())
    }

    async fn reset_generation_window(
        &self,
        user_id: &str,
        window_start: DateTime<Utc>,
    ) -> DatabaseResult<ProfileRow> {
        let mut inner = self.inner.write().await;
        let profile = inner
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| DatabaseError::new(DatabaseErrorKind::NotFound))?;
        profile.generation_count = 0;
        profile.generation_period_start = Some(window_start);
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn increment_generation_count(&self, user_id: &str) -> DatabaseResult<ProfileRow> {
        let mut inner = self.inner.write().await;
        let profile = inner
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| DatabaseError::new(DatabaseErrorKind::NotFound))?;
        profile.generation_count += 1;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn set_plan(&self, user_id: &str, plan: Plan) -> DatabaseResult<ProfileRow> {
        let mut inner = self.inner.write().await;
        let mut profile = Self::profile_row(&mut inner, user_id, Utc::now());
        profile.plan = plan.to_string();
        profile.updated_at = Utc::now();
        inner.profiles.insert(user_id.to_string(), profile.clone());
        Ok(profile)
    }

    async fn create_draft(
        &self,
        user_id: &str,
        subject: &str,
        body: &str,
    ) -> DatabaseResult<DraftRow> {
        let now = Utc::now();
        let draft = DraftRow {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            status: DraftStatus::Draft.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.drafts.insert(draft.id, draft.clone());
        Ok(draft)
    }

    async fn update_draft(
        &self,
        draft_id: Uuid,
        user_id: &str,
        subject: &str,
        body: &str,
        status: DraftStatus,
    ) -> DatabaseResult<DraftRow> {
        let mut inner = self.inner.write().await;
        let draft = inner
            .drafts
            .get_mut(&draft_id)
            .filter(|draft| draft.user_id == user_id)
            .ok_or_else(|| DatabaseError::new(DatabaseErrorKind::NotFound))?;
        draft.subject = subject.to_string();
        draft.body = body.to_string();
        draft.status = status.to_string();
        draft.updated_at = Utc::now();
        Ok(draft.clone())
    }

    async fn find_draft(&self, draft_id: Uuid, user_id: &str) -> DatabaseResult<Option<DraftRow>> {
        Ok(self
            .inner
            .read()
            .await
            .drafts
            .get(&draft_id)
            .filter(|draft| draft.user_id == user_id)
            .cloned())
    }

    async fn list_drafts(&self, user_id: &str) -> DatabaseResult<Vec<DraftRow>> {
        let mut drafts: Vec<DraftRow> = self
            .inner
            .read()
            .await
            .drafts
            .values()
            .filter(|draft| draft.user_id == user_id)
            .cloned()
            .collect();
        drafts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(drafts)
    }

    async fn mark_draft_sent(&self, draft_id: Uuid) -> DatabaseResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(draft) = inner.drafts.get_mut(&draft_id) {
            draft.status = DraftStatus::Sent.to_string();
            draft.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn create_delivery(&self, row: NewDeliveryRow) -> DatabaseResult<DeliveryRow> {
        let delivery = DeliveryRow {
            id: row.id,
            draft_id: row.draft_id,
            user_id: row.user_id,
            status: row.status,
            is_test: row.is_test,
            recipient_count: row.recipient_count,
            recipients: row.recipients,
            scheduled_at: row.scheduled_at,
            sent_at: row.sent_at,
            provider_message_id: None,
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .deliveries
            .insert(delivery.id, delivery.clone());
        Ok(delivery)
    }

    async fn delete_delivery(&self, delivery_id: Uuid) -> DatabaseResult<()> {
        self.inner.write().await.deliveries.remove(&delivery_id);
        Ok(())
    }

    async fn set_provider_message_id(
        &self,
        delivery_id: Uuid,
        message_id: Option<String>,
    ) -> DatabaseResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(delivery) = inner.deliveries.get_mut(&delivery_id) {
            delivery.provider_message_id = message_id;
        }
        Ok(())
    }

    async fn claim_due_deliveries(&self, now: DateTime<Utc>) -> DatabaseResult<Vec<DeliveryRow>> {
        let mut inner = self.inner.write().await;
        let mut claimed = Vec::new();
        for delivery in inner.deliveries.values_mut() {
            let due = delivery.status == DeliveryStatus::Scheduled.to_string()
                && delivery.scheduled_at.is_some_and(|at| at <= now);
            if due {
                delivery.status = DeliveryStatus::Sent.to_string();
                delivery.sent_at = Some(now);
                claimed.push(delivery.clone());
            }
        }
        Ok(claimed)
    }

    async fn mark_delivery_failed(&self, delivery_id: Uuid) -> DatabaseResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(delivery) = inner.deliveries.get_mut(&delivery_id) {
            delivery.status = DeliveryStatus::Failed.to_string();
        }
        Ok(())
    }

    async fn record_event(
        &self,
        delivery_id: Uuid,
        event_type: EventType,
        url: Option<String>,
    ) -> DatabaseResult<()> {
        if self.fail_event_writes {
            return Err(DatabaseError::new(DatabaseErrorKind::Query(
                "event writes disabled".to_string(),
            )));
        }
        self.inner.write().await.events.push(StoredEvent {
            delivery_id,
            event_type,
            url,
        });
        Ok(())
    }

    async fn delivery_summary(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> DatabaseResult<DeliverySummary> {
        let inner = self.inner.read().await;
        let sent_ids: Vec<Uuid> = inner
            .deliveries
            .values()
            .filter(|d| {
                d.user_id == user_id
                    && d.status == DeliveryStatus::Sent.to_string()
                    && d.sent_at.is_some_and(|at| at >= since)
            })
            .map(|d| d.id)
            .collect();

        let mut summary = DeliverySummary {
            sends: sent_ids.len() as i64,
            ..Default::default()
        };
        for event in &inner.events {
            if sent_ids.contains(&event.delivery_id) {
                match event.event_type {
                    EventType::Open => summary.opens += 1,
                    EventType::Click => summary.clicks += 1,
                }
            }
        }
        Ok(summary)
    }

    async fn add_waitlist_email(&self, email: &str) -> DatabaseResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.waitlist.iter().any(|existing| existing == email) {
            inner.waitlist.push(email.to_string());
        }
        Ok(())
    }
}
