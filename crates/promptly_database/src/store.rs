//! The storage seam used by the HTTP layer and the scheduler.

use crate::campaign_models::{DeliveryRow, DeliverySummary, DraftRow, NewDeliveryRow, NewEventRow};
use crate::connection::PgPool;
use crate::profile_models::ProfileRow;
use crate::{DatabaseResult, queries};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::PgConnection;
use promptly_core::{DraftStatus, EventType, Plan};
use promptly_error::{DatabaseError, DatabaseErrorKind};
use uuid::Uuid;

/// Persistence operations for the Promptly pipeline.
///
/// All state lives behind this trait: the production implementation is
/// [`PgStore`], and [`crate::InMemoryStore`] backs dispatcher and route tests
/// without a database.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch a profile, creating a fresh free-plan row when absent.
    async fn ensure_profile(&self, user_id: &str, window_start: DateTime<Utc>)
    -> DatabaseResult<ProfileRow>;

    /// Fetch a profile if it exists.
    async fn find_profile(&self, user_id: &str) -> DatabaseResult<Option<ProfileRow>>;

    /// Zero the generation counter and move the window start.
    async fn reset_generation_window(
        &self,
        user_id: &str,
        window_start: DateTime<Utc>,
    ) -> DatabaseResult<ProfileRow>;

    /// Record one accepted generation.
    async fn increment_generation_count(&self, user_id: &str) -> DatabaseResult<ProfileRow>;

    /// Apply a plan change from the billing webhook.
    async fn set_plan(&self, user_id: &str, plan: Plan) -> DatabaseResult<ProfileRow>;

    /// Create a new draft.
    async fn create_draft(&self, user_id: &str, subject: &str, body: &str)
    -> DatabaseResult<DraftRow>;

    /// Update an owned draft; `NotFound` when absent or not owned.
    async fn update_draft(
        &self,
        draft_id: Uuid,
        user_id: &str,
        subject: &str,
        body: &str,
        status: DraftStatus,
    ) -> DatabaseResult<DraftRow>;

    /// Fetch an owned draft.
    async fn find_draft(&self, draft_id: Uuid, user_id: &str) -> DatabaseResult<Option<DraftRow>>;

    /// List drafts owned by a user, newest first.
    async fn list_drafts(&self, user_id: &str) -> DatabaseResult<Vec<DraftRow>>;

    /// Mark a draft as sent.
    async fn mark_draft_sent(&self, draft_id: Uuid) -> DatabaseResult<()>;

    /// Insert a delivery row.
    async fn create_delivery(&self, row: NewDeliveryRow) -> DatabaseResult<DeliveryRow>;

    /// Remove a provisional delivery after a failed transport call.
    async fn delete_delivery(&self, delivery_id: Uuid) -> DatabaseResult<()>;

    /// Persist the provider's message identifier.
    async fn set_provider_message_id(
        &self,
        delivery_id: Uuid,
        message_id: Option<String>,
    ) -> DatabaseResult<()>;

    /// Atomically claim scheduled deliveries that are due.
    async fn claim_due_deliveries(&self, now: DateTime<Utc>) -> DatabaseResult<Vec<DeliveryRow>>;

    /// Mark a claimed delivery as failed.
    async fn mark_delivery_failed(&self, delivery_id: Uuid) -> DatabaseResult<()>;

    /// Append a tracking event. This is the erroring write; best-effort
    /// semantics live in the recorder, not here.
    async fn record_event(
        &self,
        delivery_id: Uuid,
        event_type: EventType,
        url: Option<String>,
    ) -> DatabaseResult<()>;

    /// Aggregate sends, opens, and clicks for a user since a point in time.
    async fn delivery_summary(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> DatabaseResult<DeliverySummary>;

    /// Record a waitlist signup, ignoring duplicates.
    async fn add_waitlist_email(&self, email: &str) -> DatabaseResult<()>;
}

/// Pool-backed [`Store`] implementation.
///
/// Diesel is synchronous, so every call checks a connection out of the r2d2
/// pool inside a blocking task.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run<T, F>(&self, f: F) -> DatabaseResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(DatabaseError::from)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::TaskJoin(e.to_string())))?
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ensure_profile(
        &self,
        user_id: &str,
        window_start: DateTime<Utc>,
    ) -> DatabaseResult<ProfileRow> {
        let user_id = user_id.to_string();
        self.run(move |conn| queries::ensure_profile(conn, &user_id, window_start))
            .await
    }

    async fn find_profile(&self, user_id: &str) -> DatabaseResult<Option<ProfileRow>> {
        let user_id = user_id.to_string();
        self.run(move |conn| queries::find_profile(conn, &user_id)).await
    }

    async fn reset_generation_window(
        &self,
        user_id: &str,
        window_start: DateTime<Utc>,
    ) -> DatabaseResult<ProfileRow> {
        let user_id = user_id.to_string();
        self.run(move |conn| queries::reset_generation_window(conn, &user_id, window_start))
            .await
    }

    async fn increment_generation_count(&self, user_id: &str) -> DatabaseResult<ProfileRow> {
        let user_id = user_id.to_string();
        self.run(move |conn| queries::increment_generation_count(conn, &user_id))
            .await
    }

    async fn set_plan(&self, user_id: &str, plan: Plan) -> DatabaseResult<ProfileRow> {
        let user_id = user_id.to_string();
        self.run(move |conn| queries::set_plan(conn, &user_id, plan)).await
    }

    async fn create_draft(
        &self,
        user_id: &str,
        subject: &str,
        body: &str,
    ) -> DatabaseResult<DraftRow> {
        let (user_id, subject, body) =
            (user_id.to_string(), subject.to_string(), body.to_string());
        self.run(move |conn| queries::create_draft(conn, &user_id, &subject, &body))
            .await
    }

    async fn update_draft(
        &self,
        draft_id: Uuid,
        user_id: &str,
        subject: &str,
        body: &str,
        status: DraftStatus,
    ) -> DatabaseResult<DraftRow> {
        let (user_id, subject, body) =
            (user_id.to_string(), subject.to_string(), body.to_string());
        self.run(move |conn| {
            queries::update_draft(conn, draft_id, &user_id, &subject, &body, status)
        })
        .await
    }

    async fn find_draft(&self, draft_id: Uuid, user_id: &str) -> DatabaseResult<Option<DraftRow>> {
        let user_id = user_id.to_string();
        self.run(move |conn| queries::find_draft(conn, draft_id, &user_id))
            .await
    }

    async fn list_drafts(&self, user_id: &str) -> DatabaseResult<Vec<DraftRow>> {
        let user_id = user_id.to_string();
        self.run(move |conn| queries::list_drafts(conn, &user_id)).await
    }

    async fn mark_draft_sent(&self, draft_id: Uuid) -> DatabaseResult<()> {
        self.run(move |conn| queries::mark_draft_sent(conn, draft_id)).await
    }

    async fn create_delivery(&self, row: NewDeliveryRow) -> DatabaseResult<DeliveryRow> {
        self.run(move |conn| queries::create_delivery(conn, &row)).await
    }

    async fn delete_delivery(&self, delivery_id: Uuid) -> DatabaseResult<()> {
        self.run(move |conn| queries::delete_delivery(conn, delivery_id)).await
    }

    async fn set_provider_message_id(
        &self,
        delivery_id: Uuid,
        message_id: Option<String>,
    ) -> DatabaseResult<()> {
        self.run(move |conn| {
            queries::set_provider_message_id(conn, delivery_id, message_id.as_deref())
        })
        .await
    }

    async fn claim_due_deliveries(&self, now: DateTime<Utc>) -> DatabaseResult<Vec<DeliveryRow>> {
        self.run(move |conn| queries::claim_due_deliveries(conn, now)).await
    }

    async fn mark_delivery_failed(&self, delivery_id: Uuid) -> DatabaseResult<()> {
        self.run(move |conn| queries::mark_delivery_failed(conn, delivery_id))
            .await
    }

    async fn record_event(
        &self,
        delivery_id: Uuid,
        event_type: EventType,
        url: Option<String>,
    ) -> DatabaseResult<()> {
        self.run(move |conn| {
            queries::record_event(conn, &NewEventRow::new(delivery_id, event_type, url))
        })
        .await
    }

    async fn delivery_summary(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> DatabaseResult<DeliverySummary> {
        let user_id = user_id.to_string();
        self.run(move |conn| queries::delivery_summary(conn, &user_id, since))
            .await
    }

    async fn add_waitlist_email(&self, email: &str) -> DatabaseResult<()> {
        let email = email.to_string();
        self.run(move |conn| queries::add_waitlist_email(conn, &email)).await
    }
}
