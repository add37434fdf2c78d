//! Query functions over the Promptly schema.
//!
//! All functions are synchronous diesel calls; the async [`crate::PgStore`]
//! wraps them in blocking tasks.

use crate::campaign_models::{
    DeliveryRow, DeliverySummary, DraftRow, NewDeliveryRow, NewDraftRow, NewEventRow,
    NewWaitlistRow,
};
use crate::profile_models::{NewProfileRow, ProfileRow};
use crate::{DatabaseResult, schema};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use promptly_core::{DeliveryStatus, DraftStatus, EventType, Plan};
use tracing::instrument;
use uuid::Uuid;

/// Fetch a profile by user id, creating a fresh free-plan row when absent.
#[instrument(skip(conn))]
pub fn ensure_profile(
    conn: &mut PgConnection,
    user_id: &str,
    window_start: DateTime<Utc>,
) -> DatabaseResult<ProfileRow> {
    use schema::profiles::dsl;

    diesel::insert_into(dsl::profiles)
        .values(NewProfileRow::free(user_id, window_start))
        .on_conflict(dsl::user_id)
        .do_nothing()
        .execute(conn)?;

    Ok(dsl::profiles
        .filter(dsl::user_id.eq(user_id))
        .select(ProfileRow::as_select())
        .first(conn)?)
}

/// Fetch a profile by user id.
#[instrument(skip(conn))]
pub fn find_profile(conn: &mut PgConnection, user_id: &str) -> DatabaseResult<Option<ProfileRow>> {
    use schema::profiles::dsl;

    Ok(dsl::profiles
        .filter(dsl::user_id.eq(user_id))
        .select(ProfileRow::as_select())
        .first(conn)
        .optional()?)
}

/// Zero the generation counter and move the window start (the physical side
/// of the lazy quota reset).
#[instrument(skip(conn))]
pub fn reset_generation_window(
    conn: &mut PgConnection,
    user_id: &str,
    window_start: DateTime<Utc>,
) -> DatabaseResult<ProfileRow> {
    use schema::profiles::dsl;

    Ok(diesel::update(dsl::profiles.filter(dsl::user_id.eq(user_id)))
        .set((
            dsl::generation_count.eq(0),
            dsl::generation_period_start.eq(Some(window_start)),
            dsl::updated_at.eq(Utc::now()),
        ))
        .get_result(conn)?)
}

/// Record one accepted generation.
#[instrument(skip(conn))]
pub fn increment_generation_count(
    conn: &mut PgConnection,
    user_id: &str,
) -> DatabaseResult<ProfileRow> {
    use schema::profiles::dsl;

    Ok(diesel::update(dsl::profiles.filter(dsl::user_id.eq(user_id)))
        .set((
            dsl::generation_count.eq(dsl::generation_count + 1),
            dsl::updated_at.eq(Utc::now()),
        ))
        .get_result(conn)?)
}

/// Apply a plan change, creating the profile when the webhook races first
/// access.
#[instrument(skip(conn))]
pub fn set_plan(conn: &mut PgConnection, user_id: &str, plan: Plan) -> DatabaseResult<ProfileRow> {
    use schema::profiles::dsl;

    Ok(diesel::insert_into(dsl::profiles)
        .values((
            dsl::user_id.eq(user_id),
            dsl::plan.eq(plan.to_string()),
            dsl::generation_count.eq(0),
        ))
        .on_conflict(dsl::user_id)
        .do_update()
        .set((dsl::plan.eq(plan.to_string()), dsl::updated_at.eq(Utc::now())))
        .get_result(conn)?)
}

/// Create a new draft.
#[instrument(skip(conn, subject, body))]
pub fn create_draft(
    conn: &mut PgConnection,
    user_id: &str,
    subject: &str,
    body: &str,
) -> DatabaseResult<DraftRow> {
    use schema::drafts::dsl;

    Ok(diesel::insert_into(dsl::drafts)
        .values(NewDraftRow::new(user_id, subject, body))
        .get_result(conn)?)
}

/// Update an owned draft in place.
#[instrument(skip(conn, subject, body))]
pub fn update_draft(
    conn: &mut PgConnection,
    draft_id: Uuid,
    user_id: &str,
    subject: &str,
    body: &str,
    status: DraftStatus,
) -> DatabaseResult<DraftRow> {
    use schema::drafts::dsl;

    Ok(diesel::update(
        dsl::drafts
            .filter(dsl::id.eq(draft_id))
            .filter(dsl::user_id.eq(user_id)),
    )
    .set((
        dsl::subject.eq(subject),
        dsl::body.eq(body),
        dsl::status.eq(status.to_string()),
        dsl::updated_at.eq(Utc::now()),
    ))
    .get_result(conn)?)
}

/// Fetch an owned draft.
#[instrument(skip(conn))]
pub fn find_draft(
    conn: &mut PgConnection,
    draft_id: Uuid,
    user_id: &str,
) -> DatabaseResult<Option<DraftRow>> {
    use schema::drafts::dsl;

    Ok(dsl::drafts
        .filter(dsl::id.eq(draft_id))
        .filter(dsl::user_id.eq(user_id))
        .select(DraftRow::as_select())
        .first(conn)
        .optional()?)
}

/// List drafts owned by a user, newest first.
#[instrument(skip(conn))]
pub fn list_drafts(conn: &mut PgConnection, user_id: &str) -> DatabaseResult<Vec<DraftRow>> {
    use schema::drafts::dsl;

    Ok(dsl::drafts
        .filter(dsl::user_id.eq(user_id))
        .order(dsl::updated_at.desc())
        .select(DraftRow::as_select())
        .load(conn)?)
}

/// Mark a draft as sent after a successful live delivery.
#[instrument(skip(conn))]
pub fn mark_draft_sent(conn: &mut PgConnection, draft_id: Uuid) -> DatabaseResult<()> {
    use schema::drafts::dsl;

    diesel::update(dsl::drafts.filter(dsl::id.eq(draft_id)))
        .set((
            dsl::status.eq(DraftStatus::Sent.to_string()),
            dsl::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;
    Ok(())
}

/// Insert a delivery row.
#[instrument(skip(conn, row), fields(delivery_id = %row.id))]
pub fn create_delivery(conn: &mut PgConnection, row: &NewDeliveryRow) -> DatabaseResult<DeliveryRow> {
    use schema::deliveries::dsl;

    Ok(diesel::insert_into(dsl::deliveries)
        .values(row)
        .get_result(conn)?)
}

/// Remove a provisional delivery after a failed transport call.
#[instrument(skip(conn))]
pub fn delete_delivery(conn: &mut PgConnection, delivery_id: Uuid) -> DatabaseResult<()> {
    use schema::deliveries::dsl;

    diesel::delete(dsl::deliveries.filter(dsl::id.eq(delivery_id))).execute(conn)?;
    Ok(())
}

/// Persist the provider's message identifier on a delivery.
#[instrument(skip(conn))]
pub fn set_provider_message_id(
    conn: &mut PgConnection,
    delivery_id: Uuid,
    message_id: Option<&str>,
) -> DatabaseResult<()> {
    use schema::deliveries::dsl;

    diesel::update(dsl::deliveries.filter(dsl::id.eq(delivery_id)))
        .set(dsl::provider_message_id.eq(message_id))
        .execute(conn)?;
    Ok(())
}

/// Atomically claim scheduled deliveries that are due.
///
/// Claimed rows flip to `sent` with a provisional sent timestamp, so a
/// delivery is handed to the transport at most once even with concurrent
/// scheduler ticks against the same database.
#[instrument(skip(conn))]
pub fn claim_due_deliveries(
    conn: &mut PgConnection,
    now: DateTime<Utc>,
) -> DatabaseResult<Vec<DeliveryRow>> {
    use schema::deliveries::dsl;

    Ok(diesel::update(
        dsl::deliveries
            .filter(dsl::status.eq(DeliveryStatus::Scheduled.to_string()))
            .filter(dsl::scheduled_at.le(now)),
    )
    .set((
        dsl::status.eq(DeliveryStatus::Sent.to_string()),
        dsl::sent_at.eq(Some(now)),
    ))
    .get_results(conn)?)
}

/// Mark a claimed delivery as failed after its transport call errored.
#[instrument(skip(conn))]
pub fn mark_delivery_failed(conn: &mut PgConnection, delivery_id: Uuid) -> DatabaseResult<()> {
    use schema::deliveries::dsl;

    diesel::update(dsl::deliveries.filter(dsl::id.eq(delivery_id)))
        .set(dsl::status.eq(DeliveryStatus::Failed.to_string()))
        .execute(conn)?;
    Ok(())
}

/// Append a tracking event.
#[instrument(skip(conn, row), fields(delivery_id = %row.delivery_id, event_type = %row.event_type))]
pub fn record_event(conn: &mut PgConnection, row: &NewEventRow) -> DatabaseResult<()> {
    use schema::events::dsl;

    diesel::insert_into(dsl::events).values(row).execute(conn)?;
    Ok(())
}

fn count_events(
    conn: &mut PgConnection,
    user_id: &str,
    since: DateTime<Utc>,
    event_type: EventType,
) -> DatabaseResult<i64> {
    use schema::{deliveries, events};

    Ok(events::table
        .inner_join(deliveries::table)
        .filter(deliveries::user_id.eq(user_id))
        .filter(deliveries::status.eq(DeliveryStatus::Sent.to_string()))
        .filter(deliveries::sent_at.ge(since))
        .filter(events::event_type.eq(event_type.to_string()))
        .count()
        .get_result(conn)?)
}

/// Aggregate sends, opens, and clicks for a user since a point in time.
#[instrument(skip(conn))]
pub fn delivery_summary(
    conn: &mut PgConnection,
    user_id: &str,
    since: DateTime<Utc>,
) -> DatabaseResult<DeliverySummary> {
    use schema::deliveries::dsl;

    let sends: i64 = dsl::deliveries
        .filter(dsl::user_id.eq(user_id))
        .filter(dsl::status.eq(DeliveryStatus::Sent.to_string()))
        .filter(dsl::sent_at.ge(since))
        .count()
        .get_result(conn)?;

    let opens = count_events(conn, user_id, since, EventType::Open)?;
    let clicks = count_events(conn, user_id, since, EventType::Click)?;

    Ok(DeliverySummary {
        sends,
        opens,
        clicks,
    })
}

/// Record a waitlist signup, ignoring duplicates.
#[instrument(skip(conn))]
pub fn add_waitlist_email(conn: &mut PgConnection, email: &str) -> DatabaseResult<()> {
    use schema::waitlist::dsl;

    diesel::insert_into(dsl::waitlist)
        .values(NewWaitlistRow {
            email: email.to_string(),
        })
        .on_conflict(dsl::email)
        .do_nothing()
        .execute(conn)?;
    Ok(())
}
