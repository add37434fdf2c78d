//! The delivery dispatcher.
//!
//! Turns a send request into a delivery row plus a transport call. The
//! delivery row is created first so its id can key the tracking rewrite; a
//! failed transport call rolls the provisional row back. Scheduled requests
//! record a deferred delivery instead and never touch the transport.

use crate::error::ApiError;
use chrono::{DateTime, Utc};
use promptly_core::{DeliveryDisposition, DispatchMode, DraftStatus};
use promptly_database::{DeliveryRow, DraftRow, NewDeliveryRow, Store};
use promptly_quota::start_of_day;
use promptly_tracking::TrackingRewriter;
use promptly_transport::{MailTransport, OutboundMessage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// A send request as it arrives on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    /// Draft to send
    pub email_id: Uuid,
    /// Test by default; live sends are plan-gated
    #[serde(default = "default_mode")]
    pub mode: DispatchMode,
    /// Single recipient for test sends
    #[serde(default)]
    pub test_recipient: Option<String>,
    /// Recipient list for live sends
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Replaces the draft subject when present and non-empty
    #[serde(default)]
    pub subject_override: Option<String>,
    /// RFC 3339 timestamp; a parseable future value defers the send
    #[serde(default)]
    pub schedule_at: Option<String>,
    /// Accepted for wire compatibility; link tagging is not applied
    #[serde(default)]
    pub utm: bool,
}

fn default_mode() -> DispatchMode {
    DispatchMode::Test
}

/// What the dispatcher reports back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    /// Always `true`; failures surface as error responses instead
    pub ok: bool,
    /// Id of the created delivery row
    pub delivery_id: Uuid,
    /// How the request was resolved
    pub status: DeliveryDisposition,
    /// Provider message id for immediate sends, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
}

/// The send pipeline shared by the `/api/send` handler and the scheduler.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn Store>,
    transport: Arc<dyn MailTransport>,
    rewriter: TrackingRewriter,
}

impl Dispatcher {
    /// Creates a dispatcher over the given store and transport.
    pub fn new(
        store: Arc<dyn Store>,
        transport: Arc<dyn MailTransport>,
        rewriter: TrackingRewriter,
    ) -> Self {
        Self {
            store,
            transport,
            rewriter,
        }
    }

    /// Resolve a send request for an authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown or unowned draft, `Validation` for
    /// unusable recipients, `UpgradeRequired` for a live send on the free
    /// plan, and `Transport` when the provider refuses an immediate send.
    #[instrument(skip(self, request), fields(user_id = %user_id, email_id = %request.email_id))]
    pub async fn dispatch(
        &self,
        user_id: &str,
        request: &DispatchRequest,
    ) -> Result<DispatchOutcome, ApiError> {
        let now = Utc::now();
        let draft = self
            .store
            .find_draft(request.email_id, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Email not found".to_string()))?;

        let subject = resolve_subject(&draft, request.subject_override.as_deref());
        let schedule_at = parse_schedule_at(request.schedule_at.as_deref(), now);

        match request.mode {
            DispatchMode::Test => {
                self.dispatch_test(user_id, &draft, subject, schedule_at, request, now)
                    .await
            }
            DispatchMode::Live => {
                self.dispatch_live(user_id, &draft, subject, schedule_at, request, now)
                    .await
            }
        }
    }

    async fn dispatch_test(
        &self,
        user_id: &str,
        draft: &DraftRow,
        subject: String,
        schedule_at: Option<DateTime<Utc>>,
        request: &DispatchRequest,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, ApiError> {
        let recipient = request
            .test_recipient
            .as_deref()
            .map(str::trim)
            .filter(|recipient| recipient.contains('@'))
            .ok_or_else(|| ApiError::Validation("Valid test recipient required".to_string()))?
            .to_string();

        if let Some(at) = schedule_at {
            let delivery = self
                .store
                .create_delivery(NewDeliveryRow::scheduled(
                    draft.id,
                    user_id,
                    vec![recipient],
                    true,
                    at,
                ))
                .await?;
            info!(delivery_id = %delivery.id, scheduled_at = %at, "Scheduled test send");
            return Ok(DispatchOutcome {
                ok: true,
                delivery_id: delivery.id,
                status: DeliveryDisposition::ScheduledTest,
                provider_message_id: None,
            });
        }

        let delivery = self
            .store
            .create_delivery(NewDeliveryRow::sent(draft.id, user_id, 1, true, now))
            .await?;
        let message_id = self
            .send_instrumented(&delivery.id, vec![recipient], format!("[TEST] {subject}"), &draft.body)
            .await?;
        Ok(DispatchOutcome {
            ok: true,
            delivery_id: delivery.id,
            status: DeliveryDisposition::SentTest,
            provider_message_id: message_id,
        })
    }

    /// Recipients are validated before the schedule branch: a scheduled
    /// delivery persists its recipient list for the poller, so a list that
    /// would be unexecutable at the due time is rejected up front.
    async fn dispatch_live(
        &self,
        user_id: &str,
        draft: &DraftRow,
        subject: String,
        schedule_at: Option<DateTime<Utc>>,
        request: &DispatchRequest,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, ApiError> {
        let profile = self.store.ensure_profile(user_id, start_of_day(now)).await?;
        if !profile.plan().is_pro() {
            return Err(ApiError::UpgradeRequired);
        }

        let recipients: Vec<String> = request
            .recipients
            .iter()
            .map(|recipient| recipient.trim())
            .filter(|recipient| recipient.contains('@'))
            .map(str::to_string)
            .collect();
        if recipients.is_empty() {
            return Err(ApiError::Validation(
                "At least one valid recipient required".to_string(),
            ));
        }

        if let Some(at) = schedule_at {
            let delivery = self
                .store
                .create_delivery(NewDeliveryRow::scheduled(
                    draft.id,
                    user_id,
                    recipients,
                    false,
                    at,
                ))
                .await?;
            self.store
                .update_draft(draft.id, user_id, &draft.subject, &draft.body, DraftStatus::Scheduled)
                .await?;
            info!(delivery_id = %delivery.id, scheduled_at = %at, "Scheduled live send");
            return Ok(DispatchOutcome {
                ok: true,
                delivery_id: delivery.id,
                status: DeliveryDisposition::Scheduled,
                provider_message_id: None,
            });
        }

        let delivery = self
            .store
            .create_delivery(NewDeliveryRow::sent(
                draft.id,
                user_id,
                recipients.len() as i32,
                false,
                now,
            ))
            .await?;
        let message_id = self
            .send_instrumented(&delivery.id, recipients, subject, &draft.body)
            .await?;
        self.store.mark_draft_sent(draft.id).await?;
        Ok(DispatchOutcome {
            ok: true,
            delivery_id: delivery.id,
            status: DeliveryDisposition::Sent,
            provider_message_id: message_id,
        })
    }

    /// Instrument the HTML for a delivery and hand it to the transport,
    /// rolling back the provisional row on failure.
    async fn send_instrumented(
        &self,
        delivery_id: &Uuid,
        recipients: Vec<String>,
        subject: String,
        body: &str,
    ) -> Result<Option<String>, ApiError> {
        let html = self
            .rewriter
            .instrument_html(&render_draft_html(body), &delivery_id.to_string());
        let message = OutboundMessage::builder()
            .to(recipients)
            .subject(subject)
            .html(html)
            .build()
            .expect("valid OutboundMessage");

        match self.transport.send(&message).await {
            Ok(receipt) => {
                let message_id = receipt.message_id().clone();
                self.store
                    .set_provider_message_id(*delivery_id, message_id.clone())
                    .await?;
                Ok(message_id)
            }
            Err(error) => {
                if let Err(cleanup) = self.store.delete_delivery(*delivery_id).await {
                    warn!(%delivery_id, error = %cleanup, "Failed to roll back delivery");
                }
                Err(ApiError::from(error))
            }
        }
    }

    /// Execute a delivery the scheduler has already claimed.
    ///
    /// The draft is re-read at execution time, so edits made between
    /// scheduling and the due time are reflected in the sent message. The
    /// persisted test flag keeps test-mode semantics at execution: the
    /// `[TEST]` subject prefix, and the parent draft left untouched. A
    /// failure here marks the delivery `failed` rather than deleting it; the
    /// claim already flipped its status, so the row documents the attempt.
    #[instrument(skip(self, delivery), fields(delivery_id = %delivery.id))]
    pub async fn execute_claimed(&self, delivery: &DeliveryRow) -> Result<(), ApiError> {
        let outcome = self.try_execute_claimed(delivery).await;
        if outcome.is_err() {
            if let Err(error) = self.store.mark_delivery_failed(delivery.id).await {
                warn!(delivery_id = %delivery.id, error = %error, "Failed to mark delivery failed");
            }
        }
        outcome
    }

    async fn try_execute_claimed(&self, delivery: &DeliveryRow) -> Result<(), ApiError> {
        let recipients = delivery.recipients.clone().unwrap_or_default();
        if recipients.is_empty() {
            return Err(ApiError::Validation(
                "Scheduled delivery has no recipients".to_string(),
            ));
        }
        let draft = self
            .store
            .find_draft(delivery.draft_id, &delivery.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Draft no longer exists".to_string()))?;

        let subject = if delivery.is_test {
            format!("[TEST] {}", resolve_subject(&draft, None))
        } else {
            resolve_subject(&draft, None)
        };
        let html = self
            .rewriter
            .instrument_html(&render_draft_html(&draft.body), &delivery.id.to_string());
        let message = OutboundMessage::builder()
            .to(recipients)
            .subject(subject)
            .html(html)
            .build()
            .expect("valid OutboundMessage");

        let receipt = self.transport.send(&message).await?;
        self.store
            .set_provider_message_id(delivery.id, receipt.message_id().clone())
            .await?;
        if !delivery.is_test {
            self.store.mark_draft_sent(draft.id).await?;
        }
        info!(delivery_id = %delivery.id, is_test = delivery.is_test, "Executed scheduled delivery");
        Ok(())
    }
}

/// Wrap the plain-text draft body in the outbound HTML shell.
pub fn render_draft_html(body: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; line-height: 1.5">{}</div>"#,
        body.replace('\n', "<br/>")
    )
}

/// The subject actually sent: a non-empty override wins, then the draft
/// subject, then a placeholder.
fn resolve_subject(draft: &DraftRow, subject_override: Option<&str>) -> String {
    let subject = subject_override
        .map(str::trim)
        .filter(|subject| !subject.is_empty())
        .unwrap_or_else(|| draft.subject.trim());
    if subject.is_empty() {
        "(no subject)".to_string()
    } else {
        subject.to_string()
    }
}

/// A schedule request only defers the send when it parses and lies strictly
/// in the future; anything else falls through to an immediate send.
fn parse_schedule_at(raw: Option<&str>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value.trim()).ok())
        .map(|at| at.with_timezone(&Utc))
        .filter(|at| *at > now)
}

#[cfg(test)]
mod tests {
    use super::parse_schedule_at;
    use chrono::{Duration, Utc};

    #[test]
    fn test_schedule_at_requires_future_timestamp() {
        let now = Utc::now();
        let future = (now + Duration::hours(1)).to_rfc3339();
        let past = (now - Duration::hours(1)).to_rfc3339();

        assert!(parse_schedule_at(Some(&future), now).is_some());
        assert!(parse_schedule_at(Some(&past), now).is_none());
        assert!(parse_schedule_at(Some("not-a-date"), now).is_none());
        assert!(parse_schedule_at(None, now).is_none());
    }
}
