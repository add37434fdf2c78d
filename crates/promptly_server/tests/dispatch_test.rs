//! Tests for the delivery dispatcher.

mod common;

use chrono::{Duration, Utc};
use common::RecordingTransport;
use promptly_core::{DeliveryDisposition, DeliveryStatus, DispatchMode, DraftStatus, Plan};
use promptly_database::{DraftRow, InMemoryStore, Store};
use promptly_server::{ApiError, DispatchRequest, Dispatcher};
use promptly_tracking::TrackingRewriter;
use std::sync::Arc;
use uuid::Uuid;

const USER: &str = "user_1";

fn dispatcher(store: &InMemoryStore, transport: Arc<RecordingTransport>) -> Dispatcher {
    Dispatcher::new(
        Arc::new(store.clone()),
        transport,
        TrackingRewriter::new("https://promptly.test"),
    )
}

async fn seed_draft(store: &InMemoryStore) -> DraftRow {
    store
        .create_draft(
            USER,
            "Spring launch",
            "Hello!\nCheck <a href=\"https://example.com/x\">this</a> out.",
        )
        .await
        .unwrap()
}

fn test_request(email_id: Uuid) -> DispatchRequest {
    DispatchRequest {
        email_id,
        mode: DispatchMode::Test,
        test_recipient: Some("tester@example.com".to_string()),
        recipients: Vec::new(),
        subject_override: None,
        schedule_at: None,
        utm: false,
    }
}

fn live_request(email_id: Uuid) -> DispatchRequest {
    DispatchRequest {
        mode: DispatchMode::Live,
        test_recipient: None,
        recipients: vec!["a@example.com".to_string(), "b@example.com".to_string()],
        ..test_request(email_id)
    }
}

#[tokio::test]
async fn test_live_send_requires_pro_plan() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());
    let draft = seed_draft(&store).await;

    let result = dispatcher(&store, transport.clone())
        .dispatch(USER, &live_request(draft.id))
        .await;

    assert!(matches!(result, Err(ApiError::UpgradeRequired)));
    assert_eq!(store.delivery_count().await, 0);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_live_send_instruments_and_records() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());
    store.set_plan(USER, Plan::Pro).await.unwrap();
    let draft = seed_draft(&store).await;

    let outcome = dispatcher(&store, transport.clone())
        .dispatch(USER, &live_request(draft.id))
        .await
        .unwrap();

    assert_eq!(outcome.status, DeliveryDisposition::Sent);
    assert_eq!(
        outcome.provider_message_id.as_deref(),
        Some("<queued@mail.test>")
    );

    let delivery = store.delivery(outcome.delivery_id).await.unwrap();
    assert_eq!(delivery.status(), Some(DeliveryStatus::Sent));
    assert_eq!(delivery.recipient_count, 2);
    assert_eq!(
        delivery.provider_message_id.as_deref(),
        Some("<queued@mail.test>")
    );

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject(), "Spring launch");
    // Links are rewritten and the open pixel injected, keyed by the delivery.
    let id = outcome.delivery_id.to_string();
    assert!(sent[0].html().contains(&format!("https://promptly.test/o/{id}.gif")));
    assert!(sent[0].html().contains("https://promptly.test/r?d="));
    assert!(!sent[0].html().contains("href=\"https://example.com/x\""));

    let draft = store.find_draft(draft.id, USER).await.unwrap().unwrap();
    assert_eq!(draft.status(), DraftStatus::Sent);
}

#[tokio::test]
async fn test_outcome_payload_carries_ok_flag() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());
    store.set_plan(USER, Plan::Pro).await.unwrap();
    let draft = seed_draft(&store).await;

    let outcome = dispatcher(&store, transport)
        .dispatch(USER, &live_request(draft.id))
        .await
        .unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["ok"], serde_json::json!(true));
    assert_eq!(json["deliveryId"], serde_json::json!(outcome.delivery_id));
    assert_eq!(json["status"], serde_json::json!("sent"));
}

#[tokio::test]
async fn test_test_send_skips_plan_gate_and_prefixes_subject() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());
    let draft = seed_draft(&store).await;

    let outcome = dispatcher(&store, transport.clone())
        .dispatch(USER, &test_request(draft.id))
        .await
        .unwrap();

    assert_eq!(outcome.status, DeliveryDisposition::SentTest);
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject(), "[TEST] Spring launch");
    assert_eq!(sent[0].to(), &vec!["tester@example.com".to_string()]);

    // Test sends never flip the draft's status.
    let draft = store.find_draft(draft.id, USER).await.unwrap().unwrap();
    assert_eq!(draft.status(), DraftStatus::Draft);
}

#[tokio::test]
async fn test_test_send_requires_plausible_recipient() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());
    let draft = seed_draft(&store).await;

    let mut request = test_request(draft.id);
    request.test_recipient = Some("not-an-address".to_string());
    let result = dispatcher(&store, transport.clone())
        .dispatch(USER, &request)
        .await;

    assert!(matches!(result, Err(ApiError::Validation(_))));
    assert_eq!(store.delivery_count().await, 0);
}

#[tokio::test]
async fn test_transport_failure_rolls_back_delivery() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::failing());
    store.set_plan(USER, Plan::Pro).await.unwrap();
    let draft = seed_draft(&store).await;

    let result = dispatcher(&store, transport)
        .dispatch(USER, &live_request(draft.id))
        .await;

    assert!(matches!(result, Err(ApiError::Transport(_))));
    // The provisional row was removed, leaving no trace of the attempt.
    assert_eq!(store.delivery_count().await, 0);
    let draft = store.find_draft(draft.id, USER).await.unwrap().unwrap();
    assert_eq!(draft.status(), DraftStatus::Draft);
}

#[tokio::test]
async fn test_future_schedule_defers_the_send() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());
    store.set_plan(USER, Plan::Pro).await.unwrap();
    let draft = seed_draft(&store).await;

    let mut request = live_request(draft.id);
    request.schedule_at = Some((Utc::now() + Duration::hours(2)).to_rfc3339());
    let outcome = dispatcher(&store, transport.clone())
        .dispatch(USER, &request)
        .await
        .unwrap();

    assert_eq!(outcome.status, DeliveryDisposition::Scheduled);
    assert!(transport.sent().is_empty());

    let delivery = store.delivery(outcome.delivery_id).await.unwrap();
    assert_eq!(delivery.status(), Some(DeliveryStatus::Scheduled));
    assert_eq!(
        delivery.recipients.as_deref().map(<[String]>::len),
        Some(2)
    );

    let draft = store.find_draft(draft.id, USER).await.unwrap().unwrap();
    assert_eq!(draft.status(), DraftStatus::Scheduled);
}

#[tokio::test]
async fn test_past_schedule_sends_immediately() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());
    store.set_plan(USER, Plan::Pro).await.unwrap();
    let draft = seed_draft(&store).await;

    let mut request = live_request(draft.id);
    request.schedule_at = Some((Utc::now() - Duration::hours(2)).to_rfc3339());
    let outcome = dispatcher(&store, transport.clone())
        .dispatch(USER, &request)
        .await
        .unwrap();

    assert_eq!(outcome.status, DeliveryDisposition::Sent);
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn test_subject_override_replaces_draft_subject() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());
    let draft = seed_draft(&store).await;

    let mut request = test_request(draft.id);
    request.subject_override = Some("  Better subject  ".to_string());
    dispatcher(&store, transport.clone())
        .dispatch(USER, &request)
        .await
        .unwrap();

    assert_eq!(transport.sent()[0].subject(), "[TEST] Better subject");
}

#[tokio::test]
async fn test_unknown_draft_is_not_found() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());

    let result = dispatcher(&store, transport)
        .dispatch(USER, &test_request(Uuid::new_v4()))
        .await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_drafts_of_other_users_are_invisible() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());
    let draft = seed_draft(&store).await;

    let result = dispatcher(&store, transport)
        .dispatch("someone_else", &test_request(draft.id))
        .await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
}
