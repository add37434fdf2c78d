//! Tests for the scheduled-send poller.

mod common;

use chrono::{Duration, Utc};
use common::RecordingTransport;
use promptly_core::{DeliveryStatus, DispatchMode, DraftStatus, Plan};
use promptly_database::{InMemoryStore, NewDeliveryRow, Store};
use promptly_server::{DispatchRequest, Dispatcher, run_once};
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

async fn seed_due_delivery(store: &InMemoryStore) -> (Uuid, Uuid) {
    store.set_plan(USER, Plan::Pro).await.unwrap();
    let draft = store.create_draft(USER, "Launch", "Body").await.unwrap();
    let delivery = store
        .create_delivery(NewDeliveryRow::scheduled(
            draft.id,
            USER,
            vec!["a@example.com".to_string()],
            false,
            Utc::now() - Duration::minutes(1),
        ))
        .await
        .unwrap();
    (draft.id, delivery.id)
}

#[tokio::test]
async fn test_run_once_executes_due_deliveries() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());
    let (draft_id, delivery_id) = seed_due_delivery(&store).await;

    let count = run_once(&dispatcher(&store, transport.clone()), &store)
        .await
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(transport.sent().len(), 1);
    assert_eq!(transport.sent()[0].subject(), "Launch");

    let delivery = store.delivery(delivery_id).await.unwrap();
    assert_eq!(delivery.status(), Some(DeliveryStatus::Sent));
    assert!(delivery.provider_message_id.is_some());

    let draft = store.find_draft(draft_id, USER).await.unwrap().unwrap();
    assert_eq!(draft.status(), DraftStatus::Sent);
}

#[tokio::test]
async fn test_run_once_leaves_future_deliveries_alone() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());
    let draft = store.create_draft(USER, "Launch", "Body").await.unwrap();
    store
        .create_delivery(NewDeliveryRow::scheduled(
            draft.id,
            USER,
            vec!["a@example.com".to_string()],
            false,
            Utc::now() + Duration::hours(1),
        ))
        .await
        .unwrap();

    let count = run_once(&dispatcher(&store, transport.clone()), &store)
        .await
        .unwrap();

    assert_eq!(count, 0);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_failed_execution_marks_delivery_failed() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::failing());
    let (_, delivery_id) = seed_due_delivery(&store).await;

    // The claim succeeds even though execution fails.
    let count = run_once(&dispatcher(&store, transport), &store).await.unwrap();
    assert_eq!(count, 1);

    let delivery = store.delivery(delivery_id).await.unwrap();
    assert_eq!(delivery.status(), Some(DeliveryStatus::Failed));
}

#[tokio::test]
async fn test_scheduled_test_send_keeps_test_semantics() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());
    let draft = store.create_draft(USER, "Launch", "Body").await.unwrap();
    let dispatcher = dispatcher(&store, transport.clone());

    let request = DispatchRequest {
        email_id: draft.id,
        mode: DispatchMode::Test,
        test_recipient: Some("tester@example.com".to_string()),
        recipients: Vec::new(),
        subject_override: None,
        // Just far enough ahead to take the deferred path.
        schedule_at: Some((Utc::now() + Duration::milliseconds(50)).to_rfc3339()),
        utm: false,
    };
    dispatcher.dispatch(USER, &request).await.unwrap();
    assert!(transport.sent().is_empty());

    tokio::time::sleep(std::time::Duration::from_millis(60)).await;
    assert_eq!(run_once(&dispatcher, &store).await.unwrap(), 1);

    // The subject prefix survives deferral and the draft is not flipped.
    assert_eq!(transport.sent()[0].subject(), "[TEST] Launch");
    let draft = store.find_draft(draft.id, USER).await.unwrap().unwrap();
    assert_eq!(draft.status(), DraftStatus::Draft);
}

#[tokio::test]
async fn test_claimed_deliveries_are_not_executed_twice() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::new());
    seed_due_delivery(&store).await;
    let dispatcher = dispatcher(&store, transport.clone());

    assert_eq!(run_once(&dispatcher, &store).await.unwrap(), 1);
    assert_eq!(run_once(&dispatcher, &store).await.unwrap(), 0);
    assert_eq!(transport.sent().len(), 1);
}
