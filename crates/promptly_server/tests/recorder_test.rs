//! Tests for the best-effort event recorder.

use promptly_core::EventType;
use promptly_database::InMemoryStore;
use promptly_server::EventRecorder;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn test_records_open_and_click_events() {
    let store = InMemoryStore::new();
    let recorder = EventRecorder::new(Arc::new(store.clone()));
    let delivery_id = Uuid::new_v4();

    recorder.record(delivery_id, EventType::Open, None).await;
    recorder
        .record(
            delivery_id,
            EventType::Click,
            Some("https://example.com/x".to_string()),
        )
        .await;

    let events = store.events().await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], (delivery_id, EventType::Open, None));
    assert_eq!(
        events[1],
        (
            delivery_id,
            EventType::Click,
            Some("https://example.com/x".to_string())
        )
    );
}

#[tokio::test]
async fn test_write_failures_are_swallowed() {
    let store = InMemoryStore::with_failing_event_writes();
    let recorder = EventRecorder::new(Arc::new(store.clone()));

    // Must not panic or propagate; the caller is serving a pixel.
    recorder.record(Uuid::new_v4(), EventType::Open, None).await;
    assert!(store.events().await.is_empty());
}
