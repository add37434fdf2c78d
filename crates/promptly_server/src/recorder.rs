//! Best-effort tracking event recorder.
//!
//! Open and click events are observability data: a failed write must never
//! break serving the pixel or following the redirect. Writes run on spawned
//! tasks and failures are logged and dropped.

use promptly_core::EventType;
use promptly_database::Store;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Fire-and-forget writer for tracking events.
#[derive(Clone)]
pub struct EventRecorder {
    store: Arc<dyn Store>,
}

impl EventRecorder {
    /// Creates a recorder over the given store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record an event, swallowing any write failure.
    pub async fn record(&self, delivery_id: Uuid, event_type: EventType, url: Option<String>) {
        if let Err(error) = self.store.record_event(delivery_id, event_type, url).await {
            warn!(
                %delivery_id,
                event_type = %event_type,
                error = %error,
                "Failed to record tracking event"
            );
        }
    }

    /// Record an OPEN event on a spawned task.
    pub fn record_open(&self, delivery_id: Uuid) {
        let recorder = self.clone();
        tokio::spawn(async move {
            recorder.record(delivery_id, EventType::Open, None).await;
        });
    }

    /// Record a CLICK event with its target URL on a spawned task.
    pub fn record_click(&self, delivery_id: Uuid, url: String) {
        let recorder = self.clone();
        tokio::spawn(async move {
            recorder.record(delivery_id, EventType::Click, Some(url)).await;
        });
    }
}
