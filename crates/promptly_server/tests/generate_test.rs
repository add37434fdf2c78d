//! Tests for the generation endpoint's quota gate.

use async_trait::async_trait;
use chrono::Utc;
use promptly_core::{Brief, CopySource, GeneratedCopy, Plan};
use promptly_database::{InMemoryStore, Store};
use promptly_error::{GenerateError, GenerateErrorKind};
use promptly_generate::CopyGenerator;
use promptly_quota::{FREE_DAILY_GENERATIONS, start_of_day};
use promptly_server::{ApiError, generate_for_user};
use std::sync::atomic::{AtomicUsize, Ordering};

const USER: &str = "user_1";

/// Generator that counts invocations and answers with fixed copy.
#[derive(Default)]
struct CountingGenerator {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingGenerator {
    fn new() -> Self {
        Self::default()
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CopyGenerator for CountingGenerator {
    async fn generate(&self, _brief: &Brief) -> Result<GeneratedCopy, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GenerateError::new(GenerateErrorKind::EmptyCompletion));
        }
        Ok(GeneratedCopy::new("Subject", "Body", CopySource::Mock))
    }
}

/// Burn through the user's free daily allowance.
async fn exhaust_quota(store: &InMemoryStore) {
    store
        .ensure_profile(USER, start_of_day(Utc::now()))
        .await
        .unwrap();
    for _ in 0..FREE_DAILY_GENERATIONS {
        store.increment_generation_count(USER).await.unwrap();
    }
}

#[tokio::test]
async fn test_generation_counts_down_free_quota() {
    let store = InMemoryStore::new();
    let generator = CountingGenerator::new();

    let response = generate_for_user(&store, &generator, USER, &Brief::default())
        .await
        .unwrap();

    assert_eq!(response.subject, "Subject");
    assert_eq!(response.remaining, i64::from(FREE_DAILY_GENERATIONS) - 1);
    assert_eq!(generator.calls(), 1);
    let profile = store.find_profile(USER).await.unwrap().unwrap();
    assert_eq!(profile.generation_count, 1);
}

#[tokio::test]
async fn test_exhausted_quota_rejects_before_invoking_generator() {
    let store = InMemoryStore::new();
    let generator = CountingGenerator::new();
    exhaust_quota(&store).await;

    let result = generate_for_user(&store, &generator, USER, &Brief::default()).await;

    assert!(matches!(result, Err(ApiError::LimitReached)));
    // The generator was never consulted and no quota was consumed.
    assert_eq!(generator.calls(), 0);
    let profile = store.find_profile(USER).await.unwrap().unwrap();
    assert_eq!(profile.generation_count, FREE_DAILY_GENERATIONS);
}

#[tokio::test]
async fn test_pro_plan_is_never_capped() {
    let store = InMemoryStore::new();
    let generator = CountingGenerator::new();
    store.set_plan(USER, Plan::Pro).await.unwrap();
    exhaust_quota(&store).await;

    let response = generate_for_user(&store, &generator, USER, &Brief::default())
        .await
        .unwrap();

    assert_eq!(response.remaining, -1);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_failed_generation_does_not_consume_quota() {
    let store = InMemoryStore::new();
    let generator = CountingGenerator::failing();

    let result = generate_for_user(&store, &generator, USER, &Brief::default()).await;

    assert!(matches!(result, Err(ApiError::Upstream(_))));
    assert_eq!(generator.calls(), 1);
    let profile = store.find_profile(USER).await.unwrap().unwrap();
    assert_eq!(profile.generation_count, 0);
}
