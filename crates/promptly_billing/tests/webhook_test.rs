//! Tests for webhook signature verification and plan mapping.

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use promptly_billing::{PlanUpdate, StripeEvent, plan_update, verify_signature};
use promptly_core::Plan;
use sha2::Sha256;

const SECRET: &str = "whsec_test_secret";

fn sign(payload: &str, timestamp: i64) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).expect("hmac accepts any key length");
    mac.update(format!("{timestamp}.{payload}").as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp},v1={signature}")
}

#[test]
fn test_valid_signature_accepted() {
    let now = Utc::now();
    let payload = r#"{"type":"checkout.session.completed"}"#;
    let header = sign(payload, now.timestamp());
    assert!(verify_signature(payload, &header, SECRET, now).is_ok());
}

#[test]
fn test_tampered_payload_rejected() {
    let now = Utc::now();
    let header = sign(r#"{"type":"a"}"#, now.timestamp());
    assert!(verify_signature(r#"{"type":"b"}"#, &header, SECRET, now).is_err());
}

#[test]
fn test_wrong_secret_rejected() {
    let now = Utc::now();
    let payload = "{}";
    let header = sign(payload, now.timestamp());
    assert!(verify_signature(payload, &header, "whsec_other", now).is_err());
}

#[test]
fn test_stale_timestamp_rejected() {
    let now = Utc::now();
    let payload = "{}";
    let stale = (now - Duration::minutes(10)).timestamp();
    let header = sign(payload, stale);
    assert!(verify_signature(payload, &header, SECRET, now).is_err());
}

#[test]
fn test_malformed_header_rejected() {
    let now = Utc::now();
    assert!(verify_signature("{}", "", SECRET, now).is_err());
    assert!(verify_signature("{}", "t=123", SECRET, now).is_err());
    assert!(verify_signature("{}", "v1=abc", SECRET, now).is_err());
}

#[test]
fn test_extra_candidate_signatures_still_match() {
    let now = Utc::now();
    let payload = "{}";
    let header = format!("{},v1=deadbeef", sign(payload, now.timestamp()));
    assert!(verify_signature(payload, &header, SECRET, now).is_ok());
}

#[test]
fn test_checkout_completed_upgrades() {
    let payload = r#"{
        "type": "checkout.session.completed",
        "data": { "object": { "metadata": { "userId": "user_1" } } }
    }"#;
    let event = StripeEvent::from_payload(payload).unwrap();
    assert_eq!(
        plan_update(&event),
        Some(PlanUpdate {
            user_id: "user_1".to_string(),
            plan: Plan::Pro
        })
    );
}

#[test]
fn test_checkout_falls_back_to_client_reference_id() {
    let payload = r#"{
        "type": "checkout.session.completed",
        "data": { "object": { "client_reference_id": "user_2" } }
    }"#;
    let event = StripeEvent::from_payload(payload).unwrap();
    assert_eq!(plan_update(&event).map(|u| u.user_id), Some("user_2".into()));
}

#[test]
fn test_subscription_deleted_downgrades() {
    let payload = r#"{
        "type": "customer.subscription.deleted",
        "data": { "object": { "metadata": { "userId": "user_3" } } }
    }"#;
    let event = StripeEvent::from_payload(payload).unwrap();
    assert_eq!(plan_update(&event).map(|u| u.plan), Some(Plan::Free));
}

#[test]
fn test_subscription_updated_only_downgrades_when_canceled() {
    let active = r#"{
        "type": "customer.subscription.updated",
        "data": { "object": { "metadata": { "userId": "u" }, "status": "active" } }
    }"#;
    let event = StripeEvent::from_payload(active).unwrap();
    assert_eq!(plan_update(&event), None);

    let canceled = r#"{
        "type": "customer.subscription.updated",
        "data": { "object": { "metadata": { "userId": "u" }, "status": "canceled" } }
    }"#;
    let event = StripeEvent::from_payload(canceled).unwrap();
    assert_eq!(plan_update(&event).map(|u| u.plan), Some(Plan::Free));
}

#[test]
fn test_unhandled_event_type_is_ignored() {
    let payload = r#"{"type":"invoice.paid","data":{"object":{}}}"#;
    let event = StripeEvent::from_payload(payload).unwrap();
    assert_eq!(plan_update(&event), None);
}

#[test]
fn test_missing_user_id_is_ignored() {
    let payload = r#"{"type":"checkout.session.completed","data":{"object":{}}}"#;
    let event = StripeEvent::from_payload(payload).unwrap();
    assert_eq!(plan_update(&event), None);
}
