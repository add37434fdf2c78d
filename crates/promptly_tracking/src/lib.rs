//! Click and open tracking rewrites for outbound email.
//!
//! Before an HTML payload is handed to the transport, every `http(s)` anchor
//! is redirected through the first-party `/r` endpoint and a 1×1 pixel
//! pointing at `/o/{delivery_id}.gif` is injected, both keyed by the delivery
//! id so later beacon hits can be attributed.

mod rewrite;

pub use rewrite::TrackingRewriter;
