//! HTTP API server for the Promptly email marketing service.
//!
//! Wires the generation, quota, dispatch, tracking, and billing crates into
//! an axum application: bearer-token authentication, the delivery
//! dispatcher, the best-effort event recorder, and the scheduled-send
//! poller.

mod api;
mod auth;
mod config;
mod dispatch;
mod error;
mod recorder;
mod routes;
mod scheduler;
mod state;

pub use api::create_router;
pub use auth::AuthenticatedUser;
pub use config::ServerConfig;
pub use dispatch::{DispatchOutcome, DispatchRequest, Dispatcher, render_draft_html};
pub use error::ApiError;
pub use recorder::EventRecorder;
pub use routes::generate::{GenerateResponse, generate_for_user};
pub use routes::waitlist::{WaitlistRequest, join_waitlist};
pub use scheduler::{run_once, run_scheduler};
pub use state::AppState;
