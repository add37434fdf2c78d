//! Shared application state threaded through the router.

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::recorder::EventRecorder;
use promptly_billing::StripeClient;
use promptly_database::Store;
use promptly_generate::CopyGenerator;
use promptly_tracking::TrackingRewriter;
use promptly_transport::MailTransport;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything the request handlers need, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Persistence seam shared by handlers, dispatcher, and scheduler
    pub store: Arc<dyn Store>,
    /// Copy generation backend
    pub generator: Arc<dyn CopyGenerator>,
    /// Send pipeline for immediate and scheduled dispatches
    pub dispatcher: Dispatcher,
    /// Best-effort tracking event writer
    pub recorder: EventRecorder,
    /// Stripe client; `None` leaves billing endpoints unconfigured
    pub stripe: Option<Arc<StripeClient>>,
    /// Bearer token to user id mapping
    pub api_tokens: Arc<HashMap<String, String>>,
}

impl AppState {
    /// Assemble the application state from its parts.
    pub fn new(
        config: &ServerConfig,
        store: Arc<dyn Store>,
        generator: Arc<dyn CopyGenerator>,
        transport: Arc<dyn MailTransport>,
        stripe: Option<Arc<StripeClient>>,
    ) -> Self {
        let rewriter = TrackingRewriter::new(config.public_url().clone());
        Self {
            dispatcher: Dispatcher::new(store.clone(), transport, rewriter),
            recorder: EventRecorder::new(store.clone()),
            store,
            generator,
            stripe,
            api_tokens: Arc::new(config.api_tokens().clone()),
        }
    }
}
