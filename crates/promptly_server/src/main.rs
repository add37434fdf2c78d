//! Promptly server binary.

use promptly_billing::{StripeClient, StripeConfig};
use promptly_database::{PgStore, Store, create_pool, run_migrations};
use promptly_error::TransportErrorKind;
use promptly_generate::generator_from_env;
use promptly_server::{AppState, ServerConfig, create_router, run_scheduler};
use promptly_transport::{MailTransport, MailgunClient, MailgunConfig, UnconfiguredTransport};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let pool = create_pool()?;
    {
        let mut conn = pool.get()?;
        run_migrations(&mut conn)?;
    }
    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    let generator = generator_from_env();

    let transport: Arc<dyn MailTransport> = match MailgunConfig::from_env() {
        Ok(mailgun) => Arc::new(MailgunClient::new(mailgun)),
        Err(error) => {
            warn!(error = %error, "Mail transport not configured; sends will fail");
            let missing = match error.kind() {
                TransportErrorKind::Configuration(missing) => missing.clone(),
                other => other.to_string(),
            };
            Arc::new(UnconfiguredTransport::new(missing))
        }
    };

    let stripe = match StripeConfig::from_env() {
        Ok(stripe) => Some(Arc::new(StripeClient::new(stripe))),
        Err(error) => {
            warn!(error = %error, "Stripe not configured; billing endpoints disabled");
            None
        }
    };

    let state = AppState::new(&config, store.clone(), generator, transport, stripe);

    tokio::spawn(run_scheduler(
        state.dispatcher.clone(),
        store,
        *config.scheduler_interval_secs(),
    ));

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), "Promptly listening");
    axum::serve(listener, app).await?;
    Ok(())
}
