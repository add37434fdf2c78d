//! Checkout-session creation over the Stripe REST API.

use promptly_error::{BillingError, BillingErrorKind};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, instrument};

const STRIPE_API_URL: &str = "https://api.stripe.com";

/// Configuration for the Stripe integration.
#[derive(Debug, Clone, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct StripeConfig {
    /// Secret API key
    secret_key: String,
    /// Endpoint secret used to verify webhook signatures
    webhook_secret: String,
    /// Price id of the pro subscription
    price_id: String,
    /// Where checkout returns on success
    success_url: String,
    /// Where checkout returns on cancel
    cancel_url: String,
    /// API base URL, overridable for tests
    #[builder(default = "STRIPE_API_URL.to_string()")]
    api_url: String,
}

impl StripeConfig {
    /// Returns a builder for constructing a StripeConfig.
    pub fn builder() -> StripeConfigBuilder {
        StripeConfigBuilder::default()
    }

    /// Read configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first missing variable.
    pub fn from_env() -> Result<Self, BillingError> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| BillingError::new(BillingErrorKind::Configuration(name.to_string())))
        };

        Ok(StripeConfigBuilder::default()
            .secret_key(var("STRIPE_SECRET_KEY")?)
            .webhook_secret(var("STRIPE_WEBHOOK_SECRET")?)
            .price_id(var("STRIPE_PRICE_ID")?)
            .success_url(var("STRIPE_SUCCESS_URL")?)
            .cancel_url(var("STRIPE_CANCEL_URL")?)
            .api_url(
                std::env::var("STRIPE_API_URL").unwrap_or_else(|_| STRIPE_API_URL.to_string()),
            )
            .build()
            .expect("valid StripeConfig"))
    }
}

/// A created checkout session.
#[derive(Debug, Clone, Deserialize, derive_getters::Getters)]
pub struct CheckoutSession {
    /// Session id
    id: String,
    /// Hosted checkout URL to redirect the user to
    url: Option<String>,
}

/// Minimal Stripe REST client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    config: StripeConfig,
}

impl StripeClient {
    /// Creates a new Stripe client.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// The configured webhook endpoint secret.
    pub fn webhook_secret(&self) -> &str {
        self.config.webhook_secret()
    }

    /// Create a subscription checkout session for a user.
    ///
    /// The user id rides along both as `client_reference_id` and in the
    /// session metadata so the completion webhook can resolve it either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Stripe rejects it.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn create_checkout_session(
        &self,
        user_id: &str,
    ) -> Result<CheckoutSession, BillingError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_url());
        let form = [
            ("mode", "subscription"),
            ("line_items[0][price]", self.config.price_id()),
            ("line_items[0][quantity]", "1"),
            ("success_url", self.config.success_url()),
            ("cancel_url", self.config.cancel_url()),
            ("client_reference_id", user_id),
            ("metadata[userId]", user_id),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(self.config.secret_key(), None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Checkout session request failed");
                BillingError::new(BillingErrorKind::Api {
                    status: 0,
                    message: e.to_string(),
                })
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = %status, message = %message, "Stripe rejected checkout session");
            return Err(BillingError::new(BillingErrorKind::Api {
                status: status.as_u16(),
                message,
            }));
        }

        response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse checkout session");
            BillingError::new(BillingErrorKind::Parse(e.to_string()))
        })
    }
}
