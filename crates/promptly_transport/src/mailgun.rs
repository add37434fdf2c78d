//! Mailgun REST transport.

use crate::{MailTransport, OutboundMessage, SendReceipt};
use async_trait::async_trait;
use promptly_error::{TransportError, TransportErrorKind};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument};

const DEFAULT_API_URL: &str = "https://api.mailgun.net";

/// Configuration for the Mailgun transport.
#[derive(Debug, Clone, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct MailgunConfig {
    /// API key for the `api` basic-auth user
    api_key: String,
    /// Sending domain
    domain: String,
    /// Default sender address
    sender: String,
    /// API base URL (differs between the US and EU regions)
    #[builder(default = "DEFAULT_API_URL.to_string()")]
    api_url: String,
}

impl MailgunConfig {
    /// Returns a builder for constructing a MailgunConfig.
    pub fn builder() -> MailgunConfigBuilder {
        MailgunConfigBuilder::default()
    }

    /// Read configuration from the environment.
    ///
    /// Requires `MAILGUN_API_KEY`, `MAILGUN_DOMAIN`, and a sender from
    /// `MAIL_FROM` or `MAILGUN_FROM`. `MAILGUN_API_URL` optionally selects
    /// the regional endpoint.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the missing pieces; a
    /// half-configured transport refuses to send rather than guessing.
    pub fn from_env() -> Result<Self, TransportError> {
        let api_key = std::env::var("MAILGUN_API_KEY").ok();
        let domain = std::env::var("MAILGUN_DOMAIN").ok();
        let sender = std::env::var("MAIL_FROM")
            .or_else(|_| std::env::var("MAILGUN_FROM"))
            .ok();
        let api_url =
            std::env::var("MAILGUN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        match (api_key, domain, sender) {
            (Some(api_key), Some(domain), Some(sender)) => Ok(MailgunConfigBuilder::default()
                .api_key(api_key)
                .domain(domain)
                .sender(sender)
                .api_url(api_url)
                .build()
                .expect("valid MailgunConfig")),
            (api_key, domain, sender) => {
                let mut missing = Vec::new();
                if api_key.is_none() {
                    missing.push("MAILGUN_API_KEY");
                }
                if domain.is_none() {
                    missing.push("MAILGUN_DOMAIN");
                }
                if sender.is_none() {
                    missing.push("MAIL_FROM or MAILGUN_FROM");
                }
                Err(TransportError::new(TransportErrorKind::Configuration(
                    missing.join(", "),
                )))
            }
        }
    }
}

/// Successful response body from the messages endpoint.
#[derive(Debug, Clone, Deserialize)]
struct MailgunResponse {
    id: Option<String>,
}

/// Mailgun transport client.
#[derive(Debug, Clone)]
pub struct MailgunClient {
    client: Client,
    config: MailgunConfig,
}

impl MailgunClient {
    /// Creates a new Mailgun client.
    pub fn new(config: MailgunConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl MailTransport for MailgunClient {
    #[instrument(skip(self, message), fields(recipients = message.to().len()))]
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, TransportError> {
        let url = format!(
            "{}/v3/{}/messages",
            self.config.api_url(),
            self.config.domain()
        );
        let from = message
            .from()
            .clone()
            .unwrap_or_else(|| self.config.sender().clone());

        let mut form: Vec<(&str, String)> = vec![
            ("from", from),
            ("subject", message.subject().clone()),
            ("html", message.html().clone()),
        ];
        for recipient in message.to() {
            form.push(("to", recipient.clone()));
        }

        let response = self
            .client
            .post(&url)
            .basic_auth("api", Some(self.config.api_key()))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Mailgun request failed");
                TransportError::new(TransportErrorKind::Request(e.to_string()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = %status, message = %message, "Mailgun rejected send");
            return Err(TransportError::new(TransportErrorKind::Api {
                status: status.as_u16(),
                message,
            }));
        }

        let body: MailgunResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse Mailgun response");
            TransportError::new(TransportErrorKind::Request(e.to_string()))
        })?;

        debug!(message_id = ?body.id, "Mailgun queued message");
        Ok(SendReceipt::new(body.id))
    }

    fn provider_name(&self) -> &'static str {
        "mailgun"
    }
}
