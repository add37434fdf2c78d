//! The transport trait and message types.

use async_trait::async_trait;
use promptly_error::TransportError;
use serde::{Deserialize, Serialize};

/// A fully rendered message ready to hand to the provider.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct OutboundMessage {
    /// Recipient addresses
    to: Vec<String>,
    /// Subject line
    subject: String,
    /// Instrumented HTML payload
    html: String,
    /// Sender override; the configured sender applies when absent
    #[builder(default)]
    from: Option<String>,
}

impl OutboundMessage {
    /// Returns a builder for constructing an OutboundMessage.
    pub fn builder() -> OutboundMessageBuilder {
        OutboundMessageBuilder::default()
    }
}

/// What the provider reported after accepting a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct SendReceipt {
    /// Provider message identifier, when the provider returned one
    message_id: Option<String>,
}

impl SendReceipt {
    /// Creates a new receipt.
    pub fn new(message_id: Option<String>) -> Self {
        Self { message_id }
    }
}

/// Transport used when the provider is not configured.
///
/// The server still starts without Mailgun credentials; send attempts fail
/// at dispatch time with a configuration error instead of the process
/// refusing to boot.
#[derive(Debug, Clone)]
pub struct UnconfiguredTransport {
    reason: String,
}

impl UnconfiguredTransport {
    /// Creates a transport that rejects every send with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl MailTransport for UnconfiguredTransport {
    async fn send(&self, _message: &OutboundMessage) -> Result<SendReceipt, TransportError> {
        Err(TransportError::new(
            promptly_error::TransportErrorKind::Configuration(self.reason.clone()),
        ))
    }

    fn provider_name(&self) -> &'static str {
        "unconfigured"
    }
}

/// Seam over the external delivery provider.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Hand a message to the provider.
    ///
    /// # Errors
    ///
    /// Returns an error when the transport is unconfigured, the request
    /// fails, or the provider rejects the message. The caller treats any of
    /// these as a failed delivery attempt and rolls back its provisional
    /// delivery row.
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, TransportError>;

    /// Short provider name for logs and responses.
    fn provider_name(&self) -> &'static str;
}
