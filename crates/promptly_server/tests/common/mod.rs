//! Shared test doubles for server tests.

use async_trait::async_trait;
use promptly_error::{TransportError, TransportErrorKind};
use promptly_transport::{MailTransport, OutboundMessage, SendReceipt};
use std::sync::Mutex;

/// Transport fake that records messages instead of sending them.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundMessage>>,
    fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every send fails with a provider error.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages handed to the transport so far.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, TransportError> {
        if self.fail {
            return Err(TransportError::new(TransportErrorKind::Api {
                status: 500,
                message: "provider down".to_string(),
            }));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(SendReceipt::new(Some("<queued@mail.test>".to_string())))
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}
