//! Outbound email transport.
//!
//! The dispatcher talks to [`MailTransport`], a narrow seam over the external
//! provider, so tests can swap in a recording fake. The production
//! implementation is a Mailgun REST client.

mod mailgun;
mod transport;

pub use mailgun::{MailgunClient, MailgunConfig};
pub use transport::{
    MailTransport, OutboundMessage, OutboundMessageBuilder, SendReceipt, UnconfiguredTransport,
};
