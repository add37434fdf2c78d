//! Error types for billing webhook and API handling.

/// Error kinds for billing operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BillingErrorKind {
    /// The webhook request carried no signature header.
    #[display("Missing webhook signature header")]
    MissingSignature,
    /// The signature did not match the payload.
    #[display("Webhook signature verification failed")]
    InvalidSignature,
    /// The signed timestamp is outside the accepted tolerance.
    #[display("Webhook timestamp outside tolerance: {age_secs}s old")]
    StaleTimestamp {
        /// Age of the signed timestamp in seconds
        age_secs: i64,
    },
    /// The event payload could not be parsed.
    #[display("Webhook payload parsing error: {_0}")]
    Parse(String),
    /// Billing API call failed.
    #[display("Billing API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the billing provider
        status: u16,
        /// Error body or message
        message: String,
    },
    /// Billing is not configured.
    #[display("Billing not configured: {_0}")]
    Configuration(String),
}

/// Billing error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Billing Error: {} at line {} in {}", kind, line, file)]
pub struct BillingError {
    kind: BillingErrorKind,
    line: u32,
    file: &'static str,
}

impl BillingError {
    /// Create a new billing error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: BillingErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BillingErrorKind {
        &self.kind
    }
}
