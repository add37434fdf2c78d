//! Error types for the outbound mail transport.

/// Error kinds for transport operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TransportErrorKind {
    /// The transport is not configured (missing credentials, domain, sender).
    #[display("Transport not configured: {_0}")]
    Configuration(String),
    /// The HTTP request to the provider failed outright.
    #[display("Transport request failed: {_0}")]
    Request(String),
    /// The provider rejected the send.
    #[display("Transport API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the provider
        status: u16,
        /// Error body or message
        message: String,
    },
}

/// Transport error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transport Error: {} at line {} in {}", kind, line, file)]
pub struct TransportError {
    kind: TransportErrorKind,
    line: u32,
    file: &'static str,
}

impl TransportError {
    /// Create a new transport error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TransportErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TransportErrorKind {
        &self.kind
    }
}
