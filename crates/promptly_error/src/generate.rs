//! Error types for copy generation.

/// Error kinds for copy generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GenerateErrorKind {
    /// HTTP transport failure talking to the generation service.
    #[display("HTTP error: {_0}")]
    Http(String),
    /// The generation service returned a non-success status.
    #[display("Generation API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the service
        status: u16,
        /// Error body or message
        message: String,
    },
    /// The response body could not be parsed.
    #[display("Response parsing error: {_0}")]
    ResponseParsing(String),
    /// The service answered but produced no usable completion.
    #[display("Generation service returned an empty completion")]
    EmptyCompletion,
}

/// Copy generation error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generate Error: {} at line {} in {}", kind, line, file)]
pub struct GenerateError {
    kind: GenerateErrorKind,
    line: u32,
    file: &'static str,
}

impl GenerateError {
    /// Create a new generation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerateErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GenerateErrorKind {
        &self.kind
    }
}
