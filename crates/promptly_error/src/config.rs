//! Configuration error types.

/// Configuration error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// Required environment variable is not set.
    #[display("Missing environment variable: {_0}")]
    Missing(String),
    /// Environment variable is set but unusable.
    #[display("Invalid value for {variable}: {reason}")]
    Invalid {
        /// Variable name
        variable: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Configuration error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Config Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    line: u32,
    file: &'static str,
}

impl ConfigError {
    /// Create a new configuration error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a missing-variable error.
    #[track_caller]
    pub fn missing(variable: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Missing(variable.into()))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}
