//! Server configuration read from the environment.

use promptly_error::{ConfigError, ConfigErrorKind};
use std::collections::HashMap;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";
const DEFAULT_SCHEDULER_INTERVAL_SECS: u64 = 60;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct ServerConfig {
    /// Socket address the server binds to
    bind_addr: String,
    /// Public base URL used to build tracking links
    public_url: String,
    /// Bearer token to user id mapping for API authentication
    api_tokens: HashMap<String, String>,
    /// Seconds between scheduler polls; zero disables the scheduler
    scheduler_interval_secs: u64,
}

impl ServerConfig {
    /// Creates a configuration directly, mainly for tests.
    pub fn new(
        bind_addr: impl Into<String>,
        public_url: impl Into<String>,
        api_tokens: HashMap<String, String>,
        scheduler_interval_secs: u64,
    ) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            public_url: public_url.into(),
            api_tokens,
            scheduler_interval_secs,
        }
    }

    /// Read configuration from the environment.
    ///
    /// `PROMPTLY_API_TOKENS` is required. `PROMPTLY_BIND_ADDR` defaults to
    /// `0.0.0.0:8080`, `PROMPTLY_PUBLIC_URL` to `http://localhost:8080`, and
    /// `PROMPTLY_SCHEDULER_INTERVAL_SECS` to 60; setting the interval to 0
    /// disables the scheduled-send poller.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = std::env::var("PROMPTLY_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let public_url = std::env::var("PROMPTLY_PUBLIC_URL")
            .unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string());
        let api_tokens = parse_api_tokens(
            &std::env::var("PROMPTLY_API_TOKENS")
                .map_err(|_| ConfigError::missing("PROMPTLY_API_TOKENS"))?,
        )?;
        let scheduler_interval_secs = match std::env::var("PROMPTLY_SCHEDULER_INTERVAL_SECS") {
            Ok(value) => value.parse().map_err(|_| {
                ConfigError::new(ConfigErrorKind::Invalid {
                    variable: "PROMPTLY_SCHEDULER_INTERVAL_SECS".to_string(),
                    reason: format!("not a non-negative integer: {value}"),
                })
            })?,
            Err(_) => DEFAULT_SCHEDULER_INTERVAL_SECS,
        };

        Ok(Self {
            bind_addr,
            public_url,
            api_tokens,
            scheduler_interval_secs,
        })
    }
}

/// Parse `token:user_id` pairs separated by commas.
///
/// This is the deliberately small stand-in for an external identity
/// provider: each configured token authenticates exactly one user.
fn parse_api_tokens(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut tokens = HashMap::new();
    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (token, user_id) = pair.split_once(':').ok_or_else(|| {
            ConfigError::new(ConfigErrorKind::Invalid {
                variable: "PROMPTLY_API_TOKENS".to_string(),
                reason: format!("expected token:user_id, got {pair}"),
            })
        })?;
        if token.is_empty() || user_id.is_empty() {
            return Err(ConfigError::new(ConfigErrorKind::Invalid {
                variable: "PROMPTLY_API_TOKENS".to_string(),
                reason: "empty token or user id".to_string(),
            }));
        }
        tokens.insert(token.to_string(), user_id.to_string());
    }
    if tokens.is_empty() {
        return Err(ConfigError::new(ConfigErrorKind::Invalid {
            variable: "PROMPTLY_API_TOKENS".to_string(),
            reason: "no token pairs configured".to_string(),
        }));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::parse_api_tokens;

    #[test]
    fn test_parses_token_pairs() {
        let tokens = parse_api_tokens("abc:user_1, def:user_2").unwrap();
        assert_eq!(tokens.get("abc").map(String::as_str), Some("user_1"));
        assert_eq!(tokens.get("def").map(String::as_str), Some("user_2"));
    }

    #[test]
    fn test_rejects_malformed_pairs() {
        assert!(parse_api_tokens("no-colon").is_err());
        assert!(parse_api_tokens(":user").is_err());
        assert!(parse_api_tokens("").is_err());
    }
}
