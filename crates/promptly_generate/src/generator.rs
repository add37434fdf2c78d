//! The generator trait and environment-driven backend selection.

use crate::{OpenAiConfig, OpenAiCopywriter, TemplateCopywriter};
use async_trait::async_trait;
use promptly_core::{Brief, GeneratedCopy};
use promptly_error::GenerateError;
use std::sync::Arc;

/// Produces subject/body copy from a structured brief.
///
/// Implementations must be side-effect free with respect to quota: the
/// caller decides whether a generation is allowed and increments the
/// persisted counter only after a successful call.
#[async_trait]
pub trait CopyGenerator: Send + Sync {
    /// Generate copy for the given brief.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing service fails or answers with an
    /// unusable completion. The template backend never fails.
    async fn generate(&self, brief: &Brief) -> Result<GeneratedCopy, GenerateError>;
}

/// Select a generator from the environment.
///
/// Presence of `OPENAI_API_KEY` selects the chat-completions backend;
/// otherwise the deterministic template backend is used, and the produced
/// copy reports `mock` as its source.
pub fn generator_from_env() -> Arc<dyn CopyGenerator> {
    match OpenAiConfig::from_env() {
        Some(config) => {
            tracing::info!(model = %config.model(), "Using OpenAI copy generator");
            Arc::new(OpenAiCopywriter::new(config))
        }
        None => {
            tracing::info!("OPENAI_API_KEY not set, using template copy generator");
            Arc::new(TemplateCopywriter::new())
        }
    }
}
