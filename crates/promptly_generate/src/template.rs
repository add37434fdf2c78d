//! Deterministic template fallback for copy generation.

use crate::CopyGenerator;
use async_trait::async_trait;
use promptly_core::{Brief, CopySource, GeneratedCopy};
use promptly_error::GenerateError;
use tracing::instrument;

/// Template-based copy generator used when no generation service is
/// configured.
///
/// Output is a fixed skeleton filled from the brief, so the same brief always
/// produces the same copy. Reported source is [`CopySource::Mock`].
#[derive(Debug, Clone, Default)]
pub struct TemplateCopywriter;

impl TemplateCopywriter {
    /// Creates a new template copywriter.
    pub fn new() -> Self {
        Self
    }

    fn render(brief: &Brief) -> (String, String) {
        let business = brief.business().as_deref().unwrap_or("your product");
        let audience = brief.audience().as_deref().unwrap_or("your audience");
        let product = brief.product().as_deref().unwrap_or("our product");
        let tone = brief.tone().as_deref().unwrap_or("friendly");
        let cta = brief.cta().as_deref().unwrap_or("Learn more");
        let signature = brief.business().as_deref().unwrap_or("Promptly");

        let subject = format!("({tone}) {business} for {audience}");
        let body = format!(
            "Hi {{{{first_name}}}},\n\n\
             Here's a quick update about {product} for {audience}.\n\n\
             \u{2022} Key benefit #1\n\
             \u{2022} Key benefit #2\n\
             \u{2022} Next step: {cta}\n\n\
             Best,\n\
             {signature}"
        );
        (subject, body)
    }
}

#[async_trait]
impl CopyGenerator for TemplateCopywriter {
    #[instrument(skip_all)]
    async fn generate(&self, brief: &Brief) -> Result<GeneratedCopy, GenerateError> {
        let (subject, body) = Self::render(brief);
        Ok(GeneratedCopy::new(subject, body, CopySource::Mock))
    }
}
