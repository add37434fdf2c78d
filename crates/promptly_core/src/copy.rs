//! Generated copy and its provenance.

use serde::{Deserialize, Serialize};

/// Which backend produced a piece of copy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CopySource {
    /// A configured chat-completions service produced the copy.
    Openai,
    /// The deterministic template fallback produced the copy.
    Mock,
}

/// Subject and body text produced by a generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct GeneratedCopy {
    /// Subject line
    subject: String,
    /// Plain-text body
    body: String,
    /// Which backend produced this copy
    source: CopySource,
}

impl GeneratedCopy {
    /// Creates a new generated copy record.
    pub fn new(subject: impl Into<String>, body: impl Into<String>, source: CopySource) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            source,
        }
    }
}
