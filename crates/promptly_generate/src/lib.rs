//! Marketing copy generation backends.
//!
//! Two implementations of [`CopyGenerator`] exist: an OpenAI-compatible
//! chat-completions client used when a credential is configured, and a
//! deterministic template fallback so the compose flow works without one.

mod generator;
mod openai;
mod template;

pub use generator::{CopyGenerator, generator_from_env};
pub use openai::{OpenAiConfig, OpenAiCopywriter};
pub use template::TemplateCopywriter;
