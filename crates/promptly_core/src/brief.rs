//! The structured brief that drives copy generation.

use serde::{Deserialize, Serialize};

/// A structured brief for generating marketing copy.
///
/// Every field is optional; the generator substitutes sensible fallbacks so a
/// half-filled compose form still produces usable copy.
///
/// # Examples
///
/// ```
/// use promptly_core::Brief;
///
/// let brief = Brief::builder()
///     .business("Acme Coffee")
///     .audience("remote developers")
///     .build()
///     .unwrap();
///
/// assert_eq!(brief.business().as_deref(), Some("Acme Coffee"));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into, strip_option), default)]
pub struct Brief {
    /// Name of the business sending the email
    business: Option<String>,
    /// Who the email is for
    audience: Option<String>,
    /// What the campaign is trying to achieve
    goal: Option<String>,
    /// Product or offer being promoted
    product: Option<String>,
    /// Desired tone of voice
    tone: Option<String>,
    /// Call to action text
    cta: Option<String>,
    /// Desired copy length hint
    length: Option<String>,
}

impl Brief {
    /// Returns a builder for constructing a Brief.
    pub fn builder() -> BriefBuilder {
        BriefBuilder::default()
    }
}
