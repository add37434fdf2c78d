//! Tests for the template copy generator.

use promptly_core::{Brief, CopySource};
use promptly_generate::{CopyGenerator, TemplateCopywriter};

#[tokio::test]
async fn test_template_fills_brief_fields() {
    let brief = Brief::builder()
        .business("Acme Coffee")
        .audience("remote developers")
        .product("Cold Brew Club")
        .cta("Start your trial")
        .build()
        .unwrap();

    let copy = TemplateCopywriter::new().generate(&brief).await.unwrap();

    assert!(copy.subject().contains("Acme Coffee"));
    assert!(copy.subject().contains("remote developers"));
    assert!(copy.body().contains("Cold Brew Club"));
    assert!(copy.body().contains("Next step: Start your trial"));
    assert!(copy.body().ends_with("Acme Coffee"));
    assert_eq!(*copy.source(), CopySource::Mock);
}

#[tokio::test]
async fn test_template_uses_fallbacks_for_empty_brief() {
    let brief = Brief::default();
    let copy = TemplateCopywriter::new().generate(&brief).await.unwrap();

    assert_eq!(copy.subject(), "(friendly) your product for your audience");
    assert!(copy.body().contains("our product"));
    assert!(copy.body().contains("Next step: Learn more"));
    assert!(copy.body().ends_with("Promptly"));
}

#[tokio::test]
async fn test_template_is_deterministic() {
    let brief = Brief::builder().business("Acme").build().unwrap();
    let generator = TemplateCopywriter::new();

    let first = generator.generate(&brief).await.unwrap();
    let second = generator.generate(&brief).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_template_keeps_merge_placeholder() {
    let copy = TemplateCopywriter::new()
        .generate(&Brief::default())
        .await
        .unwrap();
    assert!(copy.body().starts_with("Hi {{first_name}},"));
}
