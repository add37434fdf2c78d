//! Tests for the tracking link rewrite and pixel injection.

use promptly_tracking::TrackingRewriter;

fn rewriter() -> TrackingRewriter {
    TrackingRewriter::new("https://promptly.test")
}

#[test]
fn test_anchor_href_is_rewritten() {
    let html = r#"<a href="https://example.com/x">click</a>"#;
    let out = rewriter().rewrite_links(html, "abc");

    assert!(
        out.contains(r#"href="https://promptly.test/r?d=abc&u=https%3A%2F%2Fexample.com%2Fx""#),
        "unexpected rewrite: {out}"
    );
    assert!(!out.contains(r#"href="https://example.com/x""#));
}

#[test]
fn test_plain_http_anchor_is_rewritten() {
    let html = r#"<a href="http://example.com/">go</a>"#;
    let out = rewriter().rewrite_links(html, "d1");
    assert!(out.contains("u=http%3A%2F%2Fexample.com%2F"));
}

#[test]
fn test_non_http_hrefs_are_left_alone() {
    let html = r#"<a href="mailto:hi@example.com">mail</a>"#;
    let out = rewriter().rewrite_links(html, "d1");
    assert_eq!(out, html);
}

#[test]
fn test_multiple_anchors_all_rewritten() {
    let html = r#"<a href="https://a.test/1">1</a><a href="https://b.test/2">2</a>"#;
    let out = rewriter().rewrite_links(html, "d1");
    assert!(out.contains("u=https%3A%2F%2Fa.test%2F1"));
    assert!(out.contains("u=https%3A%2F%2Fb.test%2F2"));
}

#[test]
fn test_pixel_injected_before_closing_body() {
    let html = "<html><body><p>hello</p></body></html>";
    let out = rewriter().append_open_pixel(html, "abc");

    let pixel_pos = out
        .find("https://promptly.test/o/abc.gif")
        .expect("pixel missing");
    let body_pos = out.find("</body>").expect("body tag missing");
    assert!(pixel_pos < body_pos);
}

#[test]
fn test_pixel_appended_without_body_tag() {
    let html = "<p>no body tag here</p>";
    let out = rewriter().append_open_pixel(html, "abc");
    assert!(out.ends_with(r#"style="display:none;"/>"#));
    assert!(out.contains("/o/abc.gif"));
}

#[test]
fn test_full_transform_rewrites_and_adds_pixel() {
    let html = r#"<body><a href="https://example.com/x">x</a></body>"#;
    let out = rewriter().instrument_html(html, "abc");
    assert!(out.contains("/r?d=abc&u=https%3A%2F%2Fexample.com%2Fx"));
    assert!(out.contains("/o/abc.gif"));
}

#[test]
fn test_trailing_slash_base_url_is_normalized() {
    let rewriter = TrackingRewriter::new("https://promptly.test/");
    assert_eq!(rewriter.pixel_url("d1"), "https://promptly.test/o/d1.gif");
}
