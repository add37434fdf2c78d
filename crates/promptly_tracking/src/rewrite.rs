//! The link rewrite and pixel injection transform.

use regex::Regex;
use std::sync::LazyLock;
use tracing::instrument;
use urlencoding::encode;

// Intentionally simple: catches http(s) anchors the way mail clients render
// them, not arbitrary attribute orderings.
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="(https?://[^"]+)""#).expect("valid href pattern"));

/// Rewrites outbound HTML so opens and clicks route through first-party
/// tracking endpoints.
///
/// The transform is pure text manipulation keyed by a delivery id. It is not
/// idempotent: applying it twice double-encodes the redirect targets, so the
/// dispatcher applies it exactly once per outbound message.
#[derive(Debug, Clone)]
pub struct TrackingRewriter {
    base_url: String,
}

impl TrackingRewriter {
    /// Creates a rewriter that builds links under the given public base URL.
    ///
    /// Trailing slashes are stripped so path joins stay predictable.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Public URL of the open pixel for a delivery.
    pub fn pixel_url(&self, delivery_id: &str) -> String {
        format!("{}/o/{}.gif", self.base_url, delivery_id)
    }

    /// Replace every `http(s)` anchor href with a first-party redirect
    /// encoding the delivery id and the original target.
    #[instrument(skip(self, html), fields(delivery_id = %delivery_id))]
    pub fn rewrite_links(&self, html: &str, delivery_id: &str) -> String {
        HREF_RE
            .replace_all(html, |caps: &regex::Captures<'_>| {
                format!(
                    r#"href="{}/r?d={}&u={}""#,
                    self.base_url,
                    encode(delivery_id),
                    encode(&caps[1])
                )
            })
            .into_owned()
    }

    /// Inject the open pixel before `</body>`, or append it when the HTML
    /// carries no body tag, so the pixel is never dropped.
    pub fn append_open_pixel(&self, html: &str, delivery_id: &str) -> String {
        let pixel = format!(
            r#"<img src="{}" width="1" height="1" alt="" style="display:none;"/>"#,
            self.pixel_url(delivery_id)
        );
        if html.contains("</body>") {
            html.replacen("</body>", &format!("{pixel}</body>"), 1)
        } else {
            format!("{html}{pixel}")
        }
    }

    /// Full tracking transform: rewrite links, then add the open pixel.
    pub fn instrument_html(&self, html: &str, delivery_id: &str) -> String {
        self.append_open_pixel(&self.rewrite_links(html, delivery_id), delivery_id)
    }
}
