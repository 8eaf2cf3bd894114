//! Sequential fragment fetching and HTML-to-text extraction.
//!
//! Fragments are fetched one at a time, strictly in source order. The first
//! failure aborts the whole pass; fragments already fetched are discarded by
//! the caller, never persisted.

use reqwest::Client;
use scraper::Html;
use tracing::{info, warn};
use url::Url;

use bookdesk_shared::{BookdeskError, Result};

/// Elements whose text content is never part of the document body.
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Fetch and text-extract every source in index order.
///
/// Fail-fast: returns the first fetch error without requesting the
/// remaining sources. Per-index progress is logged for operator
/// visibility but never changes control flow.
pub(crate) async fn fetch_all(client: &Client, sources: &[Url]) -> Result<Vec<String>> {
    let total = sources.len();
    let mut fragments = Vec::with_capacity(total);

    for (i, url) in sources.iter().enumerate() {
        let index = i + 1;
        info!(index, total, %url, "downloading fragment");

        match fetch_one(client, url).await {
            Ok(text) => {
                info!(index, total, chars = text.len(), "fragment extracted");
                fragments.push(text);
            }
            Err(e) => {
                warn!(index, total, %url, error = %e, "fragment fetch failed, aborting pass");
                return Err(e);
            }
        }
    }

    Ok(fragments)
}

/// Fetch a single fragment and extract its plain text.
async fn fetch_one(client: &Client, url: &Url) -> Result<String> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| BookdeskError::fetch(url.as_str(), e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(BookdeskError::fetch(url.as_str(), format!("HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| BookdeskError::fetch(url.as_str(), format!("body read failed: {e}")))?;

    Ok(html_to_text(&body))
}

/// Extract the readable text of an HTML document.
///
/// Walks the DOM in document order, collecting trimmed text nodes joined by
/// newlines. Markup structure is discarded; reading order is preserved.
pub(crate) fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut chunks: Vec<&str> = Vec::new();

    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        // Script/style/noscript subtrees carry text nodes that are not
        // part of the readable document.
        let skipped = node.ancestors().any(|n| {
            n.value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if skipped {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed);
        }
    }

    chunks.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_to_text_strips_markup() {
        let html = "<html><body><h1>Chapter I</h1><p>Acting man.</p></body></html>";
        assert_eq!(html_to_text(html), "Chapter I\nActing man.");
    }

    #[test]
    fn html_to_text_preserves_reading_order() {
        let html = r#"<html><body>
            <div><p>first</p></div>
            <p>second</p>
            <span>third</span>
        </body></html>"#;
        assert_eq!(html_to_text(html), "first\nsecond\nthird");
    }

    #[test]
    fn html_to_text_skips_scripts_and_styles() {
        let html = r#"<html><head>
            <style>body { color: red; }</style>
            <script>var x = 1;</script>
        </head><body>
            <p>visible</p>
            <noscript>enable javascript</noscript>
        </body></html>"#;
        let text = html_to_text(html);
        assert_eq!(text, "visible");
        assert!(!text.contains("color"));
        assert!(!text.contains("var x"));
    }

    #[test]
    fn html_to_text_drops_whitespace_only_nodes() {
        let html = "<html><body>  \n  <p>  padded  </p>  \n  </body></html>";
        assert_eq!(html_to_text(html), "padded");
    }

    #[test]
    fn html_to_text_handles_nested_inline_markup() {
        let html = "<html><body><p>the <em>pure</em> theory</p></body></html>";
        // Inline boundaries still become newlines; no markup survives.
        assert_eq!(html_to_text(html), "the\npure\ntheory");
    }

    #[test]
    fn html_to_text_empty_document() {
        assert_eq!(html_to_text("<html><body></body></html>"), "");
    }
}
