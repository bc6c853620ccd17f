// src/cms/links.rs
// =============================================================================
// Finds the external links inside a post body.
//
// We use the `scraper` crate to walk every <a href> in the post HTML and keep
// the ones that point at a different host than the post itself.
//
// Skipped:
// - empty hrefs, #anchors, mailto: and tel: links
// - relative links (they stay on the same site by definition)
// - links to the post's own host
// =============================================================================

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

const MAX_ANCHOR_CHARS: usize = 100;
const NO_TEXT: &str = "[No text]";

/// One external link found in a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingLink {
    /// Host the link points at
    pub domain: String,
    /// Visible link text, trimmed and capped at 100 characters
    pub anchor: String,
    /// The href exactly as written in the post
    pub url: String,
}

/// Extracts external links from `html`, relative to the post at `post_url`.
///
/// Example:
///   html     = "<a href='https://rust-lang.org'>Rust</a> <a href='/about'>About</a>"
///   post_url = "https://blog.ex.com/post"
///   result   = [OutgoingLink { domain: "rust-lang.org", anchor: "Rust", .. }]
pub fn extract_outgoing_links(html: &str, post_url: &str) -> Vec<OutgoingLink> {
    let mut links: Vec<OutgoingLink> = Vec::new();

    if html.is_empty() || post_url.is_empty() {
        return links;
    }

    let post_host = match Url::parse(post_url) {
        Ok(url) => url.host_str().map(str::to_string),
        Err(e) => {
            tracing::warn!(post_url, error = %e, "Invalid post URL, cannot tell external links apart");
            return links;
        }
    };

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };
    let document = Html::parse_fragment(html);

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if is_skipped_href(href) {
            continue;
        }

        // Relative links fail to parse without a base, which is what we want
        let Ok(target) = Url::parse(href) else {
            continue;
        };
        let Some(domain) = target.host_str() else {
            continue;
        };
        if post_host.as_deref() == Some(domain) {
            continue;
        }

        let link = OutgoingLink {
            domain: domain.to_string(),
            anchor: anchor_text(element.text()),
            url: href.to_string(),
        };

        if !links.contains(&link) {
            links.push(link);
        }
    }

    tracing::debug!(post_url, count = links.len(), "Extracted outgoing links");
    links
}

fn is_skipped_href(href: &str) -> bool {
    href.is_empty() || href.starts_with('#') || href.starts_with("mailto:") || href.starts_with("tel:")
}

fn anchor_text<'a>(pieces: impl Iterator<Item = &'a str>) -> String {
    let text = pieces
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        NO_TEXT.to_string()
    } else {
        text.chars().take(MAX_ANCHOR_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST: &str = "https://blog.ex.com/post";

    #[test]
    fn test_keeps_only_external_links() {
        let html = r##"
            <p><a href="https://rust-lang.org/learn">Learn <b>Rust</b></a></p>
            <a href="https://blog.ex.com/other-post">Internal</a>
            <a href="/relative">Relative</a>
            <a href="#top">Top</a>
            <a href="mailto:me@ex.com">Mail</a>
            <a href="tel:123">Call</a>
        "##;

        let links = extract_outgoing_links(html, POST);
        assert_eq!(
            links,
            vec![OutgoingLink {
                domain: "rust-lang.org".to_string(),
                anchor: "Learn Rust".to_string(),
                url: "https://rust-lang.org/learn".to_string(),
            }]
        );
    }

    #[test]
    fn test_empty_anchor_and_duplicates() {
        let html = r#"
            <a href="https://cdn.other.net/x"><img src="x.png"></a>
            <a href="https://cdn.other.net/x"><img src="x.png"></a>
        "#;

        let links = extract_outgoing_links(html, POST);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].anchor, "[No text]");
    }

    #[test]
    fn test_long_anchor_is_truncated() {
        let long = "é".repeat(150);
        let html = format!(r#"<a href="https://other.org/">{}</a>"#, long);

        let links = extract_outgoing_links(&html, POST);
        assert_eq!(links[0].anchor.chars().count(), 100);
    }

    #[test]
    fn test_missing_inputs_give_nothing() {
        assert!(extract_outgoing_links("", POST).is_empty());
        assert!(extract_outgoing_links("<a href='https://x.org'>x</a>", "").is_empty());
    }
}
