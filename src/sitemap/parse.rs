// src/sitemap/parse.rs
// =============================================================================
// Turns the text of one sitemap document into a list of entries.
//
// We only care about <loc> elements. Both flavours of sitemap use them:
//   <urlset><url><loc>https://ex.com/page</loc></url></urlset>
//   <sitemapindex><sitemap><loc>https://ex.com/post-sitemap.xml</loc></sitemap></sitemapindex>
//
// The `sitemap` crate reads the XML for us and hands back one entity per
// <url> or <sitemap> element, already parsed into a URL. Namespaces and
// entity escapes are its job, not ours.
//
// A broken document yields the entries read before the error, then stops.
// =============================================================================

// Leading `::` picks the sitemap crate over this crate's own `sitemap` module
use ::sitemap::reader::{SiteMapEntity, SiteMapReader};

// Entries ending with one of these are files, never content pages
const EXCLUDED_EXTENSIONS: &[&str] = &[
    // Images
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".ico",
    // Documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx",
    // Archives
    ".zip", ".rar", ".tar", ".gz",
    // Media
    ".mp4", ".avi", ".mov", ".mp3", ".wav",
    // Assets
    ".css", ".js",
];

/// The `<loc>` entries of one sitemap document, in document order,
/// with non-content files already filtered out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    pub entries: Vec<String>,
}

impl SitemapDocument {
    /// Parses `text`; `document_url` is only used for log messages.
    pub fn parse(text: &str, document_url: &str) -> Self {
        let mut entries = Vec::new();

        for entity in SiteMapReader::new(text.as_bytes()) {
            let location = match entity {
                SiteMapEntity::Url(entry) => entry.loc,
                SiteMapEntity::SiteMap(entry) => entry.loc,
                SiteMapEntity::Err(e) => {
                    tracing::warn!(sitemap = document_url, error = %e, "Malformed sitemap XML");
                    break;
                }
            };

            match location.get_url() {
                Some(url) => {
                    let url = url.to_string();
                    if is_content_url(&url) {
                        entries.push(url);
                    }
                }
                None => tracing::debug!(sitemap = document_url, loc = ?location, "Skipping unusable <loc>"),
            }
        }

        Self { entries }
    }

    /// Whether this document should be treated as a sitemap index.
    ///
    /// Heuristic: no usable entries at all, or any entry mentions "sitemap".
    /// A content page whose URL happens to contain "sitemap" therefore turns
    /// its whole document into an index; that is the established behaviour.
    pub fn is_index(&self) -> bool {
        self.entries.is_empty() || self.entries.iter().any(|entry| entry.contains("sitemap"))
    }
}

// True unless the URL ends with a known non-content file extension
fn is_content_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    !EXCLUDED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URLSET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://ex.com/a.jpg</loc></url>
  <url><loc>https://ex.com/b.pdf</loc></url>
  <url><loc>https://ex.com/page</loc></url>
</urlset>"#;

    #[test]
    fn test_extension_filtering() {
        let doc = SitemapDocument::parse(URLSET, "https://ex.com/sitemap.xml");
        assert_eq!(doc.entries, vec!["https://ex.com/page"]);
        assert!(!doc.is_index());
    }

    #[test]
    fn test_extension_check_ignores_case() {
        assert!(!is_content_url("https://ex.com/PHOTO.JPG"));
        assert!(!is_content_url("https://ex.com/app.js"));
        assert!(is_content_url("https://ex.com/json-guide"));
    }

    #[test]
    fn test_sitemap_index_detection() {
        let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
            <sitemap><loc>https://ex.com/post-sitemap.xml</loc></sitemap>
            <sitemap><loc>https://ex.com/page-sitemap.xml</loc></sitemap>
        </sitemapindex>"#;
        let doc = SitemapDocument::parse(xml, "https://ex.com/sitemap_index.xml");
        assert_eq!(
            doc.entries,
            vec!["https://ex.com/post-sitemap.xml", "https://ex.com/page-sitemap.xml"]
        );
        assert!(doc.is_index());
    }

    #[test]
    fn test_non_sitemap_document_is_an_index() {
        let doc = SitemapDocument::parse("<html><body>Not found</body></html>", "https://ex.com/");
        assert!(doc.entries.is_empty());
        assert!(doc.is_index());
    }

    #[test]
    fn test_content_url_mentioning_sitemap_is_misclassified() {
        let xml = "<urlset><url><loc>https://ex.com/how-to-build-a-sitemap</loc></url></urlset>";
        let doc = SitemapDocument::parse(xml, "https://ex.com/sitemap.xml");
        assert!(doc.is_index());
    }

    #[test]
    fn test_escaped_query_strings_are_decoded() {
        let xml = "<urlset><url><loc>https://ex.com/a?x=1&amp;y=2</loc></url></urlset>";
        let doc = SitemapDocument::parse(xml, "https://ex.com/sitemap.xml");
        assert_eq!(doc.entries, vec!["https://ex.com/a?x=1&y=2"]);
    }

    #[test]
    fn test_truncated_document_keeps_earlier_entries() {
        let xml = "<urlset><url><loc>https://ex.com/first</loc></url><url><loc>https://ex.com/sec";
        let doc = SitemapDocument::parse(xml, "https://ex.com/sitemap.xml");
        assert_eq!(doc.entries, vec!["https://ex.com/first"]);
    }
}
