// src/sitemap/resolver.rs
// =============================================================================
// Finds a domain's sitemap and flattens it into a list of page URLs.
//
// How it works:
// 1. Probe the usual sitemap locations, HTTPS first, then HTTP
// 2. Parse the first document that answers with XML (or text)
// 3. If it is a sitemap index, fetch every child sitemap and repeat,
//    depth first, so URLs come out in document order
// 4. Stop the moment `max_urls` unique URLs have been collected
//
// Each call to `resolve` owns its own visit set. A sitemap that points back
// at itself (or at a sibling that points back) is fetched once and then
// skipped, so cycles cannot keep the walk alive.
//
// Nothing here is fatal: a document that fails to download or parse is
// logged and skipped. Finding nothing at all returns an empty list.
// =============================================================================

use crate::error::{Error, Result};
use crate::sitemap::{CandidateUrl, SitemapDocument};
use futures::future::{BoxFuture, FutureExt};
use reqwest::{header, Client, StatusCode};
use std::collections::HashSet;
use std::time::Duration;

/// Nesting limit for sitemap indexes. The visit set already breaks cycles;
/// this only stops pathological chains of distinct index documents.
const MAX_SITEMAP_DEPTH: usize = 8;

const USER_AGENT: &str = "Mozilla/5.0";

// Per-run bookkeeping: which sitemap documents were fetched, which page URLs
// were emitted. Never shared between runs.
#[derive(Debug, Default)]
struct SitemapVisitSet {
    documents: HashSet<String>,
    urls: HashSet<String>,
}

impl SitemapVisitSet {
    // Returns false when the document was already fetched in this run
    fn mark_document(&mut self, url: &str) -> bool {
        self.documents.insert(url.to_string())
    }
}

struct ResolveRun {
    visits: SitemapVisitSet,
    collected: Vec<CandidateUrl>,
    max_urls: usize,
}

impl ResolveRun {
    fn new(max_urls: usize) -> Self {
        Self {
            visits: SitemapVisitSet::default(),
            collected: Vec::new(),
            max_urls,
        }
    }

    fn is_full(&self) -> bool {
        self.collected.len() >= self.max_urls
    }

    fn remaining(&self) -> usize {
        self.max_urls.saturating_sub(self.collected.len())
    }

    // Adds a page URL unless it was seen before or the budget is spent
    fn push(&mut self, url: String) {
        if self.is_full() || self.visits.urls.contains(&url) {
            return;
        }
        self.visits.urls.insert(url.clone());
        self.collected.push(CandidateUrl::from_sitemap(url));
    }
}

/// Resolves domains to the page URLs listed in their sitemaps.
#[derive(Debug, Clone)]
pub struct SitemapResolver {
    client: Client,
}

impl SitemapResolver {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            // Plenty of small sites run on self-signed certificates
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// The sitemap locations probed for `domain`, in priority order.
    pub fn candidate_locations(domain: &str) -> [String; 4] {
        [
            format!("https://{}/sitemap.xml", domain),
            format!("https://{}/sitemap_index.xml", domain),
            format!("http://{}/sitemap.xml", domain),
            format!("http://{}/sitemap_index.xml", domain),
        ]
    }

    /// Collects up to `max_urls` unique page URLs from the sitemaps of
    /// `domain` (a bare host, optionally with a port).
    ///
    /// An empty result means no usable sitemap was found.
    pub async fn resolve(&self, domain: &str, max_urls: usize) -> Result<Vec<CandidateUrl>> {
        if max_urls == 0 {
            return Err(Error::InvalidArgument("max_urls must be greater than zero".to_string()));
        }
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(Error::InvalidArgument("domain must not be empty".to_string()));
        }

        let mut run = ResolveRun::new(max_urls);

        for candidate in Self::candidate_locations(domain) {
            if !run.visits.mark_document(&candidate) {
                continue;
            }

            tracing::info!(sitemap = %candidate, "Fetching sitemap");
            let (document_url, body) = match self.fetch_document(&candidate, true).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    tracing::warn!(sitemap = %candidate, error = %e, "Sitemap unavailable");
                    continue;
                }
            };

            let before = run.collected.len();
            self.walk(document_url, body, 0, &mut run).await;
            let found = run.collected.len() - before;

            if run.is_full() {
                tracing::info!(max_urls, "Reached URL limit");
                break;
            }
            if found > 0 {
                tracing::info!(sitemap = %candidate, found, "Found URLs in sitemap");
                break;
            }
        }

        tracing::info!(domain, total = run.collected.len(), "Sitemap resolution finished");
        Ok(run.collected)
    }

    // Processes one downloaded document and, for an index, its children.
    // Boxed because it recurses.
    fn walk<'a>(
        &'a self,
        document_url: String,
        body: String,
        depth: usize,
        run: &'a mut ResolveRun,
    ) -> BoxFuture<'a, ()> {
        async move {
            let document = SitemapDocument::parse(&body, &document_url);

            if !document.is_index() {
                for url in document.entries {
                    if run.is_full() {
                        return;
                    }
                    run.push(url);
                }
                return;
            }

            if depth >= MAX_SITEMAP_DEPTH {
                tracing::warn!(sitemap = %document_url, depth, "Sitemap nesting too deep, skipping");
                return;
            }

            for child in document.entries {
                if run.is_full() {
                    return;
                }
                if !run.visits.mark_document(&child) {
                    tracing::debug!(sitemap = %child, "Skipping already fetched sitemap");
                    continue;
                }

                tracing::info!(sitemap = %child, remaining = run.remaining(), "Fetching nested sitemap");
                match self.fetch_document(&child, false).await {
                    Ok((child_url, child_body)) => {
                        self.walk(child_url, child_body, depth + 1, run).await;
                    }
                    Err(e) => {
                        tracing::warn!(sitemap = %child, error = %e, "Error fetching nested sitemap");
                    }
                }
            }
        }
        .boxed()
    }

    // Downloads one sitemap document. Returns (final URL after redirects, body).
    // Probes of the well-known locations also insist on an XML or text
    // content type.
    async fn fetch_document(&self, url: &str, probe: bool) -> Result<(String, String)> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Api {
                status: status.as_u16(),
                message: format!("sitemap not found: {}", url),
            });
        }

        if probe {
            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            if !content_type.contains("xml") && !content_type.contains("text") {
                return Err(Error::Parse(format!("not XML content: {}", content_type)));
            }
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;
        Ok((final_url, body))
    }
}
