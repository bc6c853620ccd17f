// src/pipeline.rs
// =============================================================================
// The index-check pipeline: inputs -> candidate URLs -> outcomes -> groups.
//
// Inputs can be full URLs or bare domains:
// - "https://ex.com/page" is checked as given
// - "ex.com" is expanded through its sitemaps; if it has none, the
//   homepage "https://ex.com" is checked instead
// =============================================================================

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::sitemap::{CandidateUrl, SitemapResolver};
use crate::verify::{group_by_domain, into_domain_groups, verify_all, DomainGroup, SerperClient, VerificationOutcome};
use serde::Serialize;

/// Everything one index check produced
#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub candidates: Vec<CandidateUrl>,
    pub outcomes: Vec<VerificationOutcome>,
    pub groups: Vec<DomainGroup>,
}

impl IndexReport {
    pub fn indexed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_indexed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_error()).count()
    }

    pub fn not_indexed_count(&self) -> usize {
        self.outcomes.len() - self.indexed_count() - self.failed_count()
    }
}

/// Runs index checks end to end
#[derive(Debug, Clone)]
pub struct IndexChecker {
    resolver: SitemapResolver,
    serper: SerperClient,
    batch_size: usize,
    max_urls: usize,
}

impl IndexChecker {
    pub fn new(resolver: SitemapResolver, serper: SerperClient, batch_size: usize, max_urls: usize) -> Self {
        Self {
            resolver,
            serper,
            batch_size,
            max_urls,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            SitemapResolver::new(settings.sitemap_timeout)?,
            SerperClient::from_settings(settings)?,
            settings.batch_size,
            settings.max_urls,
        ))
    }

    /// Expands `inputs` into candidate URLs. Domains go through their
    /// sitemaps; URLs are passed through.
    pub async fn collect_candidates(&self, inputs: &[String]) -> Result<Vec<CandidateUrl>> {
        let mut candidates = Vec::new();

        for entry in inputs.iter().map(|e| e.trim()).filter(|e| !e.is_empty()) {
            if entry.starts_with("http") {
                candidates.push(CandidateUrl::direct(entry));
                continue;
            }

            tracing::info!(domain = entry, "Domain input detected");
            let found = self.resolver.resolve(entry, self.max_urls).await?;
            if found.is_empty() {
                tracing::info!(domain = entry, "No sitemap found, treating as single URL");
                candidates.push(CandidateUrl::direct(format!("https://{}", entry)));
            } else {
                tracing::info!(domain = entry, count = found.len(), "Found URLs from sitemap");
                candidates.extend(found);
            }
        }

        if candidates.is_empty() {
            return Err(Error::InvalidArgument("no valid URLs or sitemaps found".to_string()));
        }

        Ok(candidates)
    }

    /// Resolves, verifies and groups. Per-URL failures live inside the
    /// report; an Err means the inputs themselves were unusable.
    pub async fn check(&self, inputs: &[String]) -> Result<IndexReport> {
        let candidates = self.collect_candidates(inputs).await?;
        let urls: Vec<String> = candidates.iter().map(|c| c.url.clone()).collect();

        tracing::info!(total = urls.len(), "URLs to check for indexing");
        let outcomes = verify_all(&self.serper, &urls, self.batch_size).await?;
        let groups = into_domain_groups(group_by_domain(&outcomes));

        Ok(IndexReport {
            candidates,
            outcomes,
            groups,
        })
    }
}

/// Reduces "https://www.ex.com/some/path" to "www.ex.com" for sitemap lookup.
pub fn normalize_domain(input: &str) -> String {
    input
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
