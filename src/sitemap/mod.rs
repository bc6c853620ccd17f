// src/sitemap/mod.rs
// =============================================================================
// This module discovers the pages of a site through its sitemaps.
//
// Submodules:
// - parse: reads <loc> entries out of one sitemap document
// - resolver: probes the usual sitemap locations and walks sitemap indexes
//
// Only sitemap documents are followed. Links inside pages are never crawled.
// =============================================================================

mod parse;
mod resolver;

use serde::{Deserialize, Serialize};

pub(crate) use parse::SitemapDocument;
pub use resolver::SitemapResolver;

/// Where a candidate URL came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Found in a sitemap document
    Sitemap,
    /// Supplied directly by the caller (or the https:// fallback for a domain)
    Direct,
}

/// A page worth checking, before any check has happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateUrl {
    pub url: String,
    pub provenance: Provenance,
}

impl CandidateUrl {
    pub fn from_sitemap(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            provenance: Provenance::Sitemap,
        }
    }

    pub fn direct(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            provenance: Provenance::Direct,
        }
    }
}
