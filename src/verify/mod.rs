// src/verify/mod.rs
// =============================================================================
// This module answers "is this page in the search index?" for many URLs.
//
// Submodules:
// - serper: one Serper "site:" query per URL
// - batch: runs those queries batch by batch, concurrently within a batch
// - group: splits finished outcomes up by domain
//
// Every URL handed in comes back out as exactly one VerificationOutcome.
// Failures are outcomes too (state = Error), never missing entries.
// =============================================================================

mod batch;
mod group;
mod serper;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use batch::verify_all;
pub use group::{group_by_domain, into_domain_groups, DomainGroup};
pub use serper::SerperClient;

/// Index status of one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexState {
    Indexed,
    NotIndexed,
    Error,
}

impl fmt::Display for IndexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IndexState::Indexed => "Indexed",
            IndexState::NotIndexed => "Not Indexed",
            IndexState::Error => "Error",
        };
        f.write_str(label)
    }
}

/// The result of checking one URL. Built once, never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub url: String,
    pub state: IndexState,
    /// Why the check failed (e.g. "HTTP 429" or "Timeout")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl VerificationOutcome {
    pub fn indexed(url: impl Into<String>) -> Self {
        Self::new(url, IndexState::Indexed, None)
    }

    pub fn not_indexed(url: impl Into<String>) -> Self {
        Self::new(url, IndexState::NotIndexed, None)
    }

    pub fn error(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(url, IndexState::Error, Some(detail.into()))
    }

    fn new(url: impl Into<String>, state: IndexState, detail: Option<String>) -> Self {
        Self {
            url: url.into(),
            state,
            detail,
            checked_at: Utc::now(),
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.state == IndexState::Indexed
    }

    pub fn is_error(&self) -> bool {
        self.state == IndexState::Error
    }
}
