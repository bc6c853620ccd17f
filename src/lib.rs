// src/lib.rs
// =============================================================================
// index-guardian: find a site's pages, check whether Google has indexed
// them, and pull post metadata out of WordPress.
//
// Modules, leaf first:
// - error: the crate's error type
// - config: settings from the environment
// - sitemap: sitemap discovery and flattening
// - verify: batched Serper index checks and per-domain grouping
// - cms: WordPress REST client and the concurrent post fetcher
// - pipeline: ties sitemap -> verify -> group together
// =============================================================================

pub mod cms;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod sitemap;
pub mod verify;

pub use config::Settings;
pub use error::{Error, Result};
