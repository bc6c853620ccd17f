// src/cms/mod.rs
// =============================================================================
// This module talks to WordPress sites through their REST API.
//
// Submodules:
// - client: authenticated calls (look up posts/pages, update posts, categories)
// - fetcher: fetches many post URLs at once with a bounded worker pool
// - post: the post, category and outcome types
// - links: finds external links inside a post body
// =============================================================================

mod client;
mod fetcher;
mod links;
mod post;

pub use client::{slug_from_url, WordPressClient};
pub use links::{extract_outgoing_links, OutgoingLink};
pub use post::{Category, CategoryRef, FetchOutcome, Post, PostKind, PostUpdate, WpUser};
