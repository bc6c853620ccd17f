// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - check:           sitemap discovery + index verification, grouped by domain
// - sitemap:         sitemap discovery only
// - posts:           fetch WordPress posts for a list of URLs
// - categories:      list a WordPress site's categories
// - test-connection: check WordPress credentials
// - update-post:     change fields on one WordPress post
//
// Defaults for batch size, URL cap and worker count come from the
// environment (see config.rs); the flags here override them.
// =============================================================================

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "index-guardian",
    version = "0.1.0",
    about = "Check which pages of a site Google has indexed, and fetch WordPress posts",
    long_about = "index-guardian discovers pages through sitemaps, checks each one against the \
                  Serper search API, and fetches post metadata from WordPress sites concurrently."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether pages are indexed
    ///
    /// Example: index-guardian check example.com https://other.org/page
    Check {
        /// Domains (expanded through their sitemaps) or full URLs
        #[arg(required = true)]
        inputs: Vec<String>,

        /// URLs checked concurrently per batch
        #[arg(long)]
        batch_size: Option<usize>,

        /// Maximum URLs taken from one domain's sitemaps
        #[arg(long)]
        max_urls: Option<usize>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the URLs found in a domain's sitemaps without checking them
    ///
    /// Example: index-guardian sitemap example.com --max-urls 500
    Sitemap {
        /// Domain to look up; a scheme or path is stripped
        domain: String,

        #[arg(long)]
        max_urls: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Fetch WordPress posts (or pages) for a list of URLs
    Posts {
        #[command(flatten)]
        site: WordPressArgs,

        /// Post or page URLs on that site
        #[arg(required = true)]
        urls: Vec<String>,

        /// Number of concurrent fetch workers
        #[arg(long)]
        workers: Option<usize>,

        /// Also list the external links found in each post
        #[arg(long)]
        links: bool,

        #[arg(long)]
        json: bool,
    },

    /// List the categories of a WordPress site
    Categories {
        #[command(flatten)]
        site: WordPressArgs,

        #[arg(long, default_value_t = 100)]
        per_page: u32,

        #[arg(long)]
        json: bool,
    },

    /// Check WordPress credentials
    TestConnection {
        #[command(flatten)]
        site: WordPressArgs,
    },

    /// Update fields of one WordPress post
    UpdatePost {
        #[command(flatten)]
        site: WordPressArgs,

        /// Numeric post id
        post_id: u64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        excerpt: Option<String>,

        /// publish, draft, pending, private, ...
        #[arg(long)]
        status: Option<String>,

        /// Comma-separated category ids, e.g. --categories 3,7
        #[arg(long, value_delimiter = ',')]
        categories: Option<Vec<u64>>,

        /// Yoast SEO title
        #[arg(long)]
        seo_title: Option<String>,

        /// Yoast SEO meta description
        #[arg(long)]
        seo_description: Option<String>,

        #[arg(long)]
        json: bool,
    },
}

/// Credentials for one WordPress site
#[derive(Args, Debug)]
pub struct WordPressArgs {
    /// Site root, e.g. https://blog.example.com
    #[arg(long, env = "WP_SITE_URL")]
    pub site_url: String,

    #[arg(long, env = "WP_USERNAME")]
    pub username: String,

    /// Application Password generated in the WordPress profile screen
    #[arg(long, env = "WP_APP_PASSWORD", hide_env_values = true)]
    pub app_password: String,
}
