// src/main.rs
// =============================================================================
// This is the entry point of the index-guardian CLI.
//
// What happens here:
// 1. Load .env, set up logging, parse command-line arguments
// 2. Dispatch to the handler for the chosen subcommand
// 3. Print results as a table or JSON
// 4. Exit with a proper code (0 = all good, 1 = some items not indexed or
//    failed, 2 = error)
//
// All the real work lives in the library (src/lib.rs); this file only wires
// settings and arguments into it and formats the output.
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, WordPressArgs};
use index_guardian::cms::{FetchOutcome, PostUpdate, WordPressClient};
use index_guardian::pipeline::{normalize_domain, IndexChecker, IndexReport};
use index_guardian::sitemap::{CandidateUrl, SitemapResolver};
use index_guardian::verify::VerificationOutcome;
use index_guardian::Settings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Before parsing, so WP_* variables from .env can fill in flags
    let _ = dotenvy::dotenv();
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so `--json` output on stdout stays machine-readable.
// RUST_LOG overrides the default level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("index_guardian=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let mut settings = Settings::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Check {
            inputs,
            batch_size,
            max_urls,
            json,
        } => {
            settings.batch_size = batch_size.unwrap_or(settings.batch_size);
            settings.max_urls = max_urls.unwrap_or(settings.max_urls);
            handle_check(&settings, &inputs, json).await
        }
        Commands::Sitemap { domain, max_urls, json } => {
            let max_urls = max_urls.unwrap_or(settings.max_urls);
            handle_sitemap(&settings, &domain, max_urls, json).await
        }
        Commands::Posts {
            site,
            urls,
            workers,
            links,
            json,
        } => {
            let workers = workers.unwrap_or(settings.max_workers);
            handle_posts(&settings, &site, &urls, workers, links, json).await
        }
        Commands::Categories { site, per_page, json } => {
            handle_categories(&settings, &site, per_page, json).await
        }
        Commands::TestConnection { site } => handle_test_connection(&settings, &site).await,
        Commands::UpdatePost {
            site,
            post_id,
            title,
            content,
            excerpt,
            status,
            categories,
            seo_title,
            seo_description,
            json,
        } => {
            let update = PostUpdate {
                title,
                content,
                excerpt,
                status,
                categories,
                yoast_wpseo_title: seo_title,
                yoast_wpseo_metadesc: seo_description,
            };
            handle_update_post(&settings, &site, post_id, &update, json).await
        }
    }
}

// Handles the 'check' subcommand
async fn handle_check(settings: &Settings, inputs: &[String], json: bool) -> Result<i32> {
    let checker = IndexChecker::from_settings(settings)?;

    // With --json, stdout carries nothing but the JSON document
    if !json {
        println!("🔍 Checking {} input(s) (batch size {})", inputs.len(), settings.batch_size);
    }
    let report = checker.check(inputs).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.indexed_count() == report.outcomes.len() {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Handles the 'sitemap' subcommand
async fn handle_sitemap(settings: &Settings, domain: &str, max_urls: usize, json: bool) -> Result<i32> {
    let domain = normalize_domain(domain);
    let resolver = SitemapResolver::new(settings.sitemap_timeout)?;

    let urls = resolver.resolve(&domain, max_urls).await?;
    print!("{}", render_sitemap(&domain, &urls, json)?);

    Ok(0)
}

// Everything the 'sitemap' subcommand writes to stdout
fn render_sitemap(domain: &str, urls: &[CandidateUrl], json: bool) -> Result<String> {
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(urls)?));
    }

    let mut out = format!("📡 Sitemap for: {}\n", domain);
    if urls.is_empty() {
        out.push_str("⚠️  No sitemap found. You can still check the domain homepage.\n");
    } else {
        for candidate in urls {
            out.push_str(&candidate.url);
            out.push('\n');
        }
        out.push_str(&format!("\n📋 Total: {}\n", urls.len()));
    }
    Ok(out)
}

// Handles the 'posts' subcommand
async fn handle_posts(
    settings: &Settings,
    site: &WordPressArgs,
    urls: &[String],
    workers: usize,
    links: bool,
    json: bool,
) -> Result<i32> {
    let client = wordpress_client(settings, site)?;

    if !json {
        println!("📄 Fetching {} post(s) from {} with {} worker(s)", urls.len(), client.site_url(), workers);
    }
    let outcomes = client.fetch_all(urls, workers).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        print_posts(&outcomes, links);
    }

    let failed = outcomes.iter().filter(|o| o.is_error()).count();
    Ok(if failed > 0 { 1 } else { 0 })
}

// Handles the 'categories' subcommand
async fn handle_categories(settings: &Settings, site: &WordPressArgs, per_page: u32, json: bool) -> Result<i32> {
    let client = wordpress_client(settings, site)?;
    let categories = client.categories(per_page).await.context("Failed to fetch categories")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
    } else {
        println!("{:<8} {:<40} {:<8}", "ID", "NAME", "POSTS");
        println!("{}", "=".repeat(58));
        for category in &categories {
            println!("{:<8} {:<40} {:<8}", category.id, truncate(&category.name, 40), category.count);
        }
    }

    Ok(0)
}

// Handles the 'test-connection' subcommand
async fn handle_test_connection(settings: &Settings, site: &WordPressArgs) -> Result<i32> {
    let client = wordpress_client(settings, site)?;

    match client.test_connection().await {
        Ok(user) => {
            println!("✅ Connection successful: logged in as {} (id {})", user.name, user.id);
            Ok(0)
        }
        Err(e) => {
            println!("❌ Connection failed: {}", e);
            Ok(1)
        }
    }
}

// Handles the 'update-post' subcommand
async fn handle_update_post(
    settings: &Settings,
    site: &WordPressArgs,
    post_id: u64,
    update: &PostUpdate,
    json: bool,
) -> Result<i32> {
    let client = wordpress_client(settings, site)?;
    let post = client
        .update_post(post_id, update)
        .await
        .with_context(|| format!("Failed to update post {}", post_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&post)?);
    } else {
        println!("✅ Updated post {}: {}", post.id, post.title);
    }

    Ok(0)
}

fn wordpress_client(settings: &Settings, site: &WordPressArgs) -> Result<WordPressClient> {
    let client = WordPressClient::new(
        &site.site_url,
        site.username.as_str(),
        site.app_password.as_str(),
        settings.wordpress_timeout,
    )?;
    Ok(client)
}

// Prints index results grouped by domain, then a summary
fn print_report(report: &IndexReport) {
    for group in &report.groups {
        println!("\n🌐 {} ({} URL(s))", group.domain, group.outcomes.len());
        print_outcome_table(&group.outcomes);
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Indexed: {}", report.indexed_count());
    println!("   ❌ Not indexed: {}", report.not_indexed_count());
    println!("   ⚠️  Errors: {}", report.failed_count());
    println!("   📋 Total: {}", report.outcomes.len());
}

fn print_outcome_table(outcomes: &[VerificationOutcome]) {
    println!("{:<60} {:<15} {:<30}", "URL", "STATUS", "DETAIL");
    println!("{}", "=".repeat(105));

    for outcome in outcomes {
        let detail = outcome.detail.as_deref().unwrap_or("");
        println!(
            "{:<60} {:<15} {:<30}",
            truncate(&outcome.url, 57),
            outcome.state.to_string(),
            detail
        );
    }
}

fn print_posts(outcomes: &[FetchOutcome], links: bool) {
    println!("{:<60} {:<8} {:<10} {:<30}", "URL", "ID", "STATUS", "TITLE / ERROR");
    println!("{}", "=".repeat(110));

    for outcome in outcomes {
        match outcome {
            FetchOutcome::Fetched(post) => {
                println!(
                    "{:<60} {:<8} {:<10} {:<30}",
                    truncate(&post.url, 57),
                    post.id,
                    post.status,
                    truncate(&post.title, 30)
                );
                if links {
                    for link in post.outgoing_links() {
                        println!("    ↳ {} [{}] {}", link.domain, link.anchor, link.url);
                    }
                }
            }
            FetchOutcome::Failed { url, error } => {
                println!("{:<60} {:<8} {:<10} {:<30}", truncate(url, 57), "-", "ERROR", error);
            }
        }
    }

    let failed = outcomes.iter().filter(|o| o.is_error()).count();
    println!();
    println!("📊 Summary:");
    println!("   ✅ Fetched: {}", outcomes.len() - failed);
    println!("   ❌ Failed: {}", failed);
    println!("   📋 Total: {}", outcomes.len());
}

// Shortens long values for the table, on a character boundary
fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let cut: String = value.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sitemap_json_output_is_pure_json() {
        let urls = vec![CandidateUrl::from_sitemap("https://ex.com/a")];

        let out = render_sitemap("ex.com", &urls, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["url"], "https://ex.com/a");

        let empty = render_sitemap("ex.com", &[], true).unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&empty).unwrap(), serde_json::json!([]));
    }

    #[test]
    fn test_sitemap_table_output() {
        let urls = vec![CandidateUrl::from_sitemap("https://ex.com/a")];
        let out = render_sitemap("ex.com", &urls, false).unwrap();
        assert!(out.contains("https://ex.com/a\n"));
        assert!(out.contains("Total: 1"));
    }
}
