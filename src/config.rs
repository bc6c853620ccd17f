// src/config.rs
// =============================================================================
// Runtime settings, read from the environment (and a .env file if present).
//
// Every knob has a sensible default except the Serper API key, which is only
// demanded by the code paths that actually talk to Serper.
// =============================================================================

use crate::error::{Error, Result};
use std::time::Duration;

pub const DEFAULT_SERPER_URL: &str = "https://google.serper.dev/search";
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_MAX_URLS: usize = 10_000;
pub const DEFAULT_MAX_WORKERS: usize = 10;

#[derive(Debug, Clone)]
pub struct Settings {
    pub serper_api_key: Option<String>,
    pub serper_url: String,
    /// URLs verified per batch; also the number of Serper calls in flight
    pub batch_size: usize,
    /// Upper bound on URLs collected from one domain's sitemaps
    pub max_urls: usize,
    /// Worker tasks used when fetching WordPress posts
    pub max_workers: usize,
    pub serper_timeout: Duration,
    pub sitemap_timeout: Duration,
    pub wordpress_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            serper_api_key: None,
            serper_url: DEFAULT_SERPER_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_urls: DEFAULT_MAX_URLS,
            max_workers: DEFAULT_MAX_WORKERS,
            serper_timeout: Duration::from_secs(20),
            sitemap_timeout: Duration::from_secs(10),
            wordpress_timeout: Duration::from_secs(10),
        }
    }
}

impl Settings {
    /// Load settings from the process environment, after reading `.env`.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is normal outside development
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Tests feed a map through this.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        Ok(Self {
            serper_api_key: lookup("SERPER_API_KEY").filter(|key| !key.trim().is_empty()),
            serper_url: lookup("SERPER_URL").unwrap_or(defaults.serper_url),
            batch_size: parse_count(&lookup, "INDEX_BATCH_SIZE", defaults.batch_size)?,
            max_urls: parse_count(&lookup, "SITEMAP_MAX_URLS", defaults.max_urls)?,
            max_workers: parse_count(&lookup, "FETCH_MAX_WORKERS", defaults.max_workers)?,
            serper_timeout: parse_secs(&lookup, "SERPER_TIMEOUT_SECS", defaults.serper_timeout)?,
            sitemap_timeout: parse_secs(&lookup, "SITEMAP_TIMEOUT_SECS", defaults.sitemap_timeout)?,
            wordpress_timeout: parse_secs(
                &lookup,
                "WORDPRESS_TIMEOUT_SECS",
                defaults.wordpress_timeout,
            )?,
        })
    }

    /// The Serper key, or a configuration error naming the missing variable.
    pub fn require_serper_key(&self) -> Result<&str> {
        self.serper_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("SERPER_API_KEY is not set".to_string()))
    }
}

fn parse_count<F>(lookup: &F, key: &str, default: usize) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(0) => Err(Error::Config(format!("{} must be greater than zero", key))),
            Ok(value) => Ok(value),
            Err(_) => Err(Error::Config(format!("{} is not a number: {}", key, raw))),
        },
    }
}

fn parse_secs<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    parse_count(lookup, key, default.as_secs() as usize).map(|secs| Duration::from_secs(secs as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let settings = settings_from(&[]).unwrap();
        assert_eq!(settings.batch_size, 10);
        assert_eq!(settings.max_urls, 10_000);
        assert_eq!(settings.max_workers, 10);
        assert_eq!(settings.serper_url, DEFAULT_SERPER_URL);
        assert_eq!(settings.serper_timeout, Duration::from_secs(20));
        assert!(settings.serper_api_key.is_none());
        assert!(settings.require_serper_key().is_err());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let settings = settings_from(&[
            ("SERPER_API_KEY", "secret"),
            ("INDEX_BATCH_SIZE", "25"),
            ("SITEMAP_MAX_URLS", " 500 "),
            ("WORDPRESS_TIMEOUT_SECS", "3"),
        ])
        .unwrap();
        assert_eq!(settings.require_serper_key().unwrap(), "secret");
        assert_eq!(settings.batch_size, 25);
        assert_eq!(settings.max_urls, 500);
        assert_eq!(settings.wordpress_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(matches!(
            settings_from(&[("INDEX_BATCH_SIZE", "ten")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            settings_from(&[("FETCH_MAX_WORKERS", "0")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let settings = settings_from(&[("SERPER_API_KEY", "  ")]).unwrap();
        assert!(settings.serper_api_key.is_none());
    }
}
