// src/verify/group.rs
// Splits verification outcomes up by the host of their URL.

use crate::verify::VerificationOutcome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// All outcomes that belong to one domain, in the order they were produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainGroup {
    pub domain: String,
    pub outcomes: Vec<VerificationOutcome>,
}

/// Groups outcomes by the domain of their URL, as written: "Shop.ex.com" and
/// "shop.ex.com" are different keys, and so are two ports on one host.
/// Outcomes keep their relative order inside a group. URLs that do not
/// parse, or have no host, are logged and left out.
pub fn group_by_domain(outcomes: &[VerificationOutcome]) -> BTreeMap<String, Vec<VerificationOutcome>> {
    let mut grouped: BTreeMap<String, Vec<VerificationOutcome>> = BTreeMap::new();

    for outcome in outcomes {
        match Url::parse(&outcome.url) {
            Ok(parsed) if parsed.host_str().is_some() => {}
            Ok(_) => {
                tracing::warn!(url = %outcome.url, "Skipping URL without a host while grouping");
                continue;
            }
            Err(e) => {
                tracing::warn!(url = %outcome.url, error = %e, "Skipping malformed URL while grouping");
                continue;
            }
        }

        match authority_as_written(&outcome.url) {
            Some(domain) => grouped.entry(domain.to_string()).or_default().push(outcome.clone()),
            None => tracing::warn!(url = %outcome.url, "Skipping URL without a host while grouping"),
        }
    }

    grouped
}

// "https://user@Shop.ex.com:8443/a?b" -> "Shop.ex.com:8443"
// `Url` lowercases the host and drops default ports, so the raw text is used
fn authority_as_written(url: &str) -> Option<&str> {
    let (_, rest) = url.trim().split_once("://")?;
    let authority = rest
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    if authority.is_empty() {
        None
    } else {
        Some(authority)
    }
}

/// Flattens the grouping into a list, ordered by domain name.
pub fn into_domain_groups(grouped: BTreeMap<String, Vec<VerificationOutcome>>) -> Vec<DomainGroup> {
    grouped
        .into_iter()
        .map(|(domain, outcomes)| DomainGroup { domain, outcomes })
        .collect()
}
