// src/cms/post.rs
// =============================================================================
// WordPress data types.
//
// The REST API returns a deeply nested JSON shape (title.rendered,
// _embedded["wp:term"], yoast_head_json, ...). We read it into private Raw*
// structs and flatten that into a `Post`, the record the rest of the crate
// works with.
// =============================================================================

use crate::cms::links::{extract_outgoing_links, OutgoingLink};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Which REST collection to look a slug up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    Post,
    Page,
}

impl PostKind {
    pub fn collection(&self) -> &'static str {
        match self {
            PostKind::Post => "posts",
            PostKind::Page => "pages",
        }
    }
}

/// A category attached to a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: u64,
    pub name: String,
}

/// A post (or page) as fetched from WordPress
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: u64,
    pub url: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub status: String,
    pub categories: Vec<CategoryRef>,
    pub featured_image: Option<String>,
    pub seo_title: String,
    pub seo_description: String,
    pub date_modified: Option<NaiveDateTime>,
    pub author_id: Option<u64>,
}

impl Post {
    /// External links found in the post body.
    pub fn outgoing_links(&self) -> Vec<OutgoingLink> {
        extract_outgoing_links(&self.content, &self.url)
    }

    // `requested_url` wins over the API's own permalink so outcomes can be
    // matched back to the URLs the caller asked for
    pub(crate) fn from_raw(raw: RawPost, requested_url: Option<&str>) -> Self {
        let title = raw.title.map(|t| t.rendered).unwrap_or_default();

        let mut categories = Vec::new();
        let mut featured_image = None;
        if let Some(embedded) = raw.embedded {
            for term in embedded.terms.into_iter().flatten() {
                if term.taxonomy.as_deref() != Some("category") {
                    continue;
                }
                if let (Some(id), Some(name)) = (term.id, term.name) {
                    categories.push(CategoryRef { id, name });
                }
            }
            featured_image = embedded
                .featured_media
                .into_iter()
                .next()
                .and_then(|media| media.source_url);
        }

        let yoast = raw.yoast_head_json.unwrap_or_default();

        Self {
            id: raw.id,
            url: requested_url
                .map(str::to_string)
                .or(raw.link)
                .unwrap_or_default(),
            seo_title: yoast.title.unwrap_or_else(|| title.clone()),
            seo_description: yoast.description.unwrap_or_default(),
            title,
            content: raw.content.map(|c| c.rendered).unwrap_or_default(),
            excerpt: raw.excerpt.map(|e| e.rendered).unwrap_or_default(),
            status: raw.status.unwrap_or_else(|| "publish".to_string()),
            categories,
            featured_image,
            date_modified: raw
                .modified
                .and_then(|m| NaiveDateTime::parse_from_str(&m, "%Y-%m-%dT%H:%M:%S").ok()),
            author_id: raw.author,
        }
    }
}

/// The result of fetching one URL: the post, or why it could not be fetched.
/// Exactly one of the two, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FetchOutcome {
    Fetched(Post),
    Failed { url: String, error: String },
}

impl FetchOutcome {
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        FetchOutcome::Failed {
            url: url.into(),
            error: error.into(),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchOutcome::Fetched(post) => &post.url,
            FetchOutcome::Failed { url, .. } => url,
        }
    }

    pub fn post(&self) -> Option<&Post> {
        match self {
            FetchOutcome::Fetched(post) => Some(post),
            FetchOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchOutcome::Fetched(_) => None,
            FetchOutcome::Failed { error, .. } => Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }
}

/// A category from the site's category listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub parent: u64,
}

/// The account the credentials belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpUser {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Fields to change on a post. Unset fields are left alone by WordPress.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<u64>>,
    /// Yoast SEO title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yoast_wpseo_title: Option<String>,
    /// Yoast SEO meta description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yoast_wpseo_metadesc: Option<String>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        *self == PostUpdate::default()
    }
}

// ---- raw REST shapes -------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Rendered {
    #[serde(default)]
    rendered: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPost {
    id: u64,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    title: Option<Rendered>,
    #[serde(default)]
    content: Option<Rendered>,
    #[serde(default)]
    excerpt: Option<Rendered>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    modified: Option<String>,
    #[serde(default)]
    author: Option<u64>,
    #[serde(rename = "_embedded", default)]
    embedded: Option<Embedded>,
    #[serde(default)]
    yoast_head_json: Option<YoastHead>,
}

#[derive(Debug, Default, Deserialize)]
struct Embedded {
    #[serde(rename = "wp:term", default)]
    terms: Vec<Vec<Term>>,
    #[serde(rename = "wp:featuredmedia", default)]
    featured_media: Vec<Media>,
}

#[derive(Debug, Deserialize)]
struct Term {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    taxonomy: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Media {
    #[serde(default)]
    source_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct YoastHead {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}
