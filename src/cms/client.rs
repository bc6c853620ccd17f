// src/cms/client.rs
// =============================================================================
// A small client for the WordPress REST API (wp-json/wp/v2).
//
// Authentication uses an Application Password over HTTP basic auth.
// Certificate checks are disabled because many of the sites this talks to
// run self-signed certificates, and every call has the same short timeout.
// =============================================================================

use crate::cms::post::{Category, Post, PostKind, PostUpdate, RawPost, WpUser};
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use url::Url;

const API_PREFIX: &str = "/wp-json/wp/v2";

/// Credentials plus an HTTP client for one WordPress site.
#[derive(Debug, Clone)]
pub struct WordPressClient {
    client: Client,
    site_url: String,
    username: String,
    app_password: String,
}

impl WordPressClient {
    pub fn new(
        site_url: &str,
        username: impl Into<String>,
        app_password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let site_url = site_url.trim().trim_end_matches('/').to_string();
        if site_url.is_empty() {
            return Err(Error::InvalidArgument("site_url must not be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            site_url,
            username: username.into(),
            app_password: app_password.into(),
        })
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Checks the credentials by asking who they belong to.
    pub async fn test_connection(&self) -> Result<WpUser> {
        let response = self.get("/users/me").send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Api {
                status: status.as_u16(),
                message: format!("Authentication failed with status {}", status.as_u16()),
            });
        }

        Ok(response.json().await?)
    }

    /// Looks a slug up in one collection. `Ok(None)` means no match.
    pub async fn fetch_post_by_slug(&self, slug: &str, kind: PostKind) -> Result<Option<Post>> {
        let response = self
            .get(&format!("/{}", kind.collection()))
            .query(&[("slug", slug), ("_embed", "true")])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let mut posts: Vec<RawPost> = response.json().await?;
                if posts.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Post::from_raw(posts.swap_remove(0), None)))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(api_error(status, response).await),
        }
    }

    /// Resolves a full post URL by its slug: posts first, then pages.
    ///
    /// `Ok(None)` when neither collection has it. An error is only returned
    /// when no lookup succeeded and at least one of them failed.
    pub async fn fetch_post_by_url(&self, url: &str) -> Result<Option<Post>> {
        let Some(slug) = slug_from_url(url) else {
            return Ok(None);
        };

        let mut last_error = None;
        for kind in [PostKind::Post, PostKind::Page] {
            match self.fetch_post_by_slug(&slug, kind).await {
                Ok(Some(mut post)) => {
                    post.url = url.to_string();
                    return Ok(Some(post));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(url, slug = %slug, collection = kind.collection(), error = %e, "Slug lookup failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    /// Applies `update` to the post with id `post_id` and returns the new version.
    pub async fn update_post(&self, post_id: u64, update: &PostUpdate) -> Result<Post> {
        if update.is_empty() {
            return Err(Error::InvalidArgument("nothing to update".to_string()));
        }

        let response = self
            .authed(self.client.post(self.endpoint(&format!("/posts/{}", post_id))))
            .json(update)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(api_error(status, response).await);
        }

        let raw: RawPost = response.json().await?;
        tracing::info!(post_id, "Updated post");
        Ok(Post::from_raw(raw, None))
    }

    pub async fn update_post_content(&self, post_id: u64, content: &str) -> Result<Post> {
        let update = PostUpdate {
            content: Some(content.to_string()),
            ..Default::default()
        };
        self.update_post(post_id, &update).await
    }

    pub async fn update_post_title(&self, post_id: u64, title: &str) -> Result<Post> {
        let update = PostUpdate {
            title: Some(title.to_string()),
            ..Default::default()
        };
        self.update_post(post_id, &update).await
    }

    /// Lists categories by name, up to `per_page` of them.
    pub async fn categories(&self, per_page: u32) -> Result<Vec<Category>> {
        let per_page = per_page.to_string();
        let response = self
            .get("/categories")
            .query(&[("per_page", per_page.as_str()), ("orderby", "name"), ("order", "asc")])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(api_error(status, response).await);
        }

        Ok(response.json().await?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.site_url, API_PREFIX, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authed(self.client.get(self.endpoint(path)))
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.app_password))
    }
}

/// The slug WordPress would use for `url`: its last non-empty path segment.
///
/// "https://ex.com/2024/05/hello-world/" -> Some("hello-world")
/// "https://ex.com/"                     -> None
pub fn slug_from_url(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        // Not a full URL; treat the whole thing as a path
        Err(_) => url.split(|c| c == '?' || c == '#').next().unwrap_or_default().to_string(),
    };

    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

// WordPress error bodies look like {"code": "...", "message": "..."}
async fn api_error(status: StatusCode, response: Response) -> Error {
    let fallback = format!("Request failed with status {}", status.as_u16());
    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(fallback);

    Error::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // base64("editor:app-pass")
    const AUTH: &str = "Basic ZWRpdG9yOmFwcC1wYXNz";

    fn client_for(server: &MockServer) -> WordPressClient {
        WordPressClient::new(&format!("{}/", server.uri()), "editor", "app-pass", Duration::from_secs(5)).unwrap()
    }

    fn post_json(id: u64, slug: &str) -> serde_json::Value {
        json!({
            "id": id,
            "link": format!("https://blog.ex.com/{}/", slug),
            "title": { "rendered": format!("Post {}", id) },
            "content": { "rendered": "<p>body</p>" },
            "status": "publish"
        })
    }

    #[test]
    fn test_slug_from_url() {
        assert_eq!(slug_from_url("https://ex.com/2024/05/hello-world/").as_deref(), Some("hello-world"));
        assert_eq!(slug_from_url("https://ex.com/about?ref=nav#team").as_deref(), Some("about"));
        assert_eq!(slug_from_url("/just/a-path/").as_deref(), Some("a-path"));
        assert_eq!(slug_from_url("https://ex.com/"), None);
        assert_eq!(slug_from_url("https://ex.com"), None);
    }

    #[test]
    fn test_empty_site_url_is_rejected() {
        let result = WordPressClient::new(" / ", "u", "p", Duration::from_secs(1));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_post_lookup_uses_basic_auth_and_embed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/posts"))
            .and(query_param("slug", "hello"))
            .and(query_param("_embed", "true"))
            .and(header("authorization", AUTH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json(5, "hello")])))
            .mount(&server)
            .await;

        let post = client_for(&server)
            .fetch_post_by_url("https://blog.ex.com/hello/")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(post.id, 5);
        assert_eq!(post.url, "https://blog.ex.com/hello/");
    }

    #[tokio::test]
    async fn test_falls_back_to_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/pages"))
            .and(query_param("slug", "contact"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json(9, "contact")])))
            .mount(&server)
            .await;

        let post = client_for(&server)
            .fetch_post_by_url("https://blog.ex.com/contact")
            .await
            .unwrap();
        assert_eq!(post.map(|p| p.id), Some(9));
    }

    #[tokio::test]
    async fn test_auth_failure_is_an_error_not_a_miss() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "code": "rest_not_logged_in",
                "message": "You are not currently logged in."
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_post_by_url("https://blog.ex.com/x").await;
        match result {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "You are not currently logged in.");
            }
            other => panic!("expected an API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_returns_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1, "name": "Editor", "email": "editor@ex.com", "slug": "editor"
            })))
            .mount(&server)
            .await;

        let user = client_for(&server).test_connection().await.unwrap();
        assert_eq!(user.name, "Editor");
        assert_eq!(user.email.as_deref(), Some("editor@ex.com"));
    }

    #[tokio::test]
    async fn test_update_post_sends_only_changed_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wp-json/wp/v2/posts/12"))
            .and(body_json(json!({ "title": "Renamed" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(post_json(12, "renamed")))
            .expect(1)
            .mount(&server)
            .await;

        let post = client_for(&server).update_post_title(12, "Renamed").await.unwrap();
        assert_eq!(post.id, 12);
        assert_eq!(post.url, "https://blog.ex.com/renamed/");
    }

    #[tokio::test]
    async fn test_update_post_surfaces_wordpress_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "rest_cannot_edit",
                "message": "Sorry, you are not allowed to edit this post."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).update_post_content(3, "<p>x</p>").await.unwrap_err();
        assert_eq!(err.to_string(), "API error (status 403): Sorry, you are not allowed to edit this post.");

        let empty = client_for(&server).update_post(3, &PostUpdate::default()).await;
        assert!(matches!(empty, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_categories_are_listed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/categories"))
            .and(query_param("per_page", "100"))
            .and(query_param("orderby", "name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 2, "name": "Guides", "slug": "guides", "count": 4, "parent": 0 },
                { "id": 1, "name": "Uncategorized", "slug": "uncategorized", "count": 1, "parent": 0 }
            ])))
            .mount(&server)
            .await;

        let categories = client_for(&server).categories(100).await.unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Guides", "Uncategorized"]);
    }
}
