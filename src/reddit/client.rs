use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::models::{
    CommentThing, CommentTree, Listing, MoreChildrenResponse, Post, PostThing,
};
use super::tree::TreeAssembler;
use super::url::parse_post_url;
use super::{RedditError, RedditProvider};
use crate::config::Config;

/// Maximum number of ids accepted by one `/api/morechildren` call.
const MORE_CHILDREN_BATCH: usize = 100;

/// Refresh tokens this long before Reddit says they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expiry")]
    expires_in: u64,
}

const fn default_expiry() -> u64 {
    3600
}

#[derive(Debug)]
struct AccessToken {
    value: String,
    refresh_at: Instant,
}

/// Read-only Reddit API client using application-only OAuth.
pub struct RedditClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    api_base: String,
    auth_base: String,
    token: Mutex<Option<AccessToken>>,
}

impl RedditClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing or the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, RedditError> {
        if config.reddit_client_id.is_empty() || config.reddit_client_secret.is_empty() {
            return Err(RedditError::MissingCredentials);
        }

        let http = reqwest::Client::builder()
            .user_agent(&config.reddit_user_agent)
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            http,
            client_id: config.reddit_client_id.clone(),
            client_secret: config.reddit_client_secret.clone(),
            api_base: config.reddit_api_base.trim_end_matches('/').to_string(),
            auth_base: config.reddit_auth_base.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        })
    }

    /// Get a valid access token, requesting a new one when needed.
    async fn access_token(&self) -> Result<String, RedditError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let url = format!("{}/api/v1/access_token", self.auth_base);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RedditError::Auth(format!(
                "Reddit rejected the API credentials ({status})"
            )));
        }
        if !status.is_success() {
            return Err(RedditError::Status { status, url });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| RedditError::Auth(format!("Invalid token response: {e}")))?;

        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        debug!(expires_in = body.expires_in, "Obtained Reddit access token");

        let value = body.access_token.clone();
        *guard = Some(AccessToken {
            value: body.access_token,
            refresh_at: Instant::now() + lifetime,
        });
        Ok(value)
    }

    /// GET an API path and decode the JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RedditError> {
        let token = self.access_token().await?;
        let url = format!("{}{path}", self.api_base);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RedditError::NotFound(url));
        }
        if !status.is_success() {
            return Err(RedditError::Status { status, url });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| RedditError::Parse(format!("Unexpected response from {path}: {e}")))
    }

    /// Fetch the comment listing of a post, optionally focused on one comment.
    async fn fetch_comment_listing(
        &self,
        post_id: &str,
        focus: Option<&str>,
    ) -> Result<Vec<CommentThing>, RedditError> {
        let path = format!("/comments/{post_id}");
        let mut query = vec![("raw_json", "1"), ("limit", "500")];
        if let Some(comment) = focus {
            query.push(("comment", comment));
        }

        let (_, comments): (Listing<PostThing>, Listing<CommentThing>) =
            self.get_json(&path, &query).await?;
        Ok(comments.data.children)
    }

    /// Fetch comments hidden behind a `more` placeholder.
    async fn fetch_more_children(
        &self,
        link_fullname: &str,
        ids: &[String],
    ) -> Result<Vec<CommentThing>, RedditError> {
        let children = ids.join(",");
        let response: MoreChildrenResponse = self
            .get_json(
                "/api/morechildren",
                &[
                    ("api_type", "json"),
                    ("raw_json", "1"),
                    ("link_id", link_fullname),
                    ("children", children.as_str()),
                ],
            )
            .await?;

        if !response.json.errors.is_empty() {
            return Err(RedditError::Parse(format!(
                "morechildren returned errors: {:?}",
                response.json.errors
            )));
        }

        Ok(response.json.data.map(|d| d.things).unwrap_or_default())
    }
}

#[async_trait]
impl RedditProvider for RedditClient {
    async fn resolve_submission(&self, url: &str) -> Result<Post, RedditError> {
        let post_ref = parse_post_url(url).map_err(|e| RedditError::NotFound(e.to_string()))?;
        let fullname = post_ref.fullname();

        let listing: Listing<PostThing> = self
            .get_json(&format!("/by_id/{fullname}"), &[("raw_json", "1")])
            .await?;

        let raw = listing
            .data
            .children
            .into_iter()
            .next()
            .ok_or_else(|| RedditError::NotFound(format!("No post with id {}", post_ref.id)))?;

        let post = Post::from(raw.data);
        info!(
            post_id = %post.id,
            subreddit = %post.subreddit,
            kind = post.kind.label(),
            "Resolved submission"
        );
        Ok(post)
    }

    async fn load_full_comment_tree(&self, post: &Post) -> Result<CommentTree, RedditError> {
        let link_fullname = format!("t3_{}", post.id);
        let mut assembler = TreeAssembler::new(link_fullname.clone());

        let initial = self.fetch_comment_listing(&post.id, None).await?;
        assembler.ingest(&link_fullname, initial);

        let mut requests = 1usize;
        while let Some(stub) = assembler.next_pending() {
            if stub.children.is_empty() {
                let focus = stub.parent_id.trim_start_matches("t1_");
                let things = self.fetch_comment_listing(&post.id, Some(focus)).await?;
                requests += 1;
                assembler.ingest_subthread(&stub.parent_id, things);
                continue;
            }

            for batch in stub.children.chunks(MORE_CHILDREN_BATCH) {
                let things = self.fetch_more_children(&link_fullname, batch).await?;
                requests += 1;
                assembler.ingest(&stub.parent_id, things);
            }
        }

        let tree = assembler.finish();
        info!(
            post_id = %post.id,
            top_level = tree.comments.len(),
            total = tree.total_count(),
            requests,
            "Loaded comment tree"
        );
        Ok(tree)
    }
}
