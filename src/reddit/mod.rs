//! Reddit data provider.
//!
//! The [`RedditProvider`] trait is the seam between the web layer and
//! Reddit's API. [`RedditClient`] is the production implementation; tests
//! substitute their own.

mod client;
pub mod models;
mod tree;
pub mod url;

use async_trait::async_trait;
use thiserror::Error;

pub use client::RedditClient;
pub use models::{Comment, CommentTree, Post, PostKind};
pub use url::{parse_post_url, PostRef, UrlValidationError};

#[derive(Debug, Error)]
pub enum RedditError {
    #[error("Reddit API credentials missing. Set REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET.")]
    MissingCredentials,
    #[error("post not found: {0}")]
    NotFound(String),
    #[error("Reddit authentication failed: {0}")]
    Auth(String),
    #[error("request to Reddit failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Reddit returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("could not parse Reddit response: {0}")]
    Parse(String),
}

/// Source of posts and their comment trees.
#[async_trait]
pub trait RedditProvider: Send + Sync {
    /// Look up the post a URL points to.
    async fn resolve_submission(&self, url: &str) -> Result<Post, RedditError>;

    /// Load every comment of a post, with all "load more" placeholders expanded.
    async fn load_full_comment_tree(&self, post: &Post) -> Result<CommentTree, RedditError>;

    /// Resolve a post and load its comments.
    async fn fetch(&self, url: &str) -> Result<(Post, CommentTree), RedditError> {
        let post = self.resolve_submission(url).await?;
        let comments = self.load_full_comment_tree(&post).await?;
        Ok((post, comments))
    }
}
