//! Reddit post URL validation.
//!
//! URLs are checked before any network call so that copy-paste mistakes are
//! rejected locally.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static POST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.|old\.|new\.|m\.)?reddit\.com/r/[^/?#]+/comments/([A-Za-z0-9]+)(?:[/?#]|$)",
    )
    .unwrap()
});

static SHORT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?redd\.it/([A-Za-z0-9]+)/?(?:[?#].*)?$").unwrap()
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("no URL was provided")]
    Empty,
    #[error("not a Reddit post URL: {0}")]
    Unrecognized(String),
}

/// A validated reference to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRef {
    /// Base-36 post id, without the `t3_` prefix.
    pub id: String,
}

impl PostRef {
    /// Fullname (`t3_...`) of the post.
    #[must_use]
    pub fn fullname(&self) -> String {
        format!("t3_{}", self.id)
    }
}

/// Validate a pasted post URL and extract the post id.
///
/// Accepts `reddit.com/r/{sub}/comments/{id}/...` on the `www`, `old`, `new`
/// and `m` hosts, and `redd.it/{id}` shortlinks.
///
/// # Errors
///
/// Returns an error if the input is blank or matches neither URL shape.
pub fn parse_post_url(input: &str) -> Result<PostRef, UrlValidationError> {
    let url = input.trim();
    if url.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    if let Some(caps) = POST_URL.captures(url) {
        return Ok(PostRef {
            id: caps[1].to_string(),
        });
    }

    if let Some(caps) = SHORT_URL.captures(url) {
        return Ok(PostRef {
            id: caps[1].to_string(),
        });
    }

    Err(UrlValidationError::Unrecognized(url.to_string()))
}
