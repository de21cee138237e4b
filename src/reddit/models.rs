//! Reddit post and comment models.
//!
//! The `Raw*` types mirror Reddit's JSON listing envelopes. They are converted
//! into [`Post`] and [`Comment`], which carry only what reports and media
//! extraction need. Nested metadata objects (previews, galleries, video info)
//! are decoded leniently: a field with an unexpected shape becomes `None`
//! instead of failing the whole post.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::constants::DELETED_SENTINEL;

/// A submission snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub subreddit: String,
    /// `None` when the account was deleted or is otherwise anonymous.
    pub author: Option<String>,
    pub url: String,
    pub permalink: String,
    pub score: i64,
    pub selftext: String,
    pub post_hint: Option<String>,
    pub kind: PostKind,
    pub preview: Option<Preview>,
    pub crosspost_parent: Option<Box<Post>>,
}

/// What kind of submission a post is.
#[derive(Debug, Clone, PartialEq)]
pub enum PostKind {
    SelfPost,
    Gallery(Gallery),
    Video(Option<RedditVideo>),
    Link,
}

impl PostKind {
    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SelfPost => "self",
            Self::Gallery(_) => "gallery",
            Self::Video(_) => "video",
            Self::Link => "link",
        }
    }
}

/// Gallery items in display order, joined with their media metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gallery {
    pub items: Vec<GalleryItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    pub media_id: String,
    pub media: Option<MediaMetadata>,
}

/// One entry of a post's `media_metadata` map.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaMetadata {
    #[serde(default, rename = "s", deserialize_with = "lenient")]
    pub source: Option<MediaSource>,
    #[serde(default, rename = "p", deserialize_with = "lenient_vec")]
    pub previews: Vec<MediaSource>,
    #[serde(default, rename = "hlsUrl")]
    pub hls_url: Option<String>,
    #[serde(default, rename = "dashUrl")]
    pub dash_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaSource {
    #[serde(default, rename = "u")]
    pub url: Option<String>,
    #[serde(default)]
    pub gif: Option<String>,
    #[serde(default)]
    pub mp4: Option<String>,
    #[serde(default, rename = "x")]
    pub width: Option<u32>,
    #[serde(default, rename = "y")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RedditVideo {
    #[serde(default)]
    pub fallback_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Preview {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub images: Vec<PreviewImage>,
    #[serde(default, deserialize_with = "lenient")]
    pub reddit_video_preview: Option<RedditVideo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PreviewImage {
    #[serde(default, deserialize_with = "lenient")]
    pub source: Option<ImageSource>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub resolutions: Vec<ImageSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageSource {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// A comment and its resolved replies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comment {
    pub id: String,
    pub author: Option<String>,
    /// `None` when the listing entry carried no body at all.
    pub body: Option<String>,
    pub score: Option<i64>,
    pub replies: Vec<Comment>,
}

impl Comment {
    /// Number of comments below this one, at any depth.
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        self.replies
            .iter()
            .map(|reply| 1 + reply.descendant_count())
            .sum()
    }

    /// Whether the comment has a readable body.
    ///
    /// Comments without a body field and comments whose body is the deleted
    /// marker are both treated as removed.
    #[must_use]
    pub fn has_visible_body(&self) -> bool {
        self.body.as_deref().is_some_and(|b| b != DELETED_SENTINEL)
    }
}

/// The fully expanded comment tree of a post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentTree {
    pub comments: Vec<Comment>,
}

impl CommentTree {
    #[must_use]
    pub fn new(comments: Vec<Comment>) -> Self {
        Self { comments }
    }

    /// Total number of comments in the tree, nested replies included.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.comments
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

// ========== Raw API shapes ==========

#[derive(Debug, Deserialize)]
pub(crate) struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData<T> {
    #[serde(default = "Vec::new")]
    pub children: Vec<T>,
}

/// A `t3` entry of a listing.
#[derive(Debug, Deserialize)]
pub(crate) struct PostThing {
    pub data: RawPost,
}

/// An entry of a comment listing.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub(crate) enum CommentThing {
    #[serde(rename = "t1")]
    Comment(RawComment),
    #[serde(rename = "more")]
    More(RawMore),
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub is_gallery: bool,
    #[serde(default)]
    pub is_video: bool,
    #[serde(default)]
    pub post_hint: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub gallery_data: Option<RawGalleryData>,
    #[serde(default, deserialize_with = "lenient")]
    pub media_metadata: Option<HashMap<String, MediaMetadata>>,
    #[serde(default, deserialize_with = "lenient")]
    pub media: Option<RawMedia>,
    #[serde(default, deserialize_with = "lenient")]
    pub secure_media: Option<RawMedia>,
    #[serde(default, deserialize_with = "lenient")]
    pub preview: Option<Preview>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub crosspost_parent_list: Vec<RawPost>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGalleryData {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<RawGalleryItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGalleryItem {
    pub media_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawMedia {
    #[serde(default, deserialize_with = "lenient")]
    pub reddit_video: Option<RedditVideo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawComment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub score: Option<i64>,
    #[serde(default)]
    pub replies: Option<RawReplies>,
}

/// Reddit sends an empty string instead of a listing when there are no replies.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawReplies {
    Listing(Listing<CommentThing>),
    Empty(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawMore {
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

/// Response envelope of `/api/morechildren`.
#[derive(Debug, Deserialize)]
pub(crate) struct MoreChildrenResponse {
    pub json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoreChildrenJson {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    #[serde(default)]
    pub data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoreChildrenData {
    #[serde(default)]
    pub things: Vec<CommentThing>,
}

impl RawComment {
    /// Fullname (`t1_...`) of this comment.
    pub fn fullname(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("t1_{}", self.id))
    }

    /// Split off the nested replies, returning the comment without them.
    pub fn into_parts(self) -> (Comment, Vec<CommentThing>) {
        let replies = match self.replies {
            Some(RawReplies::Listing(listing)) => listing.data.children,
            Some(RawReplies::Empty(_)) | None => Vec::new(),
        };
        let comment = Comment {
            id: self.id,
            author: normalize_author(self.author),
            body: self.body,
            score: self.score,
            replies: Vec::new(),
        };
        (comment, replies)
    }
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        Self::from_raw(raw, true)
    }
}

impl Post {
    fn from_raw(raw: RawPost, with_parent: bool) -> Self {
        let kind = if raw.is_self {
            PostKind::SelfPost
        } else if raw.is_gallery {
            PostKind::Gallery(build_gallery(raw.gallery_data, raw.media_metadata))
        } else if raw.is_video {
            let video = raw
                .media
                .and_then(|m| m.reddit_video)
                .or_else(|| raw.secure_media.and_then(|m| m.reddit_video));
            PostKind::Video(video)
        } else {
            PostKind::Link
        };

        let crosspost_parent = if with_parent {
            raw.crosspost_parent_list
                .into_iter()
                .next()
                .map(|parent| Box::new(Self::from_raw(parent, false)))
        } else {
            None
        };

        Self {
            id: raw.id,
            title: raw.title,
            subreddit: raw.subreddit,
            author: normalize_author(raw.author),
            url: raw.url,
            permalink: raw.permalink,
            score: raw.score,
            selftext: raw.selftext,
            post_hint: raw.post_hint,
            kind,
            preview: raw.preview,
            crosspost_parent,
        }
    }

    /// Number of gallery items, zero for non-gallery posts.
    #[must_use]
    pub fn gallery_len(&self) -> usize {
        match &self.kind {
            PostKind::Gallery(gallery) => gallery.items.len(),
            _ => 0,
        }
    }
}

fn build_gallery(
    data: Option<RawGalleryData>,
    metadata: Option<HashMap<String, MediaMetadata>>,
) -> Gallery {
    let mut metadata = metadata.unwrap_or_default();
    let items = data
        .map(|d| d.items)
        .unwrap_or_default()
        .into_iter()
        .map(|item| GalleryItem {
            media: metadata.remove(&item.media_id),
            media_id: item.media_id,
        })
        .collect();
    Gallery { items }
}

fn normalize_author(author: Option<String>) -> Option<String> {
    author.filter(|a| !a.is_empty() && a != DELETED_SENTINEL)
}

/// Decode a field, treating any shape mismatch as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode a list field, keeping only the elements that decode.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
