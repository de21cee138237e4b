//! Media URL extraction from post metadata.

use std::collections::HashSet;

use serde::Serialize;

use crate::reddit::models::{Gallery, MediaMetadata, Preview};
use crate::reddit::{Post, PostKind};

/// File extensions that identify a direct image link.
pub const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp"];

/// Image and video URLs referenced by a post, deduplicated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaCollection {
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

impl MediaCollection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty()
    }
}

/// Collect the media URLs of a post.
///
/// Never fails: metadata that is missing or unreadable contributes nothing.
#[must_use]
pub fn extract_media(post: &Post) -> MediaCollection {
    let mut images = Vec::new();
    let mut videos = Vec::new();

    if let PostKind::Gallery(gallery) = &post.kind {
        collect_gallery(gallery, &mut images, &mut videos);
    }
    collect_direct_image(post, &mut images);
    collect_native_video(post, &mut videos);
    if let Some(preview) = &post.preview {
        collect_preview_image(preview, &mut images);
        collect_preview_video(preview, &mut videos);
    }

    // Crossposts often carry no media of their own.
    if let Some(parent) = &post.crosspost_parent {
        if images.is_empty() {
            collect_direct_image(parent, &mut images);
            if let Some(preview) = &parent.preview {
                collect_preview_image(preview, &mut images);
            }
        }
        if videos.is_empty() {
            collect_native_video(parent, &mut videos);
            if let Some(preview) = &parent.preview {
                collect_preview_video(preview, &mut videos);
            }
        }
    }

    MediaCollection {
        images: dedupe(images),
        videos: dedupe(videos),
    }
}

fn collect_gallery(gallery: &Gallery, images: &mut Vec<String>, videos: &mut Vec<String>) {
    for media in gallery.items.iter().filter_map(|item| item.media.as_ref()) {
        if let Some(video) = gallery_video(media) {
            videos.push(video.to_string());
        }
        if let Some(still) = gallery_still(media) {
            images.push(still.to_string());
        }
    }
}

/// Playable URL of a gallery item: a real video wins over an animated gif.
fn gallery_video(media: &MediaMetadata) -> Option<&str> {
    let source = media.source.as_ref();
    source
        .and_then(|s| s.mp4.as_deref())
        .or(media.hls_url.as_deref())
        .or(media.dash_url.as_deref())
        .or_else(|| source.and_then(|s| s.gif.as_deref()))
}

/// Best still image of a gallery item: the original, else the smallest preview.
fn gallery_still(media: &MediaMetadata) -> Option<&str> {
    media
        .source
        .as_ref()
        .and_then(|s| s.url.as_deref())
        .or_else(|| {
            media
                .previews
                .iter()
                .filter(|p| p.url.is_some())
                .min_by_key(|p| p.width.unwrap_or(u32::MAX))
                .and_then(|p| p.url.as_deref())
        })
}

fn collect_direct_image(post: &Post, images: &mut Vec<String>) {
    if post.post_hint.as_deref() == Some("image") || has_image_extension(&post.url) {
        images.push(post.url.clone());
    }
}

fn collect_native_video(post: &Post, videos: &mut Vec<String>) {
    if let PostKind::Video(Some(video)) = &post.kind {
        if let Some(url) = &video.fallback_url {
            videos.push(url.clone());
        }
    }
}

/// Full-size preview image, else the widest of its resolutions.
fn collect_preview_image(preview: &Preview, images: &mut Vec<String>) {
    let Some(image) = preview.images.first() else {
        return;
    };
    let best = image.source.as_ref().or_else(|| {
        image
            .resolutions
            .iter()
            .max_by_key(|r| r.width.unwrap_or(0))
    });
    if let Some(best) = best {
        images.push(best.url.clone());
    }
}

fn collect_preview_video(preview: &Preview, videos: &mut Vec<String>) {
    if let Some(url) = preview
        .reddit_video_preview
        .as_ref()
        .and_then(|v| v.fallback_url.as_ref())
    {
        videos.push(url.clone());
    }
}

/// Path of a URL without query string or fragment.
pub(crate) fn url_path(url: &str) -> String {
    url::Url::parse(url).map_or_else(
        |_| {
            url.split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string()
        },
        |parsed| parsed.path().to_string(),
    )
}

fn has_image_extension(url: &str) -> bool {
    let path = url_path(url).to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn dedupe(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .map(|u| u.replace("&amp;", "&"))
        .filter(|u| !u.is_empty())
        .filter(|u| seen.insert(u.clone()))
        .collect()
}
