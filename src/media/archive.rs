//! Packaging of post media into a zip archive.
//!
//! Each URL is downloaded independently. A download that fails is left out
//! of the archive; only an archive with no entries at all is reported as
//! "no media".

use std::io::{Cursor, Write};

use anyhow::{Context, Result};
use chrono::Local;
use futures_util::stream::{self, StreamExt};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::extract::{url_path, MediaCollection};
use crate::config::Config;
use crate::constants::MEDIA_USER_AGENT;

/// Extensions of directly playable video files.
const VIDEO_EXTENSIONS: [&str; 4] = [".mp4", ".gif", ".webm", ".mov"];

/// Extensions accepted verbatim for image entries.
const KNOWN_IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp"];

#[derive(Debug, Error)]
pub enum MediaFetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status} for {url}")]
    Status { status: StatusCode, url: String },
    #[error("{url} is larger than {limit} bytes")]
    TooLarge { url: String, limit: u64 },
}

/// A finished zip archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaArchive {
    pub bytes: Vec<u8>,
    pub filename: String,
    /// Names of the entries written, in archive order.
    pub entries: Vec<String>,
}

/// Downloads media URLs and zips them.
#[derive(Debug, Clone)]
pub struct MediaArchiver {
    http: reqwest::Client,
    base_name: String,
    max_bytes: u64,
    concurrency: usize,
}

impl MediaArchiver {
    /// Build an archiver from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(MEDIA_USER_AGENT)
            .timeout(config.http_timeout)
            .build()
            .context("Failed to build media HTTP client")?;

        Ok(Self {
            http,
            base_name: config.media_archive_base.clone(),
            max_bytes: config.media_max_bytes,
            concurrency: config.media_concurrency.max(1),
        })
    }

    /// Download the media and package whatever succeeded.
    ///
    /// Returns `Ok(None)` when no item could be downloaded.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing the zip itself fails.
    pub async fn archive(&self, media: &MediaCollection) -> Result<Option<MediaArchive>> {
        let planned = plan_entries(media);
        if planned.is_empty() {
            debug!("No archivable media URLs");
            return Ok(None);
        }

        let fetched: Vec<(String, Vec<u8>)> = stream::iter(planned)
            .map(|(name, url)| async move {
                match self.fetch(&url).await {
                    Ok(bytes) => Some((name, bytes)),
                    Err(e) => {
                        warn!(url = %url, error = %e, "Skipping media item");
                        None
                    }
                }
            })
            .buffered(self.concurrency)
            .filter_map(|entry| async move { entry })
            .collect()
            .await;

        if fetched.is_empty() {
            info!("No media could be downloaded");
            return Ok(None);
        }

        let entries: Vec<String> = fetched.iter().map(|(name, _)| name.clone()).collect();
        let bytes = tokio::task::spawn_blocking(move || write_zip(fetched))
            .await
            .context("Zip task panicked")??;

        let filename = format!(
            "{}_{}.zip",
            self.base_name,
            Local::now().format("%Y%m%d_%H%M%S")
        );
        info!(
            entries = entries.len(),
            size_bytes = bytes.len(),
            filename = %filename,
            "Built media archive"
        );

        Ok(Some(MediaArchive {
            bytes,
            filename,
            entries,
        }))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, MediaFetchError> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaFetchError::Status {
                status,
                url: url.to_string(),
            });
        }
        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes)
        {
            return Err(MediaFetchError::TooLarge {
                url: url.to_string(),
                limit: self.max_bytes,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(MediaFetchError::TooLarge {
                url: url.to_string(),
                limit: self.max_bytes,
            });
        }

        debug!(url = %url, size_bytes = bytes.len(), "Fetched media item");
        Ok(bytes.to_vec())
    }
}

/// Decide the zip entry name for every archivable URL.
///
/// Indices follow the positions in the collection, so skipped videos leave
/// gaps in the numbering.
#[must_use]
pub fn plan_entries(media: &MediaCollection) -> Vec<(String, String)> {
    let images = media.images.iter().enumerate().map(|(i, url)| {
        let ext = url_extension(url)
            .filter(|ext| KNOWN_IMAGE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or_else(|| ".jpg".to_string());
        (format!("image_{}{ext}", i + 1), url.clone())
    });

    let videos = media.videos.iter().enumerate().filter_map(|(i, url)| {
        let ext = url_extension(url).filter(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()));
        if ext.is_none() {
            debug!(url = %url, "Skipping video without a direct file extension");
        }
        ext.map(|ext| (format!("video_{}{ext}", i + 1), url.clone()))
    });

    images.chain(videos).collect()
}

/// Lowercased extension of the last path segment, including the dot.
fn url_extension(url: &str) -> Option<String> {
    let path = url_path(url);
    let file = path.rsplit('/').next()?;
    let dot = file.rfind('.')?;
    let ext = &file[dot..];
    (ext.len() > 1).then(|| ext.to_lowercase())
}

fn write_zip(entries: Vec<(String, Vec<u8>)>) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, bytes) in entries {
        zip.start_file(name.as_str(), options)
            .with_context(|| format!("Failed to start zip entry {name}"))?;
        zip.write_all(&bytes)
            .with_context(|| format!("Failed to write zip entry {name}"))?;
    }

    let cursor = zip.finish().context("Failed to finish zip archive")?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(images: &[&str], videos: &[&str]) -> MediaCollection {
        MediaCollection {
            images: images.iter().map(ToString::to_string).collect(),
            videos: videos.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_url_extension() {
        assert_eq!(
            url_extension("https://i.redd.it/abc.PNG?x=1").as_deref(),
            Some(".png")
        );
        assert_eq!(
            url_extension("https://v.redd.it/x/DASH_720.mp4?source=fallback").as_deref(),
            Some(".mp4")
        );
        assert_eq!(url_extension("https://v.redd.it/x/HLSPlaylist.m3u8").as_deref(), Some(".m3u8"));
        assert_eq!(url_extension("https://example.com/image"), None);
        assert_eq!(url_extension("https://example.com/dir.d/"), None);
    }

    #[test]
    fn test_plan_entries() {
        let media = collection(
            &[
                "https://i.redd.it/one.png",
                "https://preview.redd.it/two?width=640",
            ],
            &[
                "https://v.redd.it/x/HLSPlaylist.m3u8",
                "https://v.redd.it/x/DASH_720.mp4",
                "https://v.redd.it/x/DASHPlaylist.mpd",
                "https://i.redd.it/anim.gif",
            ],
        );
        let names: Vec<String> = plan_entries(&media).into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["image_1.png", "image_2.jpg", "video_2.mp4", "video_4.gif"]
        );
    }

    #[test]
    fn test_write_zip_roundtrip_names() {
        let bytes = write_zip(vec![
            ("image_1.jpg".to_string(), vec![1, 2, 3]),
            ("video_1.mp4".to_string(), vec![4, 5]),
        ])
        .unwrap();

        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"image_1.jpg"));
        assert!(names.contains(&"video_1.mp4"));
    }
}
