//! Shared constants used across the application.

/// User agent sent to the Reddit API when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Reddit Main Branches Extractor v1.0";

/// Browser user agent used when downloading media files.
pub const MEDIA_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Body value Reddit substitutes for removed or deleted content.
pub const DELETED_SENTINEL: &str = "[deleted]";

/// Number of report characters shown in the result preview.
pub const PREVIEW_CHARS: usize = 2000;
