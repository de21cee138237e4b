//! Per-browser session state kept in memory.
//!
//! A session remembers the last form inputs and the last extraction result so
//! the download endpoints can serve them. Sessions expire after a TTL of
//! inactivity and are purged by a background worker.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use tokio::sync::RwLock;

use crate::media::MediaArchive;
use crate::report::FormatOptions;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Generate a random 64-character alphanumeric session token.
#[must_use]
pub fn generate_session_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Outcome of the optional media step of an extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOutcome {
    /// The user did not ask for media.
    NotRequested,
    /// The post had no media, or none of it could be downloaded.
    Unavailable,
    /// Building the archive failed.
    Failed(String),
    Ready(MediaArchive),
}

impl MediaOutcome {
    #[must_use]
    pub const fn archive(&self) -> Option<&MediaArchive> {
        match self {
            Self::Ready(archive) => Some(archive),
            _ => None,
        }
    }
}

/// A finished extraction held for display and download.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub report_text: String,
    pub report_filename: String,
    pub branch_count: usize,
    pub media: MediaOutcome,
}

/// Everything remembered about one browser.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub url: String,
    pub options: FormatOptions,
    pub include_media: bool,
    pub result: Option<Arc<ExtractionResult>>,
    touched: Instant,
}

impl SessionState {
    #[must_use]
    pub fn new(url: String, options: FormatOptions, include_media: bool) -> Self {
        Self {
            url,
            options,
            include_media,
            result: None,
            touched: Instant::now(),
        }
    }

    /// Replace the remembered form inputs, keeping the last result.
    #[must_use]
    pub fn with_inputs(self, url: String, options: FormatOptions, include_media: bool) -> Self {
        Self {
            url,
            options,
            include_media,
            ..self
        }
    }

    #[must_use]
    pub fn with_result(mut self, result: ExtractionResult) -> Self {
        self.result = Some(Arc::new(result));
        self
    }

    fn is_valid(&self, ttl: Duration) -> bool {
        self.touched.elapsed() < ttl
    }
}

/// In-memory session store with a time-to-live.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionState>>,
    ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a live session and refresh its expiry.
    ///
    /// Expired sessions are treated as absent.
    pub async fn get(&self, token: &str) -> Option<SessionState> {
        let mut sessions = self.sessions.write().await;
        let state = sessions
            .get_mut(token)
            .filter(|state| state.is_valid(self.ttl))?;
        state.touched = Instant::now();
        Some(state.clone())
    }

    /// Store state for a session, refreshing its expiry.
    pub async fn put(&self, token: &str, mut state: SessionState) {
        state.touched = Instant::now();
        self.sessions.write().await.insert(token.to_string(), state);
    }

    /// Remove every expired session, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, state| state.is_valid(self.ttl));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Purge expired sessions forever on a fixed interval.
pub async fn run_cleanup_worker(store: Arc<SessionStore>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;
        let purged = store.purge_expired().await;
        if purged > 0 {
            tracing::info!(expired_sessions = purged, "Cleaned up expired sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SessionState {
        SessionState::new(
            "https://redd.it/abc123".to_string(),
            FormatOptions::default(),
            false,
        )
    }

    #[test]
    fn test_generate_session_token() {
        let token = generate_session_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_session_token());
    }

    #[test]
    fn test_media_outcome_archive() {
        assert!(MediaOutcome::NotRequested.archive().is_none());
        assert!(MediaOutcome::Unavailable.archive().is_none());
        let archive = MediaArchive {
            bytes: vec![1],
            filename: "reddit_media_x.zip".to_string(),
            entries: vec!["image_1.jpg".to_string()],
        };
        let outcome = MediaOutcome::Ready(archive.clone());
        assert_eq!(outcome.archive(), Some(&archive));
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert!(store.get("tok").await.is_none());

        store.put("tok", state()).await;
        let loaded = store.get("tok").await.unwrap();
        assert_eq!(loaded.url, "https://redd.it/abc123");
        assert!(loaded.result.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_sessions_hidden_and_purged() {
        let store = SessionStore::new(Duration::ZERO);
        store.put("tok", state()).await;

        assert!(store.get("tok").await.is_none());
        assert_eq!(store.purge_expired().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_reads_keep_session_alive() {
        let store = SessionStore::new(Duration::from_millis(300));
        store.put("tok", state()).await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.get("tok").await.is_some());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.get("tok").await.is_some());
        assert_eq!(store.purge_expired().await, 0);
    }

    #[test]
    fn test_with_inputs_keeps_result() {
        let result = ExtractionResult {
            report_text: "report".to_string(),
            report_filename: "reddit_report.txt".to_string(),
            branch_count: 1,
            media: MediaOutcome::NotRequested,
        };
        let options = FormatOptions {
            replies_per_branch: 3,
            ..FormatOptions::default()
        };
        let updated = state()
            .with_result(result)
            .with_inputs("not a url".to_string(), options, true);

        assert_eq!(updated.url, "not a url");
        assert_eq!(updated.options, options);
        assert!(updated.include_media);
        assert_eq!(updated.result.unwrap().report_text, "report");
    }

    #[tokio::test]
    async fn test_purge_keeps_live_sessions() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.put("a", state()).await;
        store.put("b", state()).await;
        assert_eq!(store.purge_expired().await, 0);
        assert_eq!(store.len().await, 2);
    }
}
