use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::pages::{render_home_page, HomePageParams};
use super::session::{
    generate_session_token, ExtractionResult, MediaOutcome, SessionState, SESSION_COOKIE,
};
use super::AppState;
use crate::config::Config;
use crate::media::extract_media;
use crate::reddit::{parse_post_url, Post};
use crate::report::{build_report, FormatOptions};

/// Message shown for anything that is not a Reddit post link.
pub const INVALID_URL_MESSAGE: &str = "Please paste a valid Reddit post URL.";

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/extract", post(extract))
        .route("/download/report", get(download_report))
        .route("/download/media", get(download_media))
        .route("/healthz", get(health))
}

// ========== HTML Routes ==========

async fn home(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = match session_token(&headers) {
        Some(token) => state.sessions.get(token).await,
        None => None,
    };

    let defaults = default_options(&state.config);
    let html = match &session {
        Some(session) => render_home_page(
            &HomePageParams::new(session.options, state.config.max_replies_per_branch)
                .url(&session.url)
                .include_media(session.include_media)
                .result(session.result.as_deref()),
        ),
        None => render_home_page(&HomePageParams::new(
            defaults,
            state.config.max_replies_per_branch,
        )),
    };

    Html(html.into_string()).into_response()
}

/// Raw extraction form. Checkboxes are absent when unchecked.
#[derive(Debug, Deserialize)]
pub struct ExtractForm {
    #[serde(default)]
    url: String,
    #[serde(default)]
    replies_per_branch: String,
    include_scores: Option<String>,
    include_authors: Option<String>,
    include_media: Option<String>,
}

impl ExtractForm {
    fn options(&self, config: &Config) -> FormatOptions {
        FormatOptions {
            replies_per_branch: parse_replies(
                &self.replies_per_branch,
                config.default_replies_per_branch,
                config.max_replies_per_branch,
            ),
            include_scores: self.include_scores.is_some(),
            include_authors: self.include_authors.is_some(),
        }
    }
}

async fn extract(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ExtractForm>,
) -> Response {
    // Unknown or expired tokens are replaced rather than adopted.
    let existing = match session_token(&headers) {
        Some(token) => state
            .sessions
            .get(token)
            .await
            .map(|session| (token.to_string(), session)),
        None => None,
    };

    let url = form.url.trim().to_string();
    let options = form.options(&state.config);
    let include_media = form.include_media.is_some();
    let (token, is_new, session) = match existing {
        Some((token, session)) => (
            token,
            false,
            session.with_inputs(url.clone(), options, include_media),
        ),
        None => (
            generate_session_token(),
            true,
            SessionState::new(url.clone(), options, include_media),
        ),
    };

    if let Err(e) = parse_post_url(&url) {
        debug!(url = %url, error = %e, "Rejected post URL");
        state.sessions.put(&token, session).await;
        return render_form_error(&state, &url, options, include_media, INVALID_URL_MESSAGE)
            .with_status(StatusCode::BAD_REQUEST)
            .with_session_cookie(&token, is_new);
    }

    let (post, tree) = match state.reddit.fetch(&url).await {
        Ok(fetched) => fetched,
        Err(e) => {
            warn!(url = %url, error = %e, "Extraction failed");
            let message = e.to_string();
            state.sessions.put(&token, session).await;
            return render_form_error(&state, &url, options, include_media, &message)
                .with_status(StatusCode::BAD_GATEWAY)
                .with_session_cookie(&token, is_new);
        }
    };

    let report = build_report(&post, &tree, &options);
    info!(
        post_id = %post.id,
        branches = report.branch_count,
        comments = tree.total_count(),
        "Built branch report"
    );

    let media = if include_media {
        build_media(&state, &post).await
    } else {
        MediaOutcome::NotRequested
    };

    let result = ExtractionResult {
        report_text: report.text(),
        report_filename: report.filename,
        branch_count: report.branch_count,
        media,
    };
    state
        .sessions
        .put(&token, session.with_result(result))
        .await;

    Redirect::to("/")
        .into_response()
        .with_session_cookie(&token, is_new)
}

async fn build_media(state: &AppState, post: &Post) -> MediaOutcome {
    let media = extract_media(post);
    if media.is_empty() {
        debug!(post_id = %post.id, "Post has no media");
        return MediaOutcome::Unavailable;
    }

    match state.archiver.archive(&media).await {
        Ok(Some(archive)) => MediaOutcome::Ready(archive),
        Ok(None) => MediaOutcome::Unavailable,
        Err(e) => {
            warn!(post_id = %post.id, error = %e, "Failed to build media archive");
            MediaOutcome::Failed(format!("{e:#}"))
        }
    }
}

fn render_form_error(
    state: &AppState,
    url: &str,
    options: FormatOptions,
    include_media: bool,
    message: &str,
) -> Response {
    let html = render_home_page(
        &HomePageParams::new(options, state.config.max_replies_per_branch)
            .url(url)
            .include_media(include_media)
            .error(message),
    );
    Html(html.into_string()).into_response()
}

// ========== Downloads ==========

async fn download_report(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(result) = session_result(&state, &headers).await else {
        return (StatusCode::NOT_FOUND, "No report available").into_response();
    };

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                attachment(&result.report_filename),
            ),
        ],
        result.report_text.clone(),
    )
        .into_response()
}

async fn download_media(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(result) = session_result(&state, &headers).await else {
        return (StatusCode::NOT_FOUND, "No media available").into_response();
    };
    let Some(archive) = result.media.archive() else {
        return (StatusCode::NOT_FOUND, "No media available").into_response();
    };

    (
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&archive.filename)),
        ],
        archive.bytes.clone(),
    )
        .into_response()
}

async fn health() -> &'static str {
    "OK"
}

// ========== Helpers ==========

async fn session_result(
    state: &AppState,
    headers: &HeaderMap,
) -> Option<Arc<ExtractionResult>> {
    let token = session_token(headers)?;
    state.sessions.get(token).await?.result
}

/// Extract the session token from the cookie header.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                cookie
                    .trim()
                    .strip_prefix(SESSION_COOKIE)
                    .and_then(|rest| rest.strip_prefix('='))
            })
        })
        .filter(|token| !token.is_empty())
}

fn attachment(filename: &str) -> String {
    format!("attachment; filename=\"{filename}\"")
}

fn default_options(config: &Config) -> FormatOptions {
    FormatOptions {
        replies_per_branch: config.default_replies_per_branch,
        ..FormatOptions::default()
    }
}

/// Parse the replies field, falling back to `default` and clamping to `0..=max`.
fn parse_replies(raw: &str, default: usize, max: usize) -> usize {
    let raw = raw.trim();
    if raw.is_empty() {
        return default.min(max);
    }
    match raw.parse::<i64>() {
        Ok(n) if n < 0 => 0,
        Ok(n) => usize::try_from(n).map_or(max, |n| n.min(max)),
        Err(_) => default.min(max),
    }
}

trait ResponseExt {
    fn with_status(self, status: StatusCode) -> Self;
    fn with_session_cookie(self, token: &str, is_new: bool) -> Self;
}

impl ResponseExt for Response {
    fn with_status(mut self, status: StatusCode) -> Self {
        *self.status_mut() = status;
        self
    }

    fn with_session_cookie(mut self, token: &str, is_new: bool) -> Self {
        if !is_new {
            return self;
        }
        let cookie = format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/");
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                self.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => warn!("Failed to build session cookie: {e}"),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replies() {
        assert_eq!(parse_replies("5", 10, 50), 5);
        assert_eq!(parse_replies(" 0 ", 10, 50), 0);
        assert_eq!(parse_replies("", 10, 50), 10);
        assert_eq!(parse_replies("abc", 10, 50), 10);
        assert_eq!(parse_replies("500", 10, 50), 50);
        assert_eq!(parse_replies("-3", 10, 50), 0);
    }

    #[test]
    fn test_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc123; other=1"),
        );
        assert_eq!(session_token(&headers), Some("abc123"));

        headers.insert(header::COOKIE, HeaderValue::from_static("sessionx=nope"));
        assert_eq!(session_token(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_attachment_header() {
        assert_eq!(
            attachment("reddit_media_20240101_000000.zip"),
            "attachment; filename=\"reddit_media_20240101_000000.zip\""
        );
    }

    #[test]
    fn test_form_options() {
        let config = Config::for_testing();
        let form = ExtractForm {
            url: "https://redd.it/abc".to_string(),
            replies_per_branch: "7".to_string(),
            include_scores: Some("on".to_string()),
            include_authors: None,
            include_media: None,
        };
        assert_eq!(
            form.options(&config),
            FormatOptions {
                replies_per_branch: 7,
                include_scores: true,
                include_authors: false,
            }
        );
    }
}
