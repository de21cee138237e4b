pub mod pages;
mod routes;
pub mod session;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::media::MediaArchiver;
use crate::reddit::RedditProvider;

pub use routes::INVALID_URL_MESSAGE;
pub use session::SessionStore;

/// Upper bound on how often expired sessions are purged.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub reddit: Arc<dyn RedditProvider>,
    pub archiver: MediaArchiver,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Build the state for a configuration and Reddit provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the media HTTP client cannot be built.
    pub fn new(config: Config, reddit: Arc<dyn RedditProvider>) -> Result<Self> {
        let archiver = MediaArchiver::new(&config)?;
        let sessions = Arc::new(SessionStore::new(config.session_ttl));
        Ok(Self {
            config: Arc::new(config),
            reddit,
            archiver,
            sessions,
        })
    }
}

/// Start the web server and run until the shutdown future resolves.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn serve(
    config: Config,
    reddit: Arc<dyn RedditProvider>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.web_host, config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let cleanup_every = config.session_ttl.min(SESSION_CLEANUP_INTERVAL);
    let state = AppState::new(config, reddit)?;

    let cleanup = tokio::spawn(session::run_cleanup_worker(
        Arc::clone(&state.sessions),
        cleanup_every.max(Duration::from_secs(1)),
    ));

    let app = create_app(state);

    info!(addr = %addr, "Starting HTTP web server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Web server error");

    cleanup.abort();
    served
}

/// Create the main application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
