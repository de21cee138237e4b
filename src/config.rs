use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Reddit API
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    pub reddit_api_base: String,
    pub reddit_auth_base: String,
    pub http_timeout: Duration,

    // Report defaults
    pub default_replies_per_branch: usize,
    pub max_replies_per_branch: usize,

    // Media archive
    pub media_archive_base: String,
    pub media_max_bytes: u64,
    pub media_concurrency: usize,

    // Web Server
    pub web_host: String,
    pub web_port: u16,
    pub session_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Reddit API
            reddit_client_id: required_env("REDDIT_CLIENT_ID")?,
            reddit_client_secret: required_env("REDDIT_CLIENT_SECRET")?,
            reddit_user_agent: env_or_default(
                "REDDIT_USER_AGENT",
                crate::constants::DEFAULT_USER_AGENT,
            ),
            reddit_api_base: env_or_default("REDDIT_API_BASE", "https://oauth.reddit.com"),
            reddit_auth_base: env_or_default("REDDIT_AUTH_BASE", "https://www.reddit.com"),
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),

            // Report defaults
            default_replies_per_branch: parse_env_usize("DEFAULT_REPLIES_PER_BRANCH", 10)?,
            max_replies_per_branch: parse_env_usize("MAX_REPLIES_PER_BRANCH", 50)?,

            // Media archive
            media_archive_base: env_or_default("MEDIA_ARCHIVE_BASE", "reddit_media"),
            media_max_bytes: parse_env_u64("MEDIA_MAX_BYTES", 100 * 1024 * 1024)?,
            media_concurrency: parse_env_usize("MEDIA_CONCURRENCY", 4)?,

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,
            session_ttl: Duration::from_secs(parse_env_u64("SESSION_TTL_SECS", 3600)?),
        })
    }

    /// Configuration with dummy credentials, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            reddit_client_id: "test-client".to_string(),
            reddit_client_secret: "test-secret".to_string(),
            reddit_user_agent: "reddit-branch-extractor-tests/0.1".to_string(),
            reddit_api_base: "http://127.0.0.1:9".to_string(),
            reddit_auth_base: "http://127.0.0.1:9".to_string(),
            http_timeout: Duration::from_secs(5),
            default_replies_per_branch: 10,
            max_replies_per_branch: 50,
            media_archive_base: "reddit_media".to_string(),
            media_max_bytes: 10 * 1024 * 1024,
            media_concurrency: 2,
            web_host: "127.0.0.1".to_string(),
            web_port: 0,
            session_ttl: Duration::from_secs(3600),
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reddit_client_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "REDDIT_CLIENT_ID".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.reddit_client_secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "REDDIT_CLIENT_SECRET".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.default_replies_per_branch > self.max_replies_per_branch {
            return Err(ConfigError::InvalidValue {
                name: "DEFAULT_REPLIES_PER_BRANCH".to_string(),
                message: format!(
                    "must not exceed MAX_REPLIES_PER_BRANCH ({})",
                    self.max_replies_per_branch
                ),
            });
        }
        if self.media_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MEDIA_CONCURRENCY".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.media_archive_base.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "MEDIA_ARCHIVE_BASE".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
