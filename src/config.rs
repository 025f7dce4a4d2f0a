//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- OAuth application ---
    /// OAuth client ID ("access key")
    pub access_key: String,
    /// OAuth client secret
    pub secret_key: String,
    /// Redirect URI registered for the application
    pub redirect_uri: String,
    /// Requested scopes, `+`-separated
    pub access_scope: String,

    // --- Endpoints ---
    /// Base URL of the JSON API
    pub api_base_url: String,
    /// Base URL of the OAuth host (authorize and token endpoints)
    pub auth_base_url: String,

    // --- Local state ---
    /// Where the encrypted access token is kept
    pub token_store_path: PathBuf,
    /// Passphrase the token store key is derived from
    pub token_store_key: Option<String>,
    /// Overall request timeout; reqwest's default when unset
    pub http_timeout: Option<Duration>,
}

impl Config {
    pub const DEFAULT_REDIRECT_URI: &'static str = "urn:ietf:wg:oauth:2.0:oob";
    pub const DEFAULT_SCOPE: &'static str = "public+read_user+write_likes";
    pub const DEFAULT_API_URL: &'static str = "https://api.unsplash.com";
    pub const DEFAULT_AUTH_URL: &'static str = "https://unsplash.com";

    /// Default config for testing only. Both base URLs point at `base_url`.
    pub fn test_default(base_url: &str) -> Self {
        Self {
            access_key: "test_access_key".to_string(),
            secret_key: "test_secret_key".to_string(),
            redirect_uri: Self::DEFAULT_REDIRECT_URI.to_string(),
            access_scope: Self::DEFAULT_SCOPE.to_string(),
            api_base_url: base_url.to_string(),
            auth_base_url: base_url.to_string(),
            token_store_path: PathBuf::from("photofeed_token"),
            token_store_key: None,
            http_timeout: None,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let http_timeout = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("HTTP_TIMEOUT_SECS", raw.clone()))?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self {
            access_key: env::var("UNSPLASH_ACCESS_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("UNSPLASH_ACCESS_KEY"))?,
            secret_key: env::var("UNSPLASH_SECRET_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("UNSPLASH_SECRET_KEY"))?,
            redirect_uri: env::var("UNSPLASH_REDIRECT_URI")
                .unwrap_or_else(|_| Self::DEFAULT_REDIRECT_URI.to_string()),
            access_scope: env::var("UNSPLASH_SCOPE")
                .unwrap_or_else(|_| Self::DEFAULT_SCOPE.to_string()),
            api_base_url: env::var("UNSPLASH_API_URL")
                .unwrap_or_else(|_| Self::DEFAULT_API_URL.to_string()),
            auth_base_url: env::var("UNSPLASH_AUTH_URL")
                .unwrap_or_else(|_| Self::DEFAULT_AUTH_URL.to_string()),
            token_store_path: env::var("TOKEN_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("photofeed_token")),
            token_store_key: env::var("TOKEN_STORE_KEY").ok().filter(|k| !k.is_empty()),
            http_timeout,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
