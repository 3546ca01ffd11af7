//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const TOKEN_DIR: &str = ".chirp";
const TOKEN_FILE: &str = "token.json";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `CHIRP_API_URL` is not set.
    #[error("missing backend URL: set CHIRP_API_URL")]
    MissingApiUrl,

    /// The backend URL is not an absolute `http(s)://` URL.
    #[error("invalid backend URL '{0}': expected http:// or https://")]
    InvalidApiUrl(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without trailing slash; API calls go to `{api_url}/api/...`.
    pub api_url: String,
    pub timeouts: Timeouts,
    /// Where the file-backed token slot lives.
    pub token_path: PathBuf,
}

impl ClientConfig {
    /// Build a config for `api_url` with default timeouts and token location.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_url` is not an `http(s)://` URL.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: normalize_api_url(api_url)?,
            timeouts: Timeouts::default(),
            token_path: default_token_path(std::env::var_os("HOME").map(PathBuf::from)),
        })
    }

    /// Build typed client config from environment variables.
    ///
    /// Required:
    /// - `CHIRP_API_URL`: backend base URL
    ///
    /// Optional:
    /// - `CHIRP_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CHIRP_CONNECT_TIMEOUT_SECS`: default 10
    /// - `CHIRP_TOKEN_FILE`: default `$HOME/.chirp/token.json`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_api_url(None)
    }

    /// Same as [`Self::from_env`], but `api_url` (when given) replaces
    /// `CHIRP_API_URL`. Every other variable is still read.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL is missing or malformed.
    pub fn from_env_with_api_url(api_url: Option<&str>) -> Result<Self, ConfigError> {
        Self::from_vars(api_url, |key| std::env::var(key).ok())
    }

    pub(crate) fn from_vars(api_url: Option<&str>, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = match api_url {
            Some(url) => url.to_owned(),
            None => var("CHIRP_API_URL").ok_or(ConfigError::MissingApiUrl)?,
        };
        let api_url = normalize_api_url(&raw_url)?;
        let timeouts = Timeouts {
            request_secs: parse_u64(var("CHIRP_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(var("CHIRP_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let token_path = var("CHIRP_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_token_path(var("HOME").map(PathBuf::from)));

        Ok(Self { api_url, timeouts, token_path })
    }
}

pub(crate) fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::MissingApiUrl);
    }
    let parsed = reqwest::Url::parse(trimmed).map_err(|_| ConfigError::InvalidApiUrl(raw.to_owned()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
        return Err(ConfigError::InvalidApiUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn default_token_path(home: Option<PathBuf>) -> PathBuf {
    home.unwrap_or_else(|| PathBuf::from("."))
        .join(TOKEN_DIR)
        .join(TOKEN_FILE)
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
