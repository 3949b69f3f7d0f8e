use sbm_common::ApiError;
use std::env;
use tracing::debug;
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000/";
pub const SERVER_URL_ENV: &str = "SBM_URI";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Picks the server URL from an explicit value, then `SBM_URI`, then
    /// the default.
    pub fn resolve(explicit: Option<&str>) -> Result<Self, ApiError> {
        let raw = explicit
            .map(str::to_string)
            .or_else(|| env::var(SERVER_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        debug!("Using SBM server at {}", raw);
        Self::new(&raw)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid"),
        }
    }
}

// A base without a trailing slash would lose its last path segment on join.
fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(raw.trim()).map_err(|_| ApiError::InvalidUrl(raw.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidUrl(raw.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
