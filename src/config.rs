// Client configuration
// The backend base address is resolved once at startup and never changes

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "KNOWLEDGEBOT_API_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address without a trailing slash
    pub base_url: String,

    /// Whether banner probes are issued at all
    pub banners: bool,
}

impl ClientConfig {
    pub fn new(base_url: &str, banners: bool) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim();
        let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: trimmed.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: trimmed.trim_end_matches('/').to_string(),
            banners,
        })
    }
}
