// HTTP backend over reqwest
// Talks to the KnowledgeBot service at a base address resolved once at startup

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::{ApiError, AskRequest, AskResponse, Backend, BannerResponse, Result, StatusResponse};
use crate::config::ClientConfig;

const STATUS_PATH: &str = "/";
const BANNER_PATH: &str = "/banner";
const ASK_PATH: &str = "/ask";

/// Backend reached over HTTP. No request timeout is set: a hung call
/// hangs only the operation that issued it.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(endpoint: &'static str, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
            endpoint,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn status(&self) -> Result<StatusResponse> {
        tracing::debug!(url = %self.url(STATUS_PATH), "status probe");
        let response = self
            .client
            .get(self.url(STATUS_PATH))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Self::decode("status", response).await
    }

    async fn banner(&self) -> Result<BannerResponse> {
        tracing::debug!(url = %self.url(BANNER_PATH), "banner probe");
        let response = self
            .client
            .get(self.url(BANNER_PATH))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Self::decode("banner", response).await
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse> {
        tracing::debug!(
            prompt_type = %request.prompt_type,
            force_live = request.force_live,
            "asking backend"
        );
        let response = self
            .client
            .post(self.url(ASK_PATH))
            .form(request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Self::decode("ask", response).await
    }
}
