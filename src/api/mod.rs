// Backend API module for KnowledgeBot
// Wire types, the backend seam, and the HTTP implementation

pub mod protocol;
pub mod client;

pub use client::HttpBackend;
pub use protocol::{AskRequest, AskResponse, BackendMode, BannerResponse, PromptStyle, StatusResponse};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status} from {endpoint}")]
    Http { endpoint: &'static str, status: u16 },

    #[error("Malformed response from {endpoint}: {reason}")]
    Decode { endpoint: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// The question-answering service as seen by the controller.
///
/// Every call is independent; implementations keep no per-session state.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Status probe
    async fn status(&self) -> Result<StatusResponse>;

    /// Banner probe
    async fn banner(&self) -> Result<BannerResponse>;

    /// Submit a question
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse>;
}
