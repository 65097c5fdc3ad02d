//! HTTP chat backend client (`POST /api/chat`).
//!
//! `ChatTransport` is the seam the controller calls through; the frontends
//! use the reqwest-backed `HttpChatBackend`, tests substitute a scripted
//! transport. The client enforces no timeout of its own beyond the
//! configured reqwest timeout; a call always runs to completion.

use crate::protocol::{BackendReply, ChatRequest, ErrorReply};
use async_trait::async_trait;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const CHAT_PATH: &str = "/api/chat";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport-level failure: no usable response was obtained.
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The backend answered with a non-success status and an error string.
    #[error("chat backend rejected request: {0}")]
    Api(String),
}

impl BackendError {
    /// True when no response was obtained, as opposed to a backend-supplied
    /// rejection that should be surfaced verbatim.
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Request(_))
    }
}

/// Request/response channel to the conversational backend.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one user message for the session and await the structured reply.
    async fn send(&self, message: &str, session_id: &str) -> Result<BackendReply, BackendError>;
}

/// reqwest-backed transport for the chat endpoint.
#[derive(Clone)]
pub struct HttpChatBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpChatBackend {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Build from config: resolved base URL and request timeout.
    pub fn from_config(config: &crate::config::Config) -> Result<Self, BackendError> {
        let base_url = crate::config::resolve_backend_url(config);
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.backend.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatTransport for HttpChatBackend {
    async fn send(&self, message: &str, session_id: &str) -> Result<BackendReply, BackendError> {
        let url = format!("{}{}", self.base_url, CHAT_PATH);
        let body = ChatRequest {
            message: message.to_string(),
            session_id: session_id.to_string(),
        };
        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let err = res
                .json::<ErrorReply>()
                .await
                .ok()
                .map(|e| e.error)
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| format!("chat endpoint returned {}", status));
            return Err(BackendError::Api(err));
        }
        let reply: BackendReply = res.json().await?;
        Ok(reply)
    }
}
