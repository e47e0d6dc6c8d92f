//! Error types for the Matterhorn API client.

use serde_json::Value;
use thiserror::Error;

/// Main error type for API and OAuth operations.
///
/// Upstream rejections carry the status and body verbatim; this crate
/// never reinterprets, retries, or swallows them. The calling agent
/// decides what to do next.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Required credential or setting missing; detected before any
    /// network attempt.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No access token held. Authenticate (or set an API key) first.
    #[error("No access token available. Please authenticate first.")]
    NoAccessToken,

    /// Refresh was requested but no refresh token is stored.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The token endpoint rejected an exchange or refresh.
    #[error("Token endpoint returned {status}: {body}")]
    AuthExchange { status: u16, body: Value },

    /// The upstream API rejected the request (non-2xx).
    #[error("HTTP error {status}: {body}")]
    Upstream { status: u16, body: Value },

    /// Network-level failure (DNS, connection refused, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(sanitize_reqwest_error(&value))
    }
}

/// Strip query strings out of reqwest error messages so bearer tokens or
/// API keys passed as query parameters never reach the logs.
pub(crate) fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        let mut redacted = u.clone();
        redacted.set_query(None);
        msg = msg.replace(u.as_str(), redacted.as_str());
    }
    msg
}
