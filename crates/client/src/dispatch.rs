//! Authenticated single-attempt REST dispatch.
//!
//! One outbound call per tool invocation: bearer auth, fixed timeout,
//! uniform error translation. No retries, no backoff, no circuit
//! breaking; the calling agent decides whether to retry.

use crate::auth::OAuthClient;
use crate::error::{ClientError, Result};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Credential source for API requests.
///
/// A direct API key (or pre-configured access token) takes precedence
/// over an OAuth-issued token when both are configured.
#[derive(Clone, Default)]
pub struct Credentials {
    api_key: Option<String>,
    oauth: Option<Arc<OAuthClient>>,
}

impl Credentials {
    #[must_use]
    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            oauth: None,
        }
    }

    #[must_use]
    pub fn oauth(client: Arc<OAuthClient>) -> Self {
        Self {
            api_key: None,
            oauth: Some(client),
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    #[must_use]
    pub fn with_oauth(mut self, client: Option<Arc<OAuthClient>>) -> Self {
        self.oauth = client;
        self
    }

    /// Resolve the bearer token, checked before any network attempt.
    ///
    /// # Errors
    ///
    /// [`ClientError::Config`] when neither an API key nor an OAuth
    /// client is configured; [`ClientError::NoAccessToken`] when the
    /// OAuth client holds no token yet.
    pub fn bearer(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        if let Some(oauth) = &self.oauth {
            return oauth.access_token().ok_or(ClientError::NoAccessToken);
        }
        Err(ClientError::Config(
            "No Matterhorn credentials configured. Set MATTERHORN_API_KEY, \
             MATTERHORN_ACCESS_TOKEN, or the OAuth client id/secret."
                .to_string(),
        ))
    }
}

/// Authenticated HTTP client for one upstream API base.
///
/// Connections are pooled by `reqwest` as an optimization; every call is
/// still an independent single-attempt request/response.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    credentials: Credentials,
}

impl ApiClient {
    /// Build a client for `base_url` (expects a trailing slash, e.g.
    /// `https://api.matterhorn.app/v1/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: &str, timeout: Duration, credentials: Credentials) -> Result<Self> {
        // Without the trailing slash Url::join would drop the version
        // path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ClientError::Config(format!("Invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            timeout,
            credentials,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET a resource path with query parameters.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.send(Method::GET, path, query, None).await
    }

    /// POST a JSON body to a resource path.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    /// PUT a JSON body to a resource path.
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    /// DELETE a resource path.
    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send(Method::DELETE, path, &[], None).await
    }

    /// Execute one outbound request.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Config`] / [`ClientError::NoAccessToken`] before
    ///   any network call when no credential resolves.
    /// - [`ClientError::Upstream`] on a non-2xx status, body untouched.
    /// - [`ClientError::Transport`] on DNS/connect/timeout failure.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let token = self.credentials.bearer()?;

        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Config(format!("Invalid resource path '{path}': {e}")))?;

        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(token)
            .timeout(self.timeout);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        // Upstream is JSON everywhere, but fall back to the raw text so
        // error bodies are never lost.
        let parsed: Value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status.is_success() {
            Ok(parsed)
        } else {
            Err(ClientError::Upstream {
                status: status.as_u16(),
                body: parsed,
            })
        }
    }
}
