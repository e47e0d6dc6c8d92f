//! OAuth 2.0 authorization-code flow against the Matterhorn endpoints.
//!
//! Token refresh is never automatic: every call site decides when to
//! refresh, so there is exactly one source of truth for token state and
//! no hidden retry storms inside request dispatch.

use crate::error::{ClientError, Result};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use parking_lot::RwLock;
use rand_core::{OsRng, TryRngCore as _};
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest as _, Sha256};
use std::time::Duration;
use tracing::info;
use url::Url;

/// Default OAuth endpoints for the hosted Matterhorn platform.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://app.matterhorn.app/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://api.matterhorn.app/oauth/token";

/// Scope requested during authorization.
const OAUTH_SCOPE: &str = "read write";

/// Token endpoints get their own fixed timeout, independent of the API
/// dispatch timeout.
const TOKEN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
}

impl OAuthConfig {
    /// Config pointing at the hosted Matterhorn OAuth endpoints.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

/// Raw payload returned by the token endpoint.
///
/// Fields beyond the ones we act on are preserved in `extra` so callers
/// see the upstream response verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// PKCE verifier/challenge pair (S256).
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    verifier: String,
    challenge: String,
}

impl PkceChallenge {
    /// Generate a fresh verifier from 32 bytes of OS randomness and its
    /// S256 challenge.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| ClientError::Config(format!("OS randomness unavailable: {e}")))?;
        let verifier = URL_SAFE_NO_PAD.encode(bytes);
        Ok(Self::from_verifier(verifier))
    }

    /// Derive the S256 challenge for an existing verifier.
    #[must_use]
    pub fn from_verifier(verifier: impl Into<String>) -> Self {
        let verifier = verifier.into();
        let digest = Sha256::digest(verifier.as_bytes());
        let challenge = URL_SAFE_NO_PAD.encode(digest);
        Self {
            verifier,
            challenge,
        }
    }

    #[must_use]
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    #[must_use]
    pub fn challenge(&self) -> &str {
        &self.challenge
    }
}

#[derive(Default)]
struct TokenState {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// OAuth 2.0 client for the Matterhorn API.
///
/// The token cell is shared read-mostly state: it is written only during
/// explicit exchange/refresh (or [`OAuthClient::set_access_token`]).
/// Concurrent refreshes are not coordinated; the last writer wins.
pub struct OAuthClient {
    http: reqwest::Client,
    config: OAuthConfig,
    tokens: RwLock<TokenState>,
}

impl OAuthClient {
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self::with_http(reqwest::Client::new(), config)
    }

    #[must_use]
    pub fn with_http(http: reqwest::Client, config: OAuthConfig) -> Self {
        Self {
            http,
            config,
            tokens: RwLock::new(TokenState::default()),
        }
    }

    /// Build the authorization URL the user must visit.
    ///
    /// Pure construction, no network call. PKCE and `state` are additive:
    /// callers not using them get a plain authorization-code URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorize endpoint is not a
    /// valid URL.
    pub fn authorization_url(
        &self,
        state: Option<&str>,
        pkce: Option<&PkceChallenge>,
    ) -> Result<String> {
        let mut url = Url::parse(&self.config.authorize_url).map_err(|e| {
            ClientError::Config(format!(
                "Invalid authorize URL '{}': {e}",
                self.config.authorize_url
            ))
        })?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("client_id", &self.config.client_id)
                .append_pair("redirect_uri", &self.config.redirect_uri)
                .append_pair("response_type", "code")
                .append_pair("scope", OAUTH_SCOPE);
            if let Some(state) = state {
                pairs.append_pair("state", state);
            }
            if let Some(pkce) = pkce {
                pairs
                    .append_pair("code_challenge", pkce.challenge())
                    .append_pair("code_challenge_method", "S256");
            }
        }

        Ok(url.into())
    }

    /// Exchange an authorization code for tokens and store them.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::AuthExchange`] on a non-2xx response,
    /// carrying the upstream status and body verbatim. Never retried.
    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<TokenResponse> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];
        if let Some(verifier) = code_verifier {
            form.push(("code_verifier", verifier));
        }

        let token = self.post_token_request(&form).await?;

        {
            let mut state = self.tokens.write();
            state.access_token = Some(token.access_token.clone());
            state.refresh_token = token.refresh_token.clone();
        }

        info!("Successfully obtained access token");
        Ok(token)
    }

    /// Refresh the access token using the stored refresh token.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::NoRefreshToken`] when no refresh token
    /// is held, before any network call.
    pub async fn refresh_access_token(&self) -> Result<TokenResponse> {
        let refresh_token = self
            .tokens
            .read()
            .refresh_token
            .clone()
            .ok_or(ClientError::NoRefreshToken)?;

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let token = self.post_token_request(&form).await?;

        {
            let mut state = self.tokens.write();
            state.access_token = Some(token.access_token.clone());
            // Rotation is upstream-optional: keep the old refresh token
            // unless the response carries a new one.
            if let Some(rt) = &token.refresh_token {
                state.refresh_token = Some(rt.clone());
            }
        }

        info!("Successfully refreshed access token");
        Ok(token)
    }

    async fn post_token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(form)
            .timeout(TOKEN_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body: Value =
                serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text));
            return Err(ClientError::AuthExchange {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        serde_json::from_value(body.clone()).map_err(|e| ClientError::AuthExchange {
            status: status.as_u16(),
            body: serde_json::json!({
                "error": format!("unparseable token response: {e}"),
                "body": body,
            }),
        })
    }

    /// `Authorization` header value for authenticated API requests.
    ///
    /// Never triggers a refresh implicitly; refresh is caller-initiated.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::NoAccessToken`] when no token is held.
    pub fn auth_header(&self) -> Result<String> {
        self.tokens
            .read()
            .access_token
            .as_deref()
            .map(|t| format!("Bearer {t}"))
            .ok_or(ClientError::NoAccessToken)
    }

    /// Set the access token directly (API-key compatibility mode).
    pub fn set_access_token(&self, token: impl Into<String>) {
        self.tokens.write().access_token = Some(token.into());
        info!("Access token set directly");
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.tokens.read().access_token.clone()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.tokens.read().refresh_token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn query_map(url: &str) -> HashMap<String, String> {
        Url::parse(url)
            .expect("valid url")
            .query_pairs()
            .into_owned()
            .collect()
    }

    fn test_client() -> OAuthClient {
        OAuthClient::new(OAuthConfig::new(
            "cid-1",
            "secret-1",
            "http://localhost:8000/oauth/callback",
        ))
    }

    #[test]
    fn authorization_url_has_core_params_and_omits_optional_ones() {
        let client = test_client();
        let url = client.authorization_url(None, None).expect("url");
        let q = query_map(&url);

        assert_eq!(q.get("client_id").map(String::as_str), Some("cid-1"));
        assert_eq!(
            q.get("redirect_uri").map(String::as_str),
            Some("http://localhost:8000/oauth/callback")
        );
        assert_eq!(q.get("response_type").map(String::as_str), Some("code"));
        assert_eq!(q.get("scope").map(String::as_str), Some("read write"));
        assert!(!q.contains_key("state"));
        assert!(!q.contains_key("code_challenge"));
        assert!(!q.contains_key("code_challenge_method"));
    }

    #[test]
    fn authorization_url_includes_state_and_pkce_when_supplied() {
        let client = test_client();
        let pkce = PkceChallenge::from_verifier("test-verifier");
        let url = client
            .authorization_url(Some("csrf-123"), Some(&pkce))
            .expect("url");
        let q = query_map(&url);

        assert_eq!(q.get("state").map(String::as_str), Some("csrf-123"));
        assert_eq!(
            q.get("code_challenge").map(String::as_str),
            Some(pkce.challenge())
        );
        assert_eq!(
            q.get("code_challenge_method").map(String::as_str),
            Some("S256")
        );
    }

    #[test]
    fn pkce_challenge_is_base64url_sha256_of_verifier() {
        let pkce = PkceChallenge::from_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
        // RFC 7636 appendix B test vector.
        assert_eq!(pkce.challenge(), "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn generated_pkce_verifier_matches_its_challenge() {
        let pkce = PkceChallenge::generate().expect("os randomness");
        let rederived = PkceChallenge::from_verifier(pkce.verifier());
        assert_eq!(pkce.challenge(), rederived.challenge());
    }

    #[test]
    fn auth_header_requires_a_token() {
        let client = test_client();
        assert!(matches!(
            client.auth_header(),
            Err(ClientError::NoAccessToken)
        ));

        client.set_access_token("tok-9");
        assert_eq!(client.auth_header().expect("header"), "Bearer tok-9");
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_fails_before_any_network_call() {
        // Token URL points at a port nothing listens on: if the client
        // tried the network, the error would be Transport, not
        // NoRefreshToken.
        let mut config = OAuthConfig::new("cid", "sec", "http://localhost/cb");
        config.token_url = "http://127.0.0.1:1/oauth/token".to_string();
        let client = OAuthClient::new(config);

        assert!(matches!(
            client.refresh_access_token().await,
            Err(ClientError::NoRefreshToken)
        ));
    }
}
