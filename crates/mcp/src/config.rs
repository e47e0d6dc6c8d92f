//! Runtime configuration, resolved from CLI flags and `MATTERHORN_*`
//! environment variables. Flags win over the environment.

use clap::Parser;
use matterhorn_client::{ApiClient, Credentials, OAuthClient, OAuthConfig, Result};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.matterhorn.app/v1/";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/oauth/callback";

#[derive(Debug, Clone, Parser)]
#[command(name = "matterhorn-mcp", version, about = "MCP server for the Matterhorn API")]
pub struct Settings {
    /// Address the MCP server binds to.
    #[arg(long, env = "MATTERHORN_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the MCP server listens on.
    #[arg(long, env = "MATTERHORN_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Log filter directive, e.g. `info` or `matterhorn_mcp=debug`.
    #[arg(long, env = "MATTERHORN_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON instead of human-readable lines.
    #[arg(long, env = "MATTERHORN_LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    /// Base URL of the upstream REST API.
    #[arg(long, env = "MATTERHORN_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Upstream request timeout in seconds.
    #[arg(long, env = "MATTERHORN_API_TIMEOUT_SECS", default_value_t = 30)]
    pub api_timeout_secs: u64,

    /// Static API key. Takes precedence over OAuth tokens when set.
    #[arg(long, env = "MATTERHORN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Pre-obtained OAuth access token to seed the token store with.
    #[arg(long, env = "MATTERHORN_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// OAuth client ID.
    #[arg(long, env = "MATTERHORN_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret.
    #[arg(long, env = "MATTERHORN_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// OAuth redirect URI registered with the upstream.
    #[arg(long, env = "MATTERHORN_REDIRECT_URI", default_value = DEFAULT_REDIRECT_URI)]
    pub redirect_uri: String,
}

impl Settings {
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    /// True when at least one way of authenticating upstream calls exists.
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
            || self.access_token.is_some()
            || (self.client_id.is_some() && self.client_secret.is_some())
    }

    /// Build the OAuth client when a client ID/secret pair is configured.
    pub fn oauth_client(&self) -> Option<Arc<OAuthClient>> {
        let (id, secret) = match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => (id.clone(), secret.clone()),
            _ => return None,
        };
        let client = OAuthClient::new(OAuthConfig::new(id, secret, self.redirect_uri.clone()));
        if let Some(token) = &self.access_token {
            client.set_access_token(token.clone());
        }
        Some(Arc::new(client))
    }

    /// Assemble the authenticated upstream client from these settings.
    pub fn api_client(&self) -> Result<ApiClient> {
        let oauth = self.oauth_client();
        let mut credentials = Credentials::default().with_api_key(self.api_key.clone());
        if let Some(oauth) = oauth {
            credentials = credentials.with_oauth(Some(oauth));
        } else if let Some(token) = &self.access_token {
            // Access token without client credentials: still usable, just
            // not refreshable.
            let standalone = OAuthClient::new(OAuthConfig::new(
                String::new(),
                String::new(),
                self.redirect_uri.clone(),
            ));
            standalone.set_access_token(token.clone());
            credentials = credentials.with_oauth(Some(Arc::new(standalone)));
        }
        ApiClient::new(&self.api_base_url, self.api_timeout(), credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        Settings::try_parse_from(std::iter::once("matterhorn-mcp").chain(args.iter().copied()))
            .expect("parse")
    }

    #[test]
    fn defaults_match_documented_values() {
        let settings = parse(&[]);
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.api_timeout_secs, 30);
        assert_eq!(settings.redirect_uri, DEFAULT_REDIRECT_URI);
        assert!(!settings.has_credentials());
    }

    #[test]
    fn api_key_alone_counts_as_credentials() {
        let settings = parse(&["--api-key", "k"]);
        assert!(settings.has_credentials());
        assert!(settings.oauth_client().is_none());
    }

    #[test]
    fn client_pair_yields_oauth_client_seeded_with_access_token() {
        let settings = parse(&[
            "--client-id",
            "cid",
            "--client-secret",
            "sec",
            "--access-token",
            "tok",
        ]);
        let oauth = settings.oauth_client().expect("oauth");
        assert_eq!(oauth.access_token().as_deref(), Some("tok"));
    }

    #[test]
    fn bare_access_token_builds_a_working_api_client() {
        let settings = parse(&["--access-token", "tok"]);
        let api = settings.api_client().expect("client");
        assert_eq!(api.base_url().as_str(), DEFAULT_API_BASE_URL);
    }
}
