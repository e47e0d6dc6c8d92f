//! One-shot localhost listener for the OAuth redirect. Captures the
//! `code` and `state` query parameters from the provider's callback
//! and hands them to the login flow.

use anyhow::Context as _;
use axum::Router;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        Self {
            code: query.get("code").cloned(),
            state: query.get("state").cloned(),
            error: query.get("error").cloned(),
        }
    }
}

async fn capture(
    State(tx): State<mpsc::Sender<CallbackParams>>,
    Query(query): Query<HashMap<String, String>>,
) -> Html<&'static str> {
    let params = CallbackParams::from_query(&query);
    let _ = tx.send(params).await;
    Html("<html><body><h3>Authentication complete.</h3><p>You can close this window and return to the terminal.</p></body></html>")
}

/// Serve the callback path once and return the captured parameters.
/// `path` is the path component of the registered redirect URI.
pub async fn wait_for_callback(
    addr: SocketAddr,
    path: &str,
    timeout: std::time::Duration,
) -> anyhow::Result<CallbackParams> {
    let (tx, mut rx) = mpsc::channel::<CallbackParams>(1);
    let app = Router::new().route(path, get(capture)).with_state(tx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding callback listener on {addr}"))?;
    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    let params = tokio::time::timeout(timeout, rx.recv())
        .await
        .context("timed out waiting for the OAuth callback")?
        .context("callback listener closed unexpectedly")?;
    server.abort();
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_code_state_and_error() {
        let query = HashMap::from([
            ("code".to_string(), "abc".to_string()),
            ("state".to_string(), "xyz".to_string()),
        ]);
        let params = CallbackParams::from_query(&query);
        assert_eq!(params.code.as_deref(), Some("abc"));
        assert_eq!(params.state.as_deref(), Some("xyz"));
        assert!(params.error.is_none());

        let denied = HashMap::from([("error".to_string(), "access_denied".to_string())]);
        let params = CallbackParams::from_query(&denied);
        assert!(params.code.is_none());
        assert_eq!(params.error.as_deref(), Some("access_denied"));
    }
}
