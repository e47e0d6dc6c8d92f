//! Token endpoint behavior: exchange, refresh, rotation, error
//! pass-through.

mod common;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use common::MockUpstream;
use matterhorn_client::{ClientError, OAuthClient, OAuthConfig, PkceChallenge};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct TokenEndpointState {
    calls: Arc<AtomicUsize>,
    last_form: Arc<Mutex<HashMap<String, String>>>,
    rotate_refresh: bool,
}

async fn token_handler(
    State(state): State<TokenEndpointState>,
    body: String,
) -> Json<Value> {
    state.calls.fetch_add(1, Ordering::SeqCst);
    let form: HashMap<String, String> = url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect();
    *state.last_form.lock().await = form.clone();

    let grant = form.get("grant_type").cloned().unwrap_or_default();
    let mut resp = json!({
        "access_token": format!("at-{grant}"),
        "token_type": "Bearer",
        "expires_in": 3600,
    });
    if grant == "authorization_code" {
        resp["refresh_token"] = json!("rt-initial");
    } else if state.rotate_refresh {
        resp["refresh_token"] = json!("rt-rotated");
    }
    Json(resp)
}

fn oauth_client(base_url: &str) -> OAuthClient {
    let mut config = OAuthConfig::new("cid-1", "secret-1", "http://localhost:8000/oauth/callback");
    config.token_url = format!("{base_url}/oauth/token");
    OAuthClient::new(config)
}

#[tokio::test]
async fn exchange_stores_tokens_and_auth_header_round_trips() {
    let state = TokenEndpointState::default();
    let last_form = Arc::clone(&state.last_form);
    let app = Router::new()
        .route("/oauth/token", post(token_handler))
        .with_state(state);
    let upstream = MockUpstream::start(app).await;

    let client = oauth_client(&upstream.base_url);
    let token = client
        .exchange_code_for_token("code-123", None)
        .await
        .expect("exchange");

    assert_eq!(token.access_token, "at-authorization_code");
    assert_eq!(token.refresh_token.as_deref(), Some("rt-initial"));
    assert_eq!(
        client.auth_header().expect("header"),
        format!("Bearer {}", token.access_token)
    );

    let form = last_form.lock().await.clone();
    assert_eq!(form.get("grant_type").map(String::as_str), Some("authorization_code"));
    assert_eq!(form.get("code").map(String::as_str), Some("code-123"));
    assert_eq!(form.get("client_id").map(String::as_str), Some("cid-1"));
    assert_eq!(form.get("client_secret").map(String::as_str), Some("secret-1"));
    assert!(!form.contains_key("code_verifier"));

    upstream.stop().await;
}

#[tokio::test]
async fn exchange_sends_pkce_verifier_when_supplied() {
    let state = TokenEndpointState::default();
    let last_form = Arc::clone(&state.last_form);
    let app = Router::new()
        .route("/oauth/token", post(token_handler))
        .with_state(state);
    let upstream = MockUpstream::start(app).await;

    let client = oauth_client(&upstream.base_url);
    let pkce = PkceChallenge::from_verifier("verifier-abc");
    client
        .exchange_code_for_token("code-123", Some(pkce.verifier()))
        .await
        .expect("exchange");

    let form = last_form.lock().await.clone();
    assert_eq!(
        form.get("code_verifier").map(String::as_str),
        Some("verifier-abc")
    );

    upstream.stop().await;
}

#[tokio::test]
async fn refresh_updates_access_token_and_keeps_old_refresh_token() {
    let state = TokenEndpointState::default();
    let app = Router::new()
        .route("/oauth/token", post(token_handler))
        .with_state(state);
    let upstream = MockUpstream::start(app).await;

    let client = oauth_client(&upstream.base_url);
    client
        .exchange_code_for_token("code-123", None)
        .await
        .expect("exchange");

    let refreshed = client.refresh_access_token().await.expect("refresh");
    assert_eq!(refreshed.access_token, "at-refresh_token");
    // No rotation in the response: the stored refresh token survives.
    assert_eq!(client.refresh_token().as_deref(), Some("rt-initial"));
    assert_eq!(
        client.auth_header().expect("header"),
        "Bearer at-refresh_token"
    );

    upstream.stop().await;
}

#[tokio::test]
async fn refresh_adopts_rotated_refresh_token() {
    let state = TokenEndpointState {
        rotate_refresh: true,
        ..TokenEndpointState::default()
    };
    let app = Router::new()
        .route("/oauth/token", post(token_handler))
        .with_state(state);
    let upstream = MockUpstream::start(app).await;

    let client = oauth_client(&upstream.base_url);
    client
        .exchange_code_for_token("code-123", None)
        .await
        .expect("exchange");
    client.refresh_access_token().await.expect("refresh");

    assert_eq!(client.refresh_token().as_deref(), Some("rt-rotated"));

    upstream.stop().await;
}

#[tokio::test]
async fn refresh_without_stored_token_issues_zero_network_calls() {
    let state = TokenEndpointState::default();
    let calls = Arc::clone(&state.calls);
    let app = Router::new()
        .route("/oauth/token", post(token_handler))
        .with_state(state);
    let upstream = MockUpstream::start(app).await;

    let client = oauth_client(&upstream.base_url);
    let err = client.refresh_access_token().await.expect_err("no token");

    assert!(matches!(err, ClientError::NoRefreshToken));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    upstream.stop().await;
}

#[tokio::test]
async fn failed_exchange_carries_status_and_body_verbatim() {
    async fn reject() -> (axum::http::StatusCode, Json<Value>) {
        (
            axum::http::StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant"})),
        )
    }
    let app = Router::new().route("/oauth/token", post(reject));
    let upstream = MockUpstream::start(app).await;

    let client = oauth_client(&upstream.base_url);
    let err = client
        .exchange_code_for_token("expired-code", None)
        .await
        .expect_err("rejected");

    match err {
        ClientError::AuthExchange { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, json!({"error": "invalid_grant"}));
        }
        other => panic!("expected AuthExchange, got {other:?}"),
    }
    // The failed exchange must not leave stale tokens behind.
    assert!(matches!(
        client.auth_header(),
        Err(ClientError::NoAccessToken)
    ));

    upstream.stop().await;
}
