//! Token-acquisition CLI: print an authorization URL, exchange a code
//! by hand, or run the full browser login flow against a localhost
//! callback listener.

mod callback;

use anyhow::{Context as _, bail};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use clap::{Parser, Subcommand};
use matterhorn_client::{OAuthClient, OAuthConfig, PkceChallenge, TokenResponse};
use owo_colors::OwoColorize;
use rand_core::{OsRng, TryRngCore};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Parser)]
#[command(name = "matterhorn-auth", version, about = "Obtain Matterhorn OAuth tokens")]
struct Cli {
    /// OAuth client ID.
    #[arg(long, env = "MATTERHORN_CLIENT_ID")]
    client_id: String,

    /// OAuth client secret.
    #[arg(long, env = "MATTERHORN_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Redirect URI registered with the provider.
    #[arg(
        long,
        env = "MATTERHORN_REDIRECT_URI",
        default_value = "http://localhost:8000/oauth/callback"
    )]
    redirect_uri: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the authorization URL to open in a browser.
    Authorize {
        /// Include a PKCE challenge and print the matching verifier.
        #[arg(long)]
        pkce: bool,
    },
    /// Exchange an authorization code for tokens.
    Exchange {
        /// The code from the provider's redirect.
        #[arg(long)]
        code: String,
        /// PKCE verifier, if the authorization URL carried a challenge.
        #[arg(long)]
        verifier: Option<String>,
    },
    /// Full flow: listen on the redirect URI, open the URL, exchange
    /// the returned code automatically.
    Login {
        /// Use PKCE for the authorization request.
        #[arg(long)]
        pkce: bool,
    },
}

fn random_state() -> anyhow::Result<String> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("gathering entropy for the state parameter")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn print_tokens(token: &TokenResponse) {
    println!();
    println!("{}", "Tokens obtained:".green().bold());
    println!("  access_token:  {}", token.access_token);
    if let Some(refresh) = &token.refresh_token {
        println!("  refresh_token: {refresh}");
    }
    if let Some(expires) = token.expires_in {
        println!("  expires_in:    {expires}s");
    }
    println!();
    println!("{}", "To use with the MCP server:".bold());
    println!("  export MATTERHORN_ACCESS_TOKEN={}", token.access_token);
}

async fn run_authorize(client: &OAuthClient, pkce: bool) -> anyhow::Result<()> {
    let state = random_state()?;
    let challenge = if pkce {
        Some(PkceChallenge::generate().context("generating PKCE challenge")?)
    } else {
        None
    };
    let url = client
        .authorization_url(Some(&state), challenge.as_ref())
        .context("building the authorization URL")?;

    println!("{}", "Open this URL in your browser:".bold());
    println!("  {url}");
    println!();
    println!("state: {state}");
    if let Some(challenge) = &challenge {
        println!(
            "{} pass this to 'exchange --verifier' after the redirect:",
            "PKCE verifier:".yellow()
        );
        println!("  {}", challenge.verifier());
    }
    Ok(())
}

async fn run_exchange(
    client: &OAuthClient,
    code: &str,
    verifier: Option<&str>,
) -> anyhow::Result<()> {
    let token = client
        .exchange_code_for_token(code, verifier)
        .await
        .context("exchanging the authorization code")?;
    print_tokens(&token);
    Ok(())
}

async fn run_login(client: &OAuthClient, redirect_uri: &str, pkce: bool) -> anyhow::Result<()> {
    let redirect = Url::parse(redirect_uri).context("parsing the redirect URI")?;
    let host = redirect.host_str().unwrap_or("localhost");
    let port = redirect.port().unwrap_or(8000);
    let bind_host = if host == "localhost" { "127.0.0.1" } else { host };
    let addr: SocketAddr = format!("{bind_host}:{port}")
        .parse()
        .with_context(|| format!("redirect URI host '{host}' is not a bindable address"))?;
    let path = redirect.path().to_string();

    let state = random_state()?;
    let challenge = if pkce {
        Some(PkceChallenge::generate().context("generating PKCE challenge")?)
    } else {
        None
    };
    let url = client
        .authorization_url(Some(&state), challenge.as_ref())
        .context("building the authorization URL")?;

    println!("{}", "Open this URL in your browser:".bold());
    println!("  {url}");
    println!();
    println!("Waiting for the callback on {addr}{path} ...");

    let params = callback::wait_for_callback(addr, &path, CALLBACK_TIMEOUT).await?;
    if let Some(error) = params.error {
        bail!("authorization was denied: {error}");
    }
    if params.state.as_deref() != Some(state.as_str()) {
        bail!("state mismatch in the OAuth callback");
    }
    let code = params
        .code
        .context("the callback carried no authorization code")?;

    let token = client
        .exchange_code_for_token(&code, challenge.as_ref().map(|c| c.verifier()))
        .await
        .context("exchanging the authorization code")?;
    print_tokens(&token);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = OAuthConfig::new(
        cli.client_id.clone(),
        cli.client_secret.clone(),
        cli.redirect_uri.clone(),
    );
    let client = OAuthClient::new(config);

    match &cli.command {
        Command::Authorize { pkce } => run_authorize(&client, *pkce).await,
        Command::Exchange { code, verifier } => {
            run_exchange(&client, code, verifier.as_deref()).await
        }
        Command::Login { pkce } => run_login(&client, &cli.redirect_uri, *pkce).await,
    }
}
