use anyhow::Context;
use clap::Parser;
use matterhorn_mcp::Settings;
use matterhorn_mcp::server::{McpServer, ServerMeta, create_service};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    init_tracing(&settings);

    info!(
        "Starting Matterhorn MCP server: host={}, port={}, api_base={}",
        settings.host, settings.port, settings.api_base_url
    );
    if !settings.has_credentials() {
        warn!(
            "No credentials configured; upstream calls will fail until \
             MATTERHORN_API_KEY or OAuth settings are provided"
        );
    }

    let api = settings
        .api_client()
        .context("building the upstream API client")?;
    let meta = ServerMeta {
        api_base: settings.api_base_url.clone(),
        host: settings.host.clone(),
        port: settings.port,
    };
    let mcp = McpServer::new(api, meta);

    let ct = CancellationToken::new();
    let service = create_service(mcp, ct.clone());
    let app = axum::Router::new().nest_service("/mcp", service);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    info!("MCP server listening on http://{addr}/mcp");

    let shutdown = ct.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
            shutdown.cancel();
        })
        .await
        .context("serving MCP traffic")?;

    info!("Server stopped");
    Ok(())
}
