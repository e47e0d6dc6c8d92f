//! The MCP server handler: tool routing, resource and prompt surfaces,
//! and the streamable-HTTP service wiring.

use crate::{prompts, resources};
use matterhorn_client::ApiClient;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::model::{
    GetPromptRequestParams, GetPromptResult, ListPromptsResult, ListResourceTemplatesResult,
    PaginatedRequestParams, ReadResourceRequestParams, ReadResourceResult, ServerCapabilities,
    ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, tool, tool_handler, tool_router};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Deployment facts echoed back by the status tool.
#[derive(Debug, Clone)]
pub struct ServerMeta {
    pub api_base: String,
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct McpServer {
    api: Arc<ApiClient>,
    meta: ServerMeta,
    started: Instant,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(api: ApiClient, meta: ServerMeta) -> Self {
        let tool_router = Self::search_router()
            + Self::get_router()
            + Self::manage_router()
            + Self::status_router();
        info!("Tool router initialized with {} tools", tool_router.list_all().len());

        Self {
            api: Arc::new(api),
            meta,
            started: Instant::now(),
            tool_router,
        }
    }

    pub(crate) fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[tool_router(router = status_router, vis = "pub")]
impl McpServer {
    #[tool(description = "Get server health, uptime, and configuration status")]
    pub async fn get_status(&self) -> Result<rmcp::model::CallToolResult, McpError> {
        let status = json!({
            "status": "healthy",
            "service": "matterhorn-mcp",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "system": {
                "process_uptime": format_uptime(self.started.elapsed()),
                "memory_mb": resident_memory_mb(),
            },
            "server": {
                "tools_available": self.tool_router.list_all().len(),
                "transport": "streamable-http",
                "api_base": self.meta.api_base,
                "host": self.meta.host,
                "port": self.meta.port,
            },
        });
        crate::tools::json_result(&status)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            instructions: Some(
                "Matterhorn legal practice management: search, read, and manage \
                 contacts, matters, tasks, companies, time entries, and expenses."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult {
            next_cursor: None,
            resource_templates: resources::templates(),
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        info!("Reading resource: {}", request.uri);
        resources::read(&self.api, &request.uri).await
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult {
            next_cursor: None,
            prompts: prompts::definitions(),
            meta: None,
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        info!("Rendering prompt: {}", request.name);
        prompts::render(&request.name, request.arguments.as_ref())
            .ok_or_else(|| prompts::unknown_prompt(&request.name))
    }
}

/// Build the streamable-HTTP tower service for nesting into an axum
/// router. Each session gets its own handler clone.
pub fn create_service(
    server: McpServer,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<McpServer> {
    let config = StreamableHttpServerConfig {
        sse_keep_alive: None,
        sse_retry: None,
        stateful_mode: true,
        cancellation_token,
    };
    StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        config,
    )
}

fn format_uptime(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Resident set size in MiB, read from procfs. `None` where that is
/// unavailable.
fn resident_memory_mb() -> Option<f64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: f64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some((kb / 1024.0 * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formats_as_hms() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(61)), "00:01:01");
        assert_eq!(format_uptime(Duration::from_secs(3 * 3600 + 42 * 60 + 5)), "03:42:05");
    }
}
