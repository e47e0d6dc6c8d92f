//! Get tools: single-record fetches by ID, plus the user listing.
//! Upstream 404s surface as errors carrying the status and body.

use super::{json_result, map_client_error};
use crate::server::McpServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::schemars::{self, JsonSchema};
use rmcp::{ErrorData as McpError, tool, tool_router};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetContactParams {
    #[schemars(description = "The contact's unique identifier")]
    pub contact_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetMatterParams {
    #[schemars(description = "The matter's unique identifier")]
    pub matter_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTaskParams {
    #[schemars(description = "The task's unique identifier")]
    pub task_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetCompanyParams {
    #[schemars(description = "The company's unique identifier")]
    pub company_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTimeEntryParams {
    #[schemars(description = "The time entry's unique identifier")]
    pub time_entry_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetExpenseParams {
    #[schemars(description = "The expense's unique identifier")]
    pub expense_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetUserParams {
    #[schemars(description = "The user's unique identifier")]
    pub user_id: String,
}

#[tool_router(router = get_router, vis = "pub")]
impl McpServer {
    #[tool(description = "Get full details of a contact by ID")]
    pub async fn get_contact(
        &self,
        Parameters(params): Parameters<GetContactParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Retrieving contact: {}", params.contact_id);
        let result = self
            .api()
            .get(&format!("contacts/{}", params.contact_id), &[])
            .await
            .map_err(map_client_error)?;
        json_result(&result)
    }

    #[tool(description = "Get full details of a matter (case) by ID")]
    pub async fn get_matter(
        &self,
        Parameters(params): Parameters<GetMatterParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Retrieving matter: {}", params.matter_id);
        let result = self
            .api()
            .get(&format!("matters/{}", params.matter_id), &[])
            .await
            .map_err(map_client_error)?;
        json_result(&result)
    }

    #[tool(description = "Get full details of a task by ID")]
    pub async fn get_task(
        &self,
        Parameters(params): Parameters<GetTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Retrieving task: {}", params.task_id);
        let result = self
            .api()
            .get(&format!("tasks/{}", params.task_id), &[])
            .await
            .map_err(map_client_error)?;
        json_result(&result)
    }

    #[tool(description = "Get full details of a company by ID")]
    pub async fn get_company(
        &self,
        Parameters(params): Parameters<GetCompanyParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Retrieving company: {}", params.company_id);
        let result = self
            .api()
            .get(&format!("companies/{}", params.company_id), &[])
            .await
            .map_err(map_client_error)?;
        json_result(&result)
    }

    #[tool(description = "Get full details of a time entry by ID")]
    pub async fn get_time_entry(
        &self,
        Parameters(params): Parameters<GetTimeEntryParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Retrieving time entry: {}", params.time_entry_id);
        let result = self
            .api()
            .get(&format!("time_entries/{}", params.time_entry_id), &[])
            .await
            .map_err(map_client_error)?;
        json_result(&result)
    }

    #[tool(description = "Get full details of an expense by ID")]
    pub async fn get_expense(
        &self,
        Parameters(params): Parameters<GetExpenseParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Retrieving expense: {}", params.expense_id);
        let result = self
            .api()
            .get(&format!("expenses/{}", params.expense_id), &[])
            .await
            .map_err(map_client_error)?;
        json_result(&result)
    }

    #[tool(description = "Get full details of a firm user by ID")]
    pub async fn get_user(
        &self,
        Parameters(params): Parameters<GetUserParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Retrieving user: {}", params.user_id);
        let result = self
            .api()
            .get(&format!("users/{}", params.user_id), &[])
            .await
            .map_err(map_client_error)?;
        json_result(&result)
    }

    #[tool(description = "List all users (attorneys, staff) in the firm")]
    pub async fn list_users(&self) -> Result<CallToolResult, McpError> {
        info!("Listing users");
        let result = self
            .api()
            .get("users", &[])
            .await
            .map_err(map_client_error)?;
        json_result(&result)
    }
}
