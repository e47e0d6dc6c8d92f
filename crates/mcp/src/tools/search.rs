//! Search tools: filtered list queries against the upstream
//! collections. Every filter is optional; only supplied, non-empty
//! filters reach the wire, plus a clamped `limit`.

use super::{clamp_limit, json_result, map_client_error, push_filter};
use crate::server::McpServer;
use matterhorn_client::result_count;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::schemars::{self, JsonSchema};
use rmcp::{ErrorData as McpError, tool, tool_router};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchContactsParams {
    #[schemars(description = "Filter by contact name (partial match)")]
    pub name: Option<String>,
    #[schemars(description = "Filter by email address")]
    pub email: Option<String>,
    #[schemars(description = "Filter by phone number")]
    pub phone: Option<String>,
    #[schemars(description = "Filter by associated matter ID")]
    pub matter_id: Option<String>,
    #[schemars(description = "Filter by associated company ID")]
    pub company_id: Option<String>,
    #[schemars(description = "Maximum number of results (1-100, default 20)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchMattersParams {
    #[schemars(description = "Filter by matter name (partial match)")]
    pub name: Option<String>,
    #[schemars(description = "Filter by associated contact ID")]
    pub contact_id: Option<String>,
    #[schemars(description = "Filter by matter status")]
    pub status: Option<String>,
    #[schemars(description = "Filter by practice area")]
    pub practice_area: Option<String>,
    #[schemars(description = "Maximum number of results (1-100, default 20)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchTasksParams {
    #[schemars(description = "Filter by associated contact ID")]
    pub contact_id: Option<String>,
    #[schemars(description = "Filter by associated matter ID")]
    pub matter_id: Option<String>,
    #[schemars(description = "Filter by task status")]
    pub status: Option<String>,
    #[schemars(description = "Filter by assigned user ID")]
    pub assigned_to: Option<String>,
    #[schemars(description = "Only tasks due after this date (YYYY-MM-DD)")]
    pub due_date_after: Option<String>,
    #[schemars(description = "Only tasks due before this date (YYYY-MM-DD)")]
    pub due_date_before: Option<String>,
    #[schemars(description = "Maximum number of results (1-100, default 20)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchCompaniesParams {
    #[schemars(description = "Filter by company name (partial match)")]
    pub name: Option<String>,
    #[schemars(description = "Filter by email address")]
    pub email: Option<String>,
    #[schemars(description = "Filter by phone number")]
    pub phone: Option<String>,
    #[schemars(description = "Maximum number of results (1-100, default 20)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchTimeEntriesParams {
    #[schemars(description = "Filter by associated contact ID")]
    pub contact_id: Option<String>,
    #[schemars(description = "Filter by associated matter ID")]
    pub matter_id: Option<String>,
    #[schemars(description = "Filter by the user who logged the time")]
    pub user_id: Option<String>,
    #[schemars(description = "Only entries dated after this date (YYYY-MM-DD)")]
    pub date_after: Option<String>,
    #[schemars(description = "Only entries dated before this date (YYYY-MM-DD)")]
    pub date_before: Option<String>,
    #[schemars(description = "Maximum number of results (1-100, default 20)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchExpensesParams {
    #[schemars(description = "Filter by associated contact ID")]
    pub contact_id: Option<String>,
    #[schemars(description = "Filter by associated matter ID")]
    pub matter_id: Option<String>,
    #[schemars(description = "Only expenses dated after this date (YYYY-MM-DD)")]
    pub date_after: Option<String>,
    #[schemars(description = "Only expenses dated before this date (YYYY-MM-DD)")]
    pub date_before: Option<String>,
    #[schemars(description = "Maximum number of results (1-100, default 20)")]
    pub limit: Option<u32>,
}

#[tool_router(router = search_router, vis = "pub")]
impl McpServer {
    #[tool(
        description = "Search for contacts (clients, leads) by name, email, phone, or associated matter/company"
    )]
    pub async fn search_contacts(
        &self,
        Parameters(params): Parameters<SearchContactsParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut query = Vec::new();
        push_filter(&mut query, "name", &params.name);
        push_filter(&mut query, "email", &params.email);
        push_filter(&mut query, "phone", &params.phone);
        push_filter(&mut query, "matter_id", &params.matter_id);
        push_filter(&mut query, "company_id", &params.company_id);
        query.push(("limit", clamp_limit(params.limit).to_string()));

        info!("Searching contacts with filters: {query:?}");
        let result = self
            .api()
            .get("contacts", &query)
            .await
            .map_err(map_client_error)?;
        info!("Found {} contacts", result_count(&result));
        json_result(&result)
    }

    #[tool(
        description = "Search for matters (cases) by name, status, practice area, or associated contact"
    )]
    pub async fn search_matters(
        &self,
        Parameters(params): Parameters<SearchMattersParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut query = Vec::new();
        push_filter(&mut query, "name", &params.name);
        push_filter(&mut query, "contact_id", &params.contact_id);
        push_filter(&mut query, "status", &params.status);
        push_filter(&mut query, "practice_area", &params.practice_area);
        query.push(("limit", clamp_limit(params.limit).to_string()));

        info!("Searching matters with filters: {query:?}");
        let result = self
            .api()
            .get("matters", &query)
            .await
            .map_err(map_client_error)?;
        info!("Found {} matters", result_count(&result));
        json_result(&result)
    }

    #[tool(
        description = "Search for tasks by status, assignee, due-date window, or associated contact/matter"
    )]
    pub async fn search_tasks(
        &self,
        Parameters(params): Parameters<SearchTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut query = Vec::new();
        push_filter(&mut query, "contact_id", &params.contact_id);
        push_filter(&mut query, "matter_id", &params.matter_id);
        push_filter(&mut query, "status", &params.status);
        push_filter(&mut query, "assigned_to", &params.assigned_to);
        push_filter(&mut query, "due_date_after", &params.due_date_after);
        push_filter(&mut query, "due_date_before", &params.due_date_before);
        query.push(("limit", clamp_limit(params.limit).to_string()));

        info!("Searching tasks with filters: {query:?}");
        let result = self
            .api()
            .get("tasks", &query)
            .await
            .map_err(map_client_error)?;
        info!("Found {} tasks", result_count(&result));
        json_result(&result)
    }

    #[tool(description = "Search for companies by name, email, or phone")]
    pub async fn search_companies(
        &self,
        Parameters(params): Parameters<SearchCompaniesParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut query = Vec::new();
        push_filter(&mut query, "name", &params.name);
        push_filter(&mut query, "email", &params.email);
        push_filter(&mut query, "phone", &params.phone);
        query.push(("limit", clamp_limit(params.limit).to_string()));

        info!("Searching companies with filters: {query:?}");
        let result = self
            .api()
            .get("companies", &query)
            .await
            .map_err(map_client_error)?;
        info!("Found {} companies", result_count(&result));
        json_result(&result)
    }

    #[tool(
        description = "Search for billable time entries by user, date window, or associated contact/matter"
    )]
    pub async fn search_time_entries(
        &self,
        Parameters(params): Parameters<SearchTimeEntriesParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut query = Vec::new();
        push_filter(&mut query, "contact_id", &params.contact_id);
        push_filter(&mut query, "matter_id", &params.matter_id);
        push_filter(&mut query, "user_id", &params.user_id);
        push_filter(&mut query, "date_after", &params.date_after);
        push_filter(&mut query, "date_before", &params.date_before);
        query.push(("limit", clamp_limit(params.limit).to_string()));

        info!("Searching time entries with filters: {query:?}");
        let result = self
            .api()
            .get("time_entries", &query)
            .await
            .map_err(map_client_error)?;
        info!("Found {} time entries", result_count(&result));
        json_result(&result)
    }

    #[tool(
        description = "Search for expenses by date window or associated contact/matter"
    )]
    pub async fn search_expenses(
        &self,
        Parameters(params): Parameters<SearchExpensesParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut query = Vec::new();
        push_filter(&mut query, "contact_id", &params.contact_id);
        push_filter(&mut query, "matter_id", &params.matter_id);
        push_filter(&mut query, "date_after", &params.date_after);
        push_filter(&mut query, "date_before", &params.date_before);
        query.push(("limit", clamp_limit(params.limit).to_string()));

        info!("Searching expenses with filters: {query:?}");
        let result = self
            .api()
            .get("expenses", &query)
            .await
            .map_err(map_client_error)?;
        info!("Found {} expenses", result_count(&result));
        json_result(&result)
    }
}
