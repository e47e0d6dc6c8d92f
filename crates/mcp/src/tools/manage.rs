//! Manage tools: record creation, updates, and deletion. Request
//! bodies carry only the fields the caller supplied; `additional_fields`
//! merges in last and wins on collisions.

use super::{insert_if_set, json_result, map_client_error, merge_additional};
use crate::server::McpServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content};
use rmcp::schemars::{self, JsonSchema};
use rmcp::{ErrorData as McpError, tool, tool_router};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateContactParams {
    #[schemars(description = "Contact's first name")]
    pub first_name: String,
    #[schemars(description = "Contact's last name")]
    pub last_name: String,
    #[schemars(description = "Contact's email address")]
    pub email: Option<String>,
    #[schemars(description = "Contact's phone number")]
    pub phone: Option<String>,
    #[schemars(description = "Contact type, e.g. 'lead' or 'client' (default 'lead')")]
    pub contact_type: Option<String>,
    #[schemars(description = "ID of the company to associate the contact with")]
    pub company_id: Option<String>,
    #[schemars(description = "Extra fields to include verbatim in the request body")]
    pub additional_fields: Option<HashMap<String, Value>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateContactParams {
    #[schemars(description = "The contact's unique identifier")]
    pub contact_id: String,
    #[schemars(description = "New first name")]
    pub first_name: Option<String>,
    #[schemars(description = "New last name")]
    pub last_name: Option<String>,
    #[schemars(description = "New email address")]
    pub email: Option<String>,
    #[schemars(description = "New phone number")]
    pub phone: Option<String>,
    #[schemars(description = "New contact status")]
    pub status: Option<String>,
    #[schemars(description = "Extra fields to include verbatim in the request body")]
    pub additional_fields: Option<HashMap<String, Value>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTaskParams {
    #[schemars(description = "Task title")]
    pub title: String,
    #[schemars(description = "Task description")]
    pub description: Option<String>,
    #[schemars(description = "Due date (YYYY-MM-DD)")]
    pub due_date: Option<String>,
    #[schemars(description = "ID of the user to assign the task to")]
    pub assigned_to: Option<String>,
    #[schemars(description = "ID of the contact to associate the task with")]
    pub contact_id: Option<String>,
    #[schemars(description = "ID of the matter to associate the task with")]
    pub matter_id: Option<String>,
    #[schemars(description = "Task status (default 'pending')")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateTaskParams {
    #[schemars(description = "The task's unique identifier")]
    pub task_id: String,
    #[schemars(description = "New title")]
    pub title: Option<String>,
    #[schemars(description = "New description")]
    pub description: Option<String>,
    #[schemars(description = "New due date (YYYY-MM-DD)")]
    pub due_date: Option<String>,
    #[schemars(description = "ID of the user to reassign the task to")]
    pub assigned_to: Option<String>,
    #[schemars(description = "New task status")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteTaskParams {
    #[schemars(description = "The task's unique identifier")]
    pub task_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTimeEntryParams {
    #[schemars(description = "ID of the matter the time was spent on")]
    pub matter_id: String,
    #[schemars(description = "Duration in hours")]
    pub duration: f64,
    #[schemars(description = "What the time was spent on")]
    pub description: String,
    #[schemars(description = "Date the work happened (YYYY-MM-DD)")]
    pub date: String,
    #[schemars(description = "ID of the user who did the work")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateExpenseParams {
    #[schemars(description = "ID of the matter the expense belongs to")]
    pub matter_id: String,
    #[schemars(description = "Expense amount")]
    pub amount: f64,
    #[schemars(description = "What the expense was for")]
    pub description: String,
    #[schemars(description = "Date the expense was incurred (YYYY-MM-DD)")]
    pub date: String,
    #[schemars(description = "Expense category")]
    pub category: Option<String>,
}

#[tool_router(router = manage_router, vis = "pub")]
impl McpServer {
    #[tool(description = "Create a new contact (lead or client)")]
    pub async fn create_contact(
        &self,
        Parameters(params): Parameters<CreateContactParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Creating contact: {} {}", params.first_name, params.last_name);

        let contact_type = params
            .contact_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "lead".to_string());
        let mut body = Map::new();
        body.insert("first_name".to_string(), json!(params.first_name));
        body.insert("last_name".to_string(), json!(params.last_name));
        body.insert("type".to_string(), json!(contact_type));
        insert_if_set(&mut body, "email", &params.email);
        insert_if_set(&mut body, "phone", &params.phone);
        insert_if_set(&mut body, "company_id", &params.company_id);
        merge_additional(&mut body, params.additional_fields);

        let result = self
            .api()
            .post("contacts", &Value::Object(body))
            .await
            .map_err(map_client_error)?;
        info!("Created contact with ID: {}", created_id(&result));
        json_result(&result)
    }

    #[tool(description = "Update an existing contact's details")]
    pub async fn update_contact(
        &self,
        Parameters(params): Parameters<UpdateContactParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Updating contact: {}", params.contact_id);

        let mut body = Map::new();
        insert_if_set(&mut body, "first_name", &params.first_name);
        insert_if_set(&mut body, "last_name", &params.last_name);
        insert_if_set(&mut body, "email", &params.email);
        insert_if_set(&mut body, "phone", &params.phone);
        insert_if_set(&mut body, "status", &params.status);
        merge_additional(&mut body, params.additional_fields);

        let result = self
            .api()
            .put(&format!("contacts/{}", params.contact_id), &Value::Object(body))
            .await
            .map_err(map_client_error)?;
        info!("Updated contact: {}", params.contact_id);
        json_result(&result)
    }

    #[tool(description = "Create a new task, optionally linked to a contact or matter")]
    pub async fn create_task(
        &self,
        Parameters(params): Parameters<CreateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Creating task: {}", params.title);

        let status = params
            .status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "pending".to_string());
        let mut body = Map::new();
        body.insert("title".to_string(), json!(params.title));
        body.insert("status".to_string(), json!(status));
        insert_if_set(&mut body, "description", &params.description);
        insert_if_set(&mut body, "due_date", &params.due_date);
        insert_if_set(&mut body, "assigned_to", &params.assigned_to);
        insert_if_set(&mut body, "contact_id", &params.contact_id);
        insert_if_set(&mut body, "matter_id", &params.matter_id);

        let result = self
            .api()
            .post("tasks", &Value::Object(body))
            .await
            .map_err(map_client_error)?;
        info!("Created task with ID: {}", created_id(&result));
        json_result(&result)
    }

    #[tool(description = "Update an existing task's details or status")]
    pub async fn update_task(
        &self,
        Parameters(params): Parameters<UpdateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Updating task: {}", params.task_id);

        let mut body = Map::new();
        insert_if_set(&mut body, "title", &params.title);
        insert_if_set(&mut body, "description", &params.description);
        insert_if_set(&mut body, "due_date", &params.due_date);
        insert_if_set(&mut body, "assigned_to", &params.assigned_to);
        insert_if_set(&mut body, "status", &params.status);

        let result = self
            .api()
            .put(&format!("tasks/{}", params.task_id), &Value::Object(body))
            .await
            .map_err(map_client_error)?;
        info!("Updated task: {}", params.task_id);
        json_result(&result)
    }

    #[tool(description = "Delete a task by ID")]
    pub async fn delete_task(
        &self,
        Parameters(params): Parameters<DeleteTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Deleting task: {}", params.task_id);

        self.api()
            .delete(&format!("tasks/{}", params.task_id))
            .await
            .map_err(map_client_error)?;
        info!("Deleted task: {}", params.task_id);

        // The upstream returns an empty body on delete; synthesize a
        // confirmation the caller can rely on.
        let confirmation = json!({
            "success": true,
            "message": format!("Task {} deleted successfully", params.task_id),
        });
        let text = serde_json::to_string_pretty(&confirmation)
            .unwrap_or_else(|_| confirmation.to_string());
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Log billable time against a matter")]
    pub async fn create_time_entry(
        &self,
        Parameters(params): Parameters<CreateTimeEntryParams>,
    ) -> Result<CallToolResult, McpError> {
        info!(
            "Creating time entry: {} hours on matter {}",
            params.duration, params.matter_id
        );

        let mut body = Map::new();
        body.insert("matter_id".to_string(), json!(params.matter_id));
        body.insert("duration".to_string(), json!(params.duration));
        body.insert("description".to_string(), json!(params.description));
        body.insert("date".to_string(), json!(params.date));
        body.insert("billable".to_string(), json!(true));
        insert_if_set(&mut body, "user_id", &params.user_id);

        let result = self
            .api()
            .post("time_entries", &Value::Object(body))
            .await
            .map_err(map_client_error)?;
        info!("Created time entry with ID: {}", created_id(&result));
        json_result(&result)
    }

    #[tool(description = "Record a billable expense against a matter")]
    pub async fn create_expense(
        &self,
        Parameters(params): Parameters<CreateExpenseParams>,
    ) -> Result<CallToolResult, McpError> {
        info!(
            "Creating expense: {} on matter {}",
            params.amount, params.matter_id
        );

        let mut body = Map::new();
        body.insert("matter_id".to_string(), json!(params.matter_id));
        body.insert("amount".to_string(), json!(params.amount));
        body.insert("description".to_string(), json!(params.description));
        body.insert("date".to_string(), json!(params.date));
        body.insert("billable".to_string(), json!(true));
        insert_if_set(&mut body, "category", &params.category);

        let result = self
            .api()
            .post("expenses", &Value::Object(body))
            .await
            .map_err(map_client_error)?;
        info!("Created expense with ID: {}", created_id(&result));
        json_result(&result)
    }
}

/// Best-effort ID extraction from a create response, for logging only.
fn created_id(result: &Value) -> String {
    let id = result
        .get("data")
        .and_then(|d| d.get("id"))
        .or_else(|| result.get("id"));
    match id {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "unknown".to_string(),
    }
}
