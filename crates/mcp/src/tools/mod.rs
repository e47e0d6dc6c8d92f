//! Tool catalog shared plumbing: limit clamping, query/body assembly,
//! result rendering, and upstream error translation.

pub mod get;
pub mod manage;
pub mod search;

use matterhorn_client::ClientError;
use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content};
use serde_json::{Map, Value, json};
use std::collections::HashMap;

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Absent limits default to 20; out-of-range values are pulled back
/// into 1..=100 rather than rejected.
pub(crate) fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Append a query parameter only when the caller supplied a non-empty
/// value. Empty strings mean "not provided".
pub(crate) fn push_filter(
    query: &mut Vec<(&'static str, String)>,
    key: &'static str,
    value: &Option<String>,
) {
    if let Some(v) = value
        && !v.is_empty()
    {
        query.push((key, v.clone()));
    }
}

/// Insert a body field only when supplied and non-empty.
pub(crate) fn insert_if_set(body: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value
        && !v.is_empty()
    {
        body.insert(key.to_string(), Value::String(v.clone()));
    }
}

/// Merge caller-provided extra fields over the structured ones.
/// Collisions resolve in favor of the extras.
pub(crate) fn merge_additional(
    body: &mut Map<String, Value>,
    extra: Option<HashMap<String, Value>>,
) {
    if let Some(extra) = extra {
        for (key, value) in extra {
            body.insert(key, value);
        }
    }
}

/// Render an upstream JSON payload as the single text content of a
/// successful tool call.
pub(crate) fn json_result(value: &Value) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Translate client-layer failures into MCP errors, preserving the
/// upstream status and body for the caller to inspect.
pub(crate) fn map_client_error(err: ClientError) -> McpError {
    match &err {
        ClientError::Upstream { status, body } => McpError::internal_error(
            err.to_string(),
            Some(json!({"status": status, "body": body})),
        ),
        ClientError::Config(_) | ClientError::NoAccessToken => {
            McpError::invalid_request(err.to_string(), None)
        }
        _ => McpError::internal_error(err.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None), 20);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(50)), 50);
        assert_eq!(clamp_limit(Some(500)), 100);
    }

    #[test]
    fn empty_string_filters_are_omitted() {
        let mut query = Vec::new();
        push_filter(&mut query, "name", &Some("smith".to_string()));
        push_filter(&mut query, "email", &Some(String::new()));
        push_filter(&mut query, "phone", &None);
        assert_eq!(query, vec![("name", "smith".to_string())]);
    }

    #[test]
    fn additional_fields_override_structured_ones() {
        let mut body = Map::new();
        body.insert("type".to_string(), json!("lead"));
        let extra = HashMap::from([("type".to_string(), json!("client"))]);
        merge_additional(&mut body, Some(extra));
        assert_eq!(body["type"], json!("client"));
    }

    #[test]
    fn upstream_errors_keep_status_and_body_in_error_data() {
        let err = map_client_error(ClientError::Upstream {
            status: 404,
            body: json!({"error": "not found"}),
        });
        let data = err.data.expect("data");
        assert_eq!(data["status"], 404);
        assert_eq!(data["body"], json!({"error": "not found"}));
    }
}
