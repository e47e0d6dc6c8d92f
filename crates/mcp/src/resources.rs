//! URI-templated resources: direct record access under the
//! `matterhorn://` scheme. Each template maps to a single-record GET
//! against the corresponding collection.

use matterhorn_client::ApiClient;
use rmcp::ErrorData as McpError;
use rmcp::model::{
    Annotated, RawResourceTemplate, ReadResourceResult, ResourceContents, ResourceTemplate,
};

pub const URI_SCHEME: &str = "matterhorn";

const TEMPLATES: &[(&str, &str, &str)] = &[
    ("contacts", "Contact by ID", "Get a specific contact by ID"),
    ("matters", "Matter by ID", "Get a specific matter/case by ID"),
    ("tasks", "Task by ID", "Get a specific task by ID"),
    ("companies", "Company by ID", "Get a specific company by ID"),
];

/// The four record templates, in listing order.
pub fn templates() -> Vec<ResourceTemplate> {
    TEMPLATES
        .iter()
        .map(|(collection, name, description)| {
            let singular = collection.trim_end_matches('s');
            Annotated::new(
                RawResourceTemplate {
                    uri_template: format!("{URI_SCHEME}://{collection}/{{{singular}_id}}"),
                    name: name.to_string(),
                    title: None,
                    description: Some(description.to_string()),
                    mime_type: Some("application/json".to_string()),
                    icons: None,
                },
                None,
            )
        })
        .collect()
}

/// Resolve a `matterhorn://{collection}/{id}` URI to an upstream fetch.
pub async fn read(api: &ApiClient, uri: &str) -> Result<ReadResourceResult, McpError> {
    let (collection, id) = parse_uri(uri)?;
    let result = api
        .get(&format!("{collection}/{id}"), &[])
        .await
        .map_err(crate::tools::map_client_error)?;
    let text = serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string());
    Ok(ReadResourceResult {
        contents: vec![ResourceContents::text(text, uri)],
    })
}

fn parse_uri(uri: &str) -> Result<(&str, &str), McpError> {
    let not_found = || {
        McpError::resource_not_found(
            format!("Unknown resource URI: {uri}"),
            Some(serde_json::json!({"uri": uri})),
        )
    };

    let rest = uri
        .strip_prefix(URI_SCHEME)
        .and_then(|r| r.strip_prefix("://"))
        .ok_or_else(not_found)?;
    let (collection, id) = rest.split_once('/').ok_or_else(not_found)?;
    if id.is_empty() || id.contains('/') {
        return Err(not_found());
    }
    if !TEMPLATES.iter().any(|(c, _, _)| *c == collection) {
        return Err(not_found());
    }
    Ok((collection, id))
}
