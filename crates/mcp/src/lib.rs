//! MCP server for the Matterhorn legal practice management platform.
//!
//! Exposes the upstream REST API (contacts, matters, tasks, companies,
//! time entries, expenses, users) as MCP tools, URI-templated resources,
//! and workflow prompts over the streamable-HTTP transport.

pub mod config;
pub mod prompts;
pub mod resources;
pub mod server;
pub mod tools;

pub use config::Settings;
pub use server::McpServer;
