//! Client library for the Matterhorn legal-practice-management REST API.
//!
//! This crate is the core of the Matterhorn MCP gateway:
//! - [`auth`]: OAuth 2.0 token lifecycle (authorization URL, code
//!   exchange, refresh, bearer header construction).
//! - [`dispatch`]: authenticated single-attempt REST dispatch with
//!   uniform error translation.
//! - [`shape`]: normalization of the two upstream payload shapes
//!   (bare list vs. `{data/results, total}` page) into a result count.
//!
//! It intentionally contains **no** MCP transport logic and **no**
//! tool definitions; those live in `matterhorn-mcp`.

pub mod auth;
pub mod dispatch;
pub mod error;
pub mod shape;

pub use auth::{OAuthClient, OAuthConfig, PkceChallenge, TokenResponse};
pub use dispatch::{ApiClient, Credentials};
pub use error::{ClientError, Result};
pub use shape::{ResponseShape, result_count};
