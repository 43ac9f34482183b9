//! Brightbox API interaction module
//!
//! This module provides the transport the resource layer talks to: OAuth2
//! authentication, an HTTP client, and the [`client::ApiClient`] that
//! implements [`crate::resource::RemoteApi`].
//!
//! # Module Structure
//!
//! - [`auth`] - Token grants, in-memory and on-disk token caching
//! - [`client`] - Main API client, URL building, retry on expired tokens
//! - [`error`] - Error taxonomy shared with the resource layer
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use bbox::api::client::ApiClient;
//! use bbox::resource::{RemoteApi, ResourceKind};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = ApiClient::new(url, "cli-12345", "secret", None, timeout)?;
//!     let servers = client.list(ResourceKind::Server).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod http;

pub use error::{ApiError, ApiResult};
