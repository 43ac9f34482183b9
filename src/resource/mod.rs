//! Resource abstraction layer
//!
//! This module maps identifiers to resource kinds, resolves them against the
//! remote API, and wraps the results in a uniform [`Resource`] type.
//!
//! # Architecture
//!
//! - [`identifier`] - Prefix-based classification of identifiers
//! - [`kind`] / [`registry`] - The resource kinds and their embedded JSON definitions
//! - [`remote`] - Interfaces to the remote API and the identity memo
//! - [`cache`] - Per-run lookup cache
//! - [`resolver`] - `find`, `find_or_call`, `find_all_or_warn`, `find_by_handle`, `cache_all`
//! - [`wrapper`] - The lazily-loaded [`Resource`] facade
//! - [`fields`] - Column extraction and derived display fields
//!
//! # Example
//!
//! ```ignore
//! use bbox::resource::{Resolver, ResourceKind};
//!
//! async fn list_groups(client: ApiClient, ids: &[String]) -> anyhow::Result<()> {
//!     let mut resolver = Resolver::new(client);
//!     let groups = resolver.find_all_or_warn(ResourceKind::ServerGroup, ids).await?;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod fields;
pub mod identifier;
pub mod kind;
pub mod order;
pub mod registry;
pub mod remote;
pub mod resolver;
pub mod wrapper;

pub use cache::ResourceCache;
pub use identifier::classify;
pub use kind::ResourceKind;
pub use remote::{IdentityMemo, RemoteApi, RemoteObject};
pub use resolver::{FindOptions, Found, Resolver, Selector};
pub use wrapper::Resource;
