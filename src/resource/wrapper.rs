//! Resource wrapper
//!
//! [`Resource`] is the one type every command works with. It is bound to an
//! identifier for its whole life and is backed by the remote representation,
//! fetched lazily through the resolver's cache the first time it is needed.
//!
//! Rather than forwarding arbitrary calls to the representation, the wrapper
//! offers a closed set of accessors. Each one fails with
//! [`ApiError::UnsupportedOperation`] when the representation is unavailable.

use super::{RemoteApi, RemoteObject, Resolver, ResourceKind};
use crate::api::{ApiError, ApiResult};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Lazy fetch state, transitioned at most once away from `Unfetched`
#[derive(Debug, Clone, PartialEq)]
enum RemoteState {
    Unfetched,
    Fetched(RemoteObject),
    FetchFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    kind: ResourceKind,
    id: String,
    state: RemoteState,
}

impl Resource {
    /// Wrap a remote representation. It must be a JSON object with a string `id`.
    pub fn from_remote(kind: ResourceKind, value: Value) -> ApiResult<Self> {
        RemoteObject::from_value(value)
            .map(|object| Self::from_object(kind, object))
            .map_err(|value| {
                ApiError::InvalidArguments(format!("Can't initialize {} with {}", kind, value))
            })
    }

    /// Wrap a bare identifier; the representation is fetched on first use
    pub fn from_id(kind: ResourceKind, id: &str) -> ApiResult<Self> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::InvalidArguments(format!(
                "Can't initialize {} with an empty identifier",
                kind
            )));
        }

        Ok(Self {
            kind,
            id: id.to_string(),
            state: RemoteState::Unfetched,
        })
    }

    pub fn from_object(kind: ResourceKind, object: RemoteObject) -> Self {
        Self {
            kind,
            id: object.id().to_string(),
            state: RemoteState::Fetched(object),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, RemoteState::Fetched(_))
    }

    /// The remote representation, fetched through the resolver on first call.
    /// A missing result is remembered too: later calls return `None` without
    /// another lookup.
    pub async fn load<A: RemoteApi>(
        &mut self,
        resolver: &mut Resolver<A>,
    ) -> ApiResult<Option<&RemoteObject>> {
        if self.state == RemoteState::Unfetched {
            self.state = match resolver.cached_get(self.kind, &self.id).await? {
                Some(object) => RemoteState::Fetched(object),
                None => RemoteState::FetchFailed,
            };
        }

        Ok(self.remote().ok())
    }

    /// Whether the remote side knows this identifier. A not-found answer is
    /// `false`; any other failure is returned as is.
    pub async fn exists<A: RemoteApi>(&mut self, resolver: &mut Resolver<A>) -> ApiResult<bool> {
        match self.load(resolver).await {
            Ok(object) => Ok(object.is_some()),
            Err(ApiError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Load, then read one attribute
    pub async fn fetch_attribute<A: RemoteApi>(
        &mut self,
        name: &str,
        resolver: &mut Resolver<A>,
    ) -> ApiResult<Option<&Value>> {
        self.load(resolver).await?;
        self.attribute(name)
    }

    /// The materialized representation
    pub fn remote(&self) -> ApiResult<&RemoteObject> {
        match &self.state {
            RemoteState::Fetched(object) => Ok(object),
            _ => Err(self.unsupported("remote")),
        }
    }

    /// Attribute by name (dotted names reach nested objects). `Ok(None)` means
    /// the representation is there but lacks the attribute.
    pub fn attribute(&self, name: &str) -> ApiResult<Option<&Value>> {
        match &self.state {
            RemoteState::Fetched(object) => Ok(object.get(name)),
            _ => Err(self.unsupported(name)),
        }
    }

    pub fn attribute_str(&self, name: &str) -> ApiResult<Option<&str>> {
        Ok(self.attribute(name)?.and_then(|v| v.as_str()))
    }

    pub fn name(&self) -> ApiResult<Option<&str>> {
        self.attribute_str("name")
    }

    pub fn status(&self) -> ApiResult<Option<&str>> {
        self.attribute_str("status")
    }

    /// Human readable handle, for kinds that have one (`typ-` and `zon-`)
    pub fn handle(&self) -> ApiResult<Option<&str>> {
        self.attribute_str(self.kind.handle_field())
    }

    /// Creation date as `YYYY-MM-DD`
    pub fn created_on(&self) -> ApiResult<String> {
        self.remote()?
            .created_at()
            .map(|t| t.format("%Y-%m-%d").to_string())
            .ok_or_else(|| self.unsupported("created_on"))
    }

    /// Destroy the remote resource
    pub async fn destroy<A: RemoteApi>(&self, resolver: &Resolver<A>) -> ApiResult<()> {
        resolver.api().destroy(self.kind, &self.id).await
    }

    /// Run a member action (e.g. `stop`) on the remote resource
    pub async fn perform<A: RemoteApi>(
        &self,
        action: &str,
        resolver: &Resolver<A>,
    ) -> ApiResult<Value> {
        resolver.api().perform(self.kind, &self.id, action).await
    }

    fn unsupported(&self, operation: &str) -> ApiError {
        ApiError::UnsupportedOperation {
            id: self.id.clone(),
            operation: operation.to_string(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.state {
            RemoteState::Fetched(object) => object.serialize(serializer),
            _ => serde_json::json!({ "id": self.id }).serialize(serializer),
        }
    }
}
