//! Collaborator interfaces
//!
//! The narrow seams between the resource layer and the outside world: the
//! remote API, the representation it hands back, and the optional identity
//! memo that remembers every identifier the client has seen.

use super::ResourceKind;
use crate::api::ApiResult;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Remote API operations, per resource kind
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Fetch the full collection
    async fn list(&self, kind: ResourceKind) -> ApiResult<Vec<Value>>;

    /// Fetch one member; `Ok(None)` when the API reports it missing
    async fn get(&self, kind: ResourceKind, id: &str) -> ApiResult<Option<Value>>;

    async fn create(&self, kind: ResourceKind, attributes: &Value) -> ApiResult<Value>;

    /// Destroy one member. State conflicts surface as `ApiError::Conflict`.
    async fn destroy(&self, kind: ResourceKind, id: &str) -> ApiResult<()>;

    /// Run a member action such as `stop` or `reboot`
    async fn perform(&self, kind: ResourceKind, id: &str, action: &str) -> ApiResult<Value>;
}

/// Fire-and-forget hint invoked for every identifier the resolver touches
pub trait IdentityMemo: Send + Sync {
    fn cache_id(&self, id: &str);
}

/// A materialized remote representation: a JSON object with a string `id`
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteObject {
    id: String,
    attributes: Map<String, Value>,
}

impl RemoteObject {
    /// Accept a JSON object carrying a string `id`; hand the value back otherwise
    pub fn from_value(value: Value) -> Result<Self, Value> {
        let Value::Object(attributes) = value else {
            return Err(value);
        };

        let Some(id) = attributes.get("id").and_then(|v| v.as_str()).map(String::from) else {
            return Err(Value::Object(attributes));
        };

        Ok(Self { id, attributes })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Attribute lookup by name; dotted names walk nested objects
    /// (`zone.handle`) and numeric segments index arrays.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let mut parts = name.split('.');
        let mut current = self.attributes.get(parts.next()?)?;

        for part in parts {
            current = match part.parse::<usize>() {
                Ok(idx) if current.is_array() => current.get(idx)?,
                _ => current.get(part)?,
            };
        }

        Some(current)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_str())
    }

    /// Remote creation timestamp
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        self.get_str("created_at")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.attributes.clone())
    }
}

impl Serialize for RemoteObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}
