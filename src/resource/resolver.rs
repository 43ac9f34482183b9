//! Resource Resolver
//!
//! Turns identifier selectors typed on the command line into resolved,
//! ordered [`Resource`] collections. The resolver owns the per-run cache, so
//! one resolver should be created per invocation and threaded through every
//! lookup the command makes.
//!
//! Lookups are strictly sequential: one request at a time, in input order.

use super::cache::CacheEntry;
use super::order::sort_by_attribute;
use super::{IdentityMemo, RemoteApi, RemoteObject, Resource, ResourceCache, ResourceKind};
use crate::api::{ApiError, ApiResult};
use serde_json::Value;
use std::sync::Arc;

/// What to look up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// The full remote collection
    All,
    One(String),
    /// Several identifiers, resolved in this order
    Many(Vec<String>),
}

impl From<&str> for Selector {
    fn from(id: &str) -> Self {
        Selector::One(id.to_string())
    }
}

impl From<Vec<String>> for Selector {
    fn from(ids: Vec<String>) -> Self {
        Selector::Many(ids)
    }
}

/// Result of [`Resolver::find`]: a single identifier yields one resource,
/// everything else a sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Found {
    One(Resource),
    Many(Vec<Resource>),
}

impl Found {
    pub fn into_vec(self) -> Vec<Resource> {
        match self {
            Found::One(resource) => vec![resource],
            Found::Many(resources) => resources,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Sort attribute for `Selector::All`; the kind's default order (usually
    /// `created_at`) when unset
    pub order: Option<String>,
}

impl FindOptions {
    pub fn order(attribute: &str) -> Self {
        Self {
            order: Some(attribute.to_string()),
        }
    }
}

pub struct Resolver<A> {
    api: A,
    cache: ResourceCache,
    memo: Option<Arc<dyn IdentityMemo>>,
}

impl<A: RemoteApi> Resolver<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            cache: ResourceCache::new(),
            memo: None,
        }
    }

    /// Register every identifier the resolver touches with `memo`
    pub fn with_memo(mut self, memo: Arc<dyn IdentityMemo>) -> Self {
        self.memo = Some(memo);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// General finder.
    ///
    /// - `All` lists the collection with one request and sorts it.
    /// - `One(id)` resolves through the cache; a miss is `NotFound`.
    /// - `Many(ids)` resolves each id in order and fails with `NotFound` on
    ///   the first one that doesn't resolve. The result keeps input order.
    ///
    /// A missing, empty or blank selector is `InvalidArguments`.
    pub async fn find(
        &mut self,
        kind: ResourceKind,
        selector: Option<Selector>,
        options: &FindOptions,
    ) -> ApiResult<Found> {
        let Some(selector) = selector else {
            return Err(ApiError::InvalidArguments("find(nil)".to_string()));
        };
        let order = options.order.as_deref().unwrap_or(kind.default_order());

        match selector {
            Selector::All => {
                let mut resources = Vec::new();
                for value in self.api.list(kind).await? {
                    resources.push(self.wrap_value(kind, value)?);
                }
                sort_by_attribute(&mut resources, order);
                Ok(Found::Many(resources))
            }
            Selector::One(id) => {
                if id.trim().is_empty() {
                    return Err(ApiError::InvalidArguments(format!("find({:?})", id)));
                }
                let resource = self.resolve(kind, &id).await?;
                Ok(Found::One(resource))
            }
            Selector::Many(ids) => {
                if ids.is_empty() {
                    return Err(ApiError::InvalidArguments("find([])".to_string()));
                }
                let mut resources = Vec::with_capacity(ids.len());
                for id in &ids {
                    resources.push(self.resolve(kind, id).await?);
                }
                Ok(Found::Many(resources))
            }
        }
    }

    /// Every member of `kind`, sorted by the kind's default order
    pub async fn find_all(&mut self, kind: ResourceKind) -> ApiResult<Vec<Resource>> {
        self.find(kind, Some(Selector::All), &FindOptions::default())
            .await
            .map(Found::into_vec)
    }

    pub async fn find_one(&mut self, kind: ResourceKind, id: &str) -> ApiResult<Resource> {
        match self
            .find(kind, Some(Selector::from(id)), &FindOptions::default())
            .await?
        {
            Found::One(resource) => Ok(resource),
            Found::Many(mut resources) => resources
                .pop()
                .ok_or_else(|| ApiError::NotFound(id.to_string())),
        }
    }

    /// Strict multi-lookup: the first unknown identifier fails the call
    pub async fn find_many<S: AsRef<str>>(
        &mut self,
        kind: ResourceKind,
        ids: &[S],
    ) -> ApiResult<Vec<Resource>> {
        let ids = ids.iter().map(|s| s.as_ref().to_string()).collect();
        self.find(kind, Some(Selector::Many(ids)), &FindOptions::default())
            .await
            .map(Found::into_vec)
    }

    /// Tolerant multi-lookup: each identifier that doesn't resolve is passed to
    /// `on_miss` and left out. Results keep input order. Errors other than
    /// `NotFound` still fail the call.
    pub async fn find_or_call<S, F>(
        &mut self,
        kind: ResourceKind,
        ids: &[S],
        mut on_miss: F,
    ) -> ApiResult<Vec<Resource>>
    where
        S: AsRef<str>,
        F: FnMut(&str),
    {
        let mut resources = Vec::with_capacity(ids.len());

        for id in ids {
            let id = id.as_ref();
            match self.find_one(kind, id).await {
                Ok(resource) => resources.push(resource),
                Err(ApiError::NotFound(_)) => on_miss(id),
                Err(e) => return Err(e),
            }
        }

        Ok(resources)
    }

    /// Everything when `ids` is empty, otherwise the ids that resolve, with a
    /// warning for each one that doesn't
    pub async fn find_all_or_warn<S: AsRef<str>>(
        &mut self,
        kind: ResourceKind,
        ids: &[S],
    ) -> ApiResult<Vec<Resource>> {
        if ids.is_empty() {
            return self.find_all(kind).await;
        }

        self.find_or_call(kind, ids, |id| {
            tracing::warn!("Could not find anything with ID {}", id);
        })
        .await
    }

    /// Find the member whose handle attribute equals `handle`
    pub async fn find_by_handle(&mut self, kind: ResourceKind, handle: &str) -> ApiResult<Resource> {
        self.find_all(kind)
            .await?
            .into_iter()
            .find(|r| matches!(r.handle(), Ok(Some(h)) if h == handle))
            .ok_or_else(|| ApiError::NotFound(handle.to_string()))
    }

    /// Fetch the whole collection once and prime the cache with every member
    pub async fn cache_all(&mut self, kind: ResourceKind) -> ApiResult<()> {
        let mut objects = Vec::new();
        for value in self.api.list(kind).await? {
            let object = to_object(kind, value)?;
            self.remember(object.id());
            objects.push(object);
        }

        tracing::debug!("Cached {} {} entries", objects.len(), kind.collection());
        self.cache.replace_kind(kind, objects);
        Ok(())
    }

    /// Cache-or-fetch. A hit costs nothing; a miss makes exactly one `get`
    /// call and its result is cached, including a not-found result.
    pub async fn cached_get(
        &mut self,
        kind: ResourceKind,
        id: &str,
    ) -> ApiResult<Option<RemoteObject>> {
        match self.cache.lookup(kind, id) {
            CacheEntry::Present(object) => {
                tracing::trace!("cache hit {}", id);
                return Ok(Some(object.clone()));
            }
            CacheEntry::Absent => {
                tracing::trace!("cache hit (absent) {}", id);
                return Ok(None);
            }
            CacheEntry::Miss => {}
        }

        self.remember(id);
        let object = match self.api.get(kind, id).await? {
            Some(value) => Some(to_object(kind, value)?),
            None => None,
        };
        self.cache.store(kind, id, object.clone());
        Ok(object)
    }

    /// Create a remote resource and wrap the result
    pub async fn create(&mut self, kind: ResourceKind, attributes: &Value) -> ApiResult<Resource> {
        let value = self.api.create(kind, attributes).await?;
        let object = to_object(kind, value)?;
        self.remember(object.id());
        self.cache.store(kind, object.id(), Some(object.clone()));
        Ok(Resource::from_object(kind, object))
    }

    async fn resolve(&mut self, kind: ResourceKind, id: &str) -> ApiResult<Resource> {
        match self.cached_get(kind, id).await? {
            Some(object) => Ok(self.wrap_object(kind, object)),
            None => Err(ApiError::NotFound(id.to_string())),
        }
    }

    /// Wrap a representation obtained outside the resolver, such as one
    /// embedded in another resource, registering its id with the memo
    pub fn wrap_value(&self, kind: ResourceKind, value: Value) -> ApiResult<Resource> {
        let resource = Resource::from_remote(kind, value)?;
        self.remember(resource.id());
        Ok(resource)
    }

    /// Unfetched wrapper around a bare identifier, registered with the memo
    pub fn wrap_id(&self, kind: ResourceKind, id: &str) -> ApiResult<Resource> {
        let resource = Resource::from_id(kind, id)?;
        self.remember(resource.id());
        Ok(resource)
    }

    fn wrap_object(&self, kind: ResourceKind, object: RemoteObject) -> Resource {
        self.remember(object.id());
        Resource::from_object(kind, object)
    }

    fn remember(&self, id: &str) {
        if let Some(memo) = &self.memo {
            memo.cache_id(id);
        }
    }
}

fn to_object(kind: ResourceKind, value: Value) -> ApiResult<RemoteObject> {
    RemoteObject::from_value(value).map_err(|value| {
        ApiError::InvalidArguments(format!("Can't initialize {} with {}", kind, value))
    })
}
