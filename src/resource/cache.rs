//! Resource Cache
//!
//! Per-run memo of remote lookups keyed by kind and identifier. Entries are
//! never invalidated during a run. Confirmed misses are stored as `None` so a
//! missing identifier costs one request per run, not one per lookup.

use super::{RemoteObject, ResourceKind};
use std::collections::HashMap;

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry<'a> {
    /// Never looked up
    Miss,
    /// Looked up, the API reported nothing
    Absent,
    Present(&'a RemoteObject),
}

#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: HashMap<ResourceKind, HashMap<String, Option<RemoteObject>>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, kind: ResourceKind, id: &str) -> CacheEntry<'_> {
        match self.entries.get(&kind).and_then(|by_id| by_id.get(id)) {
            None => CacheEntry::Miss,
            Some(None) => CacheEntry::Absent,
            Some(Some(object)) => CacheEntry::Present(object),
        }
    }

    /// Record a lookup result, negative results included
    pub fn store(&mut self, kind: ResourceKind, id: &str, object: Option<RemoteObject>) {
        self.entries
            .entry(kind)
            .or_default()
            .insert(id.to_string(), object);
    }

    /// Replace everything known about `kind` with a complete listing
    pub fn replace_kind(&mut self, kind: ResourceKind, objects: Vec<RemoteObject>) {
        let by_id = objects
            .into_iter()
            .map(|o| (o.id().to_string(), Some(o)))
            .collect();
        self.entries.insert(kind, by_id);
    }

    /// Number of cached entries for a kind, negatives included
    pub fn len(&self, kind: ResourceKind) -> usize {
        self.entries.get(&kind).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|m| m.is_empty())
    }
}
