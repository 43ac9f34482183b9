//! Resource Registry - Load resource kind definitions from JSON
//!
//! This module loads the per-kind definitions (remote collection, account
//! scoping, handle attribute, default order, table columns) from an embedded
//! JSON file and provides lookup functions for the rest of the crate.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[include_str!("../resources/brightbox.json")];

/// Attribute every kind is sorted by unless the definition says otherwise
pub const DEFAULT_ORDER: &str = "created_at";

/// Attribute used by `find_by_handle` unless the definition says otherwise
pub const DEFAULT_HANDLE_FIELD: &str = "handle";

/// Column definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDef {
    pub header: String,
    pub json_path: String,
    pub width: u16,
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    /// Remote collection name, used as the REST path segment
    pub collection: String,
    /// Identifier prefix, e.g. `srv`
    pub prefix: String,
    /// Whether requests must carry the selected account
    #[serde(default)]
    pub account_scoped: bool,
    #[serde(default)]
    pub handle_field: Option<String>,
    /// Default sort attribute
    #[serde(default)]
    pub order: Option<String>,
    pub columns: Vec<ColumnDef>,
}

impl ResourceDef {
    pub fn handle_field(&self) -> &str {
        self.handle_field.as_deref().unwrap_or(DEFAULT_HANDLE_FIELD)
    }

    pub fn order(&self) -> &str {
        self.order.as_deref().unwrap_or(DEFAULT_ORDER)
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}
