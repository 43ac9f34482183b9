//! Resource kinds
//!
//! The closed set of remote entity classes the client knows about. Static
//! facts live in the JSON registry; this enum is the typed handle to them.

use super::registry::{get_resource, ColumnDef, ResourceDef};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Server,
    ServerGroup,
    FirewallPolicy,
    FirewallRule,
    Image,
    Account,
    CloudIp,
    LoadBalancer,
    ServerType,
    Zone,
    User,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 11] = [
        ResourceKind::Server,
        ResourceKind::ServerGroup,
        ResourceKind::FirewallPolicy,
        ResourceKind::FirewallRule,
        ResourceKind::Image,
        ResourceKind::Account,
        ResourceKind::CloudIp,
        ResourceKind::LoadBalancer,
        ResourceKind::ServerType,
        ResourceKind::Zone,
        ResourceKind::User,
    ];

    /// Registry key for this kind
    pub fn key(self) -> &'static str {
        match self {
            ResourceKind::Server => "servers",
            ResourceKind::ServerGroup => "server_groups",
            ResourceKind::FirewallPolicy => "firewall_policies",
            ResourceKind::FirewallRule => "firewall_rules",
            ResourceKind::Image => "images",
            ResourceKind::Account => "accounts",
            ResourceKind::CloudIp => "cloud_ips",
            ResourceKind::LoadBalancer => "load_balancers",
            ResourceKind::ServerType => "server_types",
            ResourceKind::Zone => "zones",
            ResourceKind::User => "users",
        }
    }

    /// Identifier prefix, the part before the separator
    pub fn prefix(self) -> &'static str {
        match self {
            ResourceKind::Server => "srv",
            ResourceKind::ServerGroup => "grp",
            ResourceKind::FirewallPolicy => "fwp",
            ResourceKind::FirewallRule => "fwr",
            ResourceKind::Image => "img",
            ResourceKind::Account => "acc",
            ResourceKind::CloudIp => "cip",
            ResourceKind::LoadBalancer => "lba",
            ResourceKind::ServerType => "typ",
            ResourceKind::Zone => "zon",
            ResourceKind::User => "usr",
        }
    }

    /// Full definition from the embedded registry
    pub fn def(self) -> &'static ResourceDef {
        get_resource(self.key())
            .unwrap_or_else(|| panic!("No registry entry for resource kind {}", self.key()))
    }

    pub fn display_name(self) -> &'static str {
        &self.def().display_name
    }

    pub fn collection(self) -> &'static str {
        &self.def().collection
    }

    pub fn account_scoped(self) -> bool {
        self.def().account_scoped
    }

    pub fn handle_field(self) -> &'static str {
        self.def().handle_field()
    }

    pub fn default_order(self) -> &'static str {
        self.def().order()
    }

    pub fn columns(self) -> &'static [ColumnDef] {
        &self.def().columns
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    /// Accepts the registry key (`server_groups`) or the identifier prefix (`grp`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.key() == s || k.prefix() == s)
            .ok_or_else(|| format!("Unknown resource kind: {}", s))
    }
}
