//! Identifier classification
//!
//! Identifiers look like `srv-12345`: a short alphabetic prefix naming the
//! kind, a separator, and an alphanumeric suffix. Classification is advisory:
//! it never rejects an identifier, it only says which kind the prefix names.

use super::ResourceKind;

/// Length of a standard identifier (`srv-12345`)
pub const IDENTIFIER_SIZE: usize = 9;

/// Separator between the kind prefix and the suffix
pub const SEPARATOR: char = '-';

/// Static prefix table
const PREFIXES: &[(&str, ResourceKind)] = &[
    ("srv", ResourceKind::Server),
    ("grp", ResourceKind::ServerGroup),
    ("fwp", ResourceKind::FirewallPolicy),
    ("fwr", ResourceKind::FirewallRule),
    ("img", ResourceKind::Image),
    ("acc", ResourceKind::Account),
    ("cip", ResourceKind::CloudIp),
    ("lba", ResourceKind::LoadBalancer),
    ("typ", ResourceKind::ServerType),
    ("zon", ResourceKind::Zone),
    ("usr", ResourceKind::User),
];

/// Determine which resource kind an identifier denotes.
///
/// Returns `None` for an unknown prefix or an identifier with no separator;
/// the caller decides whether that is fatal.
pub fn classify(identifier: &str) -> Option<ResourceKind> {
    let (prefix, _) = identifier.trim().split_once(SEPARATOR)?;
    PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, kind)| *kind)
}

/// True when the identifier has the reference shape: known prefix, separator,
/// alphanumeric suffix and [`IDENTIFIER_SIZE`] characters overall.
pub fn looks_standard(identifier: &str) -> bool {
    let Some((_, suffix)) = identifier.split_once(SEPARATOR) else {
        return false;
    };
    classify(identifier).is_some()
        && identifier.len() == IDENTIFIER_SIZE
        && suffix.chars().all(|c| c.is_ascii_alphanumeric())
}

/// True when `identifier` carries the prefix of `kind`
pub fn is_kind(identifier: &str, kind: ResourceKind) -> bool {
    classify(identifier) == Some(kind)
}
