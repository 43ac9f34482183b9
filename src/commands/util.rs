//! Shared command helpers: the list/show/destroy/action flows every resource
//! command reuses.

use super::Session;
use crate::api::ApiError;
use crate::output::{render_detail, render_list};
use crate::resource::{RemoteApi, Resource, ResourceKind};
use anyhow::{bail, Result};

/// Everything, or the given ids with a warning for each unknown one
pub async fn list<A: RemoteApi>(
    session: &mut Session<A>,
    kind: ResourceKind,
    ids: &[String],
) -> Result<String> {
    let resources = session.resolver.find_all_or_warn(kind, ids).await?;
    render_list(session.format, kind, &resources)
}

/// Detail view for the given ids; unknown ids are reported and skipped
pub async fn show<A: RemoteApi>(
    session: &mut Session<A>,
    kind: ResourceKind,
    ids: &[String],
) -> Result<String> {
    if ids.is_empty() {
        bail!("You must specify the {} ids to show", kind.display_name().to_lowercase());
    }

    let resources = session
        .resolver
        .find_or_call(kind, ids, |id| {
            eprintln!("Couldn't find {} {}", kind.display_name().to_lowercase(), id);
        })
        .await?;

    render_detail(session.format, kind, &resources)
}

/// Resolve every id strictly for a mutating command: an unknown id aborts
/// before anything is changed.
pub async fn resolve_all<A: RemoteApi>(
    session: &mut Session<A>,
    kind: ResourceKind,
    ids: &[String],
) -> Result<Vec<Resource>> {
    if ids.is_empty() {
        bail!("You must specify the {} ids", kind.display_name().to_lowercase());
    }

    let mut missing = Vec::new();
    let resources = session
        .resolver
        .find_or_call(kind, ids, |id| missing.push(id.to_string()))
        .await?;

    if let Some(id) = missing.first() {
        bail!("Couldn't find {} {}", kind.display_name().to_lowercase(), id);
    }

    Ok(resources)
}

/// Destroy each resource. A conflict on one is reported and the rest still go.
pub async fn destroy<A: RemoteApi>(
    session: &mut Session<A>,
    kind: ResourceKind,
    ids: &[String],
) -> Result<String> {
    let resources = resolve_all(session, kind, ids).await?;

    for resource in &resources {
        eprintln!("Destroying {} {}", kind.display_name().to_lowercase(), resource);
        match resource.destroy(&session.resolver).await {
            Ok(()) => {}
            Err(ApiError::Conflict(reason)) => {
                tracing::debug!("destroy {} rejected: {}", resource, reason);
                eprintln!("ERROR: Could not destroy {}", resource);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(String::new())
}

/// Run a member action (`start`, `stop`, ...) on each resource
pub async fn perform<A: RemoteApi>(
    session: &mut Session<A>,
    kind: ResourceKind,
    ids: &[String],
    action: &str,
    verb: &str,
) -> Result<String> {
    let resources = resolve_all(session, kind, ids).await?;

    for resource in &resources {
        eprintln!("{} {} {}", verb, kind.display_name().to_lowercase(), resource);
        match resource.perform(action, &session.resolver).await {
            Ok(_) => {}
            Err(ApiError::Conflict(reason)) => {
                tracing::debug!("{} {} rejected: {}", action, resource, reason);
                eprintln!("ERROR: Could not {} {}", action, resource);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(String::new())
}
