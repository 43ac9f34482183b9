//! Lookups that don't start from a known kind, or that accept handles

use super::Session;
use crate::output::render_detail;
use crate::resource::{classify, RemoteApi, Resource, ResourceKind};
use anyhow::{bail, Result};

/// Above this many ids of one kind, listing the collection once is cheaper
/// than one request per id.
const PRELOAD_THRESHOLD: usize = 3;

/// Show resources of a kind by identifier, or by handle when the argument
/// isn't an identifier of that kind (`nano`, `gb1-a`, ...)
pub async fn show_by_id_or_handle<A: RemoteApi>(
    session: &mut Session<A>,
    kind: ResourceKind,
    args: &[String],
) -> Result<String> {
    if args.is_empty() {
        bail!("You must specify the {} ids to show", kind.display_name().to_lowercase());
    }

    let mut resources = Vec::with_capacity(args.len());
    for arg in args {
        let found = if classify(arg) == Some(kind) {
            session.resolver.find_one(kind, arg).await
        } else {
            session.resolver.find_by_handle(kind, arg).await
        };

        match found {
            Ok(resource) => resources.push(resource),
            Err(e) if e.is_not_found() => {
                eprintln!("Couldn't find {} {}", kind.display_name().to_lowercase(), arg)
            }
            Err(e) => return Err(e.into()),
        }
    }

    render_detail(session.format, kind, &resources)
}

/// Show any mix of identifiers, grouped by kind in first-seen order
pub async fn show_any<A: RemoteApi>(ids: &[String], session: &mut Session<A>) -> Result<String> {
    let groups = group_by_kind(ids);
    if groups.is_empty() {
        bail!("No recognised identifiers given");
    }

    let mut sections = Vec::with_capacity(groups.len());
    for (kind, ids) in groups {
        if ids.len() > PRELOAD_THRESHOLD {
            session.resolver.cache_all(kind).await?;
        }

        let resources: Vec<Resource> = session
            .resolver
            .find_or_call(kind, &ids, |id| eprintln!("Couldn't find {}", id))
            .await?;
        if !resources.is_empty() {
            sections.push(render_detail(session.format, kind, &resources)?);
        }
    }

    Ok(sections.join("\n\n"))
}

fn group_by_kind(ids: &[String]) -> Vec<(ResourceKind, Vec<String>)> {
    let mut groups: Vec<(ResourceKind, Vec<String>)> = Vec::new();

    for id in ids {
        let Some(kind) = classify(id) else {
            tracing::warn!("Unknown identifier type for {}", id);
            eprintln!("Couldn't recognise '{}'", id);
            continue;
        };

        match groups.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, members)) => members.push(id.clone()),
            None => groups.push((kind, vec![id.clone()])),
        }
    }

    groups
}
