use ahash::AHashSet;
use geograph::Alignment;
use tracing::debug;

use crate::diagnostics::{self, Diagnostics};
use crate::error::{invariant, Result};
use crate::graph::{connected_components, prune_stale};
use crate::registry::Registry;
use crate::seam::{find_split, SplitOutcome};
use crate::types::{AtomId, GroupId};

/// Break `group` into smaller contiguous groups along population-energy seams.
///
/// The old group is left untouched; the caller retires it once every
/// replacement of a batch is known. New groups record the group's oldest
/// ancestor as their `previous_parent`.
pub fn split_group(registry: &mut Registry, group: GroupId, diagnostics: &dyn Diagnostics) -> Result<Vec<GroupId>> {
    let members = registry.group(group).members().to_vec();
    if members.len() < 2 {
        diagnostics::dump(diagnostics, &format!("split-single-{}", group.0),
            || diagnostics::group_snapshot(registry, &[group]), &*registry, &[("group", members.as_slice())]);
        invariant!("cannot split {group}: it holds a single atomic block");
    }

    let parts = match find_split(registry, group, Alignment::NorthSouth, diagnostics)? {
        SplitOutcome::ForceSplit => singletons(&members),
        north_south => match (north_south, find_split(registry, group, Alignment::WestEast, diagnostics)?) {
            (_, SplitOutcome::ForceSplit) | (SplitOutcome::NoSplit, SplitOutcome::NoSplit) => singletons(&members),
            (SplitOutcome::Split { a, b }, SplitOutcome::NoSplit)
            | (SplitOutcome::NoSplit, SplitOutcome::Split { a, b }) => vec![a, b],
            (SplitOutcome::Split { a: north, .. }, SplitOutcome::Split { a: west, .. }) => {
                quadrants(registry, &members, &north, &west)
            }
            (SplitOutcome::ForceSplit, _) => singletons(&members),
        },
    };

    // Halves can come out in pieces when leftover fragments fold into the seam.
    let parts = parts.iter()
        .filter(|part| !part.is_empty())
        .flat_map(|part| connected_components(&*registry, part))
        .collect::<Vec<_>>();

    let previous_parent = registry.group(group).previous_parent().or(Some(group));
    let created = parts.into_iter()
        .map(|part| registry.create_group(part, previous_parent))
        .collect::<Result<Vec<_>>>()?;

    for &id in &created {
        let members = registry.group(id).members().to_vec();
        prune_stale(registry, &members);
    }
    for &id in &created {
        registry.validate_group(id)?;
    }

    let before = registry.group(group).population();
    let after = created.iter().map(|&id| registry.group(id).population()).sum::<u64>();
    if before != after {
        invariant!("splitting {group} changed population from {before} to {after}");
    }

    debug!("split {group} ({} atomic blocks) into {} groups", members.len(), created.len());
    Ok(created)
}

fn singletons(members: &[AtomId]) -> Vec<Vec<AtomId>> {
    members.iter().map(|&id| vec![id]).collect()
}

/// Intersect a north/south and a west/east split into NW, NE, SW and SE parts.
///
/// A quadrant in several pieces hands its smallest piece to the first sibling
/// it borders, until every quadrant is one piece.
fn quadrants(registry: &Registry, members: &[AtomId], north: &[AtomId], west: &[AtomId]) -> Vec<Vec<AtomId>> {
    let north = north.iter().copied().collect::<AHashSet<_>>();
    let west = west.iter().copied().collect::<AHashSet<_>>();

    let mut quads: [Vec<AtomId>; 4] = Default::default();
    for &id in members {
        let q = match (north.contains(&id), west.contains(&id)) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        };
        quads[q].push(id);
    }

    for _ in 0..members.len() {
        let Some((q, island)) = quads.iter().enumerate().find_map(|(q, quad)| {
            let components = connected_components(registry, quad);
            (components.len() > 1).then(|| {
                let smallest = components.into_iter().min_by_key(Vec::len).unwrap_or_default();
                (q, smallest)
            })
        }) else { break };

        let Some(target) = sibling_for(registry, &quads, q, &island) else { break };
        quads[q].retain(|id| !island.contains(id));
        quads[target].extend(island);
    }

    quads.into_iter().filter(|quad| !quad.is_empty()).collect()
}

/// First non-empty sibling sharing an edge with the island, else the first one
/// intersecting it, else the nearest.
fn sibling_for(registry: &Registry, quads: &[Vec<AtomId>; 4], from: usize, island: &[AtomId]) -> Option<usize> {
    let siblings = (0..4).filter(|&s| s != from && !quads[s].is_empty()).collect::<Vec<_>>();

    let bordering = siblings.iter().copied().find(|&s| island.iter()
        .any(|&id| registry.atom(id).node().neighbors().all().iter().any(|n| quads[s].contains(n))));
    if bordering.is_some() { return bordering }

    let shape = |ids: &[AtomId]| geograph::union_all(ids.iter().map(|&id| registry.atom(id).geometry()));
    let island_shape = shape(island);
    let shapes = siblings.iter().map(|&s| (s, shape(&quads[s]))).collect::<Vec<_>>();

    shapes.iter()
        .find(|(_, other)| geograph::intersects(&island_shape, other))
        .or_else(|| shapes.iter().min_by(|(_, x), (_, y)|
            geograph::distance(&island_shape, x).total_cmp(&geograph::distance(&island_shape, y))))
        .map(|&(s, _)| s)
}
