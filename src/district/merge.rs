use ahash::AHashMap;

use crate::error::Result;
use crate::graph::{assign_neighbors, bridge_components, connected_components, link_adjacent, prune_stale};
use crate::registry::Registry;
use crate::types::{AtomId, GroupId};

/// Rejoin fragments of one side of a cut that came from the same original group.
///
/// Fragments are bucketed by `previous_parent`; a group without one stands alone.
/// Each bucket with several fragments is replaced by one new group per connected
/// piece of their combined atoms, and the fragments are retired. Group edges are
/// then rebuilt among the side's groups.
pub(crate) fn merge_back(registry: &mut Registry, side: &[GroupId]) -> Result<Vec<GroupId>> {
    let mut buckets: Vec<Vec<GroupId>> = Vec::new();
    let mut slots = AHashMap::new();
    for &id in side {
        let key = registry.group(id).previous_parent().unwrap_or(id);
        let slot = *slots.entry(key).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[slot].push(id);
    }

    let mut merged = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        if let [only] = bucket.as_slice() {
            merged.push(*only);
            continue;
        }

        let atoms = bucket.iter()
            .flat_map(|&id| registry.group(id).members().iter().copied())
            .collect::<Vec<AtomId>>();
        let border = bucket.iter()
            .flat_map(|&id| registry.group(id).border().members().iter().copied())
            .collect::<Vec<AtomId>>();
        link_adjacent(registry, &border, &atoms);

        for piece in connected_components(&*registry, &atoms) {
            let id = registry.create_group(piece, None)?;
            let members = registry.group(id).members().to_vec();
            prune_stale(registry, &members);
            registry.validate_group(id)?;
            merged.push(id);
        }
        for id in bucket {
            registry.retire_group(id);
        }
    }

    assign_neighbors::<GroupId, _>(registry, &merged, &merged);
    bridge_components::<GroupId, _>(registry, &merged);
    registry.validate_groups(&merged)?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NoDiagnostics;
    use crate::graph::SpatialGraph;
    use crate::group::split_group;
    use crate::registry::testing::grid_registry;

    #[test]
    fn fragments_rejoin_their_parent() {
        let (mut registry, ids) = grid_registry(4, 4, 1);
        let group = registry.create_group(ids.clone(), None).unwrap();
        let parts = split_group(&mut registry, group, &NoDiagnostics).unwrap();
        registry.retire_group(group);

        let merged = merge_back(&mut registry, &parts).unwrap();
        assert_eq!(merged.len(), 1);
        let mut members = registry.group(merged[0]).members().to_vec();
        members.sort();
        assert_eq!(members, ids);
        assert_eq!(registry.group(merged[0]).population(), 16);
        assert!(parts.iter().all(|&id| !registry.group(id).is_live()));
    }

    #[test]
    fn unrelated_groups_pass_through() {
        let (mut registry, ids) = grid_registry(2, 1, 3);
        let left = registry.create_group(vec![ids[0]], None).unwrap();
        let right = registry.create_group(vec![ids[1]], None).unwrap();
        let merged = merge_back(&mut registry, &[left, right]).unwrap();
        assert_eq!(merged, vec![left, right]);
        assert!(SpatialGraph::<GroupId>::node(&registry, left).neighbors().contains(right));
    }

    #[test]
    fn separated_fragments_stay_apart() {
        let (mut registry, ids) = grid_registry(6, 1, 1);
        let group = registry.create_group(ids.clone(), None).unwrap();
        let west = registry.create_group(vec![ids[0]], Some(group)).unwrap();
        let east = registry.create_group(vec![ids[5]], Some(group)).unwrap();
        registry.retire_group(group);

        let merged = merge_back(&mut registry, &[west, east]).unwrap();
        assert_eq!(merged.len(), 2);
        assert!(!registry.group(west).is_live() && !registry.group(east).is_live());
        let total = merged.iter().map(|&id| registry.group(id).population()).sum::<u64>();
        assert_eq!(total, 2);
    }
}
