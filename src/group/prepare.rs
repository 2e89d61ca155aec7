use ahash::AHashMap;
use serde_json::json;
use tracing::{debug, info};

use crate::atomic::assemble_atoms;
use crate::diagnostics::Diagnostics;
use crate::error::{invariant, Result};
use crate::graph::{assign_neighbors, attach_orphans, bridge_components, connected_components};
use crate::registry::Registry;
use crate::types::{CensusBlock, GroupId};

/// Turn raw census blocks into validated, county-scale redistricting groups.
///
/// Blocks are bucketed by county and fused into atomic blocks. Water atoms are
/// dropped, atom neighbors are assigned within each county, and counties that
/// fall apart become one group per connected piece. Finally group neighbors are
/// assigned and disconnected regions (islands) are bridged so the whole
/// territory forms one component.
pub fn prepare_groups(registry: &mut Registry, blocks: Vec<CensusBlock>, diagnostics: &dyn Diagnostics) -> Result<Vec<GroupId>> {
    let total = blocks.iter().map(|block| block.population).sum::<u64>();

    let mut counties: Vec<(String, Vec<CensusBlock>)> = Vec::new();
    let mut index = AHashMap::new();
    for block in blocks {
        let slot = *index.entry(block.id.county.clone()).or_insert_with(|| {
            counties.push((block.id.county.clone(), Vec::new()));
            counties.len() - 1
        });
        counties[slot].1.push(block);
    }

    let mut groups = Vec::new();
    for (county, blocks) in counties {
        let block_count = blocks.len();
        let mut atoms = Vec::new();
        let mut water = 0;
        for atom in assemble_atoms(blocks)? {
            if !atom.is_water() {
                atoms.push(registry.add_atom(atom));
                continue;
            }
            if atom.population() > 0 {
                let ids = atom.blocks().iter().map(|block| block.id.to_string()).collect::<Vec<_>>();
                diagnostics.save(&format!("water-population-{county}"),
                    &json!({ "county": county, "blocks": ids, "population": atom.population() }));
                invariant!("water blocks {ids:?} in county {county} have population {}", atom.population());
            }
            water += 1;
        }
        debug!("county {county}: {block_count} blocks, {} atomic blocks, {water} water atoms dropped", atoms.len());
        if atoms.is_empty() { continue }

        assign_neighbors(registry, &atoms, &atoms);
        attach_orphans(registry, &atoms, &atoms);

        let components = connected_components(&*registry, &atoms);
        if components.len() > 1 {
            debug!("county {county} is split into {} contiguous groups", components.len());
        }
        for component in components {
            groups.push(registry.create_group(component, None)?);
        }
    }

    assign_neighbors::<GroupId, _>(registry, &groups, &groups);
    let bridges = bridge_components::<GroupId, _>(registry, &groups);
    registry.validate_groups(&groups)?;

    let kept = groups.iter().map(|&id| registry.group(id).population()).sum::<u64>();
    if kept != total {
        invariant!("preparing groups changed population from {total} to {kept}");
    }

    let atom_count = groups.iter().map(|&id| registry.group(id).members().len()).sum::<usize>();
    info!("prepared {} groups from {atom_count} atomic blocks ({bridges} island bridges)", groups.len());
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NoDiagnostics;
    use crate::error::SplitError;
    use crate::graph::SpatialGraph;
    use crate::registry::testing::{block, square};

    #[test]
    fn counties_become_groups() {
        let blocks = vec![
            block("001", 0, 10, square(0., 0., 1.)),
            block("002", 1, 10, square(1., 0., 1.)),
            block("001", 2, 10, square(0., 1., 1.)),
        ];
        let mut registry = Registry::new();
        let groups = prepare_groups(&mut registry, blocks, &NoDiagnostics).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(registry.group(groups[0]).population(), 20);
        assert!(registry.node(groups[0]).neighbors().contains(groups[1]));
    }

    #[test]
    fn detached_parts_of_a_county_are_separate_groups() {
        let blocks = vec![
            block("001", 0, 1, square(0., 0., 1.)),
            block("001", 1, 1, square(1., 0., 1.)),
            block("001", 2, 1, square(5., 0., 1.)),
            block("001", 3, 1, square(6., 0., 1.)),
        ];
        let mut registry = Registry::new();
        let groups = prepare_groups(&mut registry, blocks, &NoDiagnostics).unwrap();
        // orphan repair only joins atoms with no neighbors, so two pieces remain,
        // and the islands are then bridged at group level
        assert_eq!(groups.len(), 2);
        assert!(registry.node(groups[0]).neighbors().contains(groups[1]));
    }

    #[test]
    fn empty_water_is_dropped() {
        let water = CensusBlock::new(crate::types::BlockId::new("001", "000100", "0001"), 0, square(1., 0., 1.));
        let blocks = vec![block("001", 0, 4, square(0., 0., 1.)), water];
        let mut registry = Registry::new();
        let groups = prepare_groups(&mut registry, blocks, &NoDiagnostics).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(registry.group(groups[0]).members().len(), 1);
    }

    #[test]
    fn populated_water_is_fatal() {
        let water = CensusBlock::new(crate::types::BlockId::new("001", "000100", "0001"), 3, square(1., 0., 1.));
        let blocks = vec![block("001", 0, 4, square(0., 0., 1.)), water];
        let result = prepare_groups(&mut Registry::new(), blocks, &NoDiagnostics);
        assert!(matches!(result, Err(SplitError::InvariantViolation(_))));
    }
}
