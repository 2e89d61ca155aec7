use ahash::{AHashMap, AHashSet};

use crate::diagnostics::{self, Diagnostics};
use crate::error::{invariant, Result};
use crate::registry::Registry;
use crate::types::{AtomId, GroupId};

/// Population energy of every member of a group: the least population a path
/// must cross to reach the member from the seed side, the member included.
#[derive(Clone, Debug, Default)]
pub(crate) struct EnergyMap(AHashMap<AtomId, u64>);

impl EnergyMap {
    #[inline]
    pub(crate) fn get(&self, id: AtomId) -> u64 { self.0.get(&id).copied().unwrap_or(u64::MAX) }
}

/// Spread energy outward from `seeds` in waves over the group's atom graph.
///
/// Seeds carry their own population. Each later wave takes the members
/// adjacent to the previous wave, each getting its population plus the lowest
/// energy among neighbors filled by earlier waves.
pub(crate) fn propagate(
    registry: &Registry,
    group: GroupId,
    seeds: &[AtomId],
    diagnostics: &dyn Diagnostics,
) -> Result<EnergyMap> {
    let members = registry.group(group).members();
    let in_group = members.iter().copied().collect::<AHashSet<_>>();
    let mut energy = AHashMap::with_capacity(members.len());

    let mut wave = Vec::new();
    for &seed in seeds {
        if in_group.contains(&seed) && !energy.contains_key(&seed) {
            energy.insert(seed, registry.atom(seed).population());
            wave.push(seed);
        }
    }
    if wave.is_empty() { return Ok(EnergyMap(energy)) }

    while energy.len() < members.len() {
        let mut seen = AHashSet::new();
        let next = wave.iter()
            .flat_map(|&id| registry.atom(id).node().neighbors().all().iter().copied())
            .filter(|n| in_group.contains(n) && !energy.contains_key(n) && seen.insert(*n))
            .collect::<Vec<_>>();

        if next.is_empty() {
            let filled = members.iter().copied().filter(|id| energy.contains_key(id)).collect::<Vec<_>>();
            let unfilled = members.iter().copied().filter(|id| !energy.contains_key(id)).collect::<Vec<_>>();
            diagnostics::dump(diagnostics, &format!("energy-stuck-{}", group.0),
                || diagnostics::group_snapshot(registry, &[group]),
                registry, &[("filled", filled.as_slice()), ("unfilled", unfilled.as_slice())]);
            invariant!("{group}: energy cannot reach {} of {} atomic blocks", unfilled.len(), members.len());
        }

        let values = next.iter()
            .map(|&id| {
                let node = registry.atom(id).node();
                let lowest = node.neighbors().all().iter()
                    .filter_map(|n| energy.get(n).copied())
                    .min()
                    .unwrap_or(0);
                (id, lowest.saturating_add(node.population()))
            })
            .collect::<Vec<_>>();
        energy.extend(values);
        wave = next;
    }

    Ok(EnergyMap(energy))
}
