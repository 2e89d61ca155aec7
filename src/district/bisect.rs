use geograph::{alignment_of, Alignment, CardinalDirection, SpatialIndex};
use serde_json::json;
use tracing::{debug, info};

use crate::config::{BreakingMethod, SplitConfig};
use crate::diagnostics::{self, Diagnostics};
use crate::district::{merge::merge_back, District};
use crate::error::{invariant, Result, SplitError};
use crate::fill::{frontier_fill, Fill, FillRequest};
use crate::graph::{assign_neighbors, bridge_components, most_in_direction};
use crate::group::split_group;
use crate::registry::Registry;
use crate::types::GroupId;

/// Split `district` into `count` contiguous leaves of balanced population.
///
/// Each step cuts a district in the ratio ⌊count/2⌋ : ⌈count/2⌉ and recurses
/// into both halves. Leaves come out in depth-first order, first halves first.
pub fn split_district(
    registry: &mut Registry,
    district: District,
    count: usize,
    config: &SplitConfig,
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<District>> {
    config.validate()?;
    if count == 0 {
        return Err(SplitError::UnsupportedConfiguration("cannot split into zero districts".into()));
    }

    let mut leaves = Vec::with_capacity(count);
    bisect(registry, district, count, "d", config, diagnostics, &mut leaves)?;
    Ok(leaves)
}

fn bisect(
    registry: &mut Registry,
    mut district: District,
    count: usize,
    label: &str,
    config: &SplitConfig,
    diagnostics: &dyn Diagnostics,
    leaves: &mut Vec<District>,
) -> Result<()> {
    if count == 1 {
        district.validate(registry)?;
        leaves.push(district);
        return Ok(());
    }

    let ratio = (count / 2, count - count / 2);
    let (a, b) = cut_exact_ratio(registry, &mut district, ratio, label, config, diagnostics)?;

    let single_part = geograph::polygons(district.geometry()).len() == 1;
    let mut children = Vec::with_capacity(2);
    for (side, groups) in [("a", a), ("b", b)] {
        let child = District::new(registry, groups)?;
        if single_part && geograph::polygons(child.geometry()).len() != 1 {
            diagnostics::dump::<GroupId, _>(diagnostics, &format!("{label}{side}-not-single-polygon"),
                || diagnostics::group_snapshot(registry, child.groups()), &*registry, &[("child", child.groups())]);
            invariant!("district {label}{side} is not a single polygon after a cut");
        }
        child.validate(registry)?;
        children.push((format!("{label}{side}"), child));
    }

    let counts = [ratio.0, ratio.1];
    for ((child_label, child), count) in children.into_iter().zip(counts) {
        bisect(registry, child, count, &child_label, config, diagnostics, leaves)?;
    }
    Ok(())
}

/// Candidate first groups of a fresh fill, with the side each starts from.
///
/// The most extreme border group in every direction, the long axis first:
/// north, south, west, east for a tall district and west, east, north, south
/// otherwise.
fn starting_candidates(registry: &Registry, district: &District) -> Vec<(Vec<GroupId>, CardinalDirection)> {
    use CardinalDirection::*;
    let order = match alignment_of(&district.bounds()) {
        Alignment::NorthSouth => [North, South, West, East],
        Alignment::WestEast => [West, East, North, South],
    };
    order.into_iter()
        .filter_map(|dir| most_in_direction(registry, district.border().members(), dir).map(|id| (vec![id], dir)))
        .collect()
}

/// Grow the first half from the previous selection, or else from the first
/// starting candidate whose fill takes anything.
fn rough_fill(
    registry: &Registry,
    district: &District,
    budget: u64,
    previous: Option<(Vec<GroupId>, CardinalDirection)>,
    config: &SplitConfig,
) -> (Fill<GroupId>, CardinalDirection) {
    let candidates = match previous {
        Some(previous) => vec![previous],
        None => starting_candidates(registry, district),
    };

    let mut last = None;
    for (seeds, origin) in candidates {
        let request = FillRequest {
            pool: district.groups(),
            seeds: &seeds,
            budget,
            weighting: config.weighting,
            origin,
            region: district.bounds(),
            fast: config.fast_calculations,
        };
        let fill = frontier_fill(registry, &request);
        if !fill.selected.is_empty() {
            return (fill, origin);
        }
        last = Some((fill, origin));
    }
    last.unwrap_or((Fill { selected: vec![], next_best: None, rounds: 0 }, CardinalDirection::West))
}

/// Groups of `a` and `b` whose shapes meet, each listed once in discovery order.
fn groups_between(registry: &Registry, a: &[GroupId], b: &[GroupId]) -> Vec<GroupId> {
    let index = SpatialIndex::new(b.iter().map(|&id| registry.group(id).geometry()));
    let mut between = Vec::new();
    for &ga in a {
        let shape = registry.group(ga).geometry();
        for k in index.query(&registry.group(ga).node().bounds(), 0.0) {
            let gb = b[k];
            if !geograph::intersects(shape, registry.group(gb).geometry()) { continue }
            for id in [ga, gb] {
                if !between.contains(&id) { between.push(id) }
            }
        }
    }
    between
}

/// Fill and decompose until both halves land within the allowed deviation of
/// their ideal populations. Returns the groups of each half.
fn cut_exact_ratio(
    registry: &mut Registry,
    district: &mut District,
    (ratio_a, ratio_b): (usize, usize),
    label: &str,
    config: &SplitConfig,
    diagnostics: &dyn Diagnostics,
) -> Result<(Vec<GroupId>, Vec<GroupId>)> {
    let total = district.population();
    let n = (ratio_a + ratio_b) as u128;
    let ideal_a = (total as u128 * ratio_a as u128 / n) as u64;
    let ideal_b = (total as u128 * ratio_b as u128 / n) as u64;
    let deviation = config.population_deviation;
    let population = |registry: &Registry, ids: &[GroupId]| ids.iter().map(|&id| registry.group(id).population()).sum::<u64>();

    info!("cutting district {label} ({} groups, population {total}) in a {ratio_a}:{ratio_b} ratio, ideal {ideal_a} / {ideal_b}",
        district.groups().len());

    let mut previous: Option<(Vec<GroupId>, CardinalDirection)> = None;
    let mut pass = 0;
    let (a, b) = loop {
        pass += 1;
        let seeds = previous.take().filter(|(seeds, _)| !seeds.is_empty() && !config.refill_each_pass);
        let (fill, origin) = rough_fill(registry, district, ideal_a, seeds, config);
        let a = fill.selected;
        let b = district.groups().iter().copied().filter(|id| !a.contains(id)).collect::<Vec<_>>();
        let (pop_a, pop_b) = (population(registry, &a), population(registry, &b));
        debug!("district {label}: pass {pass} filled {} groups from the {origin} in {} rounds", a.len(), fill.rounds);

        if diagnostics.enabled() {
            diagnostics.save(&format!("{label}-pass-{pass}"), &json!({
                "ratio": [ratio_a, ratio_b],
                "ideal": [ideal_a, ideal_b],
                "population": [pop_a, pop_b],
                "origin": origin,
                "a": a,
                "b": b,
                "next_best": fill.next_best,
            }));
        }

        if pop_a.abs_diff(ideal_a) <= deviation && pop_b.abs_diff(ideal_b) <= deviation {
            info!("district {label}: pass {pass} accepted at {pop_a} / {pop_b}");
            break (a, b);
        }
        info!("district {label}: pass {pass} missed, {pop_a} / {pop_b} is {} off", pop_a.abs_diff(ideal_a));

        let to_break = if district.groups().len() == 1 {
            district.groups().to_vec()
        } else if a.is_empty() {
            fill.next_best.into_iter().collect()
        } else {
            match config.breaking {
                BreakingMethod::SplitBestCandidateGroup => fill.next_best.into_iter().collect(),
                BreakingMethod::SplitGroupsOnEdge => {
                    let both_sides = config.merge_into_previous_groups && config.refill_each_pass;
                    groups_between(registry, &a, &b).into_iter()
                        .filter(|id| both_sides || !a.contains(id))
                        .collect()
                }
                BreakingMethod::SplitLowestEnergySeam => {
                    return Err(SplitError::UnsupportedConfiguration(format!("breaking method {}", config.breaking)));
                }
            }
        };

        let breakable = to_break.iter().copied()
            .filter(|&id| registry.group(id).members().len() > 1)
            .collect::<Vec<_>>();
        if breakable.is_empty() {
            diagnostics::dump::<GroupId, _>(diagnostics, &format!("{label}-no-decomposable-group"),
                || json!({ "district": diagnostics::group_snapshot(registry, district.groups()), "a": a, "b": b, "selected": to_break }),
                &*registry, &[("a", a.as_slice()), ("b", b.as_slice()), ("selected", to_break.as_slice())]);
            return Err(SplitError::NoDecomposableUnit { groups: to_break });
        }

        debug!("district {label}: decomposing {} groups", breakable.len());
        let mut fragments = Vec::new();
        for &id in &breakable {
            fragments.extend(split_group(registry, id, diagnostics)?);
        }
        for &id in &breakable {
            registry.retire_group(id);
        }

        let mut updated = district.groups().iter().copied()
            .filter(|id| !breakable.contains(id))
            .collect::<Vec<_>>();
        updated.extend(&fragments);

        assign_neighbors::<GroupId, _>(registry, &fragments, &updated);
        bridge_components::<GroupId, _>(registry, &updated);
        registry.validate_groups(&updated)?;
        district.replace_groups(registry, updated)?;

        let survivors = a.into_iter().filter(|&id| registry.group(id).is_live()).collect::<Vec<_>>();
        previous = Some((survivors, origin));
    };

    if !config.merge_into_previous_groups {
        return Ok((a, b));
    }

    let (a, b) = (merge_back(registry, &a)?, merge_back(registry, &b)?);
    let (pop_a, pop_b) = (population(registry, &a), population(registry, &b));
    if pop_a + pop_b != total {
        invariant!("merging fragments of district {label} changed population from {total} to {}", pop_a + pop_b);
    }
    debug!("district {label}: merged fragments back into {} / {} groups", a.len(), b.len());
    Ok((a, b))
}
