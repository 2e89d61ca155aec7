//! Population-energy seams.
//!
//! A seam is a chain of adjacent atomic blocks crossing a group from one side
//! to the opposite side along the cheapest population path. Removing it cuts the
//! group in two.
//!
//! | axis         | energy seeds | starts | finishes | walk prefers | avoided sides |
//! |--------------|--------------|--------|----------|--------------|---------------|
//! | `NorthSouth` | west         | east   | west     | west         | north, south  |
//! | `WestEast`   | north        | south  | north    | north        | west, east    |

mod cut;
mod energy;
mod walk;

use ahash::AHashSet;
use geograph::{Alignment, CardinalDirection};
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::error::{Result, SplitError};
use crate::registry::Registry;
use crate::types::{AtomId, GroupId};

use cut::{cut_along, Cut};
use walk::SeamWalk;

/// How a group comes apart along one axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitOutcome {
    /// No seam crosses the group on this axis.
    NoSplit,
    /// Removing the seam leaves nothing; the group must be broken into single atoms.
    ForceSplit,
    /// Members of the first half (north or west) and of the second (south or east).
    Split { a: Vec<AtomId>, b: Vec<AtomId> },
}

struct Axis {
    seeds: CardinalDirection,
    starts: CardinalDirection,
    finishes: CardinalDirection,
    toward: CardinalDirection,
    avoid: [CardinalDirection; 2],
    /// Compare start candidates by centroid y (true) or x (false).
    across_y: bool,
}

impl Axis {
    fn of(alignment: Alignment) -> Self {
        use CardinalDirection::*;
        match alignment {
            Alignment::NorthSouth => Self { seeds: West, starts: East, finishes: West, toward: West, avoid: [North, South], across_y: true },
            Alignment::WestEast => Self { seeds: North, starts: South, finishes: North, toward: North, avoid: [West, East], across_y: false },
        }
    }
}

/// Find the lowest-energy seam through `group` on `alignment` and split along it.
///
/// Identical graphs always produce identical splits.
pub fn find_split(
    registry: &Registry,
    group: GroupId,
    alignment: Alignment,
    diagnostics: &dyn Diagnostics,
) -> Result<SplitOutcome> {
    match seam_split(registry, group, alignment, diagnostics) {
        Err(SplitError::SeamNotFound { group, alignment }) => {
            debug!("no {alignment} seam through {group}");
            Ok(SplitOutcome::NoSplit)
        }
        other => other,
    }
}

fn seam_split(
    registry: &Registry,
    group: GroupId,
    alignment: Alignment,
    diagnostics: &dyn Diagnostics,
) -> Result<SplitOutcome> {
    let not_found = || SplitError::SeamNotFound { group, alignment };
    let container = registry.group(group);
    let border = container.border();
    let axis = Axis::of(alignment);

    // A strip one member thick has nothing to cut across.
    let (dir_a, dir_b) = alignment.halves();
    if !border.has_exclusive(dir_a, dir_b) || !border.has_exclusive(dir_b, dir_a) {
        return Err(not_found());
    }

    let starts = border.in_direction(axis.starts);
    let finishes = border.in_direction(axis.finishes);
    if starts.is_empty() || finishes.is_empty() { return Err(not_found()) }

    let energy = energy::propagate(registry, group, border.in_direction(axis.seeds), diagnostics)?;

    let centre = container.node().centroid();
    let offset = |id: AtomId| {
        let c = registry.atom(id).node().centroid();
        if axis.across_y { (c.y() - centre.y()).abs() } else { (c.x() - centre.x()).abs() }
    };
    let mut starts = starts.to_vec();
    starts.sort_by(|&a, &b| energy.get(a).cmp(&energy.get(b)).then(offset(a).total_cmp(&offset(b))));

    let members = container.members().iter().copied().collect::<AHashSet<_>>();
    let mut avoid = starts.iter().copied().collect::<AHashSet<_>>();
    for side in axis.avoid {
        avoid.extend(border.in_direction(side).iter().copied());
    }

    let mut finish_avoid = AHashSet::new();
    loop {
        let remaining = finishes.iter().copied().filter(|id| !finish_avoid.contains(id)).collect::<AHashSet<_>>();
        if remaining.is_empty() { return Err(not_found()) }

        let walk = SeamWalk {
            registry,
            members: &members,
            energy: &energy,
            starts: starts.clone(),
            finishes: remaining,
            avoid: avoid.clone(),
            toward: axis.toward,
        };
        let Some(seam) = walk.run() else { return Err(not_found()) };
        debug!("{group}: {alignment} seam of {} atomic blocks ending at {}", seam.members.len(), seam.finish);

        match cut_along(registry, group, &seam, alignment, diagnostics)? {
            Cut::Force => return Ok(SplitOutcome::ForceSplit),
            Cut::Degenerate => { finish_avoid.insert(seam.finish); }
            Cut::Split { a, b } => return Ok(SplitOutcome::Split { a, b }),
        }
    }
}
