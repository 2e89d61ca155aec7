use ahash::AHashSet;
use geograph::CardinalDirection;
use tracing::debug;

use crate::registry::Registry;
use crate::seam::energy::EnergyMap;
use crate::types::AtomId;

/// A chain of adjacent members from a start candidate to a finish candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Seam {
    pub(crate) members: Vec<AtomId>,
    pub(crate) finish: AtomId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WalkState {
    /// Walking from the best start candidate not yet failed.
    Searching,
    /// The walk from this start ran out of moves.
    Stuck(AtomId),
    /// Every start failed; try them all again avoiding only the starts.
    Retrying,
    /// Every start failed with the relaxed avoid set too.
    Exhausted,
}

/// Greedy lowest-energy walk across a group.
pub(crate) struct SeamWalk<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) members: &'a AHashSet<AtomId>,
    pub(crate) energy: &'a EnergyMap,
    /// Start candidates, best first.
    pub(crate) starts: Vec<AtomId>,
    pub(crate) finishes: AHashSet<AtomId>,
    pub(crate) avoid: AHashSet<AtomId>,
    /// Direction the walk prefers to step in.
    pub(crate) toward: CardinalDirection,
}

impl SeamWalk<'_> {
    pub(crate) fn run(mut self) -> Option<Seam> {
        let mut failed = AHashSet::new();
        let mut relaxed = false;
        let mut state = WalkState::Searching;

        loop {
            state = match state {
                WalkState::Searching => {
                    match self.starts.iter().copied().find(|start| !failed.contains(start)) {
                        Some(start) => match self.walk_from(start) {
                            Some(seam) => return Some(seam),
                            None => WalkState::Stuck(start),
                        },
                        None if !relaxed => WalkState::Retrying,
                        None => WalkState::Exhausted,
                    }
                }
                WalkState::Stuck(start) => {
                    failed.insert(start);
                    WalkState::Searching
                }
                WalkState::Retrying => {
                    debug!("relaxing seam walk to avoid only its {} start candidates", self.starts.len());
                    self.avoid = self.starts.iter().copied().collect();
                    failed.clear();
                    relaxed = true;
                    WalkState::Searching
                }
                WalkState::Exhausted => {
                    debug!("seam walk failed from all {} start candidates", self.starts.len());
                    return None;
                }
            };
        }
    }

    /// Walk from `start` until a finish candidate is reached or no move remains.
    fn walk_from(&self, start: AtomId) -> Option<Seam> {
        if self.finishes.contains(&start) {
            return Some(Seam { members: vec![start], finish: start });
        }

        let mut path = vec![start];
        let mut visited = AHashSet::new();
        visited.insert(start);
        let mut current = start;

        loop {
            let neighbors = self.registry.atom(current).node().neighbors();
            let usable = |n: &&AtomId| self.members.contains(*n) && !visited.contains(*n) && !self.avoid.contains(*n);

            let next = self.lowest(neighbors.in_direction(self.toward).iter().filter(usable))
                .or_else(|| self.lowest(neighbors.all().iter().filter(usable)))?;

            path.push(next);
            visited.insert(next);
            if self.finishes.contains(&next) {
                return Some(Seam { members: path, finish: next });
            }
            current = next;
        }
    }

    /// Lowest-energy node; ties go to the earliest.
    fn lowest<'b>(&self, candidates: impl Iterator<Item = &'b AtomId>) -> Option<AtomId> {
        candidates.copied().fold(None, |best: Option<AtomId>, id| match best {
            Some(b) if self.energy.get(b) <= self.energy.get(id) => best,
            _ => Some(id),
        })
    }
}
