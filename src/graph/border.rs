use geo::{MultiPolygon, Rect};
use geograph::{nearest_side, touching_sides, CardinalDirection};

use crate::graph::SpatialGraph;
use crate::types::NodeId;

/// Relative tolerance used when deciding whether a member reaches a side of
/// its container's bounding box.
const SIDE_TOLERANCE: f64 = 1e-9;

/// Members of a container whose boundary meets the container's boundary,
/// labelled with the container sides they lie on.
///
/// A member reaching several sides of the bounding box (a corner, or a member
/// spanning the full width) carries every such label. A border member reaching
/// none is labelled with its nearest side.
#[derive(Clone, Debug)]
pub struct Border<I> {
    members: Vec<I>,
    by_direction: [Vec<I>; 4],
}

impl<I: NodeId> Default for Border<I> {
    fn default() -> Self {
        Self { members: Vec::new(), by_direction: Default::default() }
    }
}

impl<I: NodeId> Border<I> {
    /// Classify `members` against the container's shape and bounds.
    pub(crate) fn compute<G>(graph: &G, members: &[I], container: &MultiPolygon<f64>, bounds: &Rect<f64>) -> Self
    where
        G: SpatialGraph<I> + ?Sized,
    {
        let tol = SIDE_TOLERANCE * bounds.width().max(bounds.height());
        let mut border = Self::default();

        for &id in members {
            let node = graph.node(id);
            if !geograph::boundary_intersects(container, node.geometry()) { continue }

            let mut sides = touching_sides(bounds, &node.bounds(), tol);
            if sides.is_empty() {
                sides.push(nearest_side(bounds, &node.bounds()));
            }

            border.members.push(id);
            for side in sides {
                border.by_direction[side.index()].push(id);
            }
        }

        border
    }

    #[inline] pub fn members(&self) -> &[I] { &self.members }

    #[inline] pub fn in_direction(&self, dir: CardinalDirection) -> &[I] { &self.by_direction[dir.index()] }

    #[inline] pub fn contains(&self, id: I) -> bool { self.members.contains(&id) }

    #[inline] pub fn len(&self) -> usize { self.members.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.members.is_empty() }

    /// True if some member lies on side `dir` without also lying on `other`.
    pub fn has_exclusive(&self, dir: CardinalDirection, other: CardinalDirection) -> bool {
        let others = self.in_direction(other);
        self.in_direction(dir).iter().any(|id| !others.contains(id))
    }
}

/// The node of `nodes` reaching furthest towards `dir` (highest top edge for
/// north, lowest bottom edge for south, and so on). Ties go to the earliest node.
pub(crate) fn most_in_direction<I, G>(graph: &G, nodes: &[I], dir: CardinalDirection) -> Option<I>
where
    I: NodeId,
    G: SpatialGraph<I> + ?Sized,
{
    let reach = |id: I| {
        let side = dir.side_of(&graph.node(id).bounds());
        match dir {
            CardinalDirection::North | CardinalDirection::East => side,
            CardinalDirection::South | CardinalDirection::West => -side,
        }
    };

    nodes.iter().copied().fold(None, |best: Option<(I, f64)>, id| {
        let r = reach(id);
        match best {
            Some((_, top)) if top >= r => best,
            _ => Some((id, r)),
        }
    })
    .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::testing::*;
    use crate::types::AtomId;

    fn border_of(g: &CellGraph, members: &[AtomId]) -> Border<AtomId> {
        let shape = geograph::union_all(members.iter().map(|&id| g.node(id).geometry()));
        let bounds = geograph::bounds(&shape).unwrap();
        Border::compute(g, members, &shape, &bounds)
    }

    #[test]
    fn interior_cell_is_not_on_border() {
        let g = grid(3, 3, 1);
        let border = border_of(&g, &ids(9));
        assert_eq!(border.len(), 8);
        assert!(!border.contains(AtomId(4)));
    }

    #[test]
    fn corners_carry_two_labels() {
        let g = grid(2, 2, 1);
        let border = border_of(&g, &ids(4));
        assert_eq!(border.in_direction(CardinalDirection::South), &[AtomId(0), AtomId(1)]);
        assert_eq!(border.in_direction(CardinalDirection::West), &[AtomId(0), AtomId(2)]);
        assert_eq!(border.in_direction(CardinalDirection::North), &[AtomId(2), AtomId(3)]);
        assert_eq!(border.in_direction(CardinalDirection::East), &[AtomId(1), AtomId(3)]);
    }

    #[test]
    fn most_in_direction_prefers_first_on_ties() {
        let g = grid(3, 2, 1);
        let all = ids(6);
        assert_eq!(most_in_direction(&g, &all, CardinalDirection::North), Some(AtomId(3)));
        assert_eq!(most_in_direction(&g, &all, CardinalDirection::South), Some(AtomId(0)));
        assert_eq!(most_in_direction(&g, &all, CardinalDirection::East), Some(AtomId(2)));
        assert_eq!(most_in_direction(&g, &all, CardinalDirection::West), Some(AtomId(0)));
        assert_eq!(most_in_direction::<AtomId, _>(&g, &[], CardinalDirection::West), None);
    }

    #[test]
    fn strip_has_no_exclusive_north_or_south() {
        let g = grid(6, 1, 1);
        let border = border_of(&g, &ids(6));
        assert!(!border.has_exclusive(CardinalDirection::North, CardinalDirection::South));
        assert!(border.has_exclusive(CardinalDirection::West, CardinalDirection::East));
        assert_eq!(border.in_direction(CardinalDirection::West), &[AtomId(0)]);
        assert_eq!(border.in_direction(CardinalDirection::East), &[AtomId(5)]);
    }
}
