//! Neighbor graph construction and repair.
//!
//! Two nodes are neighbors iff their geometries share a boundary segment. Every edit keeps the
//! relation symmetric: edges are only ever added or removed on both ends.

use ahash::AHashSet;
use rayon::prelude::*;
use tracing::{debug, warn};

use geograph::SpatialIndex;

use crate::graph::{connected_components, SpatialGraph};
use crate::types::NodeId;

/// For each node of `changed`, the nodes of `pool` adjacent to it (excluding itself).
/// Candidate pairs are narrowed by a bounding-box R-tree and tested in parallel.
fn find_adjacent<I, G>(graph: &G, changed: &[I], pool: &[I]) -> Vec<(I, Vec<I>)>
where
    I: NodeId,
    G: SpatialGraph<I> + Sync + ?Sized,
{
    let index = SpatialIndex::new(pool.iter().map(|&id| graph.node(id).geometry()));

    changed.par_iter()
        .map(|&a| {
            let node = graph.node(a);
            let hits = index.query(&node.bounds(), 0.0).into_iter()
                .map(|k| pool[k])
                .filter(|&b| b != a && geograph::adjacent(node.geometry(), graph.node(b).geometry()))
                .collect();
            (a, hits)
        })
        .collect()
}

/// Add edges from each node of `changed` to every adjacent node of `pool`,
/// keeping existing edges.
pub(crate) fn link_adjacent<I, G>(graph: &mut G, changed: &[I], pool: &[I])
where
    I: NodeId,
    G: SpatialGraph<I> + Sync + ?Sized,
{
    for (a, hits) in find_adjacent(&*graph, changed, pool) {
        for b in hits {
            graph.connect(a, b);
        }
    }
}

/// Drop every edge between a node of `pool` and a node outside `pool`.
pub(crate) fn prune_stale<I, G>(graph: &mut G, pool: &[I])
where
    I: NodeId,
    G: SpatialGraph<I> + ?Sized,
{
    let members = pool.iter().copied().collect::<AHashSet<_>>();
    for &id in pool {
        let stale = graph.node(id).neighbors().all().iter()
            .copied()
            .filter(|n| !members.contains(n))
            .collect::<Vec<_>>();
        for n in stale {
            graph.disconnect(id, n);
        }
    }
}

/// Rebuild the neighbors of `changed` against `pool`: stale edges are pruned
/// from the whole pool, the changed nodes are cleared, then relinked.
pub(crate) fn assign_neighbors<I, G>(graph: &mut G, changed: &[I], pool: &[I])
where
    I: NodeId,
    G: SpatialGraph<I> + Sync + ?Sized,
{
    prune_stale(graph, pool);
    for &id in changed {
        graph.isolate(id);
    }
    link_adjacent(graph, changed, pool);
}

/// Index of the node in `candidates` closest to `node`; ties go to the earliest.
fn closest<I, G>(graph: &G, node: I, candidates: &[I]) -> Option<I>
where
    I: NodeId,
    G: SpatialGraph<I> + ?Sized,
{
    let geometry = graph.node(node).geometry();
    candidates.iter()
        .copied()
        .filter(|&c| c != node)
        .map(|c| (c, geograph::distance(geometry, graph.node(c).geometry())))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

/// Attach every node of `nodes` that has no neighbors to the closest other node
/// of `pool`. Returns the number of nodes attached.
pub(crate) fn attach_orphans<I, G>(graph: &mut G, nodes: &[I], pool: &[I]) -> usize
where
    I: NodeId,
    G: SpatialGraph<I> + ?Sized,
{
    let mut attached = 0;
    for &id in nodes {
        if !graph.node(id).neighbors().is_empty() { continue }
        let Some(target) = closest(&*graph, id, pool) else { continue };
        warn!("attaching orphan {id} to closest node {target}");
        graph.connect(id, target);
        attached += 1;
    }
    attached
}

/// Bridge the connected components of `pool` until only one remains.
///
/// Each component is linked to its closest other component through the pair
/// of nodes nearest to the opposite component's union. Returns the number of
/// bridges added.
pub(crate) fn bridge_components<I, G>(graph: &mut G, pool: &[I]) -> usize
where
    I: NodeId,
    G: SpatialGraph<I> + ?Sized,
{
    let mut bridges = 0;
    let mut components = connected_components(&*graph, pool);

    while components.len() > 1 {
        let shapes = components.iter()
            .map(|comp| geograph::union_all(comp.iter().map(|&id| graph.node(id).geometry())))
            .collect::<Vec<_>>();

        for (i, component) in components.iter().enumerate() {
            let Some(j) = (0..components.len())
                .filter(|&j| j != i)
                .min_by(|&a, &b| geograph::distance(&shapes[i], &shapes[a])
                    .total_cmp(&geograph::distance(&shapes[i], &shapes[b])))
            else { continue };

            let nearest_in = |nodes: &[I], target: &geo::MultiPolygon<f64>| nodes.iter()
                .copied()
                .min_by(|&a, &b| geograph::distance(graph.node(a).geometry(), target)
                    .total_cmp(&geograph::distance(graph.node(b).geometry(), target)));

            let (Some(a), Some(b)) = (nearest_in(component, &shapes[j]), nearest_in(&components[j], &shapes[i]))
            else { continue };

            if !graph.node(a).neighbors().contains(b) {
                debug!("bridging {a} to {b} across disconnected regions");
                graph.connect(a, b);
                bridges += 1;
            }
        }

        let next = connected_components(&*graph, pool);
        if next.len() >= components.len() { break }
        components = next;
    }

    bridges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::testing::*;
    use crate::graph::{is_contiguous, SpatialNode};
    use crate::types::AtomId;

    fn assert_symmetric(g: &CellGraph) {
        for (i, node) in g.0.iter().enumerate() {
            for &n in node.neighbors().all() {
                assert!(g.node(n).neighbors().contains(AtomId(i as u32)),
                    "edge {i} -> {n} has no reverse");
            }
        }
    }

    #[test]
    fn grid_two_by_two_has_rook_neighbors() {
        let mut g = grid(2, 2, 10);
        let all = ids(4);
        assign_neighbors(&mut g, &all, &all);
        // diagonal cells meet at a single point only
        for id in &all {
            assert_eq!(g.node(*id).neighbors().len(), 2);
        }
        assert_symmetric(&g);
    }

    #[test]
    fn strip_neighbors_are_west_and_east() {
        let mut g = grid(3, 1, 1);
        let all = ids(3);
        assign_neighbors(&mut g, &all, &all);
        let middle = g.node(AtomId(1)).neighbors();
        assert_eq!(middle.in_direction(geograph::CardinalDirection::West), &[AtomId(0)]);
        assert_eq!(middle.in_direction(geograph::CardinalDirection::East), &[AtomId(2)]);
    }

    #[test]
    fn prune_removes_edges_leaving_the_pool() {
        let mut g = grid(3, 1, 1);
        let all = ids(3);
        assign_neighbors(&mut g, &all, &all);
        prune_stale(&mut g, &[AtomId(0), AtomId(1)]);
        assert!(!g.node(AtomId(1)).neighbors().contains(AtomId(2)));
        assert!(!g.node(AtomId(2)).neighbors().contains(AtomId(1)));
        assert!(g.node(AtomId(0)).neighbors().contains(AtomId(1)));
        assert_symmetric(&g);
    }

    #[test]
    fn orphan_attaches_to_closest() {
        let mut g = CellGraph(vec![
            SpatialNode::new(cell(0., 0.), 1).unwrap(),
            SpatialNode::new(cell(1., 0.), 1).unwrap(),
            SpatialNode::new(cell(4., 0.), 1).unwrap(),
        ]);
        let all = ids(3);
        assign_neighbors(&mut g, &all, &all);
        assert_eq!(attach_orphans(&mut g, &all, &all), 1);
        assert!(g.node(AtomId(2)).neighbors().contains(AtomId(1)));
        assert!(is_contiguous(&g, &all));
        assert_symmetric(&g);
    }

    #[test]
    fn islands_are_bridged_into_one_component() {
        let mut g = CellGraph(vec![
            SpatialNode::new(cell(0., 0.), 1).unwrap(),
            SpatialNode::new(cell(1., 0.), 1).unwrap(),
            SpatialNode::new(cell(5., 0.), 1).unwrap(),
            SpatialNode::new(cell(6., 0.), 1).unwrap(),
            SpatialNode::new(cell(0., 9.), 1).unwrap(),
        ]);
        let all = ids(5);
        assign_neighbors(&mut g, &all, &all);
        assert!(bridge_components(&mut g, &all) >= 2);
        assert!(is_contiguous(&g, &all));
        assert!(g.node(AtomId(1)).neighbors().contains(AtomId(2)));
        assert_symmetric(&g);
    }

    #[test]
    fn reassigning_changed_nodes_keeps_symmetry() {
        let mut g = grid(3, 3, 1);
        let all = ids(9);
        assign_neighbors(&mut g, &all, &all);
        assign_neighbors(&mut g, &[AtomId(4)], &all);
        assert_eq!(g.node(AtomId(4)).neighbors().len(), 4);
        assert_symmetric(&g);
    }
}
