use std::collections::VecDeque;

use ahash::AHashSet;

use crate::graph::SpatialGraph;
use crate::types::NodeId;

/// Connected components of the subgraph induced by `nodes`.
///
/// Components come out in discovery order (seeded from the earliest unvisited
/// node of `nodes`), each listed in BFS order.
pub(crate) fn connected_components<I, G>(graph: &G, nodes: &[I]) -> Vec<Vec<I>>
where
    I: NodeId,
    G: SpatialGraph<I> + ?Sized,
{
    let members = nodes.iter().copied().collect::<AHashSet<_>>();
    let mut visited = AHashSet::with_capacity(nodes.len());
    let mut components = Vec::new();

    for &start in nodes {
        if !visited.insert(start) { continue }

        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(u) = queue.pop_front() {
            component.push(u);
            for &v in graph.node(u).neighbors().all() {
                if members.contains(&v) && visited.insert(v) {
                    queue.push_back(v);
                }
            }
        }
        components.push(component);
    }

    components
}

/// True if `nodes` is non-empty and forms a single component.
#[inline]
pub(crate) fn is_contiguous<I, G>(graph: &G, nodes: &[I]) -> bool
where
    I: NodeId,
    G: SpatialGraph<I> + ?Sized,
{
    connected_components(graph, nodes).len() == 1
}
