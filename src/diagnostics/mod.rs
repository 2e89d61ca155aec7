//! Diagnostic dumps and plots emitted at checkpoints and before fatal errors.
//!
//! Partitioning code reports through the `Diagnostics` trait only. Sinks must
//! never fail the run: write errors are logged and dropped.

mod dump;

use geo::{MultiPolygon, Point};
use serde_json::{json, Value};

use crate::graph::SpatialGraph;
use crate::registry::Registry;
use crate::types::{GroupId, NodeId};

pub use dump::DumpDir;

/// One named set of shapes in a plot, drawn in its own color.
#[derive(Clone, Debug, Default)]
pub struct PlotLayer {
    pub name: String,
    pub shapes: Vec<MultiPolygon<f64>>,
    /// Neighbor edges between centroids.
    pub edges: Vec<(Point<f64>, Point<f64>)>,
}

/// Receiver of diagnostic snapshots and plots.
pub trait Diagnostics {
    /// False if snapshots are discarded, so callers can skip building them.
    fn enabled(&self) -> bool { true }

    fn save(&self, tag: &str, snapshot: &Value);

    fn plot(&self, tag: &str, layers: &[PlotLayer]);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {
    fn enabled(&self) -> bool { false }

    fn save(&self, _tag: &str, _snapshot: &Value) {}

    fn plot(&self, _tag: &str, _layers: &[PlotLayer]) {}
}

/// JSON summary of groups: members, population, lineage and neighbors.
pub(crate) fn group_snapshot(registry: &Registry, groups: &[GroupId]) -> Value {
    let groups = groups.iter()
        .map(|&id| {
            let group = registry.group(id);
            json!({
                "id": id,
                "live": group.is_live(),
                "population": group.population(),
                "previous_parent": group.previous_parent(),
                "members": group.members(),
                "border": group.border().members(),
                "neighbors": group.node().neighbors().all(),
            })
        })
        .collect::<Vec<_>>();
    json!(groups)
}

/// One layer per named node list; edges are drawn only between nodes of the same list.
pub(crate) fn node_layers<I, G>(graph: &G, lists: &[(&str, &[I])]) -> Vec<PlotLayer>
where
    I: NodeId,
    G: SpatialGraph<I> + ?Sized,
{
    lists.iter()
        .map(|&(name, nodes)| PlotLayer {
            name: name.to_string(),
            shapes: nodes.iter().map(|&id| graph.node(id).geometry().clone()).collect(),
            edges: nodes.iter()
                .flat_map(|&a| graph.node(a).neighbors().all().iter()
                    .filter(move |&&b| a < b && nodes.contains(&b))
                    .map(move |&b| (graph.node(a).centroid(), graph.node(b).centroid())))
                .collect(),
        })
        .collect()
}

/// Save a snapshot and plot the listed nodes, if the sink keeps them.
pub(crate) fn dump<I, G>(diagnostics: &dyn Diagnostics, tag: &str, snapshot: impl FnOnce() -> Value, graph: &G, lists: &[(&str, &[I])])
where
    I: NodeId,
    G: SpatialGraph<I> + ?Sized,
{
    if !diagnostics.enabled() { return }
    diagnostics.save(tag, &snapshot());
    diagnostics.plot(tag, &node_layers(graph, lists));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::testing::grid_registry;
    use crate::types::AtomId;

    #[test]
    fn layers_keep_internal_edges_only() {
        let (registry, ids) = grid_registry(3, 1, 1);
        let left = [ids[0], ids[1]];
        let right = [ids[2]];
        let layers = node_layers::<AtomId, _>(&registry, &[("left", &left), ("right", &right)]);
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].shapes.len(), 2);
        assert_eq!(layers[0].edges.len(), 1);
        assert!(layers[1].edges.is_empty());
    }

    #[test]
    fn snapshot_lists_groups() {
        let (mut registry, ids) = grid_registry(2, 1, 4);
        let group = registry.create_group(ids, None).unwrap();
        let snapshot = group_snapshot(&registry, &[group]);
        assert_eq!(snapshot[0]["population"], 8);
        assert_eq!(snapshot[0]["members"].as_array().unwrap().len(), 2);
        assert!(snapshot[0]["previous_parent"].is_null());
    }
}
