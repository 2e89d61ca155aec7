//! Weighted frontier fill.
//!
//! Grows a selection outward from its seeds, one node per round, always taking
//! the best-scoring neighbor that still fits the population budget.

use ahash::AHashSet;
use geo::{MultiPolygon, Point, Rect};
use geograph::CardinalDirection;
use tracing::debug;

use crate::config::WeightingMethod;
use crate::graph::SpatialGraph;
use crate::types::NodeId;

/// Floor for distances in inverse-distance scores.
const EPS: f64 = 1e-12;

/// Inputs of one fill.
#[derive(Clone, Debug)]
pub(crate) struct FillRequest<'a, I> {
    /// Nodes the fill may take, in a stable order.
    pub(crate) pool: &'a [I],
    pub(crate) seeds: &'a [I],
    /// Largest population the selection may reach.
    pub(crate) budget: u64,
    pub(crate) weighting: WeightingMethod,
    /// Side of the region the fill starts from.
    pub(crate) origin: CardinalDirection,
    /// Bounds of the whole region being filled.
    pub(crate) region: Rect<f64>,
    /// Approximate shapes by bounding rectangles when scoring compactness.
    pub(crate) fast: bool,
}

/// Result of a fill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Fill<I> {
    /// Selected nodes, in the order they were taken.
    pub(crate) selected: Vec<I>,
    /// Best-scoring node the fill could not afford in its last round.
    pub(crate) next_best: Option<I>,
    pub(crate) rounds: usize,
}

/// Running shape of the selection, kept in whatever form the weighting needs.
enum Shape {
    /// Area-weighted centroid sums.
    Centroid { x: f64, y: f64, area: f64 },
    Exact { selection: MultiPolygon<f64>, region: MultiPolygon<f64> },
    Bounds(Option<Rect<f64>>),
    Untracked,
}

pub(crate) fn frontier_fill<I, G>(graph: &G, request: &FillRequest<'_, I>) -> Fill<I>
where
    I: NodeId,
    G: SpatialGraph<I> + ?Sized,
{
    let in_pool = request.pool.iter().copied().collect::<AHashSet<_>>();
    let mut taken = AHashSet::new();
    let mut selected = Vec::new();
    let mut population = 0u64;
    let mut next_best = None;

    for &seed in request.seeds {
        if !in_pool.contains(&seed) || taken.contains(&seed) { continue }
        let seed_population = graph.node(seed).population();
        if population + seed_population <= request.budget {
            taken.insert(seed);
            selected.push(seed);
            population += seed_population;
        } else if next_best.is_none() {
            next_best = Some(seed);
        }
    }
    if selected.is_empty() {
        return Fill { selected, next_best, rounds: 0 };
    }

    let mut shape = match (request.weighting, request.fast) {
        (WeightingMethod::Distance, _) => Shape::Centroid { x: 0.0, y: 0.0, area: 0.0 },
        (WeightingMethod::Compactness, false) => Shape::Exact {
            selection: MultiPolygon::new(vec![]),
            region: geograph::union_all(request.pool.iter().map(|&id| graph.node(id).geometry())),
        },
        (WeightingMethod::Compactness, true) => Shape::Bounds(None),
        (WeightingMethod::CardinalDistance, _) => Shape::Untracked,
    };
    for &id in &selected {
        shape.add(graph.node(id).geometry(), graph.node(id).bounds());
    }

    let mut rounds = 0;
    while rounds < request.pool.len() {
        rounds += 1;

        let mut frontier = Vec::new();
        let mut seen = AHashSet::new();
        for &id in &selected {
            for &n in graph.node(id).neighbors().all() {
                if in_pool.contains(&n) && !taken.contains(&n) && seen.insert(n) {
                    frontier.push(n);
                }
            }
        }
        if frontier.is_empty() { break }

        let remaining = match shape {
            Shape::Exact { ref selection, ref region } => Some(geograph::difference(region, selection)),
            _ => None,
        };
        let remaining_bounds = |skip: I| request.pool.iter()
            .filter(|&&id| id != skip && !taken.contains(&id))
            .map(|&id| graph.node(id).bounds())
            .reduce(|a, b| geograph::merge_rects(&a, &b));

        let mut best: Option<(I, f64)> = None;
        let mut best_fitting: Option<(I, f64)> = None;
        for &candidate in &frontier {
            let node = graph.node(candidate);
            let score = match &shape {
                Shape::Centroid { .. } => {
                    let centre = shape.centroid().unwrap_or_else(|| node.centroid());
                    1.0 / geograph::point_distance(&centre, node.geometry()).max(EPS)
                }
                Shape::Exact { selection, .. } => {
                    let grown = geograph::union_all([selection, node.geometry()]);
                    let rest = remaining.as_ref()
                        .map(|rest| geograph::difference(rest, node.geometry()))
                        .unwrap_or_else(|| MultiPolygon::new(vec![]));
                    geograph::polsby_popper(&grown) + geograph::polsby_popper(&rest)
                }
                Shape::Bounds(bounds) => {
                    let grown = bounds.map_or(node.bounds(), |b| geograph::merge_rects(&b, &node.bounds()));
                    let rest = remaining_bounds(candidate)
                        .map_or(0.0, |rest| geograph::polsby_popper(&geograph::rect_polygon(&rest)));
                    geograph::polsby_popper(&geograph::rect_polygon(&grown)) + rest
                }
                Shape::Untracked => {
                    let gap = request.origin.side_of(&request.region) - request.origin.side_of(&node.bounds());
                    1.0 / gap.abs().max(EPS)
                }
            };

            if best.is_none_or(|(_, s)| score > s) {
                best = Some((candidate, score));
            }
            if population + node.population() <= request.budget && best_fitting.is_none_or(|(_, s)| score > s) {
                best_fitting = Some((candidate, score));
            }
        }

        let Some((chosen, _)) = best_fitting else {
            next_best = best.map(|(id, _)| id);
            break;
        };
        let node = graph.node(chosen);
        taken.insert(chosen);
        selected.push(chosen);
        population += node.population();
        shape.add(node.geometry(), node.bounds());
        next_best = None;
    }

    debug!("fill took {} of {} nodes ({population} of {} population) in {rounds} rounds",
        selected.len(), request.pool.len(), request.budget);
    Fill { selected, next_best, rounds }
}

impl Shape {
    fn add(&mut self, geometry: &MultiPolygon<f64>, bounds: Rect<f64>) {
        match self {
            Self::Centroid { x, y, area } => {
                let a = geograph::area(geometry);
                if let Some(c) = geograph::centroid(geometry) {
                    *x += c.x() * a;
                    *y += c.y() * a;
                    *area += a;
                }
            }
            Self::Exact { selection, .. } => *selection = geograph::union_all([&*selection, geometry]),
            Self::Bounds(current) => {
                *current = Some(current.map_or(bounds, |b| geograph::merge_rects(&b, &bounds)));
            }
            Self::Untracked => {}
        }
    }

    fn centroid(&self) -> Option<Point<f64>> {
        match self {
            Self::Centroid { x, y, area } if *area > 0.0 => Some(Point::new(x / area, y / area)),
            _ => None,
        }
    }
}
