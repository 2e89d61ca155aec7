use geo::{MultiPolygon, Point, Rect};
use geograph::{find_direction, CardinalDirection};
use smallvec::SmallVec;

use crate::error::{Result, SplitError};
use crate::types::NodeId;

type NeighborList<I> = SmallVec<[I; 8]>;

/// Neighbor set of a node, also bucketed by the direction each neighbor lies in.
#[derive(Clone, Debug)]
pub struct Neighbors<I> {
    all: NeighborList<I>,
    by_direction: [NeighborList<I>; 4],
}

impl<I: NodeId> Default for Neighbors<I> {
    fn default() -> Self {
        Self { all: SmallVec::new(), by_direction: Default::default() }
    }
}

impl<I: NodeId> Neighbors<I> {
    /// All neighbors, in insertion order.
    #[inline] pub fn all(&self) -> &[I] { &self.all }

    #[inline] pub fn in_direction(&self, dir: CardinalDirection) -> &[I] { &self.by_direction[dir.index()] }

    #[inline] pub fn len(&self) -> usize { self.all.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.all.is_empty() }

    #[inline] pub fn contains(&self, id: I) -> bool { self.all.contains(&id) }

    /// Add a neighbor; returns false if it was already present.
    pub(crate) fn insert(&mut self, id: I, dir: CardinalDirection) -> bool {
        if self.contains(id) { return false }
        self.all.push(id);
        self.by_direction[dir.index()].push(id);
        true
    }

    /// Remove a neighbor; returns false if it was not present.
    pub(crate) fn remove(&mut self, id: I) -> bool {
        let Some(pos) = self.all.iter().position(|&n| n == id) else { return false };
        self.all.remove(pos);
        self.by_direction.iter_mut().for_each(|list| list.retain(|n| *n != id));
        true
    }

    pub(crate) fn clear(&mut self) {
        self.all.clear();
        self.by_direction.iter_mut().for_each(|list| list.clear());
    }
}

/// Geometry, population and adjacency shared by every kind of graph node.
#[derive(Clone, Debug)]
pub struct SpatialNode<I> {
    pub(crate) geometry: MultiPolygon<f64>,
    pub(crate) centroid: Point<f64>,
    pub(crate) bounds: Rect<f64>,
    pub(crate) population: u64,
    pub(crate) neighbors: Neighbors<I>,
}

impl<I: NodeId> SpatialNode<I> {
    /// Build a node with no neighbors. Fails on empty geometry.
    pub(crate) fn new(geometry: MultiPolygon<f64>, population: u64) -> Result<Self> {
        let bounds = geograph::bounds(&geometry)
            .ok_or_else(|| SplitError::Geometry("node geometry is empty".into()))?;
        let centroid = geograph::centroid(&geometry)
            .ok_or_else(|| SplitError::Geometry("node geometry has no centroid".into()))?;

        Ok(Self { geometry, centroid, bounds, population, neighbors: Neighbors::default() })
    }

    #[inline] pub fn geometry(&self) -> &MultiPolygon<f64> { &self.geometry }

    #[inline] pub fn centroid(&self) -> Point<f64> { self.centroid }

    #[inline] pub fn bounds(&self) -> Rect<f64> { self.bounds }

    #[inline] pub fn population(&self) -> u64 { self.population }

    #[inline] pub fn neighbors(&self) -> &Neighbors<I> { &self.neighbors }
}

/// Arena of `SpatialNode`s addressed by a typed id.
pub trait SpatialGraph<I: NodeId> {
    fn node(&self, id: I) -> &SpatialNode<I>;

    fn node_mut(&mut self, id: I) -> &mut SpatialNode<I>;

    /// Add the edge `a <-> b`, bucketing each end by the direction of the other.
    fn connect(&mut self, a: I, b: I) {
        if a == b { return }
        let (ca, cb) = (self.node(a).centroid, self.node(b).centroid);
        self.node_mut(a).neighbors.insert(b, find_direction(ca, cb));
        self.node_mut(b).neighbors.insert(a, find_direction(cb, ca));
    }

    /// Remove the edge `a <-> b` from both ends.
    fn disconnect(&mut self, a: I, b: I) {
        self.node_mut(a).neighbors.remove(b);
        self.node_mut(b).neighbors.remove(a);
    }

    /// Remove every edge of `id`, on both ends.
    fn isolate(&mut self, id: I) {
        let neighbors = self.node(id).neighbors.all().to_vec();
        for n in neighbors {
            self.node_mut(n).neighbors.remove(id);
        }
        self.node_mut(id).neighbors.clear();
    }
}
