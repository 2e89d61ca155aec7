//! Owning arena for atomic blocks and redistricting groups.
//!
//! Every other module addresses entities through `AtomId` / `GroupId` and borrows
//! the registry for the duration of an operation.

use geo::MultiPolygon;

use crate::error::{invariant, Result};
use crate::graph::{is_contiguous, Border, SpatialGraph, SpatialNode};
use crate::types::{AtomId, CensusBlock, GroupId};

/// Census blocks that must stay together: a block plus every block it fully contains.
#[derive(Clone, Debug)]
pub struct AtomicBlock {
    blocks: Vec<CensusBlock>,
    is_water: bool,
    node: SpatialNode<AtomId>,
}

impl AtomicBlock {
    /// Build an atom from a non-empty list of blocks; geometry is their union.
    pub(crate) fn new(blocks: Vec<CensusBlock>) -> Result<Self> {
        if blocks.is_empty() { invariant!("atomic block needs at least one census block") }

        let geometry = match blocks.as_slice() {
            [single] => single.geometry.clone(),
            _ => geograph::union_all(blocks.iter().map(|block| &block.geometry)),
        };
        let population = blocks.iter().map(|block| block.population).sum();
        let is_water = blocks.iter().all(|block| block.is_water);

        Ok(Self { node: SpatialNode::new(geometry, population)?, blocks, is_water })
    }

    #[inline] pub fn blocks(&self) -> &[CensusBlock] { &self.blocks }

    #[inline] pub fn is_water(&self) -> bool { self.is_water }

    #[inline] pub fn population(&self) -> u64 { self.node.population() }

    #[inline] pub fn geometry(&self) -> &MultiPolygon<f64> { self.node.geometry() }

    #[inline] pub fn node(&self) -> &SpatialNode<AtomId> { &self.node }
}

/// A contiguous set of atomic blocks moved as one unit by the fill.
#[derive(Clone, Debug)]
pub struct RedistrictingGroup {
    id: GroupId,
    members: Vec<AtomId>,
    node: SpatialNode<GroupId>,
    border: Border<AtomId>,
    previous_parent: Option<GroupId>,
    live: bool,
}

impl RedistrictingGroup {
    #[inline] pub fn id(&self) -> GroupId { self.id }

    #[inline] pub fn members(&self) -> &[AtomId] { &self.members }

    #[inline] pub fn population(&self) -> u64 { self.node.population() }

    #[inline] pub fn geometry(&self) -> &MultiPolygon<f64> { self.node.geometry() }

    #[inline] pub fn node(&self) -> &SpatialNode<GroupId> { &self.node }

    /// Members whose boundary lies on the group's outer boundary.
    #[inline] pub fn border(&self) -> &Border<AtomId> { &self.border }

    /// Ancestor this group was decomposed from, if any.
    #[inline] pub fn previous_parent(&self) -> Option<GroupId> { self.previous_parent }

    #[inline] pub fn is_live(&self) -> bool { self.live }
}

/// Arena of every atom and group created during a run. Ids are never reused.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    atoms: Vec<AtomicBlock>,
    groups: Vec<RedistrictingGroup>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    pub(crate) fn add_atom(&mut self, atom: AtomicBlock) -> AtomId {
        let id = AtomId(self.atoms.len() as u32);
        self.atoms.push(atom);
        id
    }

    #[inline] pub fn atom(&self, id: AtomId) -> &AtomicBlock { &self.atoms[id.0 as usize] }

    #[inline] pub fn atom_count(&self) -> usize { self.atoms.len() }

    #[inline] pub fn group(&self, id: GroupId) -> &RedistrictingGroup { &self.groups[id.0 as usize] }

    /// Ids of every group that has not been retired, in creation order.
    pub fn live_groups(&self) -> Vec<GroupId> {
        self.groups.iter().filter(|group| group.live).map(|group| group.id).collect()
    }

    /// Create a live group over `members`, deriving geometry, population and border.
    pub(crate) fn create_group(&mut self, members: Vec<AtomId>, previous_parent: Option<GroupId>) -> Result<GroupId> {
        if members.is_empty() { invariant!("redistricting group needs at least one atomic block") }

        let geometry = geograph::union_all(members.iter().map(|&id| self.atom(id).geometry()));
        let population = members.iter().map(|&id| self.atom(id).population()).sum();
        let node = SpatialNode::new(geometry, population)?;
        let border = Border::compute(&*self, &members, node.geometry(), &node.bounds());

        let id = GroupId(self.groups.len() as u32);
        self.groups.push(RedistrictingGroup { id, members, node, border, previous_parent, live: true });
        Ok(id)
    }

    /// Retire a group and drop its group-level edges.
    pub(crate) fn retire_group(&mut self, id: GroupId) {
        SpatialGraph::<GroupId>::isolate(self, id);
        self.groups[id.0 as usize].live = false;
    }

    /// Check that the atoms of a group have symmetric edges and form one component.
    pub fn validate_group(&self, id: GroupId) -> Result<()> {
        let group = self.group(id);
        for &member in group.members() {
            for &n in self.atom(member).node().neighbors().all() {
                if !self.atom(n).node().neighbors().contains(member) {
                    invariant!("{id}: neighbor edge {member} -> {n} is not symmetric");
                }
            }
        }
        if !is_contiguous(self, group.members()) {
            invariant!("{id}: {} atomic blocks do not form one connected region", group.members().len());
        }
        Ok(())
    }

    /// Validate every group of `ids`, plus symmetry of the group-level edges among them.
    pub fn validate_groups(&self, ids: &[GroupId]) -> Result<()> {
        for &id in ids {
            if !self.group(id).live { invariant!("{id} is retired but still referenced") }
            self.validate_group(id)?;
            for &n in self.group(id).node().neighbors().all() {
                if !self.group(n).node().neighbors().contains(id) {
                    invariant!("group edge {id} -> {n} is not symmetric");
                }
            }
        }
        Ok(())
    }
}

impl SpatialGraph<AtomId> for Registry {
    #[inline]
    fn node(&self, id: AtomId) -> &SpatialNode<AtomId> { &self.atoms[id.0 as usize].node }

    #[inline]
    fn node_mut(&mut self, id: AtomId) -> &mut SpatialNode<AtomId> { &mut self.atoms[id.0 as usize].node }
}

impl SpatialGraph<GroupId> for Registry {
    #[inline]
    fn node(&self, id: GroupId) -> &SpatialNode<GroupId> { &self.groups[id.0 as usize].node }

    #[inline]
    fn node_mut(&mut self, id: GroupId) -> &mut SpatialNode<GroupId> { &mut self.groups[id.0 as usize].node }
}

#[cfg(test)]
pub(crate) mod testing {
    use geo::{MultiPolygon, Rect};

    use super::*;
    use crate::graph::assign_neighbors;
    use crate::types::BlockId;

    pub(crate) fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Rect::new((x, y), (x + size, y + size)).to_polygon()])
    }

    pub(crate) fn block(county: &str, n: usize, population: u64, geometry: MultiPolygon<f64>) -> CensusBlock {
        CensusBlock::new(BlockId::new(county, "000100", format!("{:04}", 1000 + n)), population, geometry)
    }

    /// Registry holding a `w` by `h` grid of unit atoms (row-major from the south-west),
    /// with rook neighbors assigned.
    pub(crate) fn grid_registry(w: usize, h: usize, population: u64) -> (Registry, Vec<AtomId>) {
        let cells = (0..h)
            .flat_map(|y| (0..w).map(move |x| (Rect::new((x as f64, y as f64), (x as f64 + 1.0, y as f64 + 1.0)), population)))
            .collect::<Vec<_>>();
        rect_registry(&cells)
    }

    /// Registry holding one atom per rectangle, in order, with rook neighbors assigned.
    pub(crate) fn rect_registry(cells: &[(Rect<f64>, u64)]) -> (Registry, Vec<AtomId>) {
        let mut registry = Registry::new();
        let ids = cells.iter()
            .enumerate()
            .map(|(n, &(rect, population))| {
                let geometry = MultiPolygon::new(vec![rect.to_polygon()]);
                let atom = AtomicBlock::new(vec![block("001", n, population, geometry)]).unwrap();
                registry.add_atom(atom)
            })
            .collect::<Vec<_>>();
        assign_neighbors(&mut registry, &ids, &ids);
        (registry, ids)
    }
}
