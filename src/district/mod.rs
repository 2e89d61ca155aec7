//! Districts: sets of redistricting groups, recursively bisected into leaves.

mod bisect;
mod merge;

use geo::{MultiPolygon, Rect};

use crate::error::{invariant, Result, SplitError};
use crate::graph::{connected_components, prune_stale, Border, SpatialGraph};
use crate::registry::Registry;
use crate::types::GroupId;

pub use bisect::split_district;

/// A region made of whole redistricting groups.
///
/// Geometry and population are fixed at creation. Breaking groups apart
/// replaces the children but never changes what the district covers.
#[derive(Clone, Debug)]
pub struct District {
    groups: Vec<GroupId>,
    geometry: MultiPolygon<f64>,
    population: u64,
    bounds: Rect<f64>,
    border: Border<GroupId>,
}

impl District {
    /// Build a district over `groups`, dropping group edges that leave it.
    pub(crate) fn new(registry: &mut Registry, groups: Vec<GroupId>) -> Result<Self> {
        if groups.is_empty() {
            invariant!("a district needs at least one group");
        }
        prune_stale::<GroupId, _>(registry, &groups);

        let geometry = geograph::union_all(groups.iter().map(|&id| registry.group(id).geometry()));
        let bounds = geograph::bounds(&geometry)
            .ok_or_else(|| SplitError::Geometry("district geometry is empty".into()))?;
        let population = groups.iter().map(|&id| registry.group(id).population()).sum();
        let border = Border::compute(&*registry, &groups, &geometry, &bounds);

        Ok(Self { groups, geometry, population, bounds, border })
    }

    #[inline] pub fn groups(&self) -> &[GroupId] { &self.groups }

    #[inline] pub fn geometry(&self) -> &MultiPolygon<f64> { &self.geometry }

    #[inline] pub fn population(&self) -> u64 { self.population }

    #[inline] pub fn bounds(&self) -> Rect<f64> { self.bounds }

    #[inline] pub fn border(&self) -> &Border<GroupId> { &self.border }

    /// Swap in a finer set of children covering the same territory.
    pub(crate) fn replace_groups(&mut self, registry: &Registry, groups: Vec<GroupId>) -> Result<()> {
        let population = groups.iter().map(|&id| registry.group(id).population()).sum::<u64>();
        if population != self.population {
            invariant!("replacing district groups changed population from {} to {population}", self.population);
        }
        self.border = Border::compute(registry, &groups, &self.geometry, &self.bounds);
        self.groups = groups;
        Ok(())
    }

    /// Check every group and that the groups form one connected region.
    pub fn validate(&self, registry: &Registry) -> Result<()> {
        registry.validate_groups(&self.groups)?;
        let components = connected_components::<GroupId, _>(registry, &self.groups);
        if components.len() > 1 {
            invariant!("district of {} groups falls into {} pieces", self.groups.len(), components.len());
        }
        for &id in &self.groups {
            let outside = SpatialGraph::<GroupId>::node(registry, id).neighbors().all().iter()
                .copied()
                .find(|n| !self.groups.contains(n));
            if let Some(n) = outside {
                invariant!("{id} keeps an edge to {n} outside its district");
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::testing::{block_groups, cell_groups};

    #[test]
    fn district_derives_shape_and_population() {
        let (mut registry, groups) = cell_groups(3, 2, 5);
        let district = District::new(&mut registry, groups.clone()).unwrap();
        assert_eq!(district.population(), 30);
        assert_eq!(district.groups(), groups.as_slice());
        assert!((geograph::area(district.geometry()) - 6.0).abs() < 1e-9);
        assert_eq!(district.border().len(), 6);
        district.validate(&registry).unwrap();
    }

    #[test]
    fn block_groups_tile_the_grid() {
        let (registry, groups) = block_groups(4, 2, 2, 2, 1);
        assert_eq!(groups.len(), 2);
        assert_eq!(registry.group(groups[0]).population(), 4);
        registry.validate_groups(&groups).unwrap();
    }

    #[test]
    fn new_district_cuts_edges_to_the_outside() {
        let (mut registry, groups) = cell_groups(2, 1, 5);
        let left = District::new(&mut registry, vec![groups[0]]).unwrap();
        assert!(SpatialGraph::<GroupId>::node(&registry, groups[1]).neighbors().is_empty());
        left.validate(&registry).unwrap();
    }

    #[test]
    fn empty_district_is_rejected() {
        let (mut registry, _) = cell_groups(1, 1, 5);
        assert!(matches!(District::new(&mut registry, vec![]), Err(SplitError::InvariantViolation(_))));
    }

    #[test]
    fn replacing_groups_must_conserve_population() {
        let (mut registry, groups) = cell_groups(2, 1, 5);
        let mut district = District::new(&mut registry, groups.clone()).unwrap();
        let result = district.replace_groups(&registry, vec![groups[0]]);
        assert!(matches!(result, Err(SplitError::InvariantViolation(_))));
    }
}
