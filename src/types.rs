use std::fmt;
use std::hash::Hash;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// Census block identifier: state-local county, tract and block FIPS codes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId {
    pub county: String,
    pub tract: String,
    pub block: String,
}

impl BlockId {
    pub fn new(county: impl Into<String>, tract: impl Into<String>, block: impl Into<String>) -> Self {
        Self { county: county.into(), tract: tract.into(), block: block.into() }
    }

    /// Census convention: block codes starting with `0` are water.
    #[inline]
    pub fn is_water_code(&self) -> bool { self.block.starts_with('0') }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.county, self.tract, self.block)
    }
}

/// Smallest input unit. Never mutated after creation.
#[derive(Clone, Debug)]
pub struct CensusBlock {
    pub id: BlockId,
    pub population: u64,
    pub is_water: bool,
    pub geometry: MultiPolygon<f64>,
}

impl CensusBlock {
    /// Build a block, deriving water status from its block code.
    pub fn new(id: BlockId, population: u64, geometry: MultiPolygon<f64>) -> Self {
        Self { is_water: id.is_water_code(), id, population, geometry }
    }
}

/// Index of an `AtomicBlock` in a `Registry`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AtomId(pub u32);

/// Index of a `RedistrictingGroup` in a `Registry`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u32);

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtomId({})", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({})", self.0)
    }
}

/// Typed arena index shared by every kind of graph node.
pub trait NodeId: Copy + Eq + Hash + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static {
    fn index(self) -> usize;
}

impl NodeId for AtomId {
    #[inline] fn index(self) -> usize { self.0 as usize }
}

impl NodeId for GroupId {
    #[inline] fn index(self) -> usize { self.0 as usize }
}
