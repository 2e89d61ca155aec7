#![doc = "Districtor public API"]
mod atomic;
mod config;
mod diagnostics;
mod district;
mod error;
mod fill;
mod graph;
mod group;
mod io;
mod registry;
mod seam;
mod types;

#[doc(inline)]
pub use types::{AtomId, BlockId, CensusBlock, GroupId, NodeId};

#[doc(inline)]
pub use config::{BreakingMethod, SplitConfig, WeightingMethod};

#[doc(inline)]
pub use error::{Result, SplitError};

#[doc(inline)]
pub use registry::{AtomicBlock, RedistrictingGroup, Registry};

#[doc(inline)]
pub use graph::{Border, Neighbors, SpatialGraph, SpatialNode};

#[doc(inline)]
pub use atomic::assemble_atoms;

#[doc(inline)]
pub use seam::{find_split, SplitOutcome};

#[doc(inline)]
pub use group::{prepare_groups, split_group};

#[doc(inline)]
pub use district::{split_district, District};

#[doc(inline)]
pub use diagnostics::{Diagnostics, DumpDir, NoDiagnostics, PlotLayer};

#[doc(inline)]
pub use io::geojson::{read_blocks_geojson, write_districts_geojson};

/// Split the territory covered by `groups` into `count` districts.
///
/// The configuration and count are checked before any group is touched.
pub fn split_into_districts(
    registry: &mut Registry,
    groups: Vec<GroupId>,
    count: usize,
    config: &SplitConfig,
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<District>> {
    config.validate()?;
    if count == 0 {
        return Err(SplitError::UnsupportedConfiguration("cannot split into zero districts".into()));
    }
    let root = District::new(registry, groups)?;
    split_district(registry, root, count, config, diagnostics)
}
