//! Redistricting groups: building them from census blocks and breaking them apart.

mod prepare;
mod split;

pub use prepare::prepare_groups;
pub use split::split_group;
