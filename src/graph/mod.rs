mod adjacency;
mod border;
mod contiguity;
pub(crate) mod node;

pub(crate) use adjacency::{assign_neighbors, attach_orphans, bridge_components, link_adjacent, prune_stale};
pub use border::Border;
pub(crate) use border::most_in_direction;
pub(crate) use contiguity::{connected_components, is_contiguous};
pub use node::{Neighbors, SpatialGraph, SpatialNode};
