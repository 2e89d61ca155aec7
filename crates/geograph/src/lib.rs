pub mod direction;
pub mod index;
pub mod ops;

pub use direction::{alignment_of, find_direction, nearest_side, touching_sides, Alignment, CardinalDirection};
pub use index::SpatialIndex;
pub use ops::{
    adjacent, area, boundary, boundary_intersects, bounds, centroid, contains, difference, distance, interior_point,
    intersects, merge_rects, perimeter, point_distance, point_in, polsby_popper,
    polygons, rect_polygon, union_all,
};
