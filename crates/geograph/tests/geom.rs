// Integration tests for shape measures and predicates on small grids:
//   union, difference, compactness, boundaries, directions.

use geo::{MultiPolygon, Rect};
use geograph::{
    area, boundary_intersects, bounds, centroid, find_direction, perimeter, polsby_popper, polygons,
    touching_sides, union_all, CardinalDirection, SpatialIndex,
};

fn cell(x: f64, y: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![Rect::new((x, y), (x + 1.0, y + 1.0)).to_polygon()])
}

fn grid(w: usize, h: usize) -> Vec<MultiPolygon<f64>> {
    (0..h).flat_map(|y| (0..w).map(move |x| cell(x as f64, y as f64))).collect()
}

#[test]
fn area_of_union_equals_sum_of_cells() {
    let cells = grid(3, 2);
    let union = union_all(&cells);
    let total = cells.iter().map(area).sum::<f64>();
    assert!((area(&union) - total).abs() < 1e-9);
}

#[test]
fn perimeter_of_union_excludes_shared_edges() {
    let union = union_all(&grid(2, 2));
    assert!((perimeter(&union) - 8.0).abs() < 1e-9);
}

#[test]
fn compactness_drops_for_elongated_unions() {
    let square = union_all(&grid(2, 2));
    let strip = union_all(&grid(4, 1));
    assert!(polsby_popper(&square) > polsby_popper(&strip));
}

#[test]
fn separate_islands_stay_separate() {
    let islands = union_all(&[cell(0., 0.), cell(3., 0.)]);
    assert_eq!(polygons(&islands).len(), 2);
}

#[test]
fn interior_cell_does_not_touch_outer_boundary() {
    let cells = grid(3, 3);
    let union = union_all(&cells);
    let on_border = cells.iter().filter(|c| boundary_intersects(&union, c)).count();
    assert_eq!(on_border, 8);
}

#[test]
fn grid_cell_directions_from_center() {
    let cells = grid(3, 3);
    let center = centroid(&cells[4]).unwrap();
    assert_eq!(find_direction(center, centroid(&cells[7]).unwrap()), CardinalDirection::North);
    assert_eq!(find_direction(center, centroid(&cells[5]).unwrap()), CardinalDirection::East);
    assert_eq!(find_direction(center, centroid(&cells[1]).unwrap()), CardinalDirection::South);
    assert_eq!(find_direction(center, centroid(&cells[3]).unwrap()), CardinalDirection::West);
}

#[test]
fn strip_cells_touch_both_long_sides() {
    let cells = grid(6, 1);
    let outer = bounds(&union_all(&cells)).unwrap();
    let sides = touching_sides(&outer, &bounds(&cells[2]).unwrap(), 1e-9);
    assert_eq!(sides, vec![CardinalDirection::North, CardinalDirection::South]);
}

#[test]
fn index_finds_all_queen_neighbors_of_center() {
    let cells = grid(3, 3);
    let index = SpatialIndex::new(&cells);
    assert_eq!(index.query(&bounds(&cells[4]).unwrap(), 0.0).len(), 9);
}
