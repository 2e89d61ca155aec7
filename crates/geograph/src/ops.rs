//! Predicates, set operations and measures over `MultiPolygon<f64>`.
//!
//! Every shape handled by the partitioning code goes through these functions, so
//! callers never need to reach into `geo` directly.

use std::f64::consts::PI;

use geo::{
    Area, BooleanOps, BoundingRect, Centroid, Contains, Coord, Distance, Euclidean, InteriorPoint,
    Intersects, LineString, MultiLineString, MultiPolygon, Point, Polygon, Rect, Relate,
};

/// True if the two shapes share at least one point (touching included).
#[inline]
pub fn intersects(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    a.intersects(b)
}

/// True if the shapes share a boundary segment of positive length or overlap
/// in area. Shapes meeting only at isolated points are not adjacent.
pub fn adjacent(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    let im = a.relate(b);
    // DE-9IM: interior/interior non-empty, or boundary/boundary is a line.
    im.matches("T********").unwrap_or(false) || im.matches("****1****").unwrap_or(false)
}

/// True if `container` fully contains `target`.
///
/// Holes of the container are ignored: a shape sitting inside the hole of a
/// container polygon counts as contained by it.
pub fn contains(container: &MultiPolygon<f64>, target: &MultiPolygon<f64>) -> bool {
    if target.0.is_empty() { return false }

    container.0.iter().any(|polygon| {
        if polygon.interiors().is_empty() {
            polygon.relate(target).is_contains()
        } else {
            let filled = Polygon::new(polygon.exterior().clone(), vec![]);
            filled.relate(target).is_contains()
        }
    })
}

/// All rings (exterior and interior) of a shape as line strings.
pub fn boundary(shape: &MultiPolygon<f64>) -> MultiLineString<f64> {
    MultiLineString::new(shape.0.iter()
        .flat_map(|polygon| std::iter::once(polygon.exterior().clone())
            .chain(polygon.interiors().iter().cloned()))
        .collect())
}

/// True if the boundaries of the two shapes meet.
#[inline]
pub fn boundary_intersects(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    boundary(a).intersects(&boundary(b))
}

/// Union of all shapes, reduced pairwise to keep intermediate shapes small.
pub fn union_all<'a>(shapes: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> MultiPolygon<f64> {
    let mut layer = shapes.into_iter().cloned().collect::<Vec<_>>();
    while layer.len() > 1 {
        layer = layer.chunks(2)
            .filter_map(|pair| pair.iter().cloned().reduce(|a, b| a.union(&b)))
            .collect();
    }
    layer.pop().unwrap_or_else(|| MultiPolygon::new(vec![]))
}

#[inline]
pub fn difference(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    a.difference(b)
}

/// Minimum Euclidean distance between two shapes; zero when they intersect.
/// Returns `f64::INFINITY` if either shape is empty.
pub fn distance(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
    a.0.iter()
        .flat_map(|pa| b.0.iter().map(move |pb| Euclidean.distance(pa, pb)))
        .fold(f64::INFINITY, f64::min)
}

/// Minimum Euclidean distance from a point to a shape.
pub fn point_distance(point: &Point<f64>, shape: &MultiPolygon<f64>) -> f64 {
    shape.0.iter()
        .map(|polygon| Euclidean.distance(point, polygon))
        .fold(f64::INFINITY, f64::min)
}

#[inline]
pub fn centroid(shape: &MultiPolygon<f64>) -> Option<Point<f64>> {
    shape.centroid()
}

#[inline]
pub fn bounds(shape: &MultiPolygon<f64>) -> Option<Rect<f64>> {
    shape.bounding_rect()
}

#[inline]
pub fn area(shape: &MultiPolygon<f64>) -> f64 {
    shape.unsigned_area()
}

/// A point guaranteed to lie inside the shape, or `None` when it is empty.
#[inline]
pub fn interior_point(shape: &MultiPolygon<f64>) -> Option<Point<f64>> {
    shape.interior_point()
}

/// True if the point lies strictly inside the shape.
#[inline]
pub fn point_in(shape: &MultiPolygon<f64>, point: &Point<f64>) -> bool {
    shape.contains(point)
}

fn ring_length(ring: &LineString<f64>) -> f64 {
    ring.lines().map(|line| line.dx().hypot(line.dy())).sum()
}

/// Total boundary length, holes included.
pub fn perimeter(shape: &MultiPolygon<f64>) -> f64 {
    shape.0.iter()
        .map(|polygon| ring_length(polygon.exterior())
            + polygon.interiors().iter().map(ring_length).sum::<f64>())
        .sum()
}

/// Polsby-Popper compactness `4πA / P²`, in `[0, 1]` (1 for a disc).
pub fn polsby_popper(shape: &MultiPolygon<f64>) -> f64 {
    let p = perimeter(shape);
    if p <= 0.0 { return 0.0 }
    4.0 * PI * area(shape) / (p * p)
}

/// Split a shape into its polygons, each wrapped as a single-part `MultiPolygon`.
pub fn polygons(shape: &MultiPolygon<f64>) -> Vec<MultiPolygon<f64>> {
    shape.0.iter().map(|polygon| MultiPolygon::new(vec![polygon.clone()])).collect()
}

#[inline]
pub fn rect_polygon(rect: &Rect<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![rect.to_polygon()])
}

/// Smallest rectangle covering both inputs.
pub fn merge_rects(a: &Rect<f64>, b: &Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}
