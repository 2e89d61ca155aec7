use geo::{BoundingRect, MultiPolygon, Rect};
use rstar::{RTree, RTreeObject, AABB};

/// A bounding box in an R-tree, associated with a shape by index.
#[derive(Debug, Clone)]
pub(crate) struct BoundingBox {
    idx: usize, // Index of corresponding shape in the indexed slice
    bbox: Rect<f64>,
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Bounding-box R-tree over a slice of shapes, used to narrow candidate pairs
/// before running exact predicates.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    rtree: RTree<BoundingBox>,
}

impl SpatialIndex {
    /// Index the given shapes; empty shapes are skipped.
    pub fn new<'a>(shapes: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> Self {
        Self {
            rtree: RTree::bulk_load(shapes.into_iter().enumerate()
                .filter_map(|(idx, shape)| Some(BoundingBox { idx, bbox: shape.bounding_rect()? }))
                .collect()),
        }
    }

    #[inline] pub fn len(&self) -> usize { self.rtree.size() }

    #[inline] pub fn is_empty(&self) -> bool { self.rtree.size() == 0 }

    /// Indices of shapes whose bounding boxes meet `rect` grown by `pad`,
    /// in ascending order.
    pub fn query(&self, rect: &Rect<f64>, pad: f64) -> Vec<usize> {
        let search = AABB::from_corners(
            [rect.min().x - pad, rect.min().y - pad],
            [rect.max().x + pad, rect.max().y + pad],
        );
        let mut hits = self.rtree.locate_in_envelope_intersecting(&search)
            .map(|bb| bb.idx)
            .collect::<Vec<_>>();
        hits.sort_unstable();
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Rect::new((x, y), (x + 1.0, y + 1.0)).to_polygon()])
    }

    #[test]
    fn touching_boxes_are_reported() {
        let shapes = vec![cell(0., 0.), cell(1., 0.), cell(5., 5.)];
        let index = SpatialIndex::new(&shapes);
        assert_eq!(index.len(), 3);
        assert_eq!(index.query(&Rect::new((0., 0.), (1., 1.)), 0.0), vec![0, 1]);
    }

    #[test]
    fn padding_widens_the_search() {
        let shapes = vec![cell(0., 0.), cell(1.5, 0.)];
        let index = SpatialIndex::new(&shapes);
        assert_eq!(index.query(&Rect::new((0., 0.), (1., 1.)), 0.0), vec![0]);
        assert_eq!(index.query(&Rect::new((0., 0.), (1., 1.)), 0.6), vec![0, 1]);
    }

    #[test]
    fn empty_shapes_are_skipped() {
        let shapes = vec![MultiPolygon::new(vec![]), cell(0., 0.)];
        let index = SpatialIndex::new(&shapes);
        assert_eq!(index.len(), 1);
        assert_eq!(index.query(&Rect::new((0., 0.), (1., 1.)), 0.0), vec![1]);
    }
}
