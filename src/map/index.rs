use geo::{Destination, Geodesic, LineString, Point};
use rstar::{RTree, RTreeObject, AABB};

/// An edge envelope held by the R-tree, keyed by the directed edge id
/// that carries the base record's forward polyline.
pub(crate) struct IndexedEdge {
    pub(crate) edge: i64,
    envelope: AABB<Point<f64>>,
}

impl IndexedEdge {
    pub(crate) fn new(edge: i64, geometry: &LineString<f64>) -> Self {
        let mut min = (f64::INFINITY, f64::INFINITY);
        let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);

        for coord in &geometry.0 {
            min = (min.0.min(coord.x), min.1.min(coord.y));
            max = (max.0.max(coord.x), max.1.max(coord.y));
        }

        IndexedEdge {
            edge,
            envelope: AABB::from_corners(Point::new(min.0, min.1), Point::new(max.0, max.1)),
        }
    }
}

impl RTreeObject for IndexedEdge {
    type Envelope = AABB<Point<f64>>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope.clone()
    }
}

/// Bounding-envelope index over edge polylines.
///
/// The coarse pass returns every edge whose envelope intersects the
/// query box; callers project the query point exactly afterwards.
pub struct SpatialIndex {
    tree: RTree<IndexedEdge>,
}

impl SpatialIndex {
    pub(crate) fn build(entries: Vec<IndexedEdge>) -> Self {
        SpatialIndex {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Edge ids whose envelope comes within `radius` meters of `point`.
    ///
    /// Box corners sit at `radius * sqrt(2)` along the diagonals so the
    /// box inscribes the full search circle.
    pub(crate) fn within(&self, point: &Point<f64>, radius: f64) -> impl Iterator<Item = i64> + '_ {
        let diagonal = radius * std::f64::consts::SQRT_2;
        let bottom_right = Geodesic.destination(*point, 135.0, diagonal);
        let top_left = Geodesic.destination(*point, 315.0, diagonal);

        let bbox = AABB::from_corners(top_left, bottom_right);
        self.tree
            .locate_in_envelope_intersecting(&bbox)
            .map(|entry| entry.edge)
    }

    pub fn size(&self) -> usize {
        self.tree.size()
    }
}
