use crate::map::road::Road;
use crate::spatial;

use geo::Point;
use std::fmt::{Debug, Formatter};

/// A position along a directed edge, measured as cumulative geodesic
/// length fraction from the edge's source vertex.
#[derive(Clone)]
pub struct RoadPoint {
    road: Road,
    fraction: f64,
}

impl RoadPoint {
    pub fn new(road: Road, fraction: f64) -> Self {
        RoadPoint {
            road,
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn road(&self) -> &Road {
        &self.road
    }

    #[inline]
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// The geographic position of the point.
    pub fn position(&self) -> Point<f64> {
        spatial::interpolate(self.road.geometry(), self.fraction)
    }

    /// Tangent heading of the edge at the point, degrees `[0, 360)`.
    pub fn azimuth(&self) -> f64 {
        spatial::azimuth_at(self.road.geometry(), self.fraction)
    }
}

impl PartialEq for RoadPoint {
    fn eq(&self, other: &Self) -> bool {
        self.road.id() == other.road.id() && self.fraction == other.fraction
    }
}

impl Debug for RoadPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RoadPoint({} @ {:.6})", self.road.id(), self.fraction)
    }
}
