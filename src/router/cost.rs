use crate::map::Road;

/// An additive, non-negative edge cost.
///
/// `cost(road, fraction)` prices the initial `fraction` of the edge and
/// must scale linearly, so partial edges at route ends stay consistent
/// with full traversals.
pub trait Cost {
    /// Cost of traversing the whole edge.
    fn cost(&self, road: &Road) -> f64;

    /// Cost of traversing the initial `fraction` of the edge.
    #[inline]
    fn partial(&self, road: &Road, fraction: f64) -> f64 {
        self.cost(road) * fraction
    }
}

/// Edge length, meters.
pub struct Distance;

impl Cost for Distance {
    #[inline]
    fn cost(&self, road: &Road) -> f64 {
        road.length()
    }
}

/// Edge length scaled by the road's priority factor.
pub struct DistancePriority;

impl Cost for DistancePriority {
    #[inline]
    fn cost(&self, road: &Road) -> f64 {
        road.length() * road.priority()
    }
}

/// Traversal time at the edge's speed limit, seconds.
pub struct Time;

impl Cost for Time {
    #[inline]
    fn cost(&self, road: &Road) -> f64 {
        road.length() / road.maxspeed()
    }
}

/// Traversal time scaled by the road's priority factor.
pub struct TimePriority;

impl Cost for TimePriority {
    #[inline]
    fn cost(&self, road: &Road) -> f64 {
        road.length() / road.maxspeed() * road.priority()
    }
}
