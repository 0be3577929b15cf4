use crate::map::{Road, RoadPoint};
use crate::router::cost::Cost;
use crate::router::error::RouteError;
use crate::spatial;

use geo::LineString;
use std::fmt::{Debug, Formatter};

/// A route between two road points: an ordered, connected sequence of
/// edges whose first edge carries the source and last edge the target.
#[derive(Clone)]
pub struct Path {
    source: RoadPoint,
    target: RoadPoint,
    roads: Vec<Road>,
}

impl Path {
    /// Validates the path invariants and constructs the route.
    pub fn new(source: RoadPoint, target: RoadPoint, roads: Vec<Road>) -> Result<Self, RouteError> {
        let Some(first) = roads.first() else {
            return Err(RouteError::EmptyPath);
        };
        let last = roads.last().unwrap();

        if first.id() != source.road().id() {
            return Err(RouteError::MisplacedSource { edge: first.id() });
        }
        if last.id() != target.road().id() {
            return Err(RouteError::MisplacedTarget { edge: last.id() });
        }
        if roads.len() == 1 && source.fraction() > target.fraction() {
            return Err(RouteError::InvertedFractions { edge: first.id() });
        }

        for window in roads.windows(2) {
            if window[0].target() != window[1].source() {
                return Err(RouteError::DisconnectedPath {
                    from: window[0].id(),
                    to: window[1].id(),
                });
            }
        }

        Ok(Path {
            source,
            target,
            roads,
        })
    }

    #[inline]
    pub fn source(&self) -> &RoadPoint {
        &self.source
    }

    #[inline]
    pub fn target(&self) -> &RoadPoint {
        &self.target
    }

    #[inline]
    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    /// Route cost between the two road points, under any [`Cost`].
    pub fn cost(&self, cost: &impl Cost) -> f64 {
        if self.roads.len() == 1 {
            let span = self.target.fraction() - self.source.fraction();
            return cost.partial(&self.roads[0], span);
        }

        let first = cost.partial(&self.roads[0], 1.0 - self.source.fraction());
        let last = cost.partial(&self.roads[self.roads.len() - 1], self.target.fraction());
        let middle: f64 = self.roads[1..self.roads.len() - 1]
            .iter()
            .map(|road| cost.cost(road))
            .sum();

        first + middle + last
    }

    /// Route length in meters between the two road points.
    pub fn length(&self) -> f64 {
        self.cost(&crate::router::cost::Distance)
    }

    /// Whether the route turns onto an edge's opposite-heading sibling.
    pub fn is_uturn(&self) -> bool {
        self.roads
            .windows(2)
            .any(|window| window[0].sibling() == Some(window[1].id()))
    }

    /// The matched polyline, clipped to the source and target fractions.
    pub fn geometry(&self) -> LineString<f64> {
        if self.roads.len() == 1 {
            return spatial::subline(
                self.roads[0].geometry(),
                self.source.fraction(),
                self.target.fraction(),
            );
        }

        let mut coords = spatial::subline(self.roads[0].geometry(), self.source.fraction(), 1.0).0;
        for road in &self.roads[1..self.roads.len() - 1] {
            coords.extend_from_slice(&road.geometry().0);
        }
        coords.extend(spatial::subline(
            self.roads[self.roads.len() - 1].geometry(),
            0.0,
            self.target.fraction(),
        ));

        coords.dedup_by(|a, b| a == b);
        LineString::new(coords)
    }
}

impl Debug for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Path({:?} -> {:?} over {:?})",
            self.source,
            self.target,
            self.roads.iter().map(Road::id).collect::<Vec<_>>()
        )
    }
}
