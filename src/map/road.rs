use crate::map::base::{BaseRoad, Direction};

use geo::LineString;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Which way a directed edge runs over its base record's polyline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    Forward,
    Backward,
}

/// A directed edge of the routable graph.
///
/// Every [`BaseRoad`] yields one edge per permitted travel direction: a
/// two-way record yields a forward/backward sibling pair. Edge ids
/// follow the even/odd convention (`2 * base.id` forward,
/// `2 * base.id + 1` backward), so the pair maps back onto its record
/// without a lookup.
#[derive(Clone)]
pub struct Road {
    id: i64,
    heading: Heading,
    base: Arc<BaseRoad>,
}

impl Road {
    pub fn new(base: Arc<BaseRoad>, heading: Heading) -> Self {
        let id = match heading {
            Heading::Forward => base.id * 2,
            Heading::Backward => base.id * 2 + 1,
        };

        Road { id, heading, base }
    }

    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    #[inline]
    pub fn heading(&self) -> Heading {
        self.heading
    }

    #[inline]
    pub fn base(&self) -> &BaseRoad {
        &self.base
    }

    /// Reference id of the originating way, shared with the sibling edge.
    #[inline]
    pub fn refid(&self) -> i64 {
        self.base.refid
    }

    /// Start vertex of the directed edge.
    #[inline]
    pub fn source(&self) -> i64 {
        match self.heading {
            Heading::Forward => self.base.source,
            Heading::Backward => self.base.target,
        }
    }

    /// End vertex of the directed edge.
    #[inline]
    pub fn target(&self) -> i64 {
        match self.heading {
            Heading::Forward => self.base.target,
            Heading::Backward => self.base.source,
        }
    }

    /// Length in meters.
    #[inline]
    pub fn length(&self) -> f64 {
        self.base.length
    }

    /// Speed limit in travel direction, m/s.
    #[inline]
    pub fn maxspeed(&self) -> f64 {
        match self.heading {
            Heading::Forward => self.base.maxspeed_forward,
            Heading::Backward => self.base.maxspeed_backward,
        }
    }

    /// Multiplicative routing cost factor, `>= 1.0`.
    #[inline]
    pub fn priority(&self) -> f64 {
        self.base.priority
    }

    /// Polyline in travel direction: source vertex first.
    pub fn geometry(&self) -> &LineString<f64> {
        match self.heading {
            Heading::Forward => &self.base.geometry,
            Heading::Backward => self.base.reversed_geometry(),
        }
    }

    /// Edge id of the opposite-heading sibling, if the base road is two-way.
    #[inline]
    pub fn sibling(&self) -> Option<i64> {
        (self.base.direction == Direction::Both).then_some(self.id ^ 1)
    }
}

impl PartialEq for Road {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Road {}

impl Debug for Road {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Road")
            .field("id", &self.id)
            .field("heading", &self.heading)
            .field("source", &self.source())
            .field("target", &self.target())
            .finish()
    }
}
