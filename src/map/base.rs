use crate::map::error::MapError;

use geo::LineString;
use std::sync::OnceLock;

/// Travel directions a road record permits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Traversable from source to target only.
    Forward = 1,
    /// Traversable from target to source only.
    Backward = 2,
    /// Traversable both ways.
    Both = 3,
}

/// An immutable road segment as delivered by a road provider.
///
/// The polyline runs from [`source`](#structfield.source) to
/// [`target`](#structfield.target); a [`Direction::Backward`] or
/// [`Direction::Both`] record is traversable against it. The reversed
/// polyline is derived lazily and cached on first access, so backward
/// edges never pay for geometry they do not touch.
#[derive(Debug)]
pub struct BaseRoad {
    pub id: i64,
    /// Reference id of the originating way, shared by both directed edges.
    pub refid: i64,
    pub source: i64,
    pub target: i64,
    pub direction: Direction,
    pub kind: u16,
    /// Multiplicative routing cost factor, `>= 1.0`.
    pub priority: f64,
    /// Speed limit along the polyline, m/s.
    pub maxspeed_forward: f64,
    /// Speed limit against the polyline, m/s.
    pub maxspeed_backward: f64,
    /// Geodesic length in meters.
    pub length: f64,
    /// Polyline from source to target, WGS-84.
    pub geometry: LineString<f64>,
    pub tunnel: bool,
    pub tunnel_entry: bool,
    pub country: Option<String>,

    reversed: OnceLock<LineString<f64>>,
}

impl BaseRoad {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        refid: i64,
        source: i64,
        target: i64,
        direction: Direction,
        kind: u16,
        priority: f64,
        maxspeed_forward: f64,
        maxspeed_backward: f64,
        length: f64,
        geometry: LineString<f64>,
    ) -> Self {
        BaseRoad {
            id,
            refid,
            source,
            target,
            direction,
            kind,
            priority,
            maxspeed_forward,
            maxspeed_backward,
            length,
            geometry,
            tunnel: false,
            tunnel_entry: false,
            country: None,
            reversed: OnceLock::new(),
        }
    }

    /// Checks the record invariants the graph relies upon.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.geometry.0.len() < 2 {
            return Err(MapError::DegenerateGeometry(self.id));
        }
        if !(self.length > 0.0) {
            return Err(MapError::InvalidLength(self.id));
        }
        if !(self.maxspeed_forward > 0.0) || !(self.maxspeed_backward > 0.0) {
            return Err(MapError::InvalidSpeed(self.id));
        }
        if !(self.priority >= 1.0) {
            return Err(MapError::InvalidPriority(self.id));
        }
        Ok(())
    }

    /// The polyline from target to source, computed once.
    pub fn reversed_geometry(&self) -> &LineString<f64> {
        self.reversed.get_or_init(|| {
            let mut coords = self.geometry.0.clone();
            coords.reverse();
            LineString::new(coords)
        })
    }
}
