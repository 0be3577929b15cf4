use crate::markov;
use crate::matcher::error::MatchError;
use crate::spatial;

use geo::Point;
use serde::{Deserialize, Serialize};

/// A raw position measurement.
///
/// Only `id`, `time` and `point` are required; every optional field may
/// be absent. Samples are immutable once constructed and consumed once
/// per filter step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatcherSample {
    id: String,
    /// Epoch milliseconds.
    time: i64,
    #[serde(with = "wkt_point")]
    point: Point<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    azimuth: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    gps_outage: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
}

impl MatcherSample {
    pub fn new(id: impl Into<String>, time: i64, point: Point<f64>) -> Self {
        MatcherSample {
            id: id.into(),
            time,
            point,
            azimuth: None,
            gps_outage: false,
            velocity: None,
            accuracy: None,
            trace_id: None,
        }
    }

    /// Heading over ground in degrees; normalized into `[0, 360)`.
    pub fn with_azimuth(mut self, azimuth: f64) -> Self {
        self.azimuth = Some(spatial::normalize_azimuth(azimuth));
        self
    }

    pub fn with_gps_outage(mut self, outage: bool) -> Self {
        self.gps_outage = outage;
        self
    }

    /// Speed over ground, m/s.
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Reported horizontal accuracy, meters.
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn with_trace(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn time(&self) -> i64 {
        self.time
    }

    #[inline]
    pub fn point(&self) -> Point<f64> {
        self.point
    }

    /// Heading over ground, normalized into `[0, 360)`.
    #[inline]
    pub fn azimuth(&self) -> Option<f64> {
        self.azimuth.map(spatial::normalize_azimuth)
    }

    #[inline]
    pub fn gps_outage(&self) -> bool {
        self.gps_outage
    }

    #[inline]
    pub fn velocity(&self) -> Option<f64> {
        self.velocity
    }

    #[inline]
    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    #[inline]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Rejects samples without a usable position.
    pub fn validate(&self) -> Result<(), MatchError> {
        let (lon, lat) = (self.point.x(), self.point.y());
        if !lon.is_finite() || !lat.is_finite() || lon.abs() > 180.0 || lat.abs() > 90.0 {
            return Err(MatchError::DegenerateSample(self.id.clone()));
        }
        Ok(())
    }
}

impl markov::Sample for MatcherSample {
    fn time(&self) -> i64 {
        self.time
    }
}

/// WKT encoding of the sample position, e.g. `POINT(11.564 48.149)`.
mod wkt_point {
    use geo::Point;
    use serde::{Deserialize, Deserializer, Serializer};
    use wkt::{ToWkt, TryFromWkt};

    pub fn serialize<S>(point: &Point<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&point.wkt_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Point<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Point::try_from_wkt_str(&raw).map_err(serde::de::Error::custom)
    }
}
