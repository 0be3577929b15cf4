//! Persisted-state records for interchange with external tools.
//!
//! Records reference edges by id only; resolving them back needs the
//! road map they were matched against.

use crate::map::{RoadMap, RoadPoint};
use crate::markov::StateCandidate;
use crate::matcher::candidate::{MatcherCandidate, MatcherTransition};
use crate::matcher::error::MatchError;
use crate::matcher::sample::MatcherSample;
use crate::router::Path;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadPointRecord {
    /// Directed edge id.
    pub road: i64,
    pub fraction: f64,
}

impl RoadPointRecord {
    pub fn new(point: &RoadPoint) -> Self {
        RoadPointRecord {
            road: point.road().id(),
            fraction: point.fraction(),
        }
    }

    pub fn resolve(&self, map: &RoadMap) -> Result<RoadPoint, MatchError> {
        let road = map
            .edge(self.road)
            .ok_or(MatchError::UnknownEdge(self.road))?;
        Ok(RoadPoint::new(road.clone(), self.fraction))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub source: RoadPointRecord,
    pub target: RoadPointRecord,
    /// Ordered directed edge ids.
    pub roads: Vec<i64>,
}

impl RouteRecord {
    pub fn new(path: &Path) -> Self {
        RouteRecord {
            source: RoadPointRecord::new(path.source()),
            target: RoadPointRecord::new(path.target()),
            roads: path.roads().iter().map(|road| road.id()).collect(),
        }
    }

    pub fn resolve(&self, map: &RoadMap) -> Result<Path, MatchError> {
        let source = self.source.resolve(map)?;
        let target = self.target.resolve(map)?;

        let roads = self
            .roads
            .iter()
            .map(|id| {
                map.edge(*id)
                    .cloned()
                    .ok_or(MatchError::UnknownEdge(*id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Path::new(source, target, roads)
            .map_err(|error| MatchError::InvalidRecord(format!("{error:?}")))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub route: RouteRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: u64,
    pub filtprob: f64,
    /// log10, finite for any candidate a state vector retains.
    pub seqprob: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionRecord>,
    pub roadpoint: RoadPointRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<MatcherSample>,
}

impl MatcherCandidate {
    pub fn record(&self) -> CandidateRecord {
        CandidateRecord {
            id: self.id(),
            filtprob: self.filtprob(),
            seqprob: self.seqprob(),
            predecessor: self.predecessor(),
            transition: self.transition().map(|transition| TransitionRecord {
                route: RouteRecord::new(transition.route()),
            }),
            roadpoint: RoadPointRecord::new(self.point()),
            sample: self.sample().cloned(),
        }
    }

    pub fn from_record(record: &CandidateRecord, map: &RoadMap) -> Result<Self, MatchError> {
        let point = record.roadpoint.resolve(map)?;
        let transition = record
            .transition
            .as_ref()
            .map(|transition| transition.route.resolve(map))
            .transpose()?
            .map(MatcherTransition::new);

        let time = record
            .sample
            .as_ref()
            .map(|sample| sample.time())
            .unwrap_or_default();

        Ok(MatcherCandidate::restored(
            record.id,
            point,
            record.sample.clone(),
            record.filtprob,
            record.seqprob,
            record.predecessor,
            transition,
            time,
        ))
    }
}
