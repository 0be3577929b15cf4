use crate::map::RoadPoint;
use crate::markov::{self, CandidateId};
use crate::matcher::sample::MatcherSample;
use crate::router::Path;

/// The move between two consecutive matched positions, carrying the
/// route the filter inferred for it.
#[derive(Clone, Debug)]
pub struct MatcherTransition {
    route: Path,
}

impl MatcherTransition {
    pub fn new(route: Path) -> Self {
        MatcherTransition { route }
    }

    #[inline]
    pub fn route(&self) -> &Path {
        &self.route
    }
}

impl markov::StateTransition for MatcherTransition {
    fn hops(&self) -> usize {
        self.route.roads().len()
    }
}

/// A hypothesized on-road position for one sample.
///
/// `filtprob` and `seqprob` are written by the filter's forward pass;
/// the predecessor is a back-reference by id, resolved through the
/// state window.
#[derive(Clone, Debug)]
pub struct MatcherCandidate {
    id: CandidateId,
    point: RoadPoint,
    sample: Option<MatcherSample>,

    filtprob: f64,
    seqprob: f64,
    predecessor: Option<CandidateId>,
    transition: Option<MatcherTransition>,
    time: i64,
}

impl MatcherCandidate {
    pub fn new(id: CandidateId, point: RoadPoint, sample: MatcherSample) -> Self {
        MatcherCandidate {
            id,
            point,
            sample: Some(sample),
            filtprob: 0.0,
            seqprob: f64::NEG_INFINITY,
            predecessor: None,
            transition: None,
            time: 0,
        }
    }

    /// Rebuilds a candidate from persisted state.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restored(
        id: CandidateId,
        point: RoadPoint,
        sample: Option<MatcherSample>,
        filtprob: f64,
        seqprob: f64,
        predecessor: Option<CandidateId>,
        transition: Option<MatcherTransition>,
        time: i64,
    ) -> Self {
        MatcherCandidate {
            id,
            point,
            sample,
            filtprob,
            seqprob,
            predecessor,
            transition,
            time,
        }
    }

    #[inline]
    pub fn point(&self) -> &RoadPoint {
        &self.point
    }

    #[inline]
    pub fn sample(&self) -> Option<&MatcherSample> {
        self.sample.as_ref()
    }
}

impl markov::StateCandidate for MatcherCandidate {
    type Transition = MatcherTransition;
    type Sample = MatcherSample;

    fn id(&self) -> CandidateId {
        self.id
    }

    fn filtprob(&self) -> f64 {
        self.filtprob
    }

    fn set_filtprob(&mut self, prob: f64) {
        self.filtprob = prob;
    }

    fn seqprob(&self) -> f64 {
        self.seqprob
    }

    fn set_seqprob(&mut self, prob: f64) {
        self.seqprob = prob;
    }

    fn predecessor(&self) -> Option<CandidateId> {
        self.predecessor
    }

    fn set_predecessor(&mut self, id: Option<CandidateId>) {
        self.predecessor = id;
    }

    fn transition(&self) -> Option<&MatcherTransition> {
        self.transition.as_ref()
    }

    fn set_transition(&mut self, transition: Option<MatcherTransition>) {
        self.transition = transition;
    }

    fn time(&self) -> i64 {
        self.time
    }

    fn set_time(&mut self, time: i64) {
        self.time = time;
    }

    /// Candidates on the same sample tie-break by their edge id.
    fn ordinal(&self) -> i64 {
        self.point.road().id()
    }
}
