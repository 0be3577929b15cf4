//! The online matcher.
//!
//! [`Matcher`] drives the HMM filter sample by sample: it validates and
//! gates incoming fixes, lets the [`MatcherFilter`] fuse emissions and
//! routed transitions, and carries the resulting state vectors in a
//! [`KState`] window from which the most probable position and
//! trajectory can be read at any time.

#[doc(hidden)]
pub mod candidate;
#[doc(hidden)]
pub mod config;
pub mod error;
#[doc(hidden)]
pub mod filter;
#[doc(hidden)]
pub mod record;
#[doc(hidden)]
pub mod sample;
#[doc(hidden)]
mod test;

#[doc(inline)]
pub use candidate::{MatcherCandidate, MatcherTransition};
#[doc(inline)]
pub use config::MatcherConfig;
#[doc(inline)]
pub use filter::MatcherFilter;
#[doc(inline)]
pub use record::{CandidateRecord, RoadPointRecord, RouteRecord, TransitionRecord};
#[doc(inline)]
pub use sample::MatcherSample;

use crate::map::{Road, RoadMap};
use crate::markov::{Filter, KState, StateCandidate};
use crate::matcher::error::MatchError;
use crate::router::Path;
use crate::spatial;

use log::{debug, warn};

/// Matches one trace of samples online.
///
/// Samples must arrive in non-decreasing time order; independent traces
/// get independent matchers over the same shared map.
pub struct Matcher<'m> {
    filter: MatcherFilter<'m>,
    state: KState<MatcherCandidate, MatcherSample>,
    config: MatcherConfig,
}

impl<'m> Matcher<'m> {
    pub fn new(map: &'m RoadMap) -> Self {
        Self::with_config(map, MatcherConfig::default())
    }

    pub fn with_config(map: &'m RoadMap, config: MatcherConfig) -> Self {
        Matcher {
            filter: MatcherFilter::new(map, config),
            state: KState::new(config.k, config.tau),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Runs one filter step.
    ///
    /// Returns `Ok(false)` when the sample was gated away or produced
    /// no candidates (the previous state stays in place), `Ok(true)`
    /// when the state advanced.
    pub fn update(&mut self, sample: MatcherSample) -> Result<bool, MatchError> {
        sample.validate()?;

        if let Some(previous) = self.state.sample() {
            if sample.time() < previous.time() {
                return Err(MatchError::OutOfOrderSample {
                    id: sample.id().to_string(),
                    time: sample.time(),
                    previous: previous.time(),
                });
            }

            let interval = sample.time() - previous.time();
            let moved = spatial::distance(&previous.point(), &sample.point());
            if interval < self.config.min_interval || moved < self.config.min_distance {
                debug!(
                    "sample {} gated ({}ms elapsed, {:.1}m moved)",
                    sample.id(),
                    interval,
                    moved
                );
                return Ok(false);
            }
        }

        let predecessors = self.state.vector();
        let previous = self.state.sample().cloned();
        let vector = self
            .filter
            .execute(&predecessors, previous.as_ref(), &sample);

        if vector.is_empty() {
            warn!("no matching candidates for sample {}", sample.id());
            return Ok(false);
        }

        Ok(self.state.update(vector, sample))
    }

    /// The current state vector.
    pub fn vector(&self) -> Vec<MatcherCandidate> {
        self.state.vector()
    }

    /// The most probable current position.
    pub fn estimate(&self) -> Option<MatcherCandidate> {
        self.state.estimate()
    }

    /// The best candidate chain retained by the state window, oldest
    /// first.
    pub fn sequence(&self) -> Vec<MatcherCandidate> {
        self.state.sequence()
    }

    /// The most probable trajectory: the predecessor chain's transition
    /// routes concatenated into a single path.
    pub fn trajectory(&self) -> Option<Path> {
        let chain = self.state.sequence();
        let first = chain.first()?;
        let last = chain.last()?;

        let mut roads: Vec<Road> = vec![first.point().road().clone()];
        for candidate in &chain[1..] {
            let transition = candidate.transition()?;
            // The route re-enters on the edge the chain already ends
            // with; skip that shared edge when splicing.
            roads.extend(transition.route().roads()[1..].iter().cloned());
        }

        Path::new(first.point().clone(), last.point().clone(), roads).ok()
    }
}
