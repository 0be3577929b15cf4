use crate::map::{RoadMap, RoadPoint};
use crate::markov::Filter;
use crate::matcher::candidate::{MatcherCandidate, MatcherTransition};
use crate::matcher::config::MatcherConfig;
use crate::matcher::sample::MatcherSample;
use crate::router::{Bounds, Dijkstra, Distance, TimePriority};
use crate::spatial;

use log::debug;
use std::cell::Cell;

/// Zero-mean Gaussian density at `x`.
#[inline]
fn gaussian(x: f64, sigma: f64) -> f64 {
    let norm = 1.0 / (sigma * (2.0 * std::f64::consts::PI).sqrt());
    norm * (-0.5 * (x / sigma).powi(2)).exp()
}

/// The map matching model on top of the generic filter.
///
/// Emission is a Gaussian of the great-circle gap between the sample
/// and a projected road point, sharpened by a wrapped-normal heading
/// factor when the sample reports an azimuth. Transitions are routed
/// with the bounded router and weighted by how far the route deviates
/// from the straight line between the samples.
pub struct MatcherFilter<'m> {
    map: &'m RoadMap,
    config: MatcherConfig,
    router: Dijkstra,
    ids: Cell<u64>,
}

impl<'m> MatcherFilter<'m> {
    pub fn new(map: &'m RoadMap, config: MatcherConfig) -> Self {
        MatcherFilter {
            map,
            config,
            router: Dijkstra,
            ids: Cell::new(0),
        }
    }

    #[inline]
    pub fn map(&self) -> &'m RoadMap {
        self.map
    }

    fn next_id(&self) -> u64 {
        let id = self.ids.get();
        self.ids.set(id + 1);
        id
    }

    /// Positional likelihood of observing the sample at a road point.
    fn emission(&self, point: &RoadPoint, sample: &MatcherSample) -> f64 {
        let sigma = if sample.gps_outage() {
            self.config.sigma * self.config.outage_factor
        } else {
            self.config.sigma
        };

        let gap = spatial::distance(&sample.point(), &point.position());
        let mut probability = gaussian(gap, sigma);

        if !sample.gps_outage() {
            if let Some(azimuth) = sample.azimuth() {
                let delta = spatial::azimuth_delta(azimuth, point.azimuth());
                probability *= gaussian(delta, self.config.sigma_azimuth);
            }
        }

        probability
    }

    /// Route plausibility: an exponential of the absolute difference
    /// between the route length and the samples' great-circle distance.
    fn plausibility(&self, route_length: f64, straight: f64) -> f64 {
        (1.0 / self.config.beta) * (-(route_length - straight).abs() / self.config.beta).exp()
    }
}

impl Filter for MatcherFilter<'_> {
    type Sample = MatcherSample;
    type Transition = MatcherTransition;
    type Candidate = MatcherCandidate;

    fn candidates(
        &self,
        predecessors: &[MatcherCandidate],
        sample: &MatcherSample,
    ) -> Vec<(MatcherCandidate, f64)> {
        let position = sample.point();

        let mut radius = self.config.radius;
        let mut points = self.map.radius(&position, radius);
        while points.is_empty() && radius < self.config.radius_max {
            radius = (radius * 2.0).min(self.config.radius_max);
            debug!(
                "no candidates around sample {}, widening search to {:.0}m",
                sample.id(),
                radius
            );
            points = self.map.radius(&position, radius);
        }

        if sample.gps_outage() {
            debug!(
                "sample {} flagged as GPS outage, sigma widened by {:.0}x",
                sample.id(),
                self.config.outage_factor
            );
        }

        // A fix drifting slightly backwards on a predecessor's edge
        // snaps onto the predecessor, so noise cannot pull the match
        // against the travel direction.
        for point in points.iter_mut() {
            let held = predecessors
                .iter()
                .find(|p| p.point().road().id() == point.road().id());

            if let Some(predecessor) = held {
                let behind = point.fraction() < predecessor.point().fraction();
                if behind
                    && spatial::distance(&point.position(), &predecessor.point().position())
                        < self.config.sigma
                {
                    *point = predecessor.point().clone();
                }
            }
        }

        points
            .into_iter()
            .map(|point| {
                let emission = self.emission(&point, sample);
                let candidate = MatcherCandidate::new(self.next_id(), point, sample.clone());
                (candidate, emission)
            })
            .collect()
    }

    fn transition(
        &self,
        predecessor: (&MatcherSample, &MatcherCandidate),
        candidate: (&MatcherSample, &MatcherCandidate),
    ) -> Option<(MatcherTransition, f64)> {
        let (previous, from) = predecessor;
        let (sample, to) = candidate;

        let elapsed = (sample.time() - previous.time()) as f64 / 1000.0;
        let straight = spatial::distance(&previous.point(), &sample.point());

        let route = self
            .router
            .route(
                self.map,
                from.point(),
                std::slice::from_ref(to.point()),
                &TimePriority,
                Some(&Distance),
                Bounds::cost(elapsed * self.config.v_max),
            )
            .into_iter()
            .next()
            .flatten()?;

        let probability = self.plausibility(route.length(), straight);
        Some((MatcherTransition::new(route), probability))
    }

    /// One bounded multi-target expansion per predecessor instead of a
    /// route per pair.
    fn transitions(
        &self,
        predecessors: (&MatcherSample, &[MatcherCandidate]),
        candidates: (&MatcherSample, &[(MatcherCandidate, f64)]),
    ) -> Vec<Vec<Option<(MatcherTransition, f64)>>> {
        let (previous, before) = predecessors;
        let (sample, current) = candidates;

        let elapsed = (sample.time() - previous.time()) as f64 / 1000.0;
        let bound = elapsed * self.config.v_max;
        let straight = spatial::distance(&previous.point(), &sample.point());

        let targets = current
            .iter()
            .map(|(candidate, _)| candidate.point().clone())
            .collect::<Vec<_>>();

        let mut matrix: Vec<Vec<Option<(MatcherTransition, f64)>>> =
            vec![vec![None; before.len()]; current.len()];

        for (column, predecessor) in before.iter().enumerate() {
            let routes = self.router.route(
                self.map,
                predecessor.point(),
                &targets,
                &TimePriority,
                Some(&Distance),
                Bounds::cost(bound),
            );

            for (row, route) in routes.into_iter().enumerate() {
                if let Some(route) = route {
                    let probability = self.plausibility(route.length(), straight);
                    matrix[row][column] = Some((MatcherTransition::new(route), probability));
                }
            }
        }

        matrix
    }
}
