use crate::map::{Road, RoadMap, RoadPoint};
use crate::router::cost::Cost;
use crate::router::path::Path;

use log::trace;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Hard limits on the search frontier.
///
/// `max_bound` caps the separate bound cost; `max_time` (seconds) caps
/// the optimistic traversal time, computed at the faster of the edge's
/// speed limit and `max_velocity`. Entries beyond either limit are
/// pruned; affected targets resolve to `None`.
#[derive(Clone, Copy, Debug)]
pub struct Bounds {
    pub max_bound: f64,
    pub max_time: Option<f64>,
    pub max_velocity: Option<f64>,
}

impl Bounds {
    pub fn unbounded() -> Self {
        Bounds {
            max_bound: f64::INFINITY,
            max_time: None,
            max_velocity: None,
        }
    }

    pub fn cost(max_bound: f64) -> Self {
        Bounds {
            max_bound,
            ..Self::unbounded()
        }
    }

    pub fn with_time(mut self, max_time: f64, max_velocity: Option<f64>) -> Self {
        self.max_time = Some(max_time);
        self.max_velocity = max_velocity;
        self
    }

    /// Optimistic seconds over the initial `fraction` of the edge.
    fn seconds(&self, road: &Road, fraction: f64) -> f64 {
        if self.max_time.is_none() {
            return 0.0;
        }

        let speed = road.maxspeed().max(self.max_velocity.unwrap_or(0.0));
        road.length() * fraction / speed
    }

    fn exceeded_by(&self, seconds: f64) -> bool {
        matches!(self.max_time, Some(limit) if seconds > limit)
    }
}

/// A labelled edge on the search frontier. `cost` and `bound` run from
/// the source point to the *end* of the edge.
struct Mark {
    road: Road,
    predecessor: Option<usize>,
    cost: f64,
    bound: f64,
    time: f64,
}

struct QueueEntry {
    cost: f64,
    edge: i64,
    mark: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    /// Inverted for the max-heap: the cheapest entry pops first, equal
    /// costs pop in ascending edge id order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.edge.cmp(&self.edge))
            .then_with(|| other.mark.cmp(&self.mark))
    }
}

/// Goal-directed single-source, multi-target search over the road graph.
pub struct Dijkstra;

impl Dijkstra {
    /// Least-cost routes from `source` to every target.
    ///
    /// Targets grouped on an edge settle the moment the edge is reached
    /// within bounds, so a long final edge never hides an admissible
    /// mid-edge target. A target on the source edge ahead of the source
    /// settles immediately with a single-edge path; one behind it is
    /// only reachable by looping back through the edge's source vertex.
    ///
    /// Returns one entry per target, `None` where no route satisfies
    /// the bounds.
    pub fn route(
        &self,
        map: &RoadMap,
        source: &RoadPoint,
        targets: &[RoadPoint],
        cost: &dyn Cost,
        bound: Option<&dyn Cost>,
        bounds: Bounds,
    ) -> Vec<Option<Path>> {
        let mut results: Vec<Option<Path>> = vec![None; targets.len()];
        let mut remaining = targets.len();

        let mut pending: FxHashMap<i64, SmallVec<[usize; 2]>> = FxHashMap::default();
        for (index, target) in targets.iter().enumerate() {
            pending.entry(target.road().id()).or_default().push(index);
        }

        let origin = source.road();

        // Targets ahead on the source edge settle without a search.
        if let Some(indices) = pending.get(&origin.id()) {
            for &index in indices {
                let target = &targets[index];
                if target.fraction() < source.fraction() {
                    continue;
                }

                let span = target.fraction() - source.fraction();
                let partial = bound.map(|b| b.partial(origin, span)).unwrap_or(0.0);
                if partial > bounds.max_bound || bounds.exceeded_by(bounds.seconds(origin, span)) {
                    continue;
                }

                let path = Path::new(source.clone(), target.clone(), vec![origin.clone()])
                    .expect("a forward single-edge path is always valid");
                results[index] = Some(path);
                remaining -= 1;
            }
        }

        let mut marks = Vec::with_capacity(64);
        let mut settled: FxHashMap<i64, usize> = FxHashMap::default();
        let mut queue = BinaryHeap::with_capacity(64);

        let head = 1.0 - source.fraction();
        marks.push(Mark {
            road: origin.clone(),
            predecessor: None,
            cost: cost.partial(origin, head),
            bound: bound.map(|b| b.partial(origin, head)).unwrap_or(0.0),
            time: bounds.seconds(origin, head),
        });
        queue.push(QueueEntry {
            cost: marks[0].cost,
            edge: origin.id(),
            mark: 0,
        });

        while remaining > 0 {
            let Some(QueueEntry { edge, mark, .. }) = queue.pop() else {
                break;
            };

            // Lazy deletion. The initial mark never settles its edge, so
            // the source edge stays re-enterable through its source vertex.
            if mark != 0 {
                if settled.contains_key(&edge) {
                    continue;
                }
                settled.insert(edge, mark);
            }

            let current = marks[mark].road.clone();
            for successor in map.successors(&current).cloned().collect::<Vec<_>>() {
                // Settle any pending target upon first admissible reach;
                // pops are cost-ordered, so the first reach is cheapest.
                if let Some(indices) = pending.get(&successor.id()) {
                    for &index in indices {
                        if results[index].is_some() {
                            continue;
                        }

                        let target = &targets[index];
                        let reach_bound = marks[mark].bound
                            + bound
                                .map(|b| b.partial(&successor, target.fraction()))
                                .unwrap_or(0.0);
                        let reach_time =
                            marks[mark].time + bounds.seconds(&successor, target.fraction());

                        if reach_bound > bounds.max_bound || bounds.exceeded_by(reach_time) {
                            trace!(
                                "target on edge {} beyond bounds ({:.1})",
                                successor.id(),
                                reach_bound
                            );
                            continue;
                        }

                        let mut roads = backtrack(&marks, mark);
                        roads.push(successor.clone());
                        let path = Path::new(source.clone(), target.clone(), roads)
                            .expect("relaxed edges form a connected path");
                        results[index] = Some(path);
                        remaining -= 1;
                    }
                }

                if settled.contains_key(&successor.id()) {
                    continue;
                }

                let next_bound = marks[mark].bound
                    + bound.map(|b| b.cost(&successor)).unwrap_or(0.0);
                let next_time = marks[mark].time + bounds.seconds(&successor, 1.0);
                if next_bound > bounds.max_bound || bounds.exceeded_by(next_time) {
                    trace!("edge {} pruned at bound {:.1}", successor.id(), next_bound);
                    continue;
                }

                let next_cost = marks[mark].cost + cost.cost(&successor);
                marks.push(Mark {
                    road: successor.clone(),
                    predecessor: Some(mark),
                    cost: next_cost,
                    bound: next_bound,
                    time: next_time,
                });
                queue.push(QueueEntry {
                    cost: next_cost,
                    edge: successor.id(),
                    mark: marks.len() - 1,
                });
            }
        }

        results
    }
}

/// The edge chain from the source mark up to and including `mark`.
fn backtrack(marks: &[Mark], mark: usize) -> Vec<Road> {
    let mut roads = Vec::new();
    let mut at = mark;

    loop {
        roads.push(marks[at].road.clone());
        match marks[at].predecessor {
            Some(predecessor) => at = predecessor,
            None => break,
        }
    }

    roads.reverse();
    roads
}
