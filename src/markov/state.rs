use crate::markov::filter::{CandidateId, Sample, StateCandidate};

use log::trace;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

struct Frame<S> {
    sample: S,
    vector: Vec<CandidateId>,
}

/// The sliding window of past state vectors.
///
/// Candidates live in an id-keyed arena; every candidate holds one
/// reference for its frame membership plus one per successor pointing
/// at it. When a frame slides out of the `k`/`tau` window, candidates
/// whose count reaches zero are removed and the release cascades down
/// their predecessor chain, so chains stay traversable exactly as long
/// as the frontier or the window references them.
pub struct KState<C, S>
where
    C: StateCandidate,
    S: Sample,
{
    k: Option<usize>,
    tau: Option<i64>,

    sequence: VecDeque<Frame<S>>,
    candidates: FxHashMap<CandidateId, C>,
    counters: FxHashMap<CandidateId, usize>,
}

impl<C, S> KState<C, S>
where
    C: StateCandidate,
    S: Sample,
{
    /// A window bounded by `k` past vectors and/or `tau` milliseconds.
    /// `None` leaves the respective bound open.
    pub fn new(k: Option<usize>, tau: Option<i64>) -> Self {
        KState {
            k,
            tau,
            sequence: VecDeque::new(),
            candidates: FxHashMap::default(),
            counters: FxHashMap::default(),
        }
    }

    /// Appends a state vector. An empty vector leaves the window
    /// untouched and returns `false`.
    pub fn update(&mut self, vector: Vec<C>, sample: S) -> bool {
        if vector.is_empty() {
            return false;
        }

        for candidate in &vector {
            if let Some(predecessor) = candidate.predecessor() {
                *self.counters.entry(predecessor).or_insert(0) += 1;
            }
        }

        let ids = vector.iter().map(StateCandidate::id).collect::<Vec<_>>();
        for candidate in vector {
            *self.counters.entry(candidate.id()).or_insert(0) += 1;
            self.candidates.insert(candidate.id(), candidate);
        }

        let time = sample.time();
        self.sequence.push_back(Frame {
            sample,
            vector: ids,
        });

        if let Some(k) = self.k {
            while self.sequence.len() > k + 1 {
                self.evict();
            }
        }
        if let Some(tau) = self.tau {
            while self.sequence.len() > 1
                && self.sequence.front().map(|frame| frame.sample.time()) < Some(time - tau)
            {
                self.evict();
            }
        }

        true
    }

    /// The current frontier.
    pub fn vector(&self) -> Vec<C> {
        self.sequence
            .back()
            .map(|frame| {
                frame
                    .vector
                    .iter()
                    .filter_map(|id| self.candidates.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The most recent sample.
    pub fn sample(&self) -> Option<&S> {
        self.sequence.back().map(|frame| &frame.sample)
    }

    /// The frontier candidate with the highest filter probability.
    pub fn estimate(&self) -> Option<C> {
        let frame = self.sequence.back()?;
        frame
            .vector
            .iter()
            .filter_map(|id| self.candidates.get(id))
            .max_by(|a, b| {
                a.filtprob()
                    .total_cmp(&b.filtprob())
                    .then_with(|| b.id().cmp(&a.id()))
            })
            .cloned()
    }

    /// The best (maximum sequence probability) chain of candidates,
    /// oldest first, walked over the predecessor references still held
    /// by the window.
    pub fn sequence(&self) -> Vec<C> {
        let Some(frame) = self.sequence.back() else {
            return Vec::new();
        };

        let best = frame
            .vector
            .iter()
            .filter_map(|id| self.candidates.get(id))
            .max_by(|a, b| {
                a.seqprob()
                    .total_cmp(&b.seqprob())
                    .then_with(|| b.id().cmp(&a.id()))
            });

        let mut chain = Vec::new();
        let mut next = best.map(StateCandidate::id);
        while let Some(id) = next {
            let Some(candidate) = self.candidates.get(&id) else {
                break;
            };
            chain.push(candidate.clone());
            next = candidate.predecessor();
        }

        chain.reverse();
        chain
    }

    /// Number of retained state vectors.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Number of candidates alive in the arena.
    pub fn size(&self) -> usize {
        self.candidates.len()
    }

    fn evict(&mut self) {
        let Some(frame) = self.sequence.pop_front() else {
            return;
        };

        trace!("evicting frame at t={}", frame.sample.time());
        for id in frame.vector {
            self.release(id);
        }
    }

    /// Drops one reference; removal cascades along the predecessor
    /// chain while counts reach zero.
    fn release(&mut self, id: CandidateId) {
        let mut next = Some(id);

        while let Some(id) = next.take() {
            let Some(count) = self.counters.get_mut(&id) else {
                break;
            };

            *count -= 1;
            if *count > 0 {
                break;
            }

            self.counters.remove(&id);
            if let Some(candidate) = self.candidates.remove(&id) {
                next = candidate.predecessor();
            }
        }
    }
}

impl<C, S> Default for KState<C, S>
where
    C: StateCandidate,
    S: Sample,
{
    fn default() -> Self {
        KState::new(None, None)
    }
}
