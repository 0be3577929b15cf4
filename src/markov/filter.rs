use log::{trace, warn};

/// Identifies a candidate within its state window.
pub type CandidateId = u64;

/// A measurement the filter consumes.
pub trait Sample: Clone {
    /// Epoch milliseconds.
    fn time(&self) -> i64;
}

/// The inferred move between two consecutive candidates.
pub trait StateTransition: Clone {
    /// Number of edges the move traverses, used for tie-breaking.
    fn hops(&self) -> usize;
}

/// A hypothesized state at one measurement.
///
/// `filtprob` is the normalized posterior at the candidate's time;
/// `seqprob` the log10 likelihood of the best path ending in it.
/// Predecessors are referenced by id, never owned; the state window
/// resolves them.
pub trait StateCandidate: Clone {
    type Transition: StateTransition;
    type Sample: Sample;

    fn id(&self) -> CandidateId;

    fn filtprob(&self) -> f64;
    fn set_filtprob(&mut self, prob: f64);

    fn seqprob(&self) -> f64;
    fn set_seqprob(&mut self, prob: f64);

    fn predecessor(&self) -> Option<CandidateId>;
    fn set_predecessor(&mut self, id: Option<CandidateId>);

    fn transition(&self) -> Option<&Self::Transition>;
    fn set_transition(&mut self, transition: Option<Self::Transition>);

    fn time(&self) -> i64;
    fn set_time(&mut self, time: i64);

    /// A stable ordinal for deterministic tie-breaking between equally
    /// probable predecessors.
    fn ordinal(&self) -> i64;
}

/// The forward recursion of an online hidden Markov model.
///
/// Implementors supply the model: [`candidates`](Filter::candidates)
/// produces states with emission probabilities for a measurement, and
/// [`transition`](Filter::transition) the probability of moving between
/// two states. [`execute`](Filter::execute) runs one filter step on top
/// of them.
pub trait Filter {
    type Sample: Sample;
    type Transition: StateTransition;
    type Candidate: StateCandidate<Transition = Self::Transition, Sample = Self::Sample>;

    /// State candidates for the measurement with their emission
    /// probabilities.
    fn candidates(
        &self,
        predecessors: &[Self::Candidate],
        sample: &Self::Sample,
    ) -> Vec<(Self::Candidate, f64)>;

    /// Transition and its probability between a predecessor and a
    /// candidate, or `None` when the move is infeasible.
    fn transition(
        &self,
        predecessor: (&Self::Sample, &Self::Candidate),
        candidate: (&Self::Sample, &Self::Candidate),
    ) -> Option<(Self::Transition, f64)>;

    /// The full transition matrix, indexed `[candidate][predecessor]`.
    ///
    /// The default computes every pair independently; implementors
    /// override this when transitions share work.
    fn transitions(
        &self,
        predecessors: (&Self::Sample, &[Self::Candidate]),
        candidates: (&Self::Sample, &[(Self::Candidate, f64)]),
    ) -> Vec<Vec<Option<(Self::Transition, f64)>>> {
        let (previous, before) = predecessors;
        let (sample, current) = candidates;

        current
            .iter()
            .map(|(candidate, _)| {
                before
                    .iter()
                    .map(|predecessor| {
                        self.transition((previous, predecessor), (sample, candidate))
                    })
                    .collect()
            })
            .collect()
    }

    /// One step of the forward recursion: fuses the predecessor vector
    /// with the measurement into the posterior state vector.
    ///
    /// A step with candidates but no viable transition is an HMM break:
    /// it is logged and the filter restarts from the emissions alone.
    /// The returned vector's filter probabilities sum to one unless it
    /// is empty.
    fn execute(
        &self,
        predecessors: &[Self::Candidate],
        previous: Option<&Self::Sample>,
        sample: &Self::Sample,
    ) -> Vec<Self::Candidate> {
        let candidates = self.candidates(predecessors, sample);
        trace!(
            "execute filter with {} predecessors and {} candidates",
            predecessors.len(),
            candidates.len()
        );

        let mut result = Vec::with_capacity(candidates.len());
        let mut normsum = 0.0;

        if let (Some(previous), false) = (previous, predecessors.is_empty()) {
            let transitions = self.transitions((previous, predecessors), (sample, &candidates));

            for ((candidate, emission), row) in candidates.iter().zip(transitions) {
                let mut candidate = candidate.clone();
                candidate.set_filtprob(0.0);
                candidate.set_seqprob(f64::NEG_INFINITY);
                candidate.set_predecessor(None);
                candidate.set_transition(None);

                // (hops, ordinal) of the predecessor currently held.
                let mut held: Option<(usize, i64)> = None;

                for (predecessor, transition) in predecessors.iter().zip(row) {
                    let Some((transition, probability)) = transition else {
                        continue;
                    };
                    if !(probability > 0.0) {
                        continue;
                    }

                    candidate.set_filtprob(
                        candidate.filtprob() + probability * predecessor.filtprob(),
                    );

                    let seqprob =
                        predecessor.seqprob() + probability.log10() + emission.log10();
                    let contender = (transition.hops(), predecessor.ordinal());

                    let replace = if seqprob > candidate.seqprob() {
                        true
                    } else if seqprob == candidate.seqprob() {
                        held.map(|current| contender < current).unwrap_or(true)
                    } else {
                        false
                    };

                    if replace {
                        candidate.set_predecessor(Some(predecessor.id()));
                        candidate.set_transition(Some(transition));
                        candidate.set_seqprob(seqprob);
                        held = Some(contender);
                    }
                }

                if candidate.filtprob() == 0.0 || candidate.filtprob().is_nan() {
                    continue;
                }

                candidate.set_filtprob(candidate.filtprob() * emission);
                candidate.set_time(sample.time());
                normsum += candidate.filtprob();
                result.push(candidate);
            }

            if !candidates.is_empty() && result.is_empty() {
                warn!(
                    "HMM break: no viable transition into t={} ({} candidates)",
                    sample.time(),
                    candidates.len()
                );
            }
        }

        if result.is_empty() {
            // Restart from the emissions alone.
            for (mut candidate, emission) in candidates {
                if !(emission > 0.0) {
                    continue;
                }

                candidate.set_predecessor(None);
                candidate.set_transition(None);
                candidate.set_filtprob(emission);
                candidate.set_seqprob(emission.log10());
                candidate.set_time(sample.time());
                normsum += emission;
                result.push(candidate);
            }
        }

        if normsum > 0.0 {
            for candidate in result.iter_mut() {
                let normalized = candidate.filtprob() / normsum;
                candidate.set_filtprob(normalized);
            }
        } else {
            for candidate in result.iter_mut() {
                candidate.set_filtprob(0.0);
            }
        }

        result
    }
}
