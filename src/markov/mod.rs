//! The generic hidden Markov model machinery.
//!
//! The [`Filter`] fuses emission and transition probabilities into a
//! per-step state vector; [`KState`] carries those vectors through time
//! and prunes predecessors the frontier no longer references. Both are
//! polymorphic over the state types through [`Sample`],
//! [`StateCandidate`] and [`StateTransition`], so the recursion is
//! testable with synthetic states.

#[doc(hidden)]
pub mod filter;
#[doc(hidden)]
pub mod state;

#[doc(inline)]
pub use filter::{CandidateId, Filter, Sample, StateCandidate, StateTransition};
#[doc(inline)]
pub use state::KState;
