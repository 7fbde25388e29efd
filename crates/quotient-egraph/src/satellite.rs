// crates/quotient-egraph/src/satellite.rs

//! Interface between the e-graph and theory satellites.
//!
//! Satellites are theory-specific solvers (arithmetic, bit-vector, function)
//! consulted synchronously during assertions. Notifications are delivered
//! before the triggering `assert_*` returns; a satellite must not call back
//! into the e-graph from a notification — it queues its own propagations and
//! delivers them between operations via [`crate::Egraph::propagate_theory_eq`].
//!
//! ## Contracts implementors should uphold
//! - `expand_explanation(token)` must reproduce the explanation for the
//!   equality the satellite propagated under that token. Tokens stay
//!   interpretable for the lifetime of the edge that carries them; they die
//!   when the edge is popped.
//! - The expansion must be *causally consistent*: it may only name atoms and
//!   equalities that held when the propagation was made.
//! - A satellite that uses a disequality notification as an antecedent must
//!   keep the [`DiseqPreExpl`] it was handed; re-deriving it later can pick
//!   the wrong rule once the involved classes have merged further.
//! - A satellite must track the e-graph's `push`/`pop` in lockstep;
//!   notifications are not retracted.

use quotient_core::{Lit, TermId, ThVar};
use serde::{Deserialize, Serialize};

/// The theory a satellite implements.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TheoryKind {
    /// Arithmetic.
    Arith,
    /// Bit-vectors.
    BitVector,
    /// Uninterpreted functions / arrays.
    Function,
}

/// What justified a propagated disequality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiseqHint {
    /// An `eq` composite whose class is false.
    EqFalse(TermId),
    /// A `distinct` composite whose class is true.
    DistinctTrue(TermId),
    /// Both classes contain interpreted constants (dmask bit 0).
    Constants,
}

/// Pre-explanation for a propagated disequality `t1 != t2`, captured
/// eagerly at notification time.
///
/// `u1`/`u2` are the witnesses matched to the classes of `t1`/`t2` *at that
/// instant*: children of the hint composite, or the two constants for
/// [`DiseqHint::Constants`]. The two-phase split is mandatory: by
/// conflict-analysis time `u1 == u2` may hold in the e-graph, which would
/// make rule selection ambiguous if the witnesses were picked lazily.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiseqPreExpl {
    /// Justifying composite or constant pair.
    pub hint: DiseqHint,
    /// First disequal term.
    pub t1: TermId,
    /// Second disequal term.
    pub t2: TermId,
    /// Witness equal to `t1` at notification time.
    pub u1: TermId,
    /// Witness equal to `t2` at notification time.
    pub u2: TermId,
}

/// Explanation returned by a satellite for one of its propagated equalities.
#[derive(Clone, Debug, Default)]
pub struct TheoryExplanation {
    /// Theory-atom literals, appended verbatim to the result vector.
    pub atoms: Vec<Lit>,
    /// Term equalities the e-graph expands recursively.
    pub eqs: Vec<(TermId, TermId)>,
    /// Term disequalities, expanded through their stored pre-explanations.
    pub diseqs: Vec<DiseqPreExpl>,
}

/// A theory satellite attached to the e-graph.
pub trait Satellite {
    /// Which theory this satellite implements.
    fn kind(&self) -> TheoryKind;

    /// Theory variables `x1` and `x2` are now equal.
    fn notify_eq(&mut self, x1: ThVar, x2: ThVar);

    /// Theory variables `x1` and `x2` are now disequal; `pre` carries the
    /// pre-explanation to store if the satellite will use this fact.
    fn notify_diseq(&mut self, x1: ThVar, x2: ThVar, pre: DiseqPreExpl);

    /// All listed theory variables are pairwise distinct.
    fn notify_distinct(&mut self, xs: &[ThVar]);

    /// Expand the opaque token of a propagated equality into its
    /// explanation. Called while the e-graph rebuilds an explanation vector.
    fn expand_explanation(&mut self, token: u64) -> TheoryExplanation;
}
