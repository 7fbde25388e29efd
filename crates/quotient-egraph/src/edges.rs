// crates/quotient-egraph/src/edges.rs

//! Edge stack: the ordered log of merge edges.
//!
//! Each entry records the two endpoint occurrences and a typed antecedent —
//! the reason the equality was implied. The entry's index doubles as its
//! timestamp and is the sole arbiter of causality: expanding an edge must
//! only ever reach edges with smaller indices.

use quotient_core::{EdgeId, Lit, Occ, TermId};

use crate::satellite::TheoryKind;

/// Why an edge's equality holds. One variant per antecedent kind; the
/// permutation payloads for or/distinct congruence are owned by the variant,
/// so their lifetime matches the edge's.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Antecedent {
    /// Definitional; expands to nothing.
    Axiom,
    /// The Boolean solver asserted this literal.
    Assert(Lit),
    /// Both endpoints follow from the single equality `a == b` (also used
    /// for simplifications detected through equal labels, e.g. an `eq`
    /// composite whose children share a class, or an `ite` whose condition
    /// is decided).
    Eq(Occ, Occ),
    /// Disequality of `a` and `b` via dmask bit 0 (both classes hold
    /// constants).
    Distinct0(Occ, Occ),
    /// Disequality of `a` and `b` via the distinct atom registered on dmask
    /// bit `bit` (1..=31). The edge's own index is the causal cut-off when
    /// re-selecting witness children.
    DistinctI {
        /// dmask bit of the registered distinct atom.
        bit: u8,
        /// First disequal occurrence.
        a: Occ,
        /// Second disequal occurrence.
        b: Occ,
    },
    /// `(or ...)` simplified to the edge's rhs because every child is false
    /// or equal to it.
    SimpOr,
    /// Children pairwise equal (apply/update/tuple congruence).
    BasicCongruence,
    /// `eq` congruence, children aligned.
    EqCongruence1,
    /// `eq` congruence, children swapped by normalisation.
    EqCongruence2,
    /// `ite` congruence, children aligned.
    IteCongruence1,
    /// `ite` congruence, condition flipped and branches crossed.
    IteCongruence2,
    /// Or-congruence: each child of either side equals the recorded partner
    /// (first `arity(lhs)` entries for the lhs children, the rest for rhs).
    OrCongruence(Box<[Occ]>),
    /// Distinct-congruence: lhs children equal the recorded permutation of
    /// rhs children.
    DistinctCongruence(Box<[Occ]>),
    /// Equality supplied by a theory satellite; `token` is an opaque handle
    /// the satellite expands on demand.
    Theory {
        /// Which satellite supplied the equality.
        kind: TheoryKind,
        /// Opaque handle passed back to [`crate::Satellite::expand_explanation`].
        token: u64,
    },
}

/// One merge edge: `lhs == rhs` because of `ante`.
#[derive(Clone, Debug)]
pub struct Edge {
    /// Left endpoint occurrence.
    pub lhs: Occ,
    /// Right endpoint occurrence.
    pub rhs: Occ,
    /// Reason the equality holds.
    pub ante: Antecedent,
}

/// Append-only (pop-on-backtrack) stack of merge edges, with the mark bits
/// and activity counters used by the explanation engine.
#[derive(Debug, Default)]
pub struct EdgeStack {
    edges: Vec<Edge>,
    mark: Vec<bool>,
    activity: Vec<u8>,
}

impl EdgeStack {
    /// Fresh empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edges; also the index the next push will get.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// `true` when no edge has been pushed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Timestamp horizon: the index one past the newest edge. Used as the
    /// causal cut-off for explanations of the current state.
    #[inline]
    #[must_use]
    pub fn horizon(&self) -> EdgeId {
        EdgeId(u32::try_from(self.edges.len()).unwrap_or(u32::MAX))
    }

    /// Append an edge, returning its index.
    pub fn push(&mut self, lhs: Occ, rhs: Occ, ante: Antecedent) -> EdgeId {
        let id = self.horizon();
        self.edges.push(Edge { lhs, rhs, ante });
        self.mark.push(false);
        self.activity.push(0);
        id
    }

    /// Drop every edge with index ≥ `n`.
    pub fn truncate(&mut self, n: usize) {
        self.edges.truncate(n);
        self.mark.truncate(n);
        self.activity.truncate(n);
    }

    /// The edge at `i`.
    #[inline]
    #[must_use]
    pub fn get(&self, i: EdgeId) -> &Edge {
        &self.edges[i.index()]
    }

    /// The endpoint term opposite `t` on edge `i`.
    #[inline]
    #[must_use]
    pub fn next_term(&self, i: EdgeId, t: TermId) -> TermId {
        let e = &self.edges[i.index()];
        if e.lhs.term() == t {
            e.rhs.term()
        } else {
            debug_assert_eq!(e.rhs.term(), t);
            e.lhs.term()
        }
    }

    /// The occurrence opposite `u` on edge `i`, with the polarity delta of
    /// the edge already folded in (`lhs ^ rhs ^ u`).
    #[inline]
    #[must_use]
    pub fn next_occ(&self, i: EdgeId, u: Occ) -> Occ {
        let e = &self.edges[i.index()];
        Occ::from_raw(e.lhs.raw() ^ e.rhs.raw() ^ u.raw())
    }

    /// Explanation mark for edge `i`.
    #[inline]
    #[must_use]
    pub fn marked(&self, i: EdgeId) -> bool {
        self.mark[i.index()]
    }

    /// Set or clear the explanation mark for edge `i`.
    #[inline]
    pub fn set_mark(&mut self, i: EdgeId, on: bool) {
        self.mark[i.index()] = on;
    }

    /// Bump the activity counter of edge `i`, saturating at 255. Activity
    /// is advisory (conflict-clause biasing) and is never undone.
    #[inline]
    pub fn bump_activity(&mut self, i: EdgeId) {
        let a = &mut self.activity[i.index()];
        *a = a.saturating_add(1);
    }

    /// Current activity of edge `i`.
    #[inline]
    #[must_use]
    pub fn activity(&self, i: EdgeId) -> u8 {
        self.activity[i.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotient_core::TermId;

    #[test]
    fn next_occ_folds_polarity() {
        let mut s = EdgeStack::new();
        // Edge asserting t1 == ~t2.
        let i = s.push(Occ::pos(TermId(1)), Occ::neg(TermId(2)), Antecedent::Axiom);
        assert_eq!(s.next_occ(i, Occ::pos(TermId(1))), Occ::neg(TermId(2)));
        // Walking from the flipped side flips the other side too.
        assert_eq!(s.next_occ(i, Occ::neg(TermId(1))), Occ::pos(TermId(2)));
        assert_eq!(s.next_term(i, TermId(2)), TermId(1));
    }

    #[test]
    fn activity_saturates() {
        let mut s = EdgeStack::new();
        let i = s.push(Occ::pos(TermId(1)), Occ::pos(TermId(2)), Antecedent::Axiom);
        for _ in 0..300 {
            s.bump_activity(i);
        }
        assert_eq!(s.activity(i), 255);
    }
}
