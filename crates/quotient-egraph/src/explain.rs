// crates/quotient-egraph/src/explain.rs

//! Explanation engine.
//!
//! Generating an explanation has two phases. When an equality is implied,
//! the edge recording it carries a typed antecedent — enough information to
//! reconstruct the reason later. When the Boolean solver asks for a reason,
//! the antecedents are expanded into a vector of asserted literals: the
//! expansion queue starts from the target edges, each step either replaces
//! an edge by the edges its antecedent depends on or emits a literal, and
//! the queue is processed until it drains. All edges in the queue are
//! marked so each participates at most once.
//!
//! Causality is the load-bearing invariant: the expansion of edge `k` must
//! never reach an equality asserted after `k`. Path walks therefore carry an
//! edge-index cut-off where needed, and disequalities handed to satellites
//! are pre-explained eagerly (the two-phase [`DiseqPreExpl`]).

use std::mem;

use quotient_core::{EdgeId, Label, Lit, Occ, TermId, TermKind};

use crate::edges::Antecedent;
use crate::egraph::Egraph;
use crate::satellite::{DiseqHint, DiseqPreExpl};
use crate::congruence::eq_signature;

impl Egraph {
    // ------------------------------------------------------------------
    // Queue and proof-forest walks
    // ------------------------------------------------------------------

    fn enqueue_edge(&mut self, i: EdgeId) {
        if self.edges.marked(i) {
            return;
        }
        self.edges.set_mark(i, true);
        self.expl_queue.push(i);
    }

    fn term_marked(&self, t: TermId) -> bool {
        self.term_mark.get(t.0 as usize).copied().unwrap_or(false)
    }

    fn set_term_mark(&mut self, t: TermId, on: bool) {
        let idx = t.0 as usize;
        if self.term_mark.len() <= idx {
            self.term_mark.resize(idx + 1, false);
        }
        self.term_mark[idx] = on;
    }

    /// Mark and enqueue every unmarked edge on the proof path from `t1` up
    /// to its ancestor `w`.
    fn mark_path(&mut self, mut t1: TermId, w: TermId) {
        while t1 != w {
            let i = match self.classes.proof_edge(t1) {
                Some(i) => i,
                None => unreachable!("proof path ended before its ancestor"),
            };
            self.enqueue_edge(i);
            t1 = self.edges.next_term(i, t1);
        }
    }

    /// Least common ancestor of `t1` and `t2` in the proof forest
    /// (mark-first-path, scan-second, unmark-first — O(depth)).
    fn common_ancestor(&mut self, t1: TermId, t2: TermId) -> TermId {
        debug_assert_eq!(
            self.classes.class_of(Occ::pos(t1)),
            self.classes.class_of(Occ::pos(t2))
        );

        let mut t = t1;
        loop {
            self.set_term_mark(t, true);
            match self.classes.proof_edge(t) {
                None => break,
                Some(i) => t = self.edges.next_term(i, t),
            }
        }

        let mut u = t2;
        while !self.term_marked(u) {
            let i = match self.classes.proof_edge(u) {
                Some(i) => i,
                None => unreachable!("no common ancestor inside one class"),
            };
            u = self.edges.next_term(i, u);
        }

        let mut t = t1;
        loop {
            self.set_term_mark(t, false);
            match self.classes.proof_edge(t) {
                None => break,
                Some(i) => t = self.edges.next_term(i, t),
            }
        }
        u
    }

    /// Queue the edges proving `x == y` (or `x == not y`); both occurrences
    /// must be in the same class.
    pub(crate) fn explain_eq_occ(&mut self, x: Occ, y: Occ) {
        assert_eq!(
            self.classes.class_of(x),
            self.classes.class_of(y),
            "explain_eq on occurrences in different classes"
        );
        let (tx, ty) = (x.term(), y.term());
        if tx == ty {
            return;
        }
        let w = self.common_ancestor(tx, ty);
        self.mark_path(tx, w);
        self.mark_path(ty, w);
    }

    /// `true` when every edge on the path from `t1` to its ancestor `t`
    /// precedes edge `k` — i.e. `t1 == t` already held when `k` was added.
    fn path_precedes_edge(&self, mut t1: TermId, t: TermId, k: EdgeId) -> bool {
        while t1 != t {
            let i = match self.classes.proof_edge(t1) {
                Some(i) => i,
                None => unreachable!("proof path ended before its ancestor"),
            };
            if i >= k {
                return false;
            }
            t1 = self.edges.next_term(i, t1);
        }
        true
    }

    /// `true` when `x == y` (or `x == not y`) already held when edge `k`
    /// was added.
    fn causally_equal(&mut self, x: Occ, y: Occ, k: EdgeId) -> bool {
        debug_assert_eq!(self.classes.class_of(x), self.classes.class_of(y));
        let (tx, ty) = (x.term(), y.term());
        if tx == ty {
            return true;
        }
        let w = self.common_ancestor(tx, ty);
        self.path_precedes_edge(tx, w, k) && self.path_precedes_edge(ty, w, k)
    }

    // ------------------------------------------------------------------
    // Disequality explanations
    // ------------------------------------------------------------------

    /// Some constant in the class of `x`. The caller guarantees one exists
    /// (dmask bit 0).
    pub(crate) fn constant_in_class(&self, x: Occ) -> Occ {
        let mut t = x.term();
        while !self.terms.is_constant(t) {
            t = self.classes.next_in_class(t);
            debug_assert_ne!(t, x.term(), "dmask bit 0 set on a constant-free class");
        }
        Occ::pos(t)
    }

    /// `x != y` because both classes contain (distinct) constants.
    fn explain_diseq_via_constants(&mut self, x: Occ, y: Occ) {
        let a = self.constant_in_class(x);
        let b = self.constant_in_class(y);
        self.explain_eq_occ(x, a);
        self.explain_eq_occ(y, b);
    }

    /// `x != y` because the composite `(eq u v)` is false with `u == x`,
    /// `v == y` (possibly swapped).
    fn explain_diseq_via_eq(&mut self, x: Occ, y: Occ, e: TermId) {
        debug_assert!(matches!(self.terms.kind(e), TermKind::Eq));
        debug_assert_eq!(self.classes.label(e), Label::FALSE);

        self.explain_eq_occ(Occ::pos(e), Occ::FALSE);

        let (u, v) = {
            let ch = self.terms.children(e);
            (ch[0], ch[1])
        };
        let (mut x, mut y) = (x, y);
        if self.classes.class_of(x) != self.classes.class_of(u) {
            debug_assert_eq!(self.classes.class_of(y), self.classes.class_of(u));
            mem::swap(&mut x, &mut y);
        }
        self.explain_eq_occ(x, u);
        self.explain_eq_occ(y, v);
    }

    /// `x != y` because the distinct atom `d` is true with children equal
    /// to `x` and `y`. Only edges preceding `k` may justify the child
    /// equalities (causality cut-off).
    fn explain_diseq_via_distinct(&mut self, x: Occ, y: Occ, d: TermId, k: EdgeId) {
        debug_assert!(matches!(self.terms.kind(d), TermKind::Distinct));
        debug_assert_eq!(self.classes.label(d), Label::TRUE);
        self.explain_eq_occ(Occ::pos(d), Occ::TRUE);

        let cx = self.classes.class_of(x);
        let cy = self.classes.class_of(y);
        debug_assert_ne!(cx, cy);

        let children: Vec<Occ> = self.terms.children(d).to_vec();
        let (mut tx, mut ty) = (None, None);
        for ch in children {
            if tx.is_none() && self.classes.class_of(ch) == cx && self.causally_equal(ch, x, k) {
                tx = Some(ch);
                if ty.is_some() {
                    break;
                }
            } else if ty.is_none()
                && self.classes.class_of(ch) == cy
                && self.causally_equal(ch, y, k)
            {
                ty = Some(ch);
                if tx.is_some() {
                    break;
                }
            }
        }
        let (tx, ty) = match (tx, ty) {
            (Some(tx), Some(ty)) => (tx, ty),
            _ => unreachable!("distinct atom lost its causal witnesses"),
        };
        self.explain_eq_occ(x, tx);
        self.explain_eq_occ(y, ty);
    }

    /// The false `eq` composite spanning the classes of `x` and `y`, if
    /// one is indexed.
    pub(crate) fn find_false_eq(&self, x: Occ, y: Occ) -> Option<TermId> {
        let e = self.cong.find(&eq_signature(x, y, &self.classes))?;
        (self.classes.label(e) == Label::FALSE).then_some(e)
    }

    /// Queue the explanation of `x != y` from the current state (dmask
    /// first, then a false `eq` composite). Fatal when the two are not
    /// actually known-disequal.
    fn explain_diseq_current(&mut self, x: Occ, y: Occ) {
        let c1 = self.classes.class_of(x);
        let c2 = self.classes.class_of(y);
        debug_assert_ne!(c1, c2);

        let m = self.classes.class(c1).dmask & self.classes.class(c2).dmask;
        if m & 1 != 0 {
            self.explain_diseq_via_constants(x, y);
        } else if m != 0 {
            let bit = u8::try_from(m.trailing_zeros()).unwrap_or(31);
            let d = match self.dtable.atom(bit) {
                Some(d) => d,
                None => unreachable!("dmask bit without a registered atom"),
            };
            let horizon = self.edges.horizon();
            self.explain_diseq_via_distinct(x, y, d, horizon);
        } else {
            match self.find_false_eq(x, y) {
                Some(e) => self.explain_diseq_via_eq(x, y, e),
                None => panic!("explain_diseq on occurrences not known disequal"),
            }
        }
    }

    // ------------------------------------------------------------------
    // Simplification / congruence expansions
    // ------------------------------------------------------------------

    /// `(or ...) == v`: every child is false, or equal to `v`.
    fn explain_simp_or(&mut self, c: TermId, v: Occ) {
        debug_assert!(matches!(self.terms.kind(c), TermKind::Or));
        let children: Vec<Occ> = self.terms.children(c).to_vec();
        if v == Occ::FALSE {
            for ch in children {
                self.explain_eq_occ(ch, Occ::FALSE);
            }
        } else {
            for ch in children {
                if self.classes.label_occ(ch) == Label::FALSE {
                    self.explain_eq_occ(ch, Occ::FALSE);
                } else {
                    self.explain_eq_occ(ch, v);
                }
            }
        }
    }

    fn explain_child_pairs(&mut self, c1: TermId, c2: TermId, pairs: &[(usize, usize)]) {
        for &(i, j) in pairs {
            let a = self.terms.children(c1)[i];
            let b = self.terms.children(c2)[j];
            self.explain_eq_occ(a, b);
        }
    }

    fn explain_basic_congruence(&mut self, c1: TermId, c2: TermId) {
        let n = self.terms.children(c1).len();
        for i in 0..n {
            let a = self.terms.children(c1)[i];
            let b = self.terms.children(c2)[i];
            self.explain_eq_occ(a, b);
        }
    }

    fn explain_or_congruence(&mut self, c1: TermId, c2: TermId, p: &[Occ]) {
        let n1 = self.terms.children(c1).len();
        let n2 = self.terms.children(c2).len();
        debug_assert_eq!(p.len(), n1 + n2);
        for i in 0..n1 {
            let a = self.terms.children(c1)[i];
            self.explain_eq_occ(a, p[i]);
        }
        for j in 0..n2 {
            let b = self.terms.children(c2)[j];
            self.explain_eq_occ(b, p[n1 + j]);
        }
    }

    fn explain_distinct_congruence(&mut self, c1: TermId, p: &[Occ]) {
        let n = self.terms.children(c1).len();
        debug_assert_eq!(p.len(), n);
        for i in 0..n {
            let a = self.terms.children(c1)[i];
            self.explain_eq_occ(a, p[i]);
        }
    }

    // ------------------------------------------------------------------
    // Expansion loop
    // ------------------------------------------------------------------

    /// Expand the queued edges into literals appended to `v`, clear the
    /// marks and bump activity. The queue is empty on return.
    pub(crate) fn build_explanation_vector(&mut self, v: &mut Vec<Lit>) {
        let mut k = 0;
        while k < self.expl_queue.len() {
            let i = self.expl_queue[k];
            k += 1;
            debug_assert!(self.edges.marked(i));
            let (lhs, rhs, ante) = {
                let e = self.edges.get(i);
                (e.lhs, e.rhs, e.ante.clone())
            };
            match ante {
                Antecedent::Axiom => {}
                Antecedent::Assert(lit) => v.push(lit),
                Antecedent::Eq(a, b) => self.explain_eq_occ(a, b),
                Antecedent::Distinct0(a, b) => self.explain_diseq_via_constants(a, b),
                Antecedent::DistinctI { bit, a, b } => {
                    let d = match self.dtable.atom(bit) {
                        Some(d) => d,
                        None => unreachable!("edge names an unregistered distinct atom"),
                    };
                    self.explain_diseq_via_distinct(a, b, d, i);
                }
                Antecedent::SimpOr => self.explain_simp_or(lhs.term(), rhs),
                Antecedent::BasicCongruence => {
                    self.explain_basic_congruence(lhs.term(), rhs.term());
                }
                Antecedent::EqCongruence1 => {
                    self.explain_child_pairs(lhs.term(), rhs.term(), &[(0, 0), (1, 1)]);
                }
                Antecedent::EqCongruence2 => {
                    self.explain_child_pairs(lhs.term(), rhs.term(), &[(0, 1), (1, 0)]);
                }
                Antecedent::IteCongruence1 => {
                    self.explain_child_pairs(lhs.term(), rhs.term(), &[(0, 0), (1, 1), (2, 2)]);
                }
                Antecedent::IteCongruence2 => {
                    // The first pair relates a condition to its negation.
                    self.explain_child_pairs(lhs.term(), rhs.term(), &[(0, 0), (1, 2), (2, 1)]);
                }
                Antecedent::OrCongruence(p) => {
                    self.explain_or_congruence(lhs.term(), rhs.term(), &p);
                }
                Antecedent::DistinctCongruence(p) => {
                    self.explain_distinct_congruence(lhs.term(), &p);
                }
                Antecedent::Theory { kind, token } => {
                    let mut sat = match self.satellites.remove(&kind) {
                        Some(s) => s,
                        None => panic!("satellite {kind:?} detached while its edge is alive"),
                    };
                    let ex = sat.expand_explanation(token);
                    self.satellites.insert(kind, sat);
                    v.extend_from_slice(&ex.atoms);
                    for (a, b) in ex.eqs {
                        self.explain_eq_occ(Occ::pos(a), Occ::pos(b));
                    }
                    for pre in ex.diseqs {
                        self.queue_pre_expl(&pre);
                    }
                }
            }
        }

        let q = mem::take(&mut self.expl_queue);
        for &i in &q {
            self.edges.set_mark(i, false);
            self.edges.bump_activity(i);
        }
        self.expl_queue = q;
        self.expl_queue.clear();
    }

    fn queue_pre_expl(&mut self, pre: &DiseqPreExpl) {
        match pre.hint {
            DiseqHint::EqFalse(h) => self.explain_eq_occ(Occ::pos(h), Occ::FALSE),
            DiseqHint::DistinctTrue(h) => self.explain_eq_occ(Occ::pos(h), Occ::TRUE),
            DiseqHint::Constants => {}
        }
        self.explain_eq_occ(Occ::pos(pre.t1), Occ::pos(pre.u1));
        self.explain_eq_occ(Occ::pos(pre.t2), Occ::pos(pre.u2));
    }

    // ------------------------------------------------------------------
    // Public explanation entry points
    // ------------------------------------------------------------------

    /// Literals entailing the conclusion of edge `i`. Only edges with
    /// smaller indices participate.
    pub fn explain_edge(&mut self, i: EdgeId) -> Vec<Lit> {
        assert!(i.index() < self.edges.len(), "edge {i:?} out of range");
        debug_assert!(self.expl_queue.is_empty() && !self.edges.marked(i));
        self.enqueue_edge(i);
        let mut v = Vec::new();
        self.build_explanation_vector(&mut v);
        v
    }

    /// Literals entailing `x == y`. Fatal when the two occurrences are not
    /// in the same class (caller bug).
    pub fn explain_equality(&mut self, x: Occ, y: Occ) -> Vec<Lit> {
        debug_assert!(self.expl_queue.is_empty());
        self.explain_eq_occ(x, y);
        let mut v = Vec::new();
        self.build_explanation_vector(&mut v);
        v
    }

    /// Literals entailing `x != y` (which must be known: opposite
    /// polarities, dmask intersection, or a false `eq` composite).
    pub fn explain_disequality(&mut self, x: Occ, y: Occ) -> Vec<Lit> {
        debug_assert!(self.expl_queue.is_empty());
        if self.classes.opposite(x, y) {
            self.explain_eq_occ(x, y);
        } else {
            self.explain_diseq_current(x, y);
        }
        let mut v = Vec::new();
        self.build_explanation_vector(&mut v);
        v
    }

    /// Immediate expansion of a satellite disequality through its hint.
    ///
    /// This cannot be deferred: once a conflict makes `t1 == t2`, the
    /// orientation of the hint's children is ambiguous. Satellites that
    /// expand lazily must go through [`Egraph::store_diseq_pre_expl`] /
    /// [`Egraph::expand_diseq_pre_expl`] instead.
    pub fn explain_term_diseq(&mut self, t1: TermId, t2: TermId, hint: DiseqHint) -> Vec<Lit> {
        debug_assert!(self.expl_queue.is_empty());
        match hint {
            DiseqHint::EqFalse(e) => self.explain_diseq_via_eq(Occ::pos(t1), Occ::pos(t2), e),
            DiseqHint::DistinctTrue(d) => {
                let horizon = self.edges.horizon();
                self.explain_diseq_via_distinct(Occ::pos(t1), Occ::pos(t2), d, horizon);
            }
            DiseqHint::Constants => {
                self.explain_diseq_via_constants(Occ::pos(t1), Occ::pos(t2));
            }
        }
        let mut v = Vec::new();
        self.build_explanation_vector(&mut v);
        v
    }

    /// Eager phase of the two-phase disequality explanation: capture the
    /// hint's witness children while they are still distinguishable.
    #[must_use]
    pub fn store_diseq_pre_expl(&self, t1: TermId, t2: TermId, hint: DiseqHint) -> DiseqPreExpl {
        let (u1, u2) = match hint {
            DiseqHint::Constants => (
                self.constant_in_class(Occ::pos(t1)).term(),
                self.constant_in_class(Occ::pos(t2)).term(),
            ),
            DiseqHint::EqFalse(h) | DiseqHint::DistinctTrue(h) => {
                let u1 = match self.find_equal_child(h, Occ::pos(t1)) {
                    Some(u) => u,
                    None => panic!("hint composite has no child equal to {t1}"),
                };
                let u2 = match self.find_equal_child(h, Occ::pos(t2)) {
                    Some(u) => u,
                    None => panic!("hint composite has no child equal to {t2}"),
                };
                (u1, u2)
            }
        };
        debug_assert_ne!(u1, u2);
        DiseqPreExpl {
            hint,
            t1,
            t2,
            u1,
            u2,
        }
    }

    /// Lazy phase: expand a stored pre-explanation into literals.
    pub fn expand_diseq_pre_expl(&mut self, pre: &DiseqPreExpl) -> Vec<Lit> {
        debug_assert!(self.expl_queue.is_empty());
        self.queue_pre_expl(pre);
        let mut v = Vec::new();
        self.build_explanation_vector(&mut v);
        v
    }

    /// Child of `hint` currently equal to `x`, if any.
    pub(crate) fn find_equal_child(&self, hint: TermId, x: Occ) -> Option<TermId> {
        let l = self.classes.label_occ(x);
        self.terms
            .children(hint)
            .iter()
            .find(|&&c| self.classes.label_occ(c) == l)
            .map(|c| c.term())
    }

    // ------------------------------------------------------------------
    // Distinct-atom explanations and conflict entry points
    // ------------------------------------------------------------------

    /// `(distinct ...)` holds because the children's dmasks share `dmsk`:
    /// all children equal distinct constants (bit 0), or another registered
    /// distinct atom subsumes this one.
    fn explain_distinct_via_dmask(&mut self, d: TermId, dmsk: u32) {
        debug_assert_ne!(dmsk, 0);
        let children: Vec<Occ> = self.terms.children(d).to_vec();
        let bit = dmsk.trailing_zeros();
        if bit == 0 {
            for ch in children {
                let c = self.constant_in_class(ch);
                self.explain_eq_occ(ch, c);
            }
            return;
        }
        let dpred = match self.dtable.atom(u8::try_from(bit).unwrap_or(31)) {
            Some(d) => d,
            None => unreachable!("dmask bit without a registered atom"),
        };
        self.explain_eq_occ(Occ::pos(dpred), Occ::TRUE);

        debug_assert!(self.imap.is_empty());
        for &ch in self.terms.children(d) {
            let l = self.classes.label_occ(ch).raw();
            let prev = self.imap.insert(l, ch);
            debug_assert!(prev.is_none(), "distinct atom with equal children");
        }
        let pchildren: Vec<Occ> = self.terms.children(dpred).to_vec();
        for ch2 in pchildren {
            let l = self.classes.label_occ(ch2).raw();
            if let Some(&t2) = self.imap.get(&l) {
                self.explain_eq_occ(ch2, t2);
            }
        }
        self.imap.clear();
    }

    /// `(distinct ...)` holds: cheap dmask subsumption first, pairwise
    /// disequalities otherwise.
    fn explain_distinct(&mut self, d: TermId) {
        let children: Vec<Occ> = self.terms.children(d).to_vec();
        let mut dmsk = !0u32;
        for &ch in &children {
            dmsk &= self.classes.class(self.classes.class_of(ch)).dmask;
            if dmsk == 0 {
                break;
            }
        }
        if dmsk != 0 {
            self.explain_distinct_via_dmask(d, dmsk);
            return;
        }
        for i in 0..children.len() {
            for j in i + 1..children.len() {
                self.explain_diseq_current(children[i], children[j]);
            }
        }
    }

    /// Would finalising edge `k` (asserting `t1 == t2`) contradict a known
    /// disequality? If so, return the complete conflict vector (edge `k`
    /// included).
    pub(crate) fn inconsistent_edge(&mut self, t1: Occ, t2: Occ, k: EdgeId) -> Option<Vec<Lit>> {
        debug_assert!(self.expl_queue.is_empty() && !self.edges.marked(k));

        let found = if self.classes.opposite(t1, t2) {
            self.explain_eq_occ(t1, t2);
            true
        } else {
            let c1 = self.classes.class_of(t1);
            let c2 = self.classes.class_of(t2);
            debug_assert_ne!(c1, c2);
            let m = self.classes.class(c1).dmask & self.classes.class(c2).dmask;
            if m & 1 != 0 {
                self.explain_diseq_via_constants(t1, t2);
                true
            } else if m != 0 {
                let bit = u8::try_from(m.trailing_zeros()).unwrap_or(31);
                let d = match self.dtable.atom(bit) {
                    Some(d) => d,
                    None => unreachable!("dmask bit without a registered atom"),
                };
                let horizon = self.edges.horizon();
                self.explain_diseq_via_distinct(t1, t2, d, horizon);
                true
            } else if let Some(e) = self.find_false_eq(t1, t2) {
                self.explain_diseq_via_eq(t1, t2, e);
                true
            } else {
                false
            }
        };
        if !found {
            return None;
        }
        self.enqueue_edge(k);
        let mut v = Vec::new();
        self.build_explanation_vector(&mut v);
        Some(v)
    }

    /// Does asserting `(distinct ...) == false` contradict the state — are
    /// all pairs of children already known-disequal? Tries the cheap dmask
    /// check first; the pairwise scan can be expensive for wide atoms.
    pub(crate) fn inconsistent_not_distinct(&mut self, d: TermId) -> Option<Vec<Lit>> {
        debug_assert!(self.expl_queue.is_empty());
        let children: Vec<Occ> = self.terms.children(d).to_vec();

        // An equal pair satisfies the negated atom outright, and voids the
        // dmask subsumption argument below.
        for i in 0..children.len() {
            for j in i + 1..children.len() {
                if self.classes.class_of(children[i]) == self.classes.class_of(children[j]) {
                    return None;
                }
            }
        }

        let mut dmsk = !0u32;
        for &ch in &children {
            dmsk &= self.classes.class(self.classes.class_of(ch)).dmask;
            if dmsk == 0 {
                break;
            }
        }

        if dmsk == 0 {
            for i in 0..children.len() {
                let di = self.classes.class(self.classes.class_of(children[i])).dmask;
                for j in i + 1..children.len() {
                    let dj = self.classes.class(self.classes.class_of(children[j])).dmask;
                    if di & dj == 0 && self.find_false_eq(children[i], children[j]).is_none() {
                        return None;
                    }
                }
            }
            for i in 0..children.len() {
                for j in i + 1..children.len() {
                    self.explain_diseq_current(children[i], children[j]);
                }
            }
        } else {
            self.explain_distinct_via_dmask(d, dmsk);
        }

        self.explain_eq_occ(Occ::pos(d), Occ::FALSE);
        let mut v = Vec::new();
        self.build_explanation_vector(&mut v);
        Some(v)
    }

    /// Literals forcing the distinct atom `d` to hold. Used by satellites
    /// that received a `notify_distinct`.
    pub fn explain_distinct_atom(&mut self, d: TermId) -> Vec<Lit> {
        debug_assert!(self.expl_queue.is_empty());
        self.explain_distinct(d);
        let mut v = Vec::new();
        self.build_explanation_vector(&mut v);
        v
    }
}
