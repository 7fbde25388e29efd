// crates/quotient-egraph/src/egraph.rs

//! E-graph orchestrator: assertions, merge fixpoint, propagation queue,
//! satellite notifications and exact backtracking.
//!
//! Control flow per assertion: the caller's equality lands on the pending
//! queue; processing pops pending equalities, appends an edge for each one
//! not already satisfied, merges the two classes, re-indexes the absorbed
//! class's parent composites in the congruence table (firing simplification
//! rules and congruence collisions, which push more pending equalities) and
//! loops until the queue drains or a conflict surfaces. Conflicts are
//! returned as literal vectors; the caller is expected to `pop` past the
//! offending assertion before continuing.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::mem;

use quotient_core::{
    ClassId, EdgeId, Label, Lit, Occ, Sort, TermId, TermKind, TermTable, ThVar, BOOL_CLASS,
    TRUE_TERM,
};

use crate::classes::ClassTable;
use crate::congruence::{signature, CongruenceTable};
use crate::distinct::DistinctTable;
use crate::edges::{Antecedent, EdgeStack};
use crate::satellite::{DiseqHint, DiseqPreExpl, Satellite, TheoryKind};

/// Outcome of an assertion. Conflicts are data: the returned literals are
/// jointly inconsistent with the e-graph's axioms.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssertOutcome {
    /// Assertion absorbed; propagations may be waiting in [`Egraph::propagate`].
    Ok,
    /// The assertion contradicts earlier ones; the vector explains why.
    Conflict(Vec<Lit>),
}

impl AssertOutcome {
    /// `true` for [`AssertOutcome::Ok`].
    #[inline]
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// An equality waiting to be turned into an edge.
struct PendingEq {
    lhs: Occ,
    rhs: Occ,
    ante: Antecedent,
}

/// One distinct atom registered during a merge: the allocated bit and the
/// classes it was OR-ed into.
#[derive(Debug)]
struct DistinctReg {
    bit: u8,
    targets: Vec<ClassId>,
}

/// Exact undo record for one class merge.
#[derive(Debug)]
pub(crate) struct MergeUndo {
    absorbed: ClassId,
    absorbed_term: TermId,
    delta: u32,
    survivor_dmask: u32,
    survivor_card: u32,
    survivor_parents_len: usize,
    survivor_thvar: Option<(TheoryKind, ThVar)>,
    reindexed: Vec<TermId>,
    distinct_regs: Vec<DistinctReg>,
}

/// Undo-trail entry. Entries are undone in exact reverse order.
enum TrailOp {
    /// An edge was pushed (and possibly a merge performed).
    Edge,
    /// A term was interned and attached.
    TermAttached(TermId),
    /// A Boolean atom was registered.
    AtomAttached(TermId),
    /// A theory variable was attached to a class.
    ThVarAttached {
        class: ClassId,
        prev: Option<(TheoryKind, ThVar)>,
    },
}

/// Checkpoint saved by [`Egraph::push`].
struct Checkpoint {
    nterms: usize,
    trail_len: usize,
    prop_len: usize,
}

/// The congruence-closure core.
pub struct Egraph {
    pub(crate) terms: TermTable,
    pub(crate) classes: ClassTable,
    pub(crate) edges: EdgeStack,
    pub(crate) cong: CongruenceTable,
    pub(crate) dtable: DistinctTable,
    pub(crate) satellites: BTreeMap<TheoryKind, Box<dyn Satellite>>,
    atoms: HashMap<TermId, Lit>,

    merges: Vec<Option<MergeUndo>>,
    trail: Vec<TrailOp>,
    checkpoints: Vec<Checkpoint>,
    constants: Vec<TermId>,
    pending: VecDeque<PendingEq>,

    // Implied-literal log: (literal, atom occurrence, value occurrence).
    prop_log: Vec<(Lit, Occ, Occ)>,
    prop_reasons: HashMap<Lit, (Occ, Occ)>,
    prop_cursor: usize,

    // Explanation scratch, reset between uses (re-entry is forbidden).
    pub(crate) expl_queue: Vec<EdgeId>,
    pub(crate) term_mark: Vec<bool>,
    pub(crate) imap: HashMap<u32, Occ>,
}

impl Egraph {
    /// Fresh e-graph holding only the boolean constants.
    #[must_use]
    pub fn new() -> Self {
        let terms = TermTable::new();
        let mut classes = ClassTable::new();
        let mut cong = CongruenceTable::new();
        let c = classes.add_singleton(TRUE_TERM, Sort::Bool, true);
        debug_assert_eq!(c, BOOL_CLASS);
        cong.register_term(TRUE_TERM);
        Self {
            terms,
            classes,
            edges: EdgeStack::new(),
            cong,
            dtable: DistinctTable::new(),
            satellites: BTreeMap::new(),
            atoms: HashMap::new(),
            merges: Vec::new(),
            trail: Vec::new(),
            checkpoints: Vec::new(),
            constants: Vec::new(),
            pending: VecDeque::new(),
            prop_log: Vec::new(),
            prop_reasons: HashMap::new(),
            prop_cursor: 0,
            expl_queue: Vec::new(),
            term_mark: Vec::new(),
            imap: HashMap::new(),
        }
    }

    // ------------------------------------------------------------------
    // Term construction (interning + attachment)
    // ------------------------------------------------------------------

    fn attach(&mut self, t: TermId) {
        let kind = self.terms.kind(t);
        let sort = self.terms.sort(t);
        let is_const = matches!(kind, TermKind::Constant { .. });
        self.classes.add_singleton(t, sort, is_const);
        self.cong.register_term(t);
        self.trail.push(TrailOp::TermAttached(t));
        if is_const {
            self.constants.push(t);
        }
        if kind.is_composite() {
            for c in self.child_classes(t) {
                self.classes.class_mut(c).parents.push(t);
            }
            self.index_composite(t);
        }
        let _outcome = self.process_pending();
        // A freshly attached composite has a singleton class: nothing can be
        // disequal to it yet, so the fixpoint cannot conflict.
        debug_assert!(_outcome.is_ok());
    }

    /// Distinct classes of `t`'s children, in first-occurrence order.
    fn child_classes(&self, t: TermId) -> Vec<ClassId> {
        let mut out: Vec<ClassId> = Vec::new();
        for &x in self.terms.children(t) {
            let c = self.classes.class_of(x);
            if !out.contains(&c) {
                out.push(c);
            }
        }
        out
    }

    fn intern_result(&mut self, r: Result<TermId>) -> Result<TermId> {
        let t = r?;
        if (t.0 as usize) >= self.classes.len_terms() {
            self.attach(t);
        }
        Ok(t)
    }

    /// Mint and attach a fresh variable.
    pub fn variable(&mut self, sort: Sort) -> TermId {
        let t = self.terms.variable(sort);
        self.attach(t);
        t
    }

    /// Intern and attach a constant.
    ///
    /// # Errors
    /// Boolean constants are builtin; see [`TermTable::constant`].
    pub fn constant(&mut self, sort: Sort, index: u32) -> Result<TermId> {
        let r = self.terms.constant(sort, index);
        self.intern_result(r)
    }

    /// Intern and attach `(f a_1 ... a_n)`.
    ///
    /// # Errors
    /// See [`TermTable::apply`].
    pub fn apply(&mut self, f: Occ, args: &[Occ], sort: Sort) -> Result<TermId> {
        let r = self.terms.apply(f, args, sort);
        self.intern_result(r)
    }

    /// Intern and attach `(eq a b)`.
    ///
    /// # Errors
    /// See [`TermTable::eq`].
    pub fn eq(&mut self, a: Occ, b: Occ) -> Result<TermId> {
        let r = self.terms.eq(a, b);
        self.intern_result(r)
    }

    /// Intern and attach `(ite c a b)`.
    ///
    /// # Errors
    /// See [`TermTable::ite`].
    pub fn ite(&mut self, c: Occ, a: Occ, b: Occ) -> Result<TermId> {
        let r = self.terms.ite(c, a, b);
        self.intern_result(r)
    }

    /// Intern and attach `(or a_1 ... a_n)`.
    ///
    /// # Errors
    /// See [`TermTable::or`].
    pub fn or(&mut self, children: &[Occ]) -> Result<TermId> {
        let r = self.terms.or(children);
        self.intern_result(r)
    }

    /// Intern and attach `(distinct a_1 ... a_n)`.
    ///
    /// # Errors
    /// See [`TermTable::distinct`].
    pub fn distinct(&mut self, children: &[Occ]) -> Result<TermId> {
        let r = self.terms.distinct(children);
        self.intern_result(r)
    }

    /// Intern and attach a tuple.
    ///
    /// # Errors
    /// See [`TermTable::tuple`].
    pub fn tuple(&mut self, children: &[Occ], sort: Sort) -> Result<TermId> {
        let r = self.terms.tuple(children, sort);
        self.intern_result(r)
    }

    /// Intern and attach `(update f a_1 ... a_n v)`.
    ///
    /// # Errors
    /// See [`TermTable::update`].
    pub fn update(&mut self, f: Occ, args: &[Occ], v: Occ) -> Result<TermId> {
        let r = self.terms.update(f, args, v);
        self.intern_result(r)
    }

    // ------------------------------------------------------------------
    // Attachment of atoms and theory variables
    // ------------------------------------------------------------------

    /// Register the Boolean literal standing for atom `t` (positive literal
    /// means "`t` is true"). Implied immediately when the atom's class is
    /// already decided.
    pub fn attach_atom(&mut self, t: TermId, lit: Lit) {
        assert!(
            self.terms.sort(t).is_bool(),
            "atom {t} is not a boolean term"
        );
        debug_assert!(!self.atoms.contains_key(&t), "atom attached twice");
        self.atoms.insert(t, lit);
        self.trail.push(TrailOp::AtomAttached(t));
        let l = self.classes.label(t);
        if l.class() == BOOL_CLASS {
            let value = if l.sign() == 0 { Occ::TRUE } else { Occ::FALSE };
            self.push_implied(lit.xor_sign(l.sign()), Occ::pos(t), value);
        }
    }

    /// Attach theory variable `x` to the class of `t`. When the class
    /// already carries a variable of the same theory, the satellite is
    /// notified that the two are equal instead.
    pub fn attach_theory_var(&mut self, t: TermId, kind: TheoryKind, x: ThVar) {
        let c = self.classes.class_of(Occ::pos(t));
        let prev = self.classes.class(c).thvar;
        self.trail.push(TrailOp::ThVarAttached { class: c, prev });
        match prev {
            Some((k0, x0)) => {
                debug_assert_eq!(k0, kind, "theory mismatch on one class");
                if let Some(s) = self.satellites.get_mut(&kind) {
                    s.notify_eq(x0, x);
                }
            }
            None => self.classes.class_mut(c).thvar = Some((kind, x)),
        }
    }

    /// Plug in a satellite solver.
    pub fn register_satellite(&mut self, s: Box<dyn Satellite>) {
        let kind = s.kind();
        let prev = self.satellites.insert(kind, s);
        assert!(prev.is_none(), "two satellites for {kind:?}");
    }

    // ------------------------------------------------------------------
    // Assertions (Boolean solver → e-graph)
    // ------------------------------------------------------------------

    /// Assert `t1 == t2` under literal `lit`.
    pub fn assert_eq(&mut self, t1: Occ, t2: Occ, lit: Lit) -> AssertOutcome {
        assert_eq!(
            self.terms.sort(t1.term()),
            self.terms.sort(t2.term()),
            "equality between incompatible sorts"
        );
        self.pending.push_back(PendingEq {
            lhs: t1,
            rhs: t2,
            ante: Antecedent::Assert(lit),
        });
        self.process_pending()
    }

    /// Assert `t1 != t2` under literal `lit`: the atom `(eq t1 t2)` is set
    /// to false (interning it first if needed).
    pub fn assert_diseq(&mut self, t1: Occ, t2: Occ, lit: Lit) -> AssertOutcome {
        let e = match self.terms.eq(t1, t2) {
            Ok(e) => e,
            Err(err) => panic!("disequality between incompatible sorts: {err}"),
        };
        if (e.0 as usize) >= self.classes.len_terms() {
            self.attach(e);
        }
        self.pending.push_back(PendingEq {
            lhs: Occ::pos(e),
            rhs: Occ::FALSE,
            ante: Antecedent::Assert(lit),
        });
        self.process_pending()
    }

    /// Assert the distinct atom `d` true under literal `lit`.
    pub fn assert_distinct(&mut self, d: TermId, lit: Lit) -> AssertOutcome {
        assert!(
            matches!(self.terms.kind(d), TermKind::Distinct),
            "{d} is not a distinct atom"
        );
        self.pending.push_back(PendingEq {
            lhs: Occ::pos(d),
            rhs: Occ::TRUE,
            ante: Antecedent::Assert(lit),
        });
        self.process_pending()
    }

    /// Assert the distinct atom `d` false under literal `lit`. Conflicts
    /// when every pair of children is already known-disequal.
    pub fn assert_not_distinct(&mut self, d: TermId, lit: Lit) -> AssertOutcome {
        assert!(
            matches!(self.terms.kind(d), TermKind::Distinct),
            "{d} is not a distinct atom"
        );
        self.pending.push_back(PendingEq {
            lhs: Occ::pos(d),
            rhs: Occ::FALSE,
            ante: Antecedent::Assert(lit),
        });
        let out = self.process_pending();
        if !out.is_ok() {
            return out;
        }
        match self.inconsistent_not_distinct(d) {
            Some(v) => AssertOutcome::Conflict(v),
            None => AssertOutcome::Ok,
        }
    }

    /// Equality propagated by a satellite; `token` is expanded on demand
    /// through [`Satellite::expand_explanation`].
    pub fn propagate_theory_eq(
        &mut self,
        t1: TermId,
        t2: TermId,
        kind: TheoryKind,
        token: u64,
    ) -> AssertOutcome {
        self.pending.push_back(PendingEq {
            lhs: Occ::pos(t1),
            rhs: Occ::pos(t2),
            ante: Antecedent::Theory { kind, token },
        });
        self.process_pending()
    }

    /// Drain the literals implied since the last call.
    pub fn propagate(&mut self) -> Vec<Lit> {
        let out = self.prop_log[self.prop_cursor..]
            .iter()
            .map(|&(l, _, _)| l)
            .collect();
        self.prop_cursor = self.prop_log.len();
        out
    }

    /// Reason for a literal this e-graph implied: the asserted literals that
    /// force it. Caller bug to ask about a literal that was never implied.
    pub fn explain(&mut self, lit: Lit) -> Vec<Lit> {
        let (x, v) = *self
            .prop_reasons
            .get(&lit)
            .unwrap_or_else(|| panic!("literal {lit} was not implied by the e-graph"));
        self.explain_equality(x, v)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// `true` when `x` and `y` are proven equal.
    #[inline]
    #[must_use]
    pub fn same_class(&self, x: Occ, y: Occ) -> bool {
        self.classes.same_class(x, y)
    }

    /// `true` when `x` is proven equal to the negation of `y`.
    #[inline]
    #[must_use]
    pub fn opposite(&self, x: Occ, y: Occ) -> bool {
        self.classes.opposite(x, y)
    }

    /// Class of an occurrence.
    #[inline]
    #[must_use]
    pub fn class_of(&self, x: Occ) -> ClassId {
        self.classes.class_of(x)
    }

    /// Label of an occurrence.
    #[inline]
    #[must_use]
    pub fn label_of(&self, x: Occ) -> Label {
        self.classes.label_occ(x)
    }

    /// Truth value of a boolean occurrence, when decided.
    #[must_use]
    pub fn bool_value(&self, x: Occ) -> Option<bool> {
        let l = self.classes.label_occ(x);
        if l == Label::TRUE {
            Some(true)
        } else if l == Label::FALSE {
            Some(false)
        } else {
            None
        }
    }

    /// `true` when the classes of `x` and `y` are known disequal (dmask
    /// intersection, or a false `eq` composite spanning them).
    #[must_use]
    pub fn known_diseq(&self, x: Occ, y: Occ) -> bool {
        if self.classes.opposite(x, y) {
            return true;
        }
        let (c1, c2) = (self.classes.class_of(x), self.classes.class_of(y));
        if c1 == c2 {
            return false;
        }
        if self.classes.class(c1).dmask & self.classes.class(c2).dmask != 0 {
            return true;
        }
        self.find_false_eq(x, y).is_some()
    }

    /// Shared term table access.
    #[inline]
    #[must_use]
    pub fn terms(&self) -> &TermTable {
        &self.terms
    }

    /// dmask of the class of `x`.
    #[inline]
    #[must_use]
    pub fn dmask_of(&self, x: Occ) -> u32 {
        self.classes.class(self.classes.class_of(x)).dmask
    }

    /// Number of congruence-table representatives.
    #[inline]
    #[must_use]
    pub fn num_congruence_entries(&self) -> usize {
        self.cong.len()
    }

    /// Activity counter of edge `i`.
    #[inline]
    #[must_use]
    pub fn edge_activity(&self, i: EdgeId) -> u8 {
        self.edges.activity(i)
    }

    /// Number of edges currently on the stack.
    #[inline]
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of attached terms.
    #[inline]
    #[must_use]
    pub fn num_terms(&self) -> usize {
        self.classes.len_terms()
    }

    /// Number of live equivalence classes (absorbed records excluded).
    #[must_use]
    pub fn num_classes(&self) -> usize {
        (0..self.classes.len())
            .filter(|&i| {
                let c = ClassId(u32::try_from(i).unwrap_or(u32::MAX));
                self.classes.label(self.classes.class(c).root).class() == c
            })
            .count()
    }

    // ------------------------------------------------------------------
    // Checkpointing
    // ------------------------------------------------------------------

    /// Save a checkpoint.
    pub fn push(&mut self) {
        self.checkpoints.push(Checkpoint {
            nterms: self.terms.len(),
            trail_len: self.trail.len(),
            prop_len: self.prop_log.len(),
        });
    }

    /// Undo everything since the `n`-th most recent checkpoint, exactly.
    pub fn pop(&mut self, n: u32) {
        for _ in 0..n {
            let cp = match self.checkpoints.pop() {
                Some(cp) => cp,
                None => panic!("pop without matching push"),
            };
            while self.trail.len() > cp.trail_len {
                let op = self.trail.pop();
                match op {
                    Some(op) => self.undo_op(op),
                    None => unreachable!("trail shorter than checkpoint"),
                }
            }
            self.terms.truncate(cp.nterms);
            self.cong.truncate(cp.nterms);
            self.prop_log.truncate(cp.prop_len);
            self.prop_reasons.clear();
            for &(l, x, v) in &self.prop_log {
                self.prop_reasons.insert(l, (x, v));
            }
            self.prop_cursor = self.prop_cursor.min(self.prop_log.len());
        }
    }

    fn undo_op(&mut self, op: TrailOp) {
        match op {
            TrailOp::Edge => {
                let top = self.edges.len() - 1;
                let undo = self.merges.pop();
                match undo {
                    Some(Some(mu)) => self.undo_merge(mu),
                    Some(None) => {}
                    None => unreachable!("merge records out of sync"),
                }
                self.edges.truncate(top);
            }
            TrailOp::TermAttached(t) => {
                self.cong.remove(t);
                if self.terms.is_composite(t) {
                    for c in self.child_classes(t) {
                        let popped = self.classes.class_mut(c).parents.pop();
                        debug_assert_eq!(popped, Some(t));
                    }
                }
                if self.terms.is_constant(t) {
                    let popped = self.constants.pop();
                    debug_assert_eq!(popped, Some(t));
                }
                self.classes.pop_class(self.classes.label(t).class());
            }
            TrailOp::AtomAttached(t) => {
                self.atoms.remove(&t);
            }
            TrailOp::ThVarAttached { class, prev } => {
                self.classes.class_mut(class).thvar = prev;
            }
        }
    }

    fn undo_merge(&mut self, mu: MergeUndo) {
        let c2 = mu.absorbed;
        let r2 = self.classes.class(c2).root;
        let c1 = self.classes.label(r2).class();
        let r1 = self.classes.class(c1).root;

        for reg in mu.distinct_regs.iter().rev() {
            let bit = 1u32 << reg.bit;
            for &cc in &reg.targets {
                self.classes.class_mut(cc).dmask &= !bit;
            }
            self.dtable.release(reg.bit);
        }

        // Un-splice, then restore the absorbed circle's labels.
        self.classes.splice(r1, r2);
        for x in self.classes.circle_terms(r2) {
            let s = self.classes.label(x).sign();
            self.classes.set_label(x, Label::new(c2, s ^ mu.delta));
        }
        self.classes.set_proof_edge(mu.absorbed_term, None);

        let rec = self.classes.class_mut(c1);
        rec.dmask = mu.survivor_dmask;
        rec.card = mu.survivor_card;
        rec.parents.truncate(mu.survivor_parents_len);
        rec.thvar = mu.survivor_thvar;

        for &p in mu.reindexed.iter().rev() {
            self.cong.remove(p);
            let sig = signature(p, &self.terms, &self.classes);
            let collision = self.cong.insert(p, sig);
            debug_assert!(collision.is_none(), "collision while undoing a merge");
        }
    }

    // ------------------------------------------------------------------
    // Merge fixpoint
    // ------------------------------------------------------------------

    fn process_pending(&mut self) -> AssertOutcome {
        while let Some(p) = self.pending.pop_front() {
            if self.classes.same_class(p.lhs, p.rhs) {
                continue;
            }
            let k = self.edges.push(p.lhs, p.rhs, p.ante);
            self.merges.push(None);
            self.trail.push(TrailOp::Edge);
            if let Some(v) = self.inconsistent_edge(p.lhs, p.rhs, k) {
                self.pending.clear();
                return AssertOutcome::Conflict(v);
            }
            if let Some(v) = self.merge(k, p.lhs, p.rhs) {
                self.pending.clear();
                return AssertOutcome::Conflict(v);
            }
        }
        AssertOutcome::Ok
    }

    /// Merge the classes of `lhs` and `rhs` because of edge `k`. Returns a
    /// conflict vector when a distinct atom turning true has two equal
    /// children.
    fn merge(&mut self, k: EdgeId, lhs: Occ, rhs: Occ) -> Option<Vec<Lit>> {
        let (mut t1, mut t2) = (lhs, rhs);
        let (mut c1, mut c2) = (self.classes.class_of(t1), self.classes.class_of(t2));
        debug_assert_ne!(c1, c2);

        // Orientation: the boolean-constant class always survives; otherwise
        // the smaller class is absorbed into the larger.
        if c2 == BOOL_CLASS
            || (c1 != BOOL_CLASS && self.classes.class(c1).card < self.classes.class(c2).card)
        {
            mem::swap(&mut t1, &mut t2);
            mem::swap(&mut c1, &mut c2);
        }

        let delta = self.classes.label_occ(t1).sign() ^ self.classes.label_occ(t2).sign();
        let r1 = self.classes.class(c1).root;
        let r2 = self.classes.class(c2).root;
        let absorbed_terms = self.classes.circle_terms(r2);

        // Proof forest: re-root the absorbed tree at the edge endpoint, then
        // hang it on edge k.
        self.classes.reroot_proof_tree(t2.term(), &self.edges);
        self.classes.set_proof_edge(t2.term(), Some(k));

        for &x in &absorbed_terms {
            let s = self.classes.label(x).sign();
            self.classes.set_label(x, Label::new(c1, s ^ delta));
        }
        self.classes.splice(r1, r2);

        let (survivor_dmask, survivor_card, survivor_parents_len, survivor_thvar) = {
            let rec = self.classes.class(c1);
            (rec.dmask, rec.card, rec.parents.len(), rec.thvar)
        };
        let absorbed = self.classes.class(c2);
        let d2 = absorbed.dmask;
        let card2 = absorbed.card;
        let absorbed_thvar = absorbed.thvar;
        let absorbed_parents = absorbed.parents.clone();
        debug_assert_eq!(survivor_dmask & d2, 0, "merged classes were disequal");

        {
            let rec = self.classes.class_mut(c1);
            rec.card += card2;
            rec.dmask |= d2;
            rec.parents.extend_from_slice(&absorbed_parents);
        }
        match (survivor_thvar, absorbed_thvar) {
            (Some((th, x1)), Some((th2, x2))) => {
                debug_assert_eq!(th, th2);
                if let Some(s) = self.satellites.get_mut(&th) {
                    s.notify_eq(x1, x2);
                }
            }
            (None, Some(v)) => self.classes.class_mut(c1).thvar = Some(v),
            _ => {}
        }

        let mut mu = MergeUndo {
            absorbed: c2,
            absorbed_term: t2.term(),
            delta,
            survivor_dmask,
            survivor_card,
            survivor_parents_len,
            survivor_thvar,
            reindexed: Vec::new(),
            distinct_regs: Vec::new(),
        };

        // Terms entering the true/false class: implied atoms, equalities
        // carried by true eq composites, distinct registration, satellite
        // disequalities from false eq composites.
        let mut conflict = None;
        if c1 == BOOL_CLASS {
            for &x in &absorbed_terms {
                let sign = self.classes.label(x).sign();
                if let Some(&lit) = self.atoms.get(&x) {
                    let value = if sign == 0 { Occ::TRUE } else { Occ::FALSE };
                    self.push_implied(lit.xor_sign(sign), Occ::pos(x), value);
                }
                match self.terms.kind(x) {
                    TermKind::Eq if sign == 0 => {
                        let ch = self.terms.children(x);
                        let (a, b) = (ch[0], ch[1]);
                        self.pending.push_back(PendingEq {
                            lhs: a,
                            rhs: b,
                            ante: Antecedent::Eq(Occ::pos(x), Occ::TRUE),
                        });
                    }
                    TermKind::Eq => self.notify_diseq_from_false_eq(x),
                    TermKind::Distinct if sign == 0 => {
                        if let Some(v) = self.register_distinct_true(x, &mut mu.distinct_regs) {
                            conflict = Some(v);
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }

        if conflict.is_none() {
            // Re-index the absorbed class's parent composites under their
            // new child labels; collisions are congruence merges.
            for p in absorbed_parents {
                if self.cong.is_stored(p) {
                    self.cong.remove(p);
                    mu.reindexed.push(p);
                    self.index_composite(p);
                }
            }

            if (survivor_dmask | d2) != 0 {
                let parents = self.classes.class(c1).parents.clone();
                for p in parents {
                    if matches!(self.terms.kind(p), TermKind::Eq) {
                        self.try_diseq_eq_atom(p);
                    }
                }
                self.notify_satellites_dmask(c1, survivor_thvar.is_some(), d2, survivor_dmask);
            }
        }

        self.merges[k.index()] = Some(mu);
        conflict
    }

    /// Simplification rules plus congruence-table insertion for a composite
    /// whose child labels just (re)settled.
    fn index_composite(&mut self, t: TermId) {
        let kind = self.terms.kind(t);
        match kind {
            TermKind::Eq => {
                let ch = self.terms.children(t);
                let (a, b) = (ch[0], ch[1]);
                let (la, lb) = (self.classes.label_occ(a), self.classes.label_occ(b));
                if la == lb {
                    self.pending.push_back(PendingEq {
                        lhs: Occ::pos(t),
                        rhs: Occ::TRUE,
                        ante: Antecedent::Eq(a, b),
                    });
                } else if la == lb.flip() {
                    self.pending.push_back(PendingEq {
                        lhs: Occ::pos(t),
                        rhs: Occ::FALSE,
                        ante: Antecedent::Eq(a, b),
                    });
                } else {
                    self.try_diseq_eq_atom(t);
                }
            }
            TermKind::Ite => {
                let ch = self.terms.children(t);
                let (c, a, b) = (ch[0], ch[1], ch[2]);
                let lc = self.classes.label_occ(c);
                if lc == Label::TRUE {
                    self.pending.push_back(PendingEq {
                        lhs: Occ::pos(t),
                        rhs: a,
                        ante: Antecedent::Eq(c, Occ::TRUE),
                    });
                } else if lc == Label::FALSE {
                    self.pending.push_back(PendingEq {
                        lhs: Occ::pos(t),
                        rhs: b,
                        ante: Antecedent::Eq(c, Occ::FALSE),
                    });
                }
            }
            TermKind::Or => self.try_simplify_or(t),
            TermKind::Distinct => {
                if let Some((a, b)) = self.find_equal_children(t) {
                    self.pending.push_back(PendingEq {
                        lhs: Occ::pos(t),
                        rhs: Occ::FALSE,
                        ante: Antecedent::Eq(a, b),
                    });
                }
            }
            _ => {}
        }

        let sig = signature(t, &self.terms, &self.classes);
        if let Some(rep) = self.cong.insert(t, sig) {
            let ante = self.congruence_antecedent(t, rep);
            self.pending.push_back(PendingEq {
                lhs: Occ::pos(t),
                rhs: Occ::pos(rep),
                ante,
            });
        }
    }

    /// Two children of distinct atom `d` sharing a label, if any.
    fn find_equal_children(&mut self, d: TermId) -> Option<(Occ, Occ)> {
        debug_assert!(self.imap.is_empty());
        let mut found = None;
        for &ch in self.terms.children(d) {
            let l = self.classes.label_occ(ch).raw();
            if let Some(&prev) = self.imap.get(&l) {
                found = Some((prev, ch));
                break;
            }
            self.imap.insert(l, ch);
        }
        self.imap.clear();
        found
    }

    /// Or-simplification: a true child makes the disjunction true; children
    /// that are all false (or all false except one shared value) decide it.
    fn try_simplify_or(&mut self, t: TermId) {
        let children: Vec<Occ> = self.terms.children(t).to_vec();
        let mut value: Option<(Label, Occ)> = None;
        for &ch in &children {
            let l = self.classes.label_occ(ch);
            if l == Label::TRUE {
                self.pending.push_back(PendingEq {
                    lhs: Occ::pos(t),
                    rhs: Occ::TRUE,
                    ante: Antecedent::Eq(ch, Occ::TRUE),
                });
                return;
            }
            if l == Label::FALSE {
                continue;
            }
            match value {
                None => value = Some((l, ch)),
                Some((lv, _)) if lv == l => {}
                Some(_) => return, // two undecided values: no simplification
            }
        }
        match value {
            None => self.pending.push_back(PendingEq {
                lhs: Occ::pos(t),
                rhs: Occ::FALSE,
                ante: Antecedent::SimpOr,
            }),
            Some((_, v)) => self.pending.push_back(PendingEq {
                lhs: Occ::pos(t),
                rhs: v,
                ante: Antecedent::SimpOr,
            }),
        }
    }

    /// An `eq` composite over two known-disequal classes is false; the
    /// edge's antecedent names the dmask bit that witnesses it.
    fn try_diseq_eq_atom(&mut self, t: TermId) {
        if self.classes.label(t).class() == BOOL_CLASS {
            return; // already decided
        }
        let ch = self.terms.children(t);
        let (u, v) = (ch[0], ch[1]);
        let (cu, cv) = (self.classes.class_of(u), self.classes.class_of(v));
        if cu == cv {
            return;
        }
        let m = self.classes.class(cu).dmask & self.classes.class(cv).dmask;
        if m == 0 {
            return;
        }
        let bit = m.trailing_zeros();
        let ante = if bit == 0 {
            Antecedent::Distinct0(u, v)
        } else {
            Antecedent::DistinctI {
                bit: u8::try_from(bit).unwrap_or(31),
                a: u,
                b: v,
            }
        };
        self.pending.push_back(PendingEq {
            lhs: Occ::pos(t),
            rhs: Occ::FALSE,
            ante,
        });
    }

    /// Pick the congruence antecedent variant for colliding composites
    /// `t` (edge lhs) and `rep` (edge rhs).
    fn congruence_antecedent(&mut self, t: TermId, rep: TermId) -> Antecedent {
        match self.terms.kind(t) {
            TermKind::Apply | TermKind::Update | TermKind::Tuple => Antecedent::BasicCongruence,
            TermKind::Eq => {
                let a = self.terms.children(t)[0];
                let a2 = self.terms.children(rep)[0];
                if self.classes.label_occ(a) == self.classes.label_occ(a2) {
                    Antecedent::EqCongruence1
                } else {
                    Antecedent::EqCongruence2
                }
            }
            TermKind::Ite => {
                let c = self.terms.children(t)[0];
                let c2 = self.terms.children(rep)[0];
                if self.classes.label_occ(c) == self.classes.label_occ(c2) {
                    Antecedent::IteCongruence1
                } else {
                    Antecedent::IteCongruence2
                }
            }
            TermKind::Or => Antecedent::OrCongruence(self.or_congruence_witnesses(t, rep)),
            TermKind::Distinct => {
                Antecedent::DistinctCongruence(self.distinct_congruence_permutation(t, rep))
            }
            TermKind::Variable | TermKind::Constant { .. } => {
                unreachable!("congruence on a non-composite")
            }
        }
    }

    /// Permutation `p` of `rep`'s children with `label(child_i(t)) ==
    /// label(p[i])`, for the distinct-congruence antecedent.
    fn distinct_congruence_permutation(&mut self, t: TermId, rep: TermId) -> Box<[Occ]> {
        debug_assert!(self.imap.is_empty());
        for &u in self.terms.children(rep) {
            let l = self.classes.label_occ(u).raw();
            let prev = self.imap.insert(l, u);
            debug_assert!(prev.is_none(), "distinct atom with equal children");
        }
        let mut perm = Vec::with_capacity(self.terms.children(t).len());
        for &c in self.terms.children(t) {
            let l = self.classes.label_occ(c).raw();
            match self.imap.get(&l) {
                Some(&u) => perm.push(u),
                None => unreachable!("congruent distincts disagree on labels"),
            }
        }
        self.imap.clear();
        perm.into_boxed_slice()
    }

    /// Witness array for or-congruence: for every child of `t` a child of
    /// `rep` (or false) it equals, then symmetrically for `rep`.
    fn or_congruence_witnesses(&mut self, t: TermId, rep: TermId) -> Box<[Occ]> {
        let n1 = self.terms.children(t).len();
        let n2 = self.terms.children(rep).len();
        let mut out = Vec::with_capacity(n1 + n2);
        self.half_or_witnesses(t, rep, &mut out);
        self.half_or_witnesses(rep, t, &mut out);
        out.into_boxed_slice()
    }

    /// For every child of `of`, find an occurrence among `among`'s children
    /// (or the false constant) that shares its class, by walking proof
    /// paths. Appends to `out`.
    fn half_or_witnesses(&mut self, of: TermId, among: TermId, out: &mut Vec<Occ>) {
        debug_assert!(self.imap.is_empty());
        let ds: Vec<Occ> = self.terms.children(among).to_vec();
        for d in ds {
            self.map_proof_path(d);
        }
        // root(false) falls back to false itself
        self.imap.entry(TRUE_TERM.0).or_insert(Occ::FALSE);
        let cs: Vec<Occ> = self.terms.children(of).to_vec();
        for c in cs {
            out.push(self.find_on_proof_path(c));
        }
        self.imap.clear();
    }

    /// Map every term on the proof path from `t` to its root to `t` (with
    /// running polarity), unless already mapped.
    fn map_proof_path(&mut self, t: Occ) {
        let mut mapped = t.positive();
        let mut u = mapped;
        loop {
            let x = u.term();
            if self.imap.contains_key(&x.0) {
                break;
            }
            self.imap.insert(x.0, mapped);
            let Some(i) = self.classes.proof_edge(x) else {
                break;
            };
            let v = self.edges.next_occ(i, u);
            mapped = mapped.xor_sign(u.raw() ^ v.raw());
            u = v;
        }
    }

    /// Walk the proof path from `t` until a mapped term is found; return its
    /// mapping with polarities adjusted.
    fn find_on_proof_path(&mut self, t: Occ) -> Occ {
        let mut sgn = t.sign();
        let mut u = t;
        loop {
            let x = u.term();
            if let Some(&m) = self.imap.get(&x.0) {
                return m.xor_sign(sgn);
            }
            let i = match self.classes.proof_edge(x) {
                Some(i) => i,
                None => unreachable!("or-congruence witness not on any proof path"),
            };
            let v = self.edges.next_occ(i, u);
            sgn ^= (u.raw() ^ v.raw()) & 1;
            u = v;
        }
    }

    // ------------------------------------------------------------------
    // Distinct registration and satellite notifications
    // ------------------------------------------------------------------

    /// A distinct atom just became true: check its children for an equal
    /// pair (conflict), then allocate a dmask bit or fall back to pairwise
    /// notifications.
    fn register_distinct_true(
        &mut self,
        d: TermId,
        regs: &mut Vec<DistinctReg>,
    ) -> Option<Vec<Lit>> {
        if let Some((a, b)) = self.find_equal_children(d) {
            // (distinct ...) true with two equal children.
            debug_assert!(self.expl_queue.is_empty());
            self.explain_eq_occ(Occ::pos(d), Occ::TRUE);
            self.explain_eq_occ(a, b);
            let mut v = Vec::new();
            self.build_explanation_vector(&mut v);
            return Some(v);
        }

        let children: Vec<Occ> = self.terms.children(d).to_vec();
        match self.dtable.register(d) {
            Some(bit) => {
                let mask = 1u32 << bit;
                let mut targets = Vec::with_capacity(children.len());
                for &ch in &children {
                    let c = self.classes.class_of(ch);
                    self.classes.class_mut(c).dmask |= mask;
                    targets.push(c);
                }
                // Equality atoms over newly-disequal classes turn false.
                for &c in &targets {
                    let parents = self.classes.class(c).parents.clone();
                    for p in parents {
                        if matches!(self.terms.kind(p), TermKind::Eq) {
                            self.try_diseq_eq_atom(p);
                        }
                    }
                }
                let mut vars = Vec::new();
                let mut kind = None;
                for &c in &targets {
                    if let Some((th, x)) = self.classes.class(c).thvar {
                        kind = Some(th);
                        vars.push(x);
                    }
                }
                if let (Some(th), true) = (kind, vars.len() >= 2) {
                    if let Some(s) = self.satellites.get_mut(&th) {
                        s.notify_distinct(&vars);
                    }
                }
                regs.push(DistinctReg { bit, targets });
            }
            None => {
                // dmask budget exhausted: no compact representation, eager
                // pairwise notifications only.
                for i in 0..children.len() {
                    for j in i + 1..children.len() {
                        self.notify_diseq_pair(
                            children[i],
                            children[j],
                            DiseqHint::DistinctTrue(d),
                        );
                    }
                }
            }
        }
        None
    }

    /// `(eq u v)` just turned false: hand the disequality to the satellite
    /// owning the two classes, with its pre-explanation.
    fn notify_diseq_from_false_eq(&mut self, e: TermId) {
        let ch = self.terms.children(e);
        let (u, v) = (ch[0], ch[1]);
        self.notify_diseq_pair(u, v, DiseqHint::EqFalse(e));
    }

    fn notify_diseq_pair(&mut self, u: Occ, v: Occ, hint: DiseqHint) {
        let (cu, cv) = (self.classes.class_of(u), self.classes.class_of(v));
        if cu == cv {
            return;
        }
        let (Some((th1, x1)), Some((th2, x2))) =
            (self.classes.class(cu).thvar, self.classes.class(cv).thvar)
        else {
            return;
        };
        if th1 != th2 {
            return;
        }
        let pre = DiseqPreExpl {
            hint,
            t1: u.term(),
            t2: v.term(),
            u1: u.term(),
            u2: v.term(),
        };
        if let Some(s) = self.satellites.get_mut(&th1) {
            s.notify_diseq(x1, x2, pre);
        }
    }

    /// After a merge extended the survivor's dmask: tell the owning
    /// satellite about disequalities the class gained. `foreign` is the bit
    /// set contributed by the side that did not carry the theory variable.
    fn notify_satellites_dmask(&mut self, c: ClassId, var_from_survivor: bool, d2: u32, d1: u32) {
        let Some((th, xm)) = self.classes.class(c).thvar else {
            return;
        };
        let foreign = if var_from_survivor { d2 } else { d1 };
        if foreign == 0 {
            return;
        }
        let root = self.classes.class(c).root;

        for bit in 1..32u8 {
            if foreign & (1u32 << bit) == 0 {
                continue;
            }
            let Some(d) = self.dtable.atom(bit) else {
                continue;
            };
            let u1 = match self.find_equal_child(d, Occ::pos(root)) {
                Some(u1) => u1,
                None => continue,
            };
            let children: Vec<Occ> = self.terms.children(d).to_vec();
            for ch in children {
                let cc = self.classes.class_of(ch);
                if cc == c {
                    continue;
                }
                let Some((th2, x2)) = self.classes.class(cc).thvar else {
                    continue;
                };
                if th2 != th {
                    continue;
                }
                let pre = DiseqPreExpl {
                    hint: DiseqHint::DistinctTrue(d),
                    t1: root,
                    t2: self.classes.class(cc).root,
                    u1,
                    u2: ch.term(),
                };
                if let Some(s) = self.satellites.get_mut(&th) {
                    s.notify_diseq(xm, x2, pre);
                }
            }
        }

        if foreign & 1 != 0 {
            // The class now holds a constant: disequal to every other
            // constant-bearing class.
            let u1 = self.constant_in_class(Occ::pos(root)).term();
            let mut seen: Vec<ClassId> = Vec::new();
            let consts = self.constants.clone();
            for cst in consts {
                let cc = self.classes.class_of(Occ::pos(cst));
                if cc == c || seen.contains(&cc) {
                    continue;
                }
                seen.push(cc);
                let Some((th2, x2)) = self.classes.class(cc).thvar else {
                    continue;
                };
                if th2 != th {
                    continue;
                }
                let pre = DiseqPreExpl {
                    hint: DiseqHint::Constants,
                    t1: root,
                    t2: self.classes.class(cc).root,
                    u1,
                    u2: cst,
                };
                if let Some(s) = self.satellites.get_mut(&th) {
                    s.notify_diseq(xm, x2, pre);
                }
            }
        }
    }

    pub(crate) fn push_implied(&mut self, lit: Lit, atom: Occ, value: Occ) {
        self.prop_log.push((lit, atom, value));
        self.prop_reasons.insert(lit, (atom, value));
    }
}

impl Default for Egraph {
    fn default() -> Self {
        Self::new()
    }
}
