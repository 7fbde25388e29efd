// crates/quotient-core/src/term.rs

//! Interned term table.
//!
//! Terms are append-only: ids are dense indices, term 0 is the boolean
//! constant `true`, and the only removal path is [`TermTable::truncate`],
//! used by the e-graph when a backtrack discards terms interned after a
//! checkpoint. Composites are hash-consed structurally, so re-interning an
//! identical composite returns the existing id.
//!
//! The table performs the sort checks a detached e-graph core can check
//! locally (`eq` children agree, `ite` condition is boolean, ...). Full
//! signature checking for `apply`/`update` belongs to the surrounding type
//! checker, which hands us the result sort.

use crate::ids::{Occ, TermId, TRUE_TERM};
use crate::sort::Sort;
use anyhow::{ensure, Result};
use std::collections::HashMap;

/// Kind of a term. `Apply` through `Update` are composites and carry
/// children; the first child of `Apply` and `Update` is the function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// Free variable (never hash-consed; every call mints a fresh id).
    Variable,
    /// Interpreted constant; two constants of the same sort with different
    /// `index` are semantically distinct (dmask bit 0 reasoning).
    Constant {
        /// Distinguishes constants within one sort.
        index: u32,
    },
    /// Function application `(f a_1 ... a_n)`.
    Apply,
    /// Equality atom `(eq a b)`.
    Eq,
    /// If-then-else `(ite c a b)`.
    Ite,
    /// Boolean disjunction `(or a_1 ... a_n)`.
    Or,
    /// Pairwise-distinct atom `(distinct a_1 ... a_n)`.
    Distinct,
    /// Tuple constructor.
    Tuple,
    /// Function update `(update f a_1 ... a_n v)`.
    Update,
}

impl TermKind {
    /// `true` for kinds that carry children.
    #[inline]
    #[must_use]
    pub const fn is_composite(self) -> bool {
        !matches!(self, Self::Variable | Self::Constant { .. })
    }
}

#[derive(Clone, Debug)]
struct Term {
    kind: TermKind,
    sort: Sort,
    children: Box<[Occ]>,
}

/// Append-only interned term store.
#[derive(Clone, Debug)]
pub struct TermTable {
    terms: Vec<Term>,
    // Structural hash-consing for constants and composites.
    interned: HashMap<(TermKind, Sort, Box<[Occ]>), TermId>,
}

impl TermTable {
    /// Fresh table holding only the boolean constant `true` (term 0).
    #[must_use]
    pub fn new() -> Self {
        let mut t = Self {
            terms: Vec::new(),
            interned: HashMap::new(),
        };
        let id = t.push(TermKind::Constant { index: 0 }, Sort::Bool, Box::new([]));
        debug_assert_eq!(id, TRUE_TERM);
        t
    }

    fn push(&mut self, kind: TermKind, sort: Sort, children: Box<[Occ]>) -> TermId {
        let id = TermId(u32::try_from(self.terms.len()).unwrap_or(u32::MAX));
        if !matches!(kind, TermKind::Variable) {
            self.interned.insert((kind, sort, children.clone()), id);
        }
        self.terms.push(Term {
            kind,
            sort,
            children,
        });
        id
    }

    fn intern(&mut self, kind: TermKind, sort: Sort, children: Box<[Occ]>) -> TermId {
        let key = (kind, sort, children);
        if let Some(&id) = self.interned.get(&key) {
            return id;
        }
        self.push(key.0, key.1, key.2)
    }

    /// Mint a fresh free variable of the given sort.
    pub fn variable(&mut self, sort: Sort) -> TermId {
        self.push(TermKind::Variable, sort, Box::new([]))
    }

    /// Intern the `index`-th constant of a non-boolean sort.
    ///
    /// # Errors
    /// The boolean constants are builtin (`true` is term 0, `false` its
    /// negative occurrence); interning further boolean constants is refused.
    pub fn constant(&mut self, sort: Sort, index: u32) -> Result<TermId> {
        ensure!(!sort.is_bool(), "boolean constants are builtin");
        Ok(self.intern(TermKind::Constant { index }, sort, Box::new([])))
    }

    /// Intern `(f a_1 ... a_n)` with caller-supplied result sort.
    ///
    /// # Errors
    /// `f` must have the function sort and at least one argument is required.
    pub fn apply(&mut self, f: Occ, args: &[Occ], sort: Sort) -> Result<TermId> {
        ensure!(
            self.sort(f.term()) == Sort::Function,
            "apply head {} is not a function",
            f.term()
        );
        ensure!(!args.is_empty(), "apply needs at least one argument");
        let mut children = Vec::with_capacity(args.len() + 1);
        children.push(f);
        children.extend_from_slice(args);
        Ok(self.intern(TermKind::Apply, sort, children.into_boxed_slice()))
    }

    /// Intern the equality atom `(eq a b)`.
    ///
    /// # Errors
    /// Both sides must have the same sort.
    pub fn eq(&mut self, a: Occ, b: Occ) -> Result<TermId> {
        let sa = self.sort(a.term());
        let sb = self.sort(b.term());
        ensure!(sa == sb, "eq between sorts {sa} and {sb}");
        Ok(self.intern(TermKind::Eq, Sort::Bool, Box::new([a, b])))
    }

    /// Intern `(ite c a b)`.
    ///
    /// # Errors
    /// `c` must be boolean and the branches must agree on sort.
    pub fn ite(&mut self, c: Occ, a: Occ, b: Occ) -> Result<TermId> {
        ensure!(self.sort(c.term()).is_bool(), "ite condition is not boolean");
        let sa = self.sort(a.term());
        let sb = self.sort(b.term());
        ensure!(sa == sb, "ite branches have sorts {sa} and {sb}");
        Ok(self.intern(TermKind::Ite, sa, Box::new([c, a, b])))
    }

    /// Intern `(or a_1 ... a_n)`, n ≥ 2.
    ///
    /// # Errors
    /// All children must be boolean.
    pub fn or(&mut self, children: &[Occ]) -> Result<TermId> {
        ensure!(children.len() >= 2, "or needs at least two disjuncts");
        for &c in children {
            ensure!(
                self.sort(c.term()).is_bool(),
                "or child {} is not boolean",
                c.term()
            );
        }
        Ok(self.intern(TermKind::Or, Sort::Bool, children.into()))
    }

    /// Intern `(distinct a_1 ... a_n)`, n ≥ 2, over positive non-boolean
    /// occurrences of a single sort.
    ///
    /// # Errors
    /// Mixed sorts, boolean children or negative occurrences are refused.
    pub fn distinct(&mut self, children: &[Occ]) -> Result<TermId> {
        ensure!(children.len() >= 2, "distinct needs at least two children");
        let sort = self.sort(children[0].term());
        ensure!(!sort.is_bool(), "distinct over booleans is not supported");
        for &c in children {
            ensure!(!c.is_neg(), "distinct child {c} must be a positive occurrence");
            let s = self.sort(c.term());
            ensure!(s == sort, "distinct mixes sorts {sort} and {s}");
        }
        Ok(self.intern(TermKind::Distinct, Sort::Bool, children.into()))
    }

    /// Intern a tuple with a caller-declared sort.
    ///
    /// # Errors
    /// An empty tuple is refused.
    pub fn tuple(&mut self, children: &[Occ], sort: Sort) -> Result<TermId> {
        ensure!(!children.is_empty(), "tuple needs at least one component");
        Ok(self.intern(TermKind::Tuple, sort, children.into()))
    }

    /// Intern `(update f a_1 ... a_n v)`: the function equal to `f`
    /// everywhere except at `(a_1 ... a_n)`, where it returns `v`.
    ///
    /// # Errors
    /// `f` must have the function sort and at least one index is required.
    pub fn update(&mut self, f: Occ, args: &[Occ], v: Occ) -> Result<TermId> {
        ensure!(
            self.sort(f.term()) == Sort::Function,
            "update head {} is not a function",
            f.term()
        );
        ensure!(!args.is_empty(), "update needs at least one index");
        let mut children = Vec::with_capacity(args.len() + 2);
        children.push(f);
        children.extend_from_slice(args);
        children.push(v);
        Ok(self.intern(TermKind::Update, Sort::Function, children.into_boxed_slice()))
    }

    /// Kind of `t`.
    #[inline]
    #[must_use]
    pub fn kind(&self, t: TermId) -> TermKind {
        self.terms[t.0 as usize].kind
    }

    /// Sort of `t`.
    #[inline]
    #[must_use]
    pub fn sort(&self, t: TermId) -> Sort {
        self.terms[t.0 as usize].sort
    }

    /// Children of `t` (empty for variables and constants).
    #[inline]
    #[must_use]
    pub fn children(&self, t: TermId) -> &[Occ] {
        &self.terms[t.0 as usize].children
    }

    /// `true` when `t` is a composite.
    #[inline]
    #[must_use]
    pub fn is_composite(&self, t: TermId) -> bool {
        self.kind(t).is_composite()
    }

    /// `true` when `t` is a constant.
    #[inline]
    #[must_use]
    pub fn is_constant(&self, t: TermId) -> bool {
        matches!(self.kind(t), TermKind::Constant { .. })
    }

    /// Number of interned terms.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// `true` when the table is empty (never, in practice: term 0 is builtin).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Discard every term with id ≥ `n`. Used by backtracking; the caller is
    /// responsible for having removed those terms from its own indexes.
    pub fn truncate(&mut self, n: usize) {
        for t in self.terms.drain(n..) {
            if !matches!(t.kind, TermKind::Variable) {
                self.interned.remove(&(t.kind, t.sort, t.children));
            }
        }
    }
}

impl Default for TermTable {
    fn default() -> Self {
        Self::new()
    }
}
