// crates/quotient-egraph/src/congruence.rs

//! Congruence table: hash table keyed by (kind, child-label tuple).
//!
//! Each composite is indexed under the signature computed from its current
//! child labels. A collision means the two composites are congruent; the
//! caller merges their classes and the newcomer stays out of the table (its
//! signature can never diverge from the winner's while the merge stands).
//!
//! Signatures normalise symmetric structure so congruent-but-reordered
//! composites collide: `eq` children are sorted by label, an `ite` with a
//! negative condition label flips the condition and crosses the branches,
//! `or` signatures drop false children and deduplicate, `distinct`
//! signatures sort.

use quotient_core::{Label, Occ, Sort, TermId, TermKind, TermTable};
use std::collections::HashMap;

use crate::classes::ClassTable;

/// Normalised composite signature (kind tag, sort words, child labels).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Sig(Box<[u32]>);

const TAG_APPLY: u32 = 1;
const TAG_EQ: u32 = 2;
const TAG_ITE: u32 = 3;
const TAG_OR: u32 = 4;
const TAG_DISTINCT: u32 = 5;
const TAG_TUPLE: u32 = 6;
const TAG_UPDATE: u32 = 7;

const fn sort_words(s: Sort) -> (u32, u32) {
    match s {
        Sort::Bool => (0, 0),
        Sort::Arith => (1, 0),
        Sort::BitVector(w) => (2, w),
        Sort::Function => (3, 0),
        Sort::Uninterpreted(k) => (4, k),
    }
}

/// Compute the signature of composite `t` under the current labels.
#[must_use]
pub fn signature(t: TermId, terms: &TermTable, classes: &ClassTable) -> Sig {
    let kind = terms.kind(t);
    let children = terms.children(t);
    let (sd, sp) = sort_words(terms.sort(t));
    let tag = match kind {
        TermKind::Apply => TAG_APPLY,
        TermKind::Eq => TAG_EQ,
        TermKind::Ite => TAG_ITE,
        TermKind::Or => TAG_OR,
        TermKind::Distinct => TAG_DISTINCT,
        TermKind::Tuple => TAG_TUPLE,
        TermKind::Update => TAG_UPDATE,
        TermKind::Variable | TermKind::Constant { .. } => {
            unreachable!("signature of a non-composite")
        }
    };

    let mut words = Vec::with_capacity(children.len() + 3);
    words.push(tag);
    words.push(sd);
    words.push(sp);

    let lab = |x: Occ| classes.label_occ(x).raw();
    match kind {
        TermKind::Eq => {
            let (a, b) = (lab(children[0]), lab(children[1]));
            words.push(a.min(b));
            words.push(a.max(b));
        }
        TermKind::Ite => {
            let c = classes.label_occ(children[0]);
            let (t1, t2) = (lab(children[1]), lab(children[2]));
            if c.sign() == 1 {
                words.push(c.flip().raw());
                words.push(t2);
                words.push(t1);
            } else {
                words.push(c.raw());
                words.push(t1);
                words.push(t2);
            }
        }
        TermKind::Or => {
            let mut ls: Vec<u32> = children
                .iter()
                .map(|&x| lab(x))
                .filter(|&l| l != Label::FALSE.raw())
                .collect();
            ls.sort_unstable();
            ls.dedup();
            words.extend_from_slice(&ls);
        }
        TermKind::Distinct => {
            let mut ls: Vec<u32> = children.iter().map(|&x| lab(x)).collect();
            ls.sort_unstable();
            words.extend_from_slice(&ls);
        }
        _ => words.extend(children.iter().map(|&x| lab(x))),
    }
    Sig(words.into_boxed_slice())
}

/// Signature an `eq` composite over `x` and `y` would have right now. Used
/// to look up a false equality atom between two classes.
#[must_use]
pub fn eq_signature(x: Occ, y: Occ, classes: &ClassTable) -> Sig {
    let (sd, sp) = sort_words(Sort::Bool);
    let (a, b) = (classes.label_occ(x).raw(), classes.label_occ(y).raw());
    Sig(Box::new([TAG_EQ, sd, sp, a.min(b), a.max(b)]))
}

/// The congruence table proper.
#[derive(Debug, Default)]
pub struct CongruenceTable {
    table: HashMap<Sig, TermId>,
    // Per term: the signature under which it is the table representative.
    stored: Vec<Option<Sig>>,
}

impl CongruenceTable {
    /// Fresh empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bookkeeping space for the next interned term.
    pub fn register_term(&mut self, t: TermId) {
        debug_assert_eq!(t.0 as usize, self.stored.len());
        self.stored.push(None);
    }

    /// Index composite `t` under `sig`. Returns the congruence partner when
    /// the slot is taken by a different composite; `t` then stays out of the
    /// table.
    pub fn insert(&mut self, t: TermId, sig: Sig) -> Option<TermId> {
        match self.table.get(&sig) {
            Some(&rep) if rep != t => Some(rep),
            Some(_) => None,
            None => {
                self.table.insert(sig.clone(), t);
                self.stored[t.0 as usize] = Some(sig);
                None
            }
        }
    }

    /// Remove `t`'s table entry if it is a representative. No-op for
    /// composites that lost a congruence collision.
    pub fn remove(&mut self, t: TermId) {
        if let Some(sig) = self.stored[t.0 as usize].take() {
            let removed = self.table.remove(&sig);
            debug_assert_eq!(removed, Some(t));
        }
    }

    /// `true` when `t` is a table representative.
    #[inline]
    #[must_use]
    pub fn is_stored(&self, t: TermId) -> bool {
        self.stored[t.0 as usize].is_some()
    }

    /// Representative composite under `sig`, if any.
    #[inline]
    #[must_use]
    pub fn find(&self, sig: &Sig) -> Option<TermId> {
        self.table.get(sig).copied()
    }

    /// Drop bookkeeping for terms with id ≥ `n` (their entries must already
    /// have been removed).
    pub fn truncate(&mut self, n: usize) {
        debug_assert!(self.stored[n..].iter().all(Option::is_none));
        self.stored.truncate(n);
    }

    /// Number of representatives currently indexed.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// `true` when nothing is indexed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
