// crates/quotient-script/src/naive.rs

//! Naive quadratic congruence closure, used as a differential oracle.
//!
//! No explanations, no incrementality, no dmasks: just union-find over the
//! term table plus a congruence fixpoint, then a scan for violated
//! disequalities. Deliberately written in the most obvious way so its
//! verdicts can be trusted against the incremental engine.

use std::collections::HashMap;

use quotient_core::{Occ, TermId, TermKind, TermTable};

/// An asserted constraint, in oracle form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// `x == y`.
    Eq(Occ, Occ),
    /// `x != y`.
    Diseq(Occ, Occ),
    /// The distinct atom holds.
    DistinctTrue(TermId),
    /// The distinct atom does not hold.
    DistinctFalse(TermId),
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut r = x;
        while self.parent[r] != r {
            r = self.parent[r];
        }
        let mut c = x;
        while self.parent[c] != r {
            let next = self.parent[c];
            self.parent[c] = r;
            c = next;
        }
        r
    }

    /// Union; returns `true` when the two were separate.
    fn union(&mut self, x: usize, y: usize) -> bool {
        let (rx, ry) = (self.find(x), self.find(y));
        if rx == ry {
            return false;
        }
        self.parent[ry] = rx;
        true
    }
}

/// Equality + congruence closure of `constraints` over the term table.
fn close(terms: &TermTable, constraints: &[Constraint]) -> UnionFind {
    let n = terms.len();
    let mut uf = UnionFind::new(n);

    for c in constraints {
        if let Constraint::Eq(x, y) = c {
            uf.union(x.term().0 as usize, y.term().0 as usize);
        }
    }

    // Congruence fixpoint: same kind, same child roots => same class.
    loop {
        let mut changed = false;
        let mut sig: HashMap<(u32, Vec<usize>), usize> = HashMap::new();
        for t in 0..n {
            let id = TermId(u32::try_from(t).unwrap_or(u32::MAX));
            let tag = match terms.kind(id) {
                TermKind::Apply => 1,
                TermKind::Tuple => 2,
                TermKind::Update => 3,
                _ => continue,
            };
            let key: Vec<usize> = terms
                .children(id)
                .iter()
                .map(|ch| uf.find(ch.term().0 as usize))
                .collect();
            match sig.get(&(tag, key.clone())) {
                Some(&other) => {
                    if uf.union(other, t) {
                        changed = true;
                    }
                }
                None => {
                    sig.insert((tag, key), t);
                }
            }
        }
        if !changed {
            break;
        }
    }
    uf
}

/// Do the equalities in `constraints` (with congruence) entail `a == b`?
/// Disequality constraints play no part.
#[must_use]
pub fn entailed_eq(terms: &TermTable, constraints: &[Constraint], a: Occ, b: Occ) -> bool {
    let mut uf = close(terms, constraints);
    uf.find(a.term().0 as usize) == uf.find(b.term().0 as usize)
}

/// Satisfiability of `constraints` over `terms`, by exhaustive closure.
///
/// Congruence is computed for `apply`/`tuple`/`update` composites. The
/// constraints are expected over non-boolean terms (polarities are
/// ignored), which is what the script generator produces.
#[must_use]
pub fn check_sat(terms: &TermTable, constraints: &[Constraint]) -> bool {
    let mut uf = close(terms, constraints);
    let n = terms.len();

    // A constant representative per root; two different constants in one
    // class is a conflict.
    let mut constant_of: HashMap<usize, TermId> = HashMap::new();
    for t in 0..n {
        let id = TermId(u32::try_from(t).unwrap_or(u32::MAX));
        if terms.is_constant(id) {
            let r = uf.find(t);
            match constant_of.get(&r) {
                Some(&other) if other != id => return false,
                _ => {
                    constant_of.insert(r, id);
                }
            }
        }
    }

    let mut root = |x: Occ| uf.find(x.term().0 as usize);

    for c in constraints {
        match *c {
            Constraint::Diseq(x, y) => {
                if root(x) == root(y) {
                    return false;
                }
            }
            Constraint::DistinctTrue(d) => {
                let ch = terms.children(d);
                for i in 0..ch.len() {
                    for j in i + 1..ch.len() {
                        if root(ch[i]) == root(ch[j]) {
                            return false;
                        }
                    }
                }
            }
            _ => {}
        }
    }

    // A falsified distinct atom needs at least one equal pair to be
    // satisfiable; if every pair is provably disequal, conflict.
    for c in constraints {
        let Constraint::DistinctFalse(d) = *c else {
            continue;
        };
        let ch = terms.children(d);
        let mut all_pairs_diseq = true;
        'pairs: for i in 0..ch.len() {
            for j in i + 1..ch.len() {
                if !provably_diseq(terms, &mut uf, constraints, &constant_of, ch[i], ch[j]) {
                    all_pairs_diseq = false;
                    break 'pairs;
                }
            }
        }
        if all_pairs_diseq {
            return false;
        }
    }

    true
}

fn provably_diseq(
    terms: &TermTable,
    uf: &mut UnionFind,
    constraints: &[Constraint],
    constant_of: &HashMap<usize, TermId>,
    a: Occ,
    b: Occ,
) -> bool {
    let (ra, rb) = (uf.find(a.term().0 as usize), uf.find(b.term().0 as usize));
    if ra == rb {
        return false;
    }
    if constant_of.contains_key(&ra) && constant_of.contains_key(&rb) {
        return true;
    }
    for c in constraints {
        match *c {
            Constraint::Diseq(u, v) => {
                let (ru, rv) = (uf.find(u.term().0 as usize), uf.find(v.term().0 as usize));
                if (ru, rv) == (ra, rb) || (ru, rv) == (rb, ra) {
                    return true;
                }
            }
            Constraint::DistinctTrue(d) => {
                let ch = terms.children(d);
                let in_a = ch.iter().any(|x| uf.find(x.term().0 as usize) == ra);
                let in_b = ch.iter().any(|x| uf.find(x.term().0 as usize) == rb);
                if in_a && in_b {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotient_core::Sort;

    const U: Sort = Sort::Uninterpreted(0);

    #[test]
    fn transitivity_and_congruence() {
        let mut terms = TermTable::new();
        let a = Occ::pos(terms.variable(U));
        let b = Occ::pos(terms.variable(U));
        let f = Occ::pos(terms.variable(Sort::Function));
        let fa = Occ::pos(terms.apply(f, &[a], U).expect("apply"));
        let fb = Occ::pos(terms.apply(f, &[b], U).expect("apply"));

        assert!(check_sat(&terms, &[Constraint::Eq(a, b)]));
        assert!(!check_sat(
            &terms,
            &[Constraint::Eq(a, b), Constraint::Diseq(fa, fb)]
        ));
    }

    #[test]
    fn distinct_constants_conflict() {
        let mut terms = TermTable::new();
        let c0 = Occ::pos(terms.constant(U, 0).expect("const"));
        let c1 = Occ::pos(terms.constant(U, 1).expect("const"));
        assert!(!check_sat(&terms, &[Constraint::Eq(c0, c1)]));
    }

    #[test]
    fn falsified_distinct_needs_an_equal_pair() {
        let mut terms = TermTable::new();
        let x = Occ::pos(terms.variable(U));
        let y = Occ::pos(terms.variable(U));
        let d = terms.distinct(&[x, y]).expect("distinct");
        assert!(check_sat(&terms, &[Constraint::DistinctFalse(d)]));
        assert!(!check_sat(
            &terms,
            &[Constraint::DistinctFalse(d), Constraint::Diseq(x, y)]
        ));
    }
}
