// crates/quotient-egraph/tests/satellites.rs

//! Satellite interface: notifications, theory propagation and the
//! two-phase disequality pre-explanations.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use quotient_core::{Lit, Occ, Sort, ThVar};
use quotient_egraph::{
    DiseqHint, DiseqPreExpl, Egraph, Satellite, TheoryExplanation, TheoryKind,
};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Note {
    Eq(ThVar, ThVar),
    Diseq(ThVar, ThVar, DiseqPreExpl),
    Distinct(Vec<ThVar>),
}

type Expansions = Rc<RefCell<HashMap<u64, TheoryExplanation>>>;

/// Records every notification; expands tokens from a shared table so tests
/// can add expansions after registration.
struct Recorder {
    kind: TheoryKind,
    log: Rc<RefCell<Vec<Note>>>,
    expansions: Expansions,
}

impl Recorder {
    fn new(kind: TheoryKind, log: Rc<RefCell<Vec<Note>>>, expansions: Expansions) -> Self {
        Self {
            kind,
            log,
            expansions,
        }
    }
}

impl Satellite for Recorder {
    fn kind(&self) -> TheoryKind {
        self.kind
    }

    fn notify_eq(&mut self, x1: ThVar, x2: ThVar) {
        self.log.borrow_mut().push(Note::Eq(x1, x2));
    }

    fn notify_diseq(&mut self, x1: ThVar, x2: ThVar, pre: DiseqPreExpl) {
        self.log.borrow_mut().push(Note::Diseq(x1, x2, pre));
    }

    fn notify_distinct(&mut self, xs: &[ThVar]) {
        self.log.borrow_mut().push(Note::Distinct(xs.to_vec()));
    }

    fn expand_explanation(&mut self, token: u64) -> TheoryExplanation {
        self.expansions
            .borrow()
            .get(&token)
            .cloned()
            .unwrap_or_else(|| panic!("unknown token {token}"))
    }
}

struct Setup {
    eg: Egraph,
    log: Rc<RefCell<Vec<Note>>>,
    expansions: Expansions,
}

fn setup(kind: TheoryKind) -> Setup {
    let log = Rc::new(RefCell::new(Vec::new()));
    let expansions: Expansions = Rc::new(RefCell::new(HashMap::new()));
    let mut eg = Egraph::new();
    eg.register_satellite(Box::new(Recorder::new(kind, log.clone(), expansions.clone())));
    Setup { eg, log, expansions }
}

fn lits(mut v: Vec<Lit>) -> Vec<Lit> {
    v.sort_unstable();
    v.dedup();
    v
}

#[test]
fn merging_var_classes_notifies_eq() {
    let Setup { mut eg, log, .. } = setup(TheoryKind::Arith);

    let a = eg.variable(Sort::Arith);
    let b = eg.variable(Sort::Arith);
    eg.attach_theory_var(a, TheoryKind::Arith, ThVar(0));
    eg.attach_theory_var(b, TheoryKind::Arith, ThVar(1));

    assert!(eg
        .assert_eq(Occ::pos(a), Occ::pos(b), Lit::pos(1))
        .is_ok());
    assert_eq!(log.borrow().as_slice(), &[Note::Eq(ThVar(0), ThVar(1))]);
}

#[test]
fn false_eq_composite_notifies_diseq_with_pre_explanation() {
    let Setup { mut eg, log, .. } = setup(TheoryKind::Arith);

    let a = eg.variable(Sort::Arith);
    let b = eg.variable(Sort::Arith);
    eg.attach_theory_var(a, TheoryKind::Arith, ThVar(0));
    eg.attach_theory_var(b, TheoryKind::Arith, ThVar(1));

    assert!(eg
        .assert_diseq(Occ::pos(a), Occ::pos(b), Lit::pos(1))
        .is_ok());

    let pre = {
        let notes = log.borrow();
        match notes.first() {
            Some(Note::Diseq(x1, x2, pre)) => {
                assert_eq!((*x1, *x2), (ThVar(0), ThVar(1)));
                *pre
            }
            other => panic!("no diseq notification: {other:?}"),
        }
    };
    assert!(matches!(pre.hint, DiseqHint::EqFalse(_)));

    // Lazy expansion of the stored pre-explanation.
    assert_eq!(lits(eg.expand_diseq_pre_expl(&pre)), vec![Lit::pos(1)]);
}

#[test]
fn distinct_assertion_notifies_all_theory_vars() {
    let Setup { mut eg, log, .. } = setup(TheoryKind::Arith);

    let xs: Vec<_> = (0..3).map(|_| eg.variable(Sort::Arith)).collect();
    for (i, &x) in xs.iter().enumerate() {
        eg.attach_theory_var(x, TheoryKind::Arith, ThVar(u32::try_from(i).expect("small")));
    }
    let d = eg
        .distinct(&[Occ::pos(xs[0]), Occ::pos(xs[1]), Occ::pos(xs[2])])
        .expect("distinct");
    assert!(eg.assert_distinct(d, Lit::pos(1)).is_ok());

    assert_eq!(
        log.borrow().as_slice(),
        &[Note::Distinct(vec![ThVar(0), ThVar(1), ThVar(2)])]
    );
}

#[test]
fn constant_classes_notify_diseq_eagerly() {
    let Setup { mut eg, log, .. } = setup(TheoryKind::Arith);

    let zero = Occ::pos(eg.constant(Sort::Arith, 0).expect("const"));
    let one = Occ::pos(eg.constant(Sort::Arith, 1).expect("const"));
    let x = eg.variable(Sort::Arith);
    let y = eg.variable(Sort::Arith);
    eg.attach_theory_var(x, TheoryKind::Arith, ThVar(0));
    eg.attach_theory_var(y, TheoryKind::Arith, ThVar(1));

    assert!(eg.assert_eq(Occ::pos(x), zero, Lit::pos(1)).is_ok());
    assert!(log.borrow().is_empty(), "no counterpart var yet");

    assert!(eg.assert_eq(Occ::pos(y), one, Lit::pos(2)).is_ok());
    let pre = {
        let notes = log.borrow();
        match notes.first() {
            Some(Note::Diseq(_, _, pre)) => *pre,
            other => panic!("no diseq notification: {other:?}"),
        }
    };
    assert_eq!(pre.hint, DiseqHint::Constants);

    assert_eq!(
        lits(eg.expand_diseq_pre_expl(&pre)),
        vec![Lit::pos(1), Lit::pos(2)]
    );
}

#[test]
fn theory_propagation_expands_through_the_satellite() {
    let Setup {
        mut eg,
        expansions,
        ..
    } = setup(TheoryKind::Arith);

    let a = eg.variable(Sort::Arith);
    let b = eg.variable(Sort::Arith);
    let p = eg.variable(Sort::Arith);
    let q = eg.variable(Sort::Arith);

    // The satellite's reason for p == q: its own atom 40 plus a == b.
    expansions.borrow_mut().insert(
        7,
        TheoryExplanation {
            atoms: vec![Lit::pos(40)],
            eqs: vec![(a, b)],
            diseqs: vec![],
        },
    );

    assert!(eg
        .assert_eq(Occ::pos(a), Occ::pos(b), Lit::pos(1))
        .is_ok());
    assert!(eg.propagate_theory_eq(p, q, TheoryKind::Arith, 7).is_ok());
    assert!(eg.same_class(Occ::pos(p), Occ::pos(q)));

    assert_eq!(
        lits(eg.explain_equality(Occ::pos(p), Occ::pos(q))),
        vec![Lit::pos(1), Lit::pos(40)]
    );
}

#[test]
fn theory_diseq_expansion_uses_the_stored_witnesses() {
    let Setup {
        mut eg,
        log,
        expansions,
    } = setup(TheoryKind::Arith);

    let a = eg.variable(Sort::Arith);
    let b = eg.variable(Sort::Arith);
    let p = eg.variable(Sort::Arith);
    let q = eg.variable(Sort::Arith);
    eg.attach_theory_var(a, TheoryKind::Arith, ThVar(0));
    eg.attach_theory_var(b, TheoryKind::Arith, ThVar(1));

    // a != b reaches the satellite with its pre-explanation...
    assert!(eg
        .assert_diseq(Occ::pos(a), Occ::pos(b), Lit::pos(1))
        .is_ok());
    let pre = {
        let notes = log.borrow();
        match notes.first() {
            Some(Note::Diseq(_, _, pre)) => *pre,
            other => panic!("no diseq notification: {other:?}"),
        }
    };

    // ...which it later cites as the reason for its own propagation p == q.
    expansions.borrow_mut().insert(
        9,
        TheoryExplanation {
            atoms: vec![],
            eqs: vec![],
            diseqs: vec![pre],
        },
    );
    assert!(eg.propagate_theory_eq(p, q, TheoryKind::Arith, 9).is_ok());

    assert_eq!(
        lits(eg.explain_equality(Occ::pos(p), Occ::pos(q))),
        vec![Lit::pos(1)]
    );
}
