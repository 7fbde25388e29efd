// crates/quotient-egraph/tests/closure.rs

//! End-to-end closure scenarios: transitivity, congruence, disequalities
//! via constants, distinct conflicts, simplification rules and literal
//! propagation.

use quotient_core::{Lit, Occ, Sort};
use quotient_egraph::{AssertOutcome, Egraph};

const U: Sort = Sort::Uninterpreted(0);

fn lits(mut v: Vec<Lit>) -> Vec<Lit> {
    v.sort_unstable();
    v.dedup();
    v
}

#[test]
fn transitivity_explains_both_steps() {
    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let c = Occ::pos(eg.variable(U));

    assert!(eg.assert_eq(a, b, Lit::pos(1)).is_ok());
    assert!(eg.assert_eq(b, c, Lit::pos(2)).is_ok());

    assert!(eg.same_class(a, c));
    assert_eq!(
        lits(eg.explain_equality(a, c)),
        vec![Lit::pos(1), Lit::pos(2)]
    );
    // Reflexivity costs nothing.
    assert!(eg.same_class(a, a));
    assert!(eg.explain_equality(a, a).is_empty());
}

#[test]
fn congruence_merges_applications() {
    let mut eg = Egraph::new();
    let f = Occ::pos(eg.variable(Sort::Function));
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let fa = Occ::pos(eg.apply(f, &[a], U).expect("apply"));
    let fb = Occ::pos(eg.apply(f, &[b], U).expect("apply"));

    assert!(!eg.same_class(fa, fb));
    assert!(eg.assert_eq(a, b, Lit::pos(1)).is_ok());
    assert!(eg.same_class(fa, fb));
    assert_eq!(lits(eg.explain_equality(fa, fb)), vec![Lit::pos(1)]);
}

#[test]
fn nested_congruence_closes_transitively() {
    let mut eg = Egraph::new();
    let f = Occ::pos(eg.variable(Sort::Function));
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let fa = Occ::pos(eg.apply(f, &[a], U).expect("apply"));
    let ffa = Occ::pos(eg.apply(f, &[fa], U).expect("apply"));
    let fb = Occ::pos(eg.apply(f, &[b], U).expect("apply"));
    let ffb = Occ::pos(eg.apply(f, &[fb], U).expect("apply"));

    assert!(eg.assert_eq(a, b, Lit::pos(1)).is_ok());
    assert!(eg.same_class(ffa, ffb));
    assert_eq!(lits(eg.explain_equality(ffa, ffb)), vec![Lit::pos(1)]);
}

#[test]
fn constants_make_classes_disequal() {
    let mut eg = Egraph::new();
    let zero = Occ::pos(eg.constant(U, 0).expect("const"));
    let one = Occ::pos(eg.constant(U, 1).expect("const"));
    let x = Occ::pos(eg.variable(U));
    let y = Occ::pos(eg.variable(U));

    assert!(eg.assert_eq(x, zero, Lit::pos(1)).is_ok());
    assert!(eg.assert_eq(y, one, Lit::pos(2)).is_ok());

    assert!(eg.known_diseq(x, y));
    assert_eq!(
        lits(eg.explain_disequality(x, y)),
        vec![Lit::pos(1), Lit::pos(2)]
    );
}

#[test]
fn equating_two_constants_conflicts() {
    let mut eg = Egraph::new();
    let zero = Occ::pos(eg.constant(U, 0).expect("const"));
    let one = Occ::pos(eg.constant(U, 1).expect("const"));
    let x = Occ::pos(eg.variable(U));

    assert!(eg.assert_eq(x, zero, Lit::pos(1)).is_ok());
    match eg.assert_eq(x, one, Lit::pos(2)) {
        AssertOutcome::Conflict(v) => {
            assert_eq!(lits(v), vec![Lit::pos(1), Lit::pos(2)]);
        }
        AssertOutcome::Ok => panic!("two distinct constants merged"),
    }
}

#[test]
fn distinct_then_equal_children_conflicts() {
    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let c = Occ::pos(eg.variable(U));
    let d = eg.distinct(&[a, b, c]).expect("distinct");

    assert!(eg.assert_distinct(d, Lit::pos(1)).is_ok());
    match eg.assert_eq(a, b, Lit::pos(2)) {
        AssertOutcome::Conflict(v) => {
            assert_eq!(lits(v), vec![Lit::pos(1), Lit::pos(2)]);
        }
        AssertOutcome::Ok => panic!("distinct children merged"),
    }
}

#[test]
fn equal_children_then_distinct_conflicts() {
    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let c = Occ::pos(eg.variable(U));
    let d = eg.distinct(&[a, b, c]).expect("distinct");

    assert!(eg.assert_eq(a, c, Lit::pos(1)).is_ok());
    match eg.assert_distinct(d, Lit::pos(2)) {
        AssertOutcome::Conflict(v) => {
            assert_eq!(lits(v), vec![Lit::pos(1), Lit::pos(2)]);
        }
        AssertOutcome::Ok => panic!("distinct accepted over equal children"),
    }
}

#[test]
fn diseq_then_eq_conflicts_both_ways() {
    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));

    assert!(eg.assert_diseq(a, b, Lit::pos(1)).is_ok());
    match eg.assert_eq(a, b, Lit::pos(2)) {
        AssertOutcome::Conflict(v) => assert_eq!(lits(v), vec![Lit::pos(1), Lit::pos(2)]),
        AssertOutcome::Ok => panic!("diseq ignored"),
    }

    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    assert!(eg.assert_eq(a, b, Lit::pos(1)).is_ok());
    match eg.assert_diseq(a, b, Lit::pos(2)) {
        AssertOutcome::Conflict(v) => assert_eq!(lits(v), vec![Lit::pos(1), Lit::pos(2)]),
        AssertOutcome::Ok => panic!("eq ignored"),
    }
}

#[test]
fn diseq_transfers_through_equalities() {
    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let x = Occ::pos(eg.variable(U));
    let y = Occ::pos(eg.variable(U));

    assert!(eg.assert_diseq(a, b, Lit::pos(1)).is_ok());
    assert!(eg.assert_eq(x, a, Lit::pos(2)).is_ok());
    assert!(eg.assert_eq(y, b, Lit::pos(3)).is_ok());

    assert!(eg.known_diseq(x, y));
    assert_eq!(
        lits(eg.explain_disequality(x, y)),
        vec![Lit::pos(1), Lit::pos(2), Lit::pos(3)]
    );
}

#[test]
fn not_distinct_with_all_pairs_disequal_conflicts() {
    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let c = Occ::pos(eg.variable(U));
    let d = eg.distinct(&[a, b, c]).expect("distinct");

    assert!(eg.assert_diseq(a, b, Lit::pos(1)).is_ok());
    assert!(eg.assert_diseq(a, c, Lit::pos(2)).is_ok());
    assert!(eg.assert_diseq(b, c, Lit::pos(3)).is_ok());
    match eg.assert_not_distinct(d, Lit::pos(4)) {
        AssertOutcome::Conflict(v) => {
            assert_eq!(
                lits(v),
                vec![Lit::pos(1), Lit::pos(2), Lit::pos(3), Lit::pos(4)]
            );
        }
        AssertOutcome::Ok => panic!("not-distinct accepted over pairwise-disequal children"),
    }
}

#[test]
fn not_distinct_over_constants_conflicts_via_dmask() {
    let mut eg = Egraph::new();
    let zero = Occ::pos(eg.constant(U, 0).expect("const"));
    let one = Occ::pos(eg.constant(U, 1).expect("const"));
    let x = Occ::pos(eg.variable(U));
    let y = Occ::pos(eg.variable(U));
    let d = eg.distinct(&[x, y]).expect("distinct");

    assert!(eg.assert_eq(x, zero, Lit::pos(1)).is_ok());
    assert!(eg.assert_eq(y, one, Lit::pos(2)).is_ok());
    match eg.assert_not_distinct(d, Lit::pos(3)) {
        AssertOutcome::Conflict(v) => {
            assert_eq!(lits(v), vec![Lit::pos(1), Lit::pos(2), Lit::pos(3)]);
        }
        AssertOutcome::Ok => panic!("not-distinct accepted over distinct constants"),
    }
}

#[test]
fn not_distinct_without_full_disequality_is_accepted() {
    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let c = Occ::pos(eg.variable(U));
    let d = eg.distinct(&[a, b, c]).expect("distinct");

    assert!(eg.assert_diseq(a, b, Lit::pos(1)).is_ok());
    assert!(eg.assert_not_distinct(d, Lit::pos(2)).is_ok());
}

#[test]
fn eq_atom_propagates_when_children_merge() {
    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let c = Occ::pos(eg.variable(U));
    let e = eg.eq(a, b).expect("eq");
    eg.attach_atom(e, Lit::pos(10));

    assert!(eg.assert_eq(a, c, Lit::pos(1)).is_ok());
    assert!(eg.propagate().is_empty());

    assert!(eg.assert_eq(c, b, Lit::pos(2)).is_ok());
    assert_eq!(eg.propagate(), vec![Lit::pos(10)]);
    assert_eq!(
        lits(eg.explain(Lit::pos(10))),
        vec![Lit::pos(1), Lit::pos(2)]
    );
}

#[test]
fn eq_atom_propagates_false_over_disequal_classes() {
    let mut eg = Egraph::new();
    let zero = Occ::pos(eg.constant(U, 0).expect("const"));
    let one = Occ::pos(eg.constant(U, 1).expect("const"));
    let x = Occ::pos(eg.variable(U));
    let y = Occ::pos(eg.variable(U));
    let e = eg.eq(x, y).expect("eq");
    eg.attach_atom(e, Lit::pos(10));

    assert!(eg.assert_eq(x, zero, Lit::pos(1)).is_ok());
    assert!(eg.assert_eq(y, one, Lit::pos(2)).is_ok());
    assert_eq!(eg.propagate(), vec![Lit::neg(10)]);
    assert_eq!(
        lits(eg.explain(Lit::neg(10))),
        vec![Lit::pos(1), Lit::pos(2)]
    );
}

#[test]
fn asserting_an_eq_atom_true_merges_its_children() {
    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let e = eg.eq(a, b).expect("eq");

    assert!(eg.assert_eq(Occ::pos(e), Occ::TRUE, Lit::pos(1)).is_ok());
    assert!(eg.same_class(a, b));
    assert_eq!(lits(eg.explain_equality(a, b)), vec![Lit::pos(1)]);
}

#[test]
fn ite_collapses_when_the_condition_decides() {
    let mut eg = Egraph::new();
    let cond = Occ::pos(eg.variable(Sort::Bool));
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let ite = Occ::pos(eg.ite(cond, a, b).expect("ite"));

    assert!(eg.assert_eq(cond, Occ::TRUE, Lit::pos(1)).is_ok());
    assert!(eg.same_class(ite, a));
    assert_eq!(lits(eg.explain_equality(ite, a)), vec![Lit::pos(1)]);

    let mut eg = Egraph::new();
    let cond = Occ::pos(eg.variable(Sort::Bool));
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let ite = Occ::pos(eg.ite(cond, a, b).expect("ite"));

    assert!(eg.assert_eq(cond, Occ::FALSE, Lit::pos(1)).is_ok());
    assert!(eg.same_class(ite, b));
}

#[test]
fn or_simplifies_to_false_and_to_its_last_value() {
    let mut eg = Egraph::new();
    let p = Occ::pos(eg.variable(Sort::Bool));
    let q = Occ::pos(eg.variable(Sort::Bool));
    let o = Occ::pos(eg.or(&[p, q]).expect("or"));

    assert!(eg.assert_eq(p, Occ::FALSE, Lit::pos(1)).is_ok());
    // One undecided disjunct left: (or p q) == q.
    assert!(eg.same_class(o, q));
    assert_eq!(lits(eg.explain_equality(o, q)), vec![Lit::pos(1)]);

    assert!(eg.assert_eq(q, Occ::FALSE, Lit::pos(2)).is_ok());
    assert_eq!(eg.bool_value(o), Some(false));
}

#[test]
fn or_with_a_true_disjunct_is_true() {
    let mut eg = Egraph::new();
    let p = Occ::pos(eg.variable(Sort::Bool));
    let q = Occ::pos(eg.variable(Sort::Bool));
    let o = Occ::pos(eg.or(&[p, q]).expect("or"));

    assert!(eg.assert_eq(q, Occ::TRUE, Lit::pos(1)).is_ok());
    assert_eq!(eg.bool_value(o), Some(true));
    assert_eq!(lits(eg.explain_equality(o, Occ::TRUE)), vec![Lit::pos(1)]);
}

#[test]
fn distinct_registration_falsifies_eq_atoms() {
    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let d = eg.distinct(&[a, b]).expect("distinct");

    assert!(eg.assert_distinct(d, Lit::pos(1)).is_ok());

    let e = eg.eq(a, b).expect("eq");
    eg.attach_atom(e, Lit::pos(10));
    assert_eq!(eg.propagate(), vec![Lit::neg(10)]);
    assert_eq!(lits(eg.explain(Lit::neg(10))), vec![Lit::pos(1)]);
}

#[test]
fn distinct_atoms_are_congruent_under_child_equalities() {
    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let x = Occ::pos(eg.variable(U));
    let y = Occ::pos(eg.variable(U));
    let d1 = Occ::pos(eg.distinct(&[a, b]).expect("distinct"));
    let d2 = Occ::pos(eg.distinct(&[y, x]).expect("distinct"));

    assert!(eg.assert_eq(a, x, Lit::pos(1)).is_ok());
    assert!(eg.assert_eq(b, y, Lit::pos(2)).is_ok());
    assert!(eg.same_class(d1, d2));
    assert_eq!(
        lits(eg.explain_equality(d1, d2)),
        vec![Lit::pos(1), Lit::pos(2)]
    );
}

#[test]
fn swapped_eq_atoms_are_congruent_for_free() {
    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let e1 = Occ::pos(eg.eq(a, b).expect("eq"));
    let e2 = Occ::pos(eg.eq(b, a).expect("eq"));

    assert_ne!(e1, e2, "distinct interned terms");
    assert!(eg.same_class(e1, e2));
    assert!(eg.explain_equality(e1, e2).is_empty());
}

#[test]
fn or_atoms_with_shuffled_children_are_congruent() {
    let mut eg = Egraph::new();
    let p = Occ::pos(eg.variable(Sort::Bool));
    let q = Occ::pos(eg.variable(Sort::Bool));
    let o1 = Occ::pos(eg.or(&[p, q]).expect("or"));
    let o2 = Occ::pos(eg.or(&[q, p, q]).expect("or"));

    // Same label set (sorted, deduplicated): congruent at interning time.
    assert!(eg.same_class(o1, o2));
    assert!(eg.explain_equality(o1, o2).is_empty());
}

#[test]
fn dmask_exhaustion_degrades_to_pairwise_reasoning() {
    let mut eg = Egraph::new();
    // Burn every dmask bit (1..=31) on unrelated atoms.
    for i in 0..31 {
        let u = Occ::pos(eg.variable(U));
        let v = Occ::pos(eg.variable(U));
        let d = eg.distinct(&[u, v]).expect("distinct");
        assert!(eg.assert_distinct(d, Lit::pos(100 + i)).is_ok());
    }
    // The 32nd atom gets no bit, yet still conflicts through its own
    // simplification rule when two children merge.
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    let d = eg.distinct(&[a, b]).expect("distinct");
    assert!(eg.assert_distinct(d, Lit::pos(1)).is_ok());
    match eg.assert_eq(a, b, Lit::pos(2)) {
        AssertOutcome::Conflict(v) => {
            assert_eq!(lits(v), vec![Lit::pos(1), Lit::pos(2)]);
        }
        AssertOutcome::Ok => panic!("exhausted dmask lost the distinct semantics"),
    }
}

#[test]
fn redundant_assertions_add_no_edges() {
    let mut eg = Egraph::new();
    let a = Occ::pos(eg.variable(U));
    let b = Occ::pos(eg.variable(U));
    assert!(eg.assert_eq(a, b, Lit::pos(1)).is_ok());
    let edges = eg.num_edges();
    assert!(eg.assert_eq(a, b, Lit::pos(2)).is_ok());
    assert_eq!(eg.num_edges(), edges, "same-class equality re-asserted");
}
