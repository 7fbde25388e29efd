// crates/quotient-script/tests/differential.rs

//! Differential property test of the incremental e-graph against the naive
//! quadratic closure, over randomly generated scripts:
//!
//! - every conflict vector, replayed as a cube of constraints, must be
//!   unsatisfiable for the oracle;
//! - after a full run, two terms are proven equal by the e-graph iff the
//!   live constraints entail their equality by closure.
//!
//! The strategy ranges from tiny vocabularies (collision- and
//! conflict-heavy) to wider ones (deep congruence chains); shrinking walks
//! a failure down to the smallest script shape that still exhibits it.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use quotient_core::Occ;
use quotient_script::{
    check_sat, entailed_eq, generate_script, Cmd, GeneratorConfig, RunEvent, RunReport, Runner,
};

fn term_names(cfg: &GeneratorConfig) -> Vec<String> {
    let mut names = Vec::new();
    for i in 0..cfg.constants {
        names.push(format!("c{i}"));
    }
    for i in 0..cfg.variables {
        names.push(format!("x{i}"));
    }
    for i in 0..cfg.applications {
        names.push(format!("a{i}"));
    }
    names
}

fn config_strategy() -> impl Strategy<Value = GeneratorConfig> {
    (
        any::<u64>(),
        2u32..6,
        2u32..10,
        1u32..3,
        4u32..20,
        0u32..4,
        20u32..150,
    )
        .prop_map(
            |(seed, constants, variables, functions, applications, distincts, commands)| {
                GeneratorConfig {
                    constants,
                    variables,
                    functions,
                    applications,
                    distincts,
                    commands,
                    seed,
                }
            },
        )
}

fn run_differential(cfg: &GeneratorConfig) -> Result<(), TestCaseError> {
    let script = generate_script(cfg);

    let mut runner = Runner::new();
    let mut report = RunReport::default();
    for d in &script.decls {
        runner.declare(d).map_err(|e| TestCaseError::fail(e.to_string()))?;
    }
    for (i, c) in script.cmds.iter().enumerate() {
        runner
            .exec(i, c, &mut report)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
    }

    // Conflict vectors must be oracle-unsat cubes.
    for ev in &report.events {
        let RunEvent::Conflict { cmd, lits } = ev else {
            continue;
        };
        prop_assert!(!lits.is_empty(), "empty conflict at cmd {cmd}");
        let mut cube = Vec::with_capacity(lits.len());
        for l in lits {
            match runner.constraint_of(l.var()) {
                Some(c) => cube.push(c),
                None => prop_assert!(false, "unmapped literal {l} at cmd {cmd}"),
            }
        }
        prop_assert!(
            !check_sat(runner.terms(), &cube),
            "conflict at cmd {cmd} ({:?}) is satisfiable: {cube:?}",
            script.cmds[*cmd]
        );
    }

    if report.root_conflict {
        return Ok(());
    }

    // Equality agreement between engine and oracle over every term pair.
    let live = runner.live_constraints();
    let names = term_names(cfg);
    let mut occs: Vec<Occ> = Vec::with_capacity(names.len());
    for n in &names {
        occs.push(
            runner
                .resolve(n)
                .map_err(|e| TestCaseError::fail(e.to_string()))?,
        );
    }
    for i in 0..occs.len() {
        for j in i + 1..occs.len() {
            let engine = runner.egraph.same_class(occs[i], occs[j]);
            let oracle = entailed_eq(runner.terms(), &live, occs[i], occs[j]);
            prop_assert_eq!(
                engine,
                oracle,
                "engine/oracle disagree on {} == {}",
                &names[i],
                &names[j]
            );
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]
    #[test]
    fn generated_scripts_agree_with_the_oracle(cfg in config_strategy()) {
        run_differential(&cfg)?;
    }
}

#[test]
fn checked_equalities_match_the_engine_state() {
    let cfg = GeneratorConfig {
        commands: 200,
        seed: 7,
        ..GeneratorConfig::default()
    };
    let script = generate_script(&cfg);
    let report = Runner::run(&script).expect("run");
    // CheckEq events exist and carry both verdicts over a long run.
    let checks = report
        .events
        .iter()
        .filter(|e| matches!(e, RunEvent::CheckedEq { .. }))
        .count();
    assert!(checks > 0, "generator produced no equality checks");
}

#[test]
fn explicit_transcript_matches_hand_computation() {
    use quotient_script::{Decl, ScriptFile};
    let mut s = ScriptFile::new();
    let u = quotient_core::Sort::Uninterpreted(0);
    for name in ["a", "b", "c"] {
        s.decls.push(Decl::Var {
            name: name.into(),
            sort: u,
        });
    }
    s.cmds.push(Cmd::AssertEq {
        lhs: "a".into(),
        rhs: "b".into(),
        lit: 1,
    });
    s.cmds.push(Cmd::Push);
    s.cmds.push(Cmd::AssertDiseq {
        lhs: "a".into(),
        rhs: "c".into(),
        lit: 2,
    });
    s.cmds.push(Cmd::AssertEq {
        lhs: "b".into(),
        rhs: "c".into(),
        lit: 3,
    }); // conflicts with 1 + 2, backjumps
    s.cmds.push(Cmd::CheckEq {
        lhs: "a".into(),
        rhs: "b".into(),
    });

    let report = Runner::run(&s).expect("run");
    let mut saw_conflict = false;
    for ev in &report.events {
        match ev {
            RunEvent::Conflict { lits, .. } => {
                saw_conflict = true;
                let mut vars: Vec<u32> = lits.iter().map(|l| l.var()).collect();
                vars.sort_unstable();
                assert_eq!(vars, vec![1, 2, 3]);
            }
            RunEvent::CheckedEq { equal, .. } => {
                assert!(*equal, "a == b survives the backjump");
            }
            _ => {}
        }
    }
    assert!(saw_conflict, "conflict not reported");
    assert!(!report.root_conflict);
}
