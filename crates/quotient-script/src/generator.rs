// crates/quotient-script/src/generator.rs

//! Seeded random script generator used by tests, the CLI `generate`
//! subcommand and the benchmark harness.
//!
//! Produces well-sorted scripts over one uninterpreted sort: constants,
//! variables, function applications, then a weighted mix of assertions and
//! checkpoint operations. Pops never unwind more checkpoints than exist.

use rand::{rngs::StdRng, Rng as _, SeedableRng};

use quotient_core::Sort;

use crate::format::{Cmd, Decl, ScriptFile};

/// Knobs for [`generate_script`].
#[derive(Clone, Copy, Debug)]
pub struct GeneratorConfig {
    /// Interpreted constants to declare.
    pub constants: u32,
    /// Free variables to declare.
    pub variables: u32,
    /// Function symbols to declare.
    pub functions: u32,
    /// Applications to declare (arguments drawn from earlier terms).
    pub applications: u32,
    /// Distinct atoms to declare (2..=4 children each).
    pub distincts: u32,
    /// Commands to emit.
    pub commands: u32,
    /// RNG seed.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            constants: 4,
            variables: 8,
            functions: 2,
            applications: 12,
            distincts: 2,
            commands: 64,
            seed: 42,
        }
    }
}

const U: Sort = Sort::Uninterpreted(0);

/// Generate a deterministic random script for `cfg`.
#[must_use]
pub fn generate_script(cfg: &GeneratorConfig) -> ScriptFile {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut s = ScriptFile::new();

    let mut terms: Vec<String> = Vec::new();
    for i in 0..cfg.constants {
        let name = format!("c{i}");
        s.decls.push(Decl::Const {
            name: name.clone(),
            sort: U,
            index: i,
        });
        terms.push(name);
    }
    for i in 0..cfg.variables {
        let name = format!("x{i}");
        s.decls.push(Decl::Var {
            name: name.clone(),
            sort: U,
        });
        terms.push(name);
    }
    let funs: Vec<String> = (0..cfg.functions.max(1))
        .map(|i| {
            let name = format!("f{i}");
            s.decls.push(Decl::Fun { name: name.clone() });
            name
        })
        .collect();
    for i in 0..cfg.applications {
        let name = format!("a{i}");
        let fun = funs[rng.random_range(0..funs.len())].clone();
        let nargs = rng.random_range(1..=2usize);
        let args = (0..nargs)
            .map(|_| terms[rng.random_range(0..terms.len())].clone())
            .collect();
        s.decls.push(Decl::Apply {
            name: name.clone(),
            fun,
            args,
            sort: U,
        });
        terms.push(name);
    }
    let distincts: Vec<String> = (0..cfg.distincts)
        .map(|i| {
            let name = format!("d{i}");
            let n = rng.random_range(2..=4usize).min(terms.len());
            let mut args: Vec<String> = Vec::new();
            while args.len() < n {
                let cand = terms[rng.random_range(0..terms.len())].clone();
                if !args.contains(&cand) {
                    args.push(cand);
                }
            }
            s.decls.push(Decl::Distinct {
                name: name.clone(),
                args,
            });
            name
        })
        .collect();

    let mut depth = 0u32;
    let mut next_lit = 0u32;
    for _ in 0..cfg.commands {
        let pick = |rng: &mut StdRng, terms: &[String]| terms[rng.random_range(0..terms.len())].clone();
        match rng.random_range(0..16u32) {
            0..=6 => {
                let (lhs, rhs) = (pick(&mut rng, &terms), pick(&mut rng, &terms));
                s.cmds.push(Cmd::AssertEq {
                    lhs,
                    rhs,
                    lit: next_lit,
                });
                next_lit += 1;
            }
            7..=9 => {
                let (lhs, rhs) = (pick(&mut rng, &terms), pick(&mut rng, &terms));
                s.cmds.push(Cmd::AssertDiseq {
                    lhs,
                    rhs,
                    lit: next_lit,
                });
                next_lit += 1;
            }
            10 | 11 if !distincts.is_empty() => {
                let atom = distincts[rng.random_range(0..distincts.len())].clone();
                s.cmds.push(Cmd::AssertDistinct {
                    atom,
                    lit: next_lit,
                    value: rng.random_bool(0.7),
                });
                next_lit += 1;
            }
            12 => {
                s.cmds.push(Cmd::Push);
                depth += 1;
            }
            13 if depth > 0 => {
                let levels = rng.random_range(1..=depth);
                s.cmds.push(Cmd::Pop { levels });
                depth -= levels;
            }
            14 => s.cmds.push(Cmd::Propagate),
            _ => {
                let (lhs, rhs) = (pick(&mut rng, &terms), pick(&mut rng, &terms));
                s.cmds.push(Cmd::CheckEq { lhs, rhs });
            }
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let cfg = GeneratorConfig::default();
        assert_eq!(generate_script(&cfg), generate_script(&cfg));
    }

    #[test]
    fn pops_never_underflow() {
        let s = generate_script(&GeneratorConfig {
            commands: 500,
            seed: 7,
            ..GeneratorConfig::default()
        });
        let mut depth = 0i64;
        for c in &s.cmds {
            match c {
                Cmd::Push => depth += 1,
                Cmd::Pop { levels } => {
                    depth -= i64::from(*levels);
                    assert!(depth >= 0, "pop past the root");
                }
                _ => {}
            }
        }
    }
}
