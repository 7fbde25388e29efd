// crates/quotient-script/src/runner.rs

//! Script execution against the e-graph.
//!
//! The runner plays the Boolean solver's role at its simplest: each
//! assertion carries a fresh boolean variable, a conflict backjumps one
//! checkpoint (or stops the run when it happens at the root), `propagate`
//! drains implied literals. It also keeps the currently-live constraint set
//! in oracle form, which the differential tests replay against the naive
//! closure.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use quotient_core::{Lit, Occ, Sort, TermTable};
use quotient_egraph::{AssertOutcome, Egraph};

use crate::format::{Cmd, Decl, ScriptFile};
use crate::naive::Constraint;

/// One observable event of a run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Literals drained by a `propagate` command.
    Implied {
        /// The implied literals.
        lits: Vec<Lit>,
    },
    /// A conflicting assertion (command index and conflict vector).
    Conflict {
        /// Index of the offending command.
        cmd: usize,
        /// Jointly-inconsistent literals.
        lits: Vec<Lit>,
    },
    /// Reason returned for an implied literal.
    Explained {
        /// The queried literal.
        lit: Lit,
        /// Asserted literals that force it.
        reason: Vec<Lit>,
    },
    /// Result of a `check_eq` query.
    CheckedEq {
        /// Left term name.
        lhs: String,
        /// Right term name.
        rhs: String,
        /// Whether the two are currently proven equal.
        equal: bool,
    },
}

/// Everything observable about one run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Events in order.
    pub events: Vec<RunEvent>,
    /// A conflict happened outside any checkpoint: the script is
    /// unsatisfiable and execution stopped there.
    pub root_conflict: bool,
}

/// Script interpreter over an [`Egraph`].
pub struct Runner {
    /// The engine under drive.
    pub egraph: Egraph,
    names: HashMap<String, Occ>,
    litmap: HashMap<u32, Constraint>,
    live: Vec<(u32, Constraint)>,
    marks: Vec<usize>,
    implied_seen: HashSet<Lit>,
    stopped: bool,
}

impl Runner {
    /// Fresh runner over an empty e-graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            egraph: Egraph::new(),
            names: HashMap::new(),
            litmap: HashMap::new(),
            live: Vec::new(),
            marks: Vec::new(),
            implied_seen: HashSet::new(),
            stopped: false,
        }
    }

    /// Execute a whole script.
    ///
    /// # Errors
    /// Undeclared names, duplicate declarations and malformed commands.
    pub fn run(script: &ScriptFile) -> Result<RunReport> {
        let mut r = Self::new();
        let mut report = RunReport::default();
        for d in &script.decls {
            r.declare(d)?;
        }
        for (i, c) in script.cmds.iter().enumerate() {
            if r.stopped {
                break;
            }
            r.exec(i, c, &mut report)?;
        }
        Ok(report)
    }

    fn lookup(&self, name: &str) -> Result<Occ> {
        match self.names.get(name) {
            Some(&x) => Ok(x),
            None => bail!("undeclared term {name:?}"),
        }
    }

    fn bind(&mut self, name: &str, x: Occ) -> Result<()> {
        ensure!(
            self.names.insert(name.to_string(), x).is_none(),
            "term {name:?} declared twice"
        );
        Ok(())
    }

    /// Intern one declaration.
    ///
    /// # Errors
    /// Undeclared child names, duplicate names, sort mismatches.
    pub fn declare(&mut self, d: &Decl) -> Result<()> {
        match d {
            Decl::Const { name, sort, index } => {
                let t = self
                    .egraph
                    .constant(*sort, *index)
                    .with_context(|| format!("declare {name:?}"))?;
                self.bind(name, Occ::pos(t))
            }
            Decl::Var { name, sort } => {
                let t = self.egraph.variable(*sort);
                self.bind(name, Occ::pos(t))
            }
            Decl::Fun { name } => {
                let t = self.egraph.variable(Sort::Function);
                self.bind(name, Occ::pos(t))
            }
            Decl::Apply {
                name,
                fun,
                args,
                sort,
            } => {
                let f = self.lookup(fun)?;
                let args = args
                    .iter()
                    .map(|a| self.lookup(a))
                    .collect::<Result<Vec<_>>>()?;
                let t = self
                    .egraph
                    .apply(f, &args, *sort)
                    .with_context(|| format!("declare {name:?}"))?;
                self.bind(name, Occ::pos(t))
            }
            Decl::Eq { name, lhs, rhs } => {
                let (a, b) = (self.lookup(lhs)?, self.lookup(rhs)?);
                let t = self
                    .egraph
                    .eq(a, b)
                    .with_context(|| format!("declare {name:?}"))?;
                self.bind(name, Occ::pos(t))
            }
            Decl::Distinct { name, args } => {
                let args = args
                    .iter()
                    .map(|a| self.lookup(a))
                    .collect::<Result<Vec<_>>>()?;
                let t = self
                    .egraph
                    .distinct(&args)
                    .with_context(|| format!("declare {name:?}"))?;
                self.bind(name, Occ::pos(t))
            }
            Decl::Atom { term, lit } => {
                let t = self.lookup(term)?;
                self.egraph.attach_atom(t.term(), Lit::pos(*lit));
                Ok(())
            }
        }
    }

    fn settle(
        &mut self,
        idx: usize,
        lit_var: u32,
        constraint: Constraint,
        outcome: &AssertOutcome,
        report: &mut RunReport,
    ) {
        self.litmap.insert(lit_var, constraint);
        match outcome {
            AssertOutcome::Ok => self.live.push((lit_var, constraint)),
            AssertOutcome::Conflict(lits) => {
                report.events.push(RunEvent::Conflict {
                    cmd: idx,
                    lits: lits.clone(),
                });
                if let Some(mark) = self.marks.pop() {
                    self.egraph.pop(1);
                    self.live.truncate(mark);
                } else {
                    report.root_conflict = true;
                    self.stopped = true;
                }
            }
        }
    }

    /// Execute one command.
    ///
    /// # Errors
    /// Undeclared names, pops past the root, explaining a literal that was
    /// never implied.
    pub fn exec(&mut self, idx: usize, c: &Cmd, report: &mut RunReport) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        match c {
            Cmd::AssertEq { lhs, rhs, lit } => {
                let (a, b) = (self.lookup(lhs)?, self.lookup(rhs)?);
                let out = self.egraph.assert_eq(a, b, Lit::pos(*lit));
                self.settle(idx, *lit, Constraint::Eq(a, b), &out, report);
            }
            Cmd::AssertDiseq { lhs, rhs, lit } => {
                let (a, b) = (self.lookup(lhs)?, self.lookup(rhs)?);
                let out = self.egraph.assert_diseq(a, b, Lit::pos(*lit));
                self.settle(idx, *lit, Constraint::Diseq(a, b), &out, report);
            }
            Cmd::AssertDistinct { atom, lit, value } => {
                let d = self.lookup(atom)?.term();
                let (out, constraint) = if *value {
                    (
                        self.egraph.assert_distinct(d, Lit::pos(*lit)),
                        Constraint::DistinctTrue(d),
                    )
                } else {
                    (
                        self.egraph.assert_not_distinct(d, Lit::pos(*lit)),
                        Constraint::DistinctFalse(d),
                    )
                };
                self.settle(idx, *lit, constraint, &out, report);
            }
            Cmd::Push => {
                self.egraph.push();
                self.marks.push(self.live.len());
            }
            Cmd::Pop { levels } => {
                // Conflict backjumps may have consumed script checkpoints
                // already; clamp rather than unwind past the root.
                let n = (*levels as usize).min(self.marks.len());
                self.egraph.pop(u32::try_from(n).unwrap_or(0));
                for _ in 0..n {
                    let mark = self.marks.pop().unwrap_or(0);
                    self.live.truncate(mark);
                }
            }
            Cmd::Propagate => {
                let lits = self.egraph.propagate();
                self.implied_seen.extend(lits.iter().copied());
                report.events.push(RunEvent::Implied { lits });
            }
            Cmd::Explain { lit } => {
                let l = Lit::pos(*lit);
                ensure!(
                    self.implied_seen.contains(&l),
                    "literal {l} was never implied"
                );
                let reason = self.egraph.explain(l);
                report.events.push(RunEvent::Explained { lit: l, reason });
            }
            Cmd::CheckEq { lhs, rhs } => {
                let (a, b) = (self.lookup(lhs)?, self.lookup(rhs)?);
                report.events.push(RunEvent::CheckedEq {
                    lhs: lhs.clone(),
                    rhs: rhs.clone(),
                    equal: self.egraph.same_class(a, b),
                });
            }
        }
        Ok(())
    }

    /// Constraints currently asserted (conflicting ones excluded).
    #[must_use]
    pub fn live_constraints(&self) -> Vec<Constraint> {
        self.live.iter().map(|&(_, c)| c).collect()
    }

    /// The constraint a boolean variable stood for, if it was asserted.
    #[must_use]
    pub fn constraint_of(&self, var: u32) -> Option<Constraint> {
        self.litmap.get(&var).copied()
    }

    /// Name-resolved occurrence, for tests.
    ///
    /// # Errors
    /// Undeclared name.
    pub fn resolve(&self, name: &str) -> Result<Occ> {
        self.lookup(name)
    }

    /// The underlying term table.
    #[must_use]
    pub fn terms(&self) -> &TermTable {
        self.egraph.terms()
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}
