// crates/quotient-egraph/src/lib.rs

//! Congruence-closure (e-graph) core with explanation generation.
//!
//! The e-graph maintains equivalence classes of first-order terms under
//! equality and congruence, detects implied equalities and disequalities,
//! and reconstructs minimal, causally-consistent explanations for anything
//! it has announced. It sits between a Boolean (CDCL) solver and theory
//! satellites:
//!
//! - the Boolean solver asserts atoms ([`Egraph::assert_eq`] and friends),
//!   drains implied literals with [`Egraph::propagate`] and asks for reasons
//!   with [`Egraph::explain`];
//! - satellites receive equality/disequality notifications (the
//!   [`Satellite`] trait) and may push their own equalities back via
//!   [`Egraph::propagate_theory_eq`].
//!
//! Conflicts are data ([`AssertOutcome::Conflict`]), never errors; after a
//! conflict the caller is expected to backtrack past the offending
//! assertion with [`Egraph::pop`].

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod classes;
pub mod congruence;
pub mod distinct;
pub mod edges;
pub mod egraph;
pub mod explain;
pub mod satellite;

pub use classes::ClassTable;
pub use congruence::CongruenceTable;
pub use distinct::DistinctTable;
pub use edges::{Antecedent, Edge, EdgeStack};
pub use egraph::{AssertOutcome, Egraph};
pub use satellite::{DiseqHint, DiseqPreExpl, Satellite, TheoryExplanation, TheoryKind};
