// crates/quotient-script/src/format.rs

//! Versioned script format: named declarations followed by solver commands.
//!
//! The format is a test/bench surface, not a standard: it covers the
//! operations the Boolean solver would drive (equalities, disequalities,
//! distinct atoms, checkpoints) over a vocabulary of constants, variables
//! and applications.

use quotient_core::Sort;
use serde::{Deserialize, Serialize};

/// Current script format version.
pub const SCRIPT_VERSION: u16 = 1;

/// A named term declaration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decl {
    /// Interpreted constant of a sort.
    Const {
        /// Script-local name.
        name: String,
        /// Sort of the constant.
        sort: Sort,
        /// Distinguishes constants of one sort.
        index: u32,
    },
    /// Free variable.
    Var {
        /// Script-local name.
        name: String,
        /// Sort of the variable.
        sort: Sort,
    },
    /// Function symbol (a variable of the function sort).
    Fun {
        /// Script-local name.
        name: String,
    },
    /// Application of a declared function to declared terms.
    Apply {
        /// Script-local name.
        name: String,
        /// Function symbol name.
        fun: String,
        /// Argument names.
        args: Vec<String>,
        /// Result sort.
        sort: Sort,
    },
    /// Equality atom over two declared terms.
    Eq {
        /// Script-local name.
        name: String,
        /// Left child name.
        lhs: String,
        /// Right child name.
        rhs: String,
    },
    /// Distinct atom over declared terms.
    Distinct {
        /// Script-local name.
        name: String,
        /// Child names.
        args: Vec<String>,
    },
    /// Attach a Boolean literal to a declared boolean term.
    Atom {
        /// Term name.
        term: String,
        /// Boolean variable id; the positive literal means "term is true".
        lit: u32,
    },
}

/// A solver command.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Cmd {
    /// Assert `lhs == rhs` under a fresh boolean variable.
    AssertEq {
        /// Left term name.
        lhs: String,
        /// Right term name.
        rhs: String,
        /// Boolean variable standing for the assertion.
        lit: u32,
    },
    /// Assert `lhs != rhs` under a fresh boolean variable.
    AssertDiseq {
        /// Left term name.
        lhs: String,
        /// Right term name.
        rhs: String,
        /// Boolean variable standing for the assertion.
        lit: u32,
    },
    /// Assert a distinct atom true or false.
    AssertDistinct {
        /// Atom name (a `Distinct` declaration).
        atom: String,
        /// Boolean variable standing for the assertion.
        lit: u32,
        /// Asserted truth value.
        value: bool,
    },
    /// Save a checkpoint.
    Push,
    /// Undo to earlier checkpoints.
    Pop {
        /// Number of checkpoints to unwind.
        levels: u32,
    },
    /// Drain implied literals.
    Propagate,
    /// Ask for the reason of an implied literal.
    Explain {
        /// Boolean variable whose positive literal is queried.
        lit: u32,
    },
    /// Record whether two terms are currently proven equal.
    CheckEq {
        /// Left term name.
        lhs: String,
        /// Right term name.
        rhs: String,
    },
}

/// A complete script.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptFile {
    /// Format version ([`SCRIPT_VERSION`]).
    pub version: u16,
    /// Vocabulary, interned in order.
    pub decls: Vec<Decl>,
    /// Commands, executed in order.
    pub cmds: Vec<Cmd>,
}

impl ScriptFile {
    /// Empty script of the current version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: SCRIPT_VERSION,
            decls: Vec::new(),
            cmds: Vec::new(),
        }
    }
}

impl Default for ScriptFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_json() {
        let mut s = ScriptFile::new();
        s.decls.push(Decl::Var {
            name: "x".into(),
            sort: Sort::Uninterpreted(0),
        });
        s.cmds.push(Cmd::AssertEq {
            lhs: "x".into(),
            rhs: "x".into(),
            lit: 0,
        });
        let text = serde_json::to_string(&s).expect("serialize");
        let back: ScriptFile = serde_json::from_str(&text).expect("parse");
        assert_eq!(s, back);
    }
}
