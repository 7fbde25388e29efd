// crates/quotient-core/src/sort.rs

//! Sorts carried by terms and equivalence classes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort of a term / class.
///
/// `Uninterpreted(k)` values with different `k` are distinct user sorts;
/// function sorts are not curried (the term table checks arity, not domain
/// shapes — full signature checking belongs to the surrounding type checker).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
    /// Booleans.
    Bool,
    /// Arithmetic (integers/reals; the e-graph does not distinguish).
    Arith,
    /// Bit-vectors of the given width.
    BitVector(u32),
    /// Function sort (for apply/update operands).
    Function,
    /// k-th uninterpreted sort.
    Uninterpreted(u32),
}

impl Sort {
    /// `true` for the boolean sort.
    #[inline]
    #[must_use]
    pub const fn is_bool(self) -> bool {
        matches!(self, Self::Bool)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "Bool"),
            Self::Arith => write!(f, "Arith"),
            Self::BitVector(w) => write!(f, "Bv{w}"),
            Self::Function => write!(f, "Fun"),
            Self::Uninterpreted(k) => write!(f, "U{k}"),
        }
    }
}
