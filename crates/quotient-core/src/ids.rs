// crates/quotient-core/src/ids.rs

//! Canonical identifier types shared across the quotient workspace.
//!
//! Occurrences and labels pack a polarity bit into bit 0 of the raw word, so
//! boolean negation is a single bit toggle and every path-walking routine can
//! combine polarities by XOR. `Occ::TRUE`/`Occ::FALSE` are the two polarities
//! of the boolean constant term 0.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Term identifier (index into the term table).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(pub u32);

/// The boolean constant `true` is always term 0.
pub const TRUE_TERM: TermId = TermId(0);

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Equivalence-class identifier (index into the class table).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub u32);

/// The class of the boolean constants (`true`/`false`) is always class 0.
pub const BOOL_CLASS: ClassId = ClassId(0);

/// Index of an edge in the edge stack. Doubles as the edge's timestamp:
/// smaller index means asserted earlier.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Index into mark/activity arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A term occurrence: term id in bits 1.., polarity in bit 0.
///
/// `pos(t)` denotes the term itself, `neg(t)` its boolean negation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Occ(u32);

impl Occ {
    /// Positive occurrence of the boolean constant `true`.
    pub const TRUE: Self = Self(0);
    /// Negative occurrence of `true`, i.e. the constant `false`.
    pub const FALSE: Self = Self(1);

    /// Positive occurrence of `t`.
    #[inline]
    #[must_use]
    pub const fn pos(t: TermId) -> Self {
        Self(t.0 << 1)
    }

    /// Negative occurrence of `t`.
    #[inline]
    #[must_use]
    pub const fn neg(t: TermId) -> Self {
        Self(t.0 << 1 | 1)
    }

    /// Occurrence of `t` with an explicit polarity bit (0 = positive).
    #[inline]
    #[must_use]
    pub const fn with_sign(t: TermId, sign: u32) -> Self {
        Self(t.0 << 1 | (sign & 1))
    }

    /// The underlying term.
    #[inline]
    #[must_use]
    pub const fn term(self) -> TermId {
        TermId(self.0 >> 1)
    }

    /// Polarity bit (0 = positive, 1 = negative).
    #[inline]
    #[must_use]
    pub const fn sign(self) -> u32 {
        self.0 & 1
    }

    /// `true` when this is a negative occurrence.
    #[inline]
    #[must_use]
    pub const fn is_neg(self) -> bool {
        self.0 & 1 == 1
    }

    /// Boolean negation: flip the polarity bit.
    #[inline]
    #[must_use]
    pub const fn flip(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// XOR an extra polarity into this occurrence.
    #[inline]
    #[must_use]
    pub const fn xor_sign(self, sign: u32) -> Self {
        Self(self.0 ^ (sign & 1))
    }

    /// Positive occurrence of the same term.
    #[inline]
    #[must_use]
    pub const fn positive(self) -> Self {
        Self(self.0 & !1)
    }

    /// Raw packed word. With [`Occ::from_raw`] this supports the edge-walk
    /// identity `other = lhs ^ rhs ^ this`, which yields the opposite
    /// endpoint with the polarity delta already applied.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Rebuild an occurrence from its raw packed word.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Occ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_neg() {
            write!(f, "~{}", self.term())
        } else {
            write!(f, "{}", self.term())
        }
    }
}

/// A class label: class id in bits 1.., polarity in bit 0.
///
/// Two occurrences have equal labels iff the e-graph has proved them equal
/// (invariant 1 of the class table).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(u32);

impl Label {
    /// Label of everything equal to `true`.
    pub const TRUE: Self = Self(0);
    /// Label of everything equal to `false`.
    pub const FALSE: Self = Self(1);

    /// Build a label from a class id and a polarity bit.
    #[inline]
    #[must_use]
    pub const fn new(c: ClassId, sign: u32) -> Self {
        Self(c.0 << 1 | (sign & 1))
    }

    /// The class this label names.
    #[inline]
    #[must_use]
    pub const fn class(self) -> ClassId {
        ClassId(self.0 >> 1)
    }

    /// Polarity bit relative to the class representative.
    #[inline]
    #[must_use]
    pub const fn sign(self) -> u32 {
        self.0 & 1
    }

    /// Same class, flipped polarity.
    #[inline]
    #[must_use]
    pub const fn flip(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// XOR an extra polarity into this label.
    #[inline]
    #[must_use]
    pub const fn xor_sign(self, sign: u32) -> Self {
        Self(self.0 ^ (sign & 1))
    }

    /// Raw word, used as a hash key by the congruence table.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Boolean-solver literal: variable id in bits 1.., sign in bit 0.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(pub u32);

impl Lit {
    /// Positive literal of boolean variable `v`.
    #[inline]
    #[must_use]
    pub const fn pos(v: u32) -> Self {
        Self(v << 1)
    }

    /// Negative literal of boolean variable `v`.
    #[inline]
    #[must_use]
    pub const fn neg(v: u32) -> Self {
        Self(v << 1 | 1)
    }

    /// The boolean variable.
    #[inline]
    #[must_use]
    pub const fn var(self) -> u32 {
        self.0 >> 1
    }

    /// Negated literal.
    #[inline]
    #[must_use]
    pub const fn negate(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// Literal with an extra sign XOR-ed in.
    #[inline]
    #[must_use]
    pub const fn xor_sign(self, sign: u32) -> Self {
        Self(self.0 ^ (sign & 1))
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 & 1 == 1 {
            write!(f, "-{}", self.var())
        } else {
            write!(f, "+{}", self.var())
        }
    }
}

/// Theory variable inside a satellite solver.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThVar(pub u32);
