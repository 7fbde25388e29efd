// crates/quotient-egraph/src/distinct.rs

//! Registry of the currently-true `distinct` atoms backing dmask bits.
//!
//! Bit 0 is reserved for "class contains a constant"; bits 1..=31 each name
//! one registered distinct atom. When every bit is taken, further atoms get
//! no compact representation and the e-graph falls back to pairwise
//! disequality reasoning.

use quotient_core::TermId;

/// Number of dmask bits, constants bit included.
pub const DMASK_BITS: usize = 32;

/// Slot registry for live distinct atoms.
#[derive(Debug)]
pub struct DistinctTable {
    slots: [Option<TermId>; DMASK_BITS],
}

impl DistinctTable {
    /// Fresh registry with every bit free.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [None; DMASK_BITS],
        }
    }

    /// Register `d` on the lowest free bit in 1..=31, or return `None` when
    /// the budget is exhausted.
    pub fn register(&mut self, d: TermId) -> Option<u8> {
        for bit in 1..DMASK_BITS {
            if self.slots[bit].is_none() {
                self.slots[bit] = Some(d);
                return Some(u8::try_from(bit).unwrap_or(0));
            }
        }
        None
    }

    /// Release a bit on backtrack.
    pub fn release(&mut self, bit: u8) {
        debug_assert!((1..DMASK_BITS).contains(&(bit as usize)));
        debug_assert!(self.slots[bit as usize].is_some());
        self.slots[bit as usize] = None;
    }

    /// The atom registered on `bit`, if any.
    #[inline]
    #[must_use]
    pub fn atom(&self, bit: u8) -> Option<TermId> {
        self.slots.get(bit as usize).copied().flatten()
    }
}

impl Default for DistinctTable {
    fn default() -> Self {
        Self::new()
    }
}
