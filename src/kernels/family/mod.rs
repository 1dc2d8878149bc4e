// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Kernel Family** - *Elementwise loops for every traversal*
//!
//! One generic loop per traversal strategy, instantiated per operation and
//! per element type by the closure `f: Fn(&T, &T) -> Option<U>` it receives.
//! `None` from `f` is an arithmetic fault (integer division by zero); the
//! loop stops there and reports the logical position.
//!
//! | Family        | Operands                         | Output                        |
//! |---------------|----------------------------------|-------------------------------|
//! | `vv` `vs` `sv`| contiguous slices / one scalar   | contiguous slice              |
//! | `*_iter`      | [`FlatIterator`] cursors         | [`OutputCursor`]              |
//! | `bc`          | resolved [`BroadcastPlan`]       | output index space, row-major |
//! | `*_inplace`   | destination is the left operand  | left operand's slots          |
//! | `*_recv`      | destination is the right operand | right operand's slots         |
//!
//! Every assigning kernel has an `_incr` twin with the same index
//! computation, writing `dest += result` through the [`Accumulate`] sink.
//!
//! [`BroadcastPlan`]: crate::kernels::broadcast::BroadcastPlan

use crate::enums::error::KernelError;
use crate::structs::flat_iterator::FlatIterator;
use crate::traits::type_unions::Addable;

pub mod broadcasted;
pub mod contiguous;
pub mod iterated;

pub use broadcasted::*;
pub use contiguous::*;
pub use iterated::*;

/// How a computed value lands in its destination slot.
pub trait Sink<U> {
    fn put(slot: &mut U, value: U);
}

/// `dest = value`
pub struct Assign;

/// `dest += value`
pub struct Accumulate;

impl<U> Sink<U> for Assign {
    #[inline(always)]
    fn put(slot: &mut U, value: U) {
        *slot = value;
    }
}

impl<U: Addable> Sink<U> for Accumulate {
    #[inline(always)]
    fn put(slot: &mut U, value: U) {
        *slot = slot.add_el(&value);
    }
}

/// Where an iterator-driven kernel writes element `k`.
///
/// `SameAsLeft` / `SameAsRight` are the operand-is-output paths: the
/// destination shares the operand's access pattern, so the operand's own
/// advancing offset is the write offset and no third cursor is walked.
#[derive(Debug)]
pub enum OutputCursor<'a> {
    /// Packed destination filled in traversal order
    Flat,
    SameAsLeft,
    SameAsRight,
    /// Independent cursor over the destination's pattern
    Iter(FlatIterator<'a>),
}

impl OutputCursor<'_> {
    /// Write offset and validity for logical position `k`.
    ///
    /// `Iter` advances its own cursor; the other variants are stateless.
    #[inline(always)]
    pub(crate) fn next(
        &mut self,
        left: Option<usize>,
        right: Option<usize>,
        k: usize,
    ) -> Result<(usize, bool), KernelError> {
        match self {
            OutputCursor::Flat => Ok((k, true)),
            OutputCursor::SameAsLeft => left
                .map(|o| (o, true))
                .ok_or_else(|| scalar_output("left")),
            OutputCursor::SameAsRight => right
                .map(|o| (o, true))
                .ok_or_else(|| scalar_output("right")),
            OutputCursor::Iter(it) => it.next_validity(),
        }
    }

    /// Rewinds an `Iter` cursor.
    pub fn reset(&mut self) {
        if let OutputCursor::Iter(it) = self {
            it.reset();
        }
    }
}

#[cold]
fn scalar_output(side: &str) -> KernelError {
    KernelError::InvalidPattern(format!(
        "output cannot follow the {} operand, it is a scalar",
        side
    ))
}

#[inline(always)]
pub(crate) fn fault(index: usize) -> KernelError {
    KernelError::DivisionByZero { index }
}
