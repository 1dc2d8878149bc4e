//! # **FlatIterator Module** - *Position cursor over one access pattern*
//!
//! Walks every logical element of an [`AccessPattern`] and yields its storage
//! offset together with a validity flag read from an optional [`Bitmask`].
//!
//! ## Protocol
//! - [`FlatIterator::next_validity`] returns `Ok((offset, valid))` for each
//!   position and `Err(KernelError::EndOfSequence)` once exhausted. The
//!   sentinel is a normal stop, not a failure.
//! - `valid == false` marks a masked slot. The cursor still advances past it.
//! - Traversal order is row-major by default, column-major when configured.
//!   Iterators that advance in lockstep must share the same order and shape.
//! - [`FlatIterator::reset`] rewinds to the first position, so the same cursor can
//!   drive two sequential passes.
//!
//! The cursor is exclusively owned by the kernel that created it.

use crate::enums::error::KernelError;
use crate::kernels::broadcast::effective_strides;
use crate::structs::access_pattern::{AccessPattern, MemoryOrder, shape_size};
use crate::Bitmask;

/// # FlatIterator
///
/// Odometer-style cursor producing storage offsets without a division per step.
///
/// ## Example
/// ```rust
/// use minstride::{AccessPattern, FlatIterator, KernelError};
///
/// let p = AccessPattern::row_major(&[2, 4]).slice(1, 0, 4, 2).unwrap();
/// let mut it = FlatIterator::new(&p);
/// let mut seen = Vec::new();
/// loop {
///     match it.next_validity() {
///         Ok((offset, _valid)) => seen.push(offset),
///         Err(KernelError::EndOfSequence) => break,
///         Err(e) => panic!("{e}"),
///     }
/// }
/// assert_eq!(seen, vec![0, 2, 4, 6]);
/// ```
#[derive(Debug, Clone)]
pub struct FlatIterator<'a> {
    shape: Vec<usize>,
    strides: Vec<usize>,
    base: usize,
    order: MemoryOrder,
    mask: Option<&'a Bitmask>,
    coord: Vec<usize>,
    next_offset: usize,
    remaining: usize,
}

impl<'a> FlatIterator<'a> {
    /// Row-major cursor over `pattern`, without a mask.
    pub fn new(pattern: &AccessPattern) -> Self {
        Self::from_parts(
            pattern.shape().to_vec(),
            pattern.strides().to_vec(),
            pattern.offset(),
        )
    }

    /// Cursor over `pattern` stretched to `out_shape` with zero strides on
    /// broadcast axes.
    pub fn broadcast(pattern: &AccessPattern, out_shape: &[usize]) -> Result<Self, KernelError> {
        let strides = effective_strides(pattern, out_shape)?;
        Ok(Self::from_parts(out_shape.to_vec(), strides, pattern.offset()))
    }

    /// Raw constructor. `shape` and `strides` must have the same rank.
    pub fn from_parts(shape: Vec<usize>, strides: Vec<usize>, base: usize) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        let remaining = shape_size(&shape);
        let rank = shape.len();
        Self {
            shape,
            strides,
            base,
            order: MemoryOrder::RowMajor,
            mask: None,
            coord: vec![0; rank],
            next_offset: base,
            remaining,
        }
    }

    /// Reads validity from `mask` at each storage offset.
    pub fn with_mask(mut self, mask: Option<&'a Bitmask>) -> Self {
        self.mask = mask;
        self
    }

    /// Sets the traversal order and rewinds.
    pub fn with_order(mut self, order: MemoryOrder) -> Self {
        self.order = order;
        self.reset();
        self
    }

    /// Total positions per pass.
    #[inline]
    pub fn size(&self) -> usize {
        shape_size(&self.shape)
    }

    /// Positions left in the current pass.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    #[inline]
    pub fn order(&self) -> MemoryOrder {
        self.order
    }

    /// Rewinds to the first position.
    pub fn reset(&mut self) {
        self.coord.iter_mut().for_each(|c| *c = 0);
        self.next_offset = self.base;
        self.remaining = self.size();
    }

    /// Next `(storage offset, valid)` pair, or `EndOfSequence`.
    #[inline]
    pub fn next_validity(&mut self) -> Result<(usize, bool), KernelError> {
        if self.remaining == 0 {
            return Err(KernelError::EndOfSequence);
        }
        let offset = self.next_offset;
        let valid = self.mask.is_none_or(|m| m.get(offset));
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Ok((offset, valid))
    }

    /// Next storage offset regardless of validity.
    #[inline]
    pub fn next_offset(&mut self) -> Result<usize, KernelError> {
        self.next_validity().map(|(offset, _)| offset)
    }

    #[inline]
    fn advance(&mut self) {
        match self.order {
            MemoryOrder::RowMajor => {
                for j in (0..self.shape.len()).rev() {
                    if self.bump(j) {
                        return;
                    }
                }
            }
            MemoryOrder::ColMajor => {
                for j in 0..self.shape.len() {
                    if self.bump(j) {
                        return;
                    }
                }
            }
        }
    }

    /// Steps axis `j`; returns false when it wrapped and the carry continues.
    #[inline(always)]
    fn bump(&mut self, j: usize) -> bool {
        self.coord[j] += 1;
        self.next_offset += self.strides[j];
        if self.coord[j] < self.shape[j] {
            return true;
        }
        self.next_offset -= self.coord[j] * self.strides[j];
        self.coord[j] = 0;
        false
    }
}

impl Iterator for FlatIterator<'_> {
    type Item = (usize, bool);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.next_validity().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for FlatIterator<'_> {}

/// Maps the iterator sentinel to normal completion.
#[inline]
pub(crate) fn end_ok(res: Result<(), KernelError>) -> Result<(), KernelError> {
    match res {
        Err(KernelError::EndOfSequence) => Ok(()),
        other => other,
    }
}
