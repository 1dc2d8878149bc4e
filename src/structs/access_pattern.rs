//! # **AccessPattern Module** - *Shape, strides and offset of one array view*
//!
//! An `AccessPattern` describes how a logical N-dimensional index maps onto a
//! flat buffer: `storage = offset + Σ coord[j] * strides[j]`.
//!
//! ## Behaviour
//! - Strides are in elements, never bytes.
//! - A zero stride repeats one element along that axis (broadcast view).
//! - Contiguity is derived, not stored: a pattern is contiguous when its
//!   strides equal the packed strides for its declared [`MemoryOrder`].
//!   Axes of extent 1 never break contiguity.
//! - A rank-0 pattern is a scalar with size 1.

use std::fmt::{Display, Formatter};
use std::ops::Range;

use crate::enums::error::KernelError;

/// Memory order of a packed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryOrder {
    /// Last axis varies fastest (C order)
    #[default]
    RowMajor,
    /// First axis varies fastest (Fortran order)
    ColMajor,
}

/// # AccessPattern
///
/// Shape, per-axis strides, base offset and memory order for one array view.
///
/// ## Example
/// ```rust
/// use minstride::AccessPattern;
///
/// let p = AccessPattern::row_major(&[2, 3]);
/// assert_eq!(p.strides(), &[3, 1]);
/// assert_eq!(p.offset_of(&[1, 2]), 5);
///
/// // Every other column: no longer contiguous
/// let s = p.slice(1, 0, 3, 2).unwrap();
/// assert_eq!(s.shape(), &[2, 2]);
/// assert!(!s.is_contiguous());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPattern {
    shape: Vec<usize>,
    strides: Vec<usize>,
    offset: usize,
    order: MemoryOrder,
}

/// Packed strides for `shape` in `order`.
pub fn packed_strides(shape: &[usize], order: MemoryOrder) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut acc = 1usize;
    match order {
        MemoryOrder::RowMajor => {
            for j in (0..shape.len()).rev() {
                strides[j] = acc;
                acc *= shape[j].max(1);
            }
        }
        MemoryOrder::ColMajor => {
            for j in 0..shape.len() {
                strides[j] = acc;
                acc *= shape[j].max(1);
            }
        }
    }
    strides
}

/// Number of elements addressed by `shape`. Rank 0 is one element.
#[inline]
pub fn shape_size(shape: &[usize]) -> usize {
    shape.iter().product()
}

impl AccessPattern {
    /// Validated constructor.
    pub fn new(
        shape: Vec<usize>,
        strides: Vec<usize>,
        offset: usize,
        order: MemoryOrder,
    ) -> Result<Self, KernelError> {
        if shape.len() != strides.len() {
            return Err(KernelError::InvalidPattern(format!(
                "rank mismatch: shape {:?} has {} axes, strides {:?} has {}",
                shape,
                shape.len(),
                strides,
                strides.len()
            )));
        }
        Ok(Self {
            shape,
            strides,
            offset,
            order,
        })
    }

    /// Packed row-major pattern at offset 0.
    pub fn row_major(shape: &[usize]) -> Self {
        Self::packed(shape, MemoryOrder::RowMajor)
    }

    /// Packed column-major pattern at offset 0.
    pub fn col_major(shape: &[usize]) -> Self {
        Self::packed(shape, MemoryOrder::ColMajor)
    }

    pub fn packed(shape: &[usize], order: MemoryOrder) -> Self {
        Self {
            shape: shape.to_vec(),
            strides: packed_strides(shape, order),
            offset: 0,
            order,
        }
    }

    /// Rank-0 pattern.
    pub fn scalar() -> Self {
        Self::row_major(&[])
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn order(&self) -> MemoryOrder {
        self.order
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn size(&self) -> usize {
        shape_size(&self.shape)
    }

    /// Rank 0, or every axis of extent 1.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.shape.iter().all(|&d| d == 1)
    }

    /// Exactly one element, whatever the rank.
    #[inline]
    pub fn is_scalar_equivalent(&self) -> bool {
        self.size() == 1
    }

    #[inline]
    pub fn is_row_major(&self) -> bool {
        self.order == MemoryOrder::RowMajor
    }

    /// True when the view covers `offset..offset + size` with no gaps, in its declared order.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.is_contiguous_in(self.order)
    }

    /// True when the strides are the packed strides of `order`.
    pub fn is_contiguous_in(&self, order: MemoryOrder) -> bool {
        if self.size() <= 1 {
            return true;
        }
        let packed = packed_strides(&self.shape, order);
        self.shape
            .iter()
            .zip(self.strides.iter().zip(packed.iter()))
            .all(|(&d, (&s, &p))| d == 1 || s == p)
    }

    /// Storage range of a contiguous view.
    pub fn contiguous_range(&self) -> Option<Range<usize>> {
        if self.is_contiguous() {
            Some(self.offset..self.offset + self.size())
        } else {
            None
        }
    }

    /// Storage offset of a logical coordinate.
    ///
    /// # Panics
    /// When `coord` has the wrong rank.
    #[inline]
    pub fn offset_of(&self, coord: &[usize]) -> usize {
        assert_eq!(coord.len(), self.rank(), "coordinate rank mismatch");
        self.offset
            + coord
                .iter()
                .zip(&self.strides)
                .map(|(&c, &s)| c * s)
                .sum::<usize>()
    }

    /// Largest storage offset touched, or `None` for an empty view.
    pub fn max_offset(&self) -> Option<usize> {
        if self.size() == 0 {
            return None;
        }
        Some(
            self.offset
                + self
                    .shape
                    .iter()
                    .zip(&self.strides)
                    .map(|(&d, &s)| (d - 1) * s)
                    .sum::<usize>(),
        )
    }

    /// Errors unless every addressed offset is below `buffer_len`.
    pub fn check_bounds(&self, buffer_len: usize) -> Result<(), KernelError> {
        match self.max_offset() {
            Some(max) if max >= buffer_len => Err(KernelError::InvalidPattern(format!(
                "pattern addresses offset {} but buffer holds {} elements",
                max, buffer_len
            ))),
            _ => Ok(()),
        }
    }

    /// Strided sub-range `start..end` with `step` along `axis`.
    pub fn slice(
        &self,
        axis: usize,
        start: usize,
        end: usize,
        step: usize,
    ) -> Result<Self, KernelError> {
        if axis >= self.rank() {
            return Err(KernelError::InvalidPattern(format!(
                "axis {} out of range for rank {}",
                axis,
                self.rank()
            )));
        }
        if step == 0 || start > end || end > self.shape[axis] {
            return Err(KernelError::InvalidPattern(format!(
                "invalid slice {}..{} step {} on axis {} of extent {}",
                start, end, step, axis, self.shape[axis]
            )));
        }
        let mut out = self.clone();
        out.shape[axis] = (end - start).div_ceil(step);
        if out.shape[axis] > 0 {
            out.offset += start * self.strides[axis];
        }
        out.strides[axis] *= step;
        Ok(out)
    }

    /// Permutes axes. The declared order follows the new strides when they
    /// happen to be packed.
    pub fn transpose(&self, perm: &[usize]) -> Result<Self, KernelError> {
        let mut seen = vec![false; self.rank()];
        if perm.len() != self.rank() || perm.iter().any(|&p| p >= self.rank()) {
            return Err(KernelError::InvalidPattern(format!(
                "permutation {:?} is invalid for rank {}",
                perm,
                self.rank()
            )));
        }
        for &p in perm {
            if seen[p] {
                return Err(KernelError::InvalidPattern(format!(
                    "permutation {:?} repeats axis {}",
                    perm, p
                )));
            }
            seen[p] = true;
        }
        let shape: Vec<usize> = perm.iter().map(|&p| self.shape[p]).collect();
        let strides: Vec<usize> = perm.iter().map(|&p| self.strides[p]).collect();
        let mut out = Self {
            shape,
            strides,
            offset: self.offset,
            order: self.order,
        };
        out.order = out.natural_order();
        Ok(out)
    }

    /// New shape over the same storage. Only valid for contiguous views.
    pub fn reshape_packed(&self, shape: &[usize]) -> Result<Self, KernelError> {
        if shape_size(shape) != self.size() {
            return Err(KernelError::shape_mismatch(&self.shape, shape));
        }
        if !self.is_contiguous() {
            return Err(KernelError::InvalidPattern(
                "cannot reshape a non-contiguous view in place".into(),
            ));
        }
        let mut out = Self::packed(shape, self.order);
        out.offset = self.offset;
        Ok(out)
    }

    /// Order under which these strides are packed, defaulting to the declared one.
    fn natural_order(&self) -> MemoryOrder {
        if self.is_contiguous_in(self.order) {
            self.order
        } else if self.is_contiguous_in(MemoryOrder::RowMajor) {
            MemoryOrder::RowMajor
        } else if self.is_contiguous_in(MemoryOrder::ColMajor) {
            MemoryOrder::ColMajor
        } else {
            self.order
        }
    }
}

impl Default for AccessPattern {
    fn default() -> Self {
        Self::scalar()
    }
}

impl Display for AccessPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AccessPattern(shape={:?}, strides={:?}, offset={}, {:?}{})",
            self.shape,
            self.strides,
            self.offset,
            self.order,
            if self.is_contiguous() { "" } else { ", non-contiguous" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_strides() {
        assert_eq!(packed_strides(&[2, 3, 4], MemoryOrder::RowMajor), vec![12, 4, 1]);
        assert_eq!(packed_strides(&[2, 3, 4], MemoryOrder::ColMajor), vec![1, 2, 6]);
        assert!(packed_strides(&[], MemoryOrder::RowMajor).is_empty());
    }

    #[test]
    fn test_new_rejects_rank_mismatch() {
        let err = AccessPattern::new(vec![2, 2], vec![1], 0, MemoryOrder::RowMajor).unwrap_err();
        assert!(matches!(err, KernelError::InvalidPattern(_)));
    }

    #[test]
    fn test_scalar_forms() {
        assert!(AccessPattern::scalar().is_scalar());
        assert_eq!(AccessPattern::scalar().size(), 1);
        assert!(AccessPattern::row_major(&[1, 1]).is_scalar());
        assert!(!AccessPattern::row_major(&[1, 2]).is_scalar());
        assert!(AccessPattern::row_major(&[1, 1, 1]).is_scalar_equivalent());
    }

    #[test]
    fn test_slice_and_bounds() {
        let p = AccessPattern::row_major(&[4, 5]);
        let s = p.slice(0, 1, 4, 2).unwrap();
        assert_eq!(s.shape(), &[2, 5]);
        assert_eq!(s.strides(), &[10, 1]);
        assert_eq!(s.offset(), 5);
        assert_eq!(s.max_offset(), Some(5 + 10 + 4));
        assert!(s.check_bounds(20).is_ok());
        assert!(s.check_bounds(19).is_err());
        assert!(p.slice(2, 0, 1, 1).is_err());
        assert!(p.slice(0, 0, 5, 1).is_err());
    }

    #[test]
    fn test_contiguity_ignores_unit_axes() {
        let p = AccessPattern::new(vec![3, 1], vec![1, 99], 2, MemoryOrder::RowMajor).unwrap();
        assert!(p.is_contiguous());
        assert_eq!(p.contiguous_range(), Some(2..5));
    }

    #[test]
    fn test_transpose_switches_order() {
        let p = AccessPattern::row_major(&[2, 3]);
        let t = p.transpose(&[1, 0]).unwrap();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.strides(), &[1, 3]);
        assert_eq!(t.order(), MemoryOrder::ColMajor);
        assert!(t.is_contiguous());
        assert!(p.transpose(&[0, 0]).is_err());
    }

    #[test]
    fn test_reshape_packed() {
        let p = AccessPattern::row_major(&[2, 6]);
        let r = p.reshape_packed(&[3, 4]).unwrap();
        assert_eq!(r.strides(), &[4, 1]);
        assert!(p.reshape_packed(&[5]).is_err());
        let sliced = p.slice(1, 0, 6, 2).unwrap();
        assert!(sliced.reshape_packed(&[6]).is_err());
    }
}
