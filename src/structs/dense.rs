//! # **DenseArray Module** - *Strided N-dimensional array*
//!
//! A typed array made of a shared [`Buffer`], an [`AccessPattern`] describing
//! which buffer slots form the logical array, and an optional validity
//! [`Bitmask`] indexed by storage offset.
//!
//! ## Sharing
//! - Views (`slice`, `transpose`, `broadcast_to`) clone the `Arc` and swap the
//!   pattern. No element is copied.
//! - Writes go through [`DenseArray::data_mut`], which is copy-on-write: a
//!   buffer still referenced by another array is cloned first, so an
//!   aliased buffer is never mutated behind its other owners' backs.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::enums::error::KernelError;
use crate::structs::access_pattern::{AccessPattern, MemoryOrder, shape_size};
use crate::structs::flat_iterator::FlatIterator;
use crate::traits::print::MAX_PREVIEW;
use crate::traits::type_unions::Element;
use crate::{Bitmask, Buffer};

/// # DenseArray
///
/// Dense, strided, optionally masked array of `T`.
///
/// ## Fields
/// - `data`: backing storage, shared between views.
/// - `pattern`: shape, strides, offset and order of this view.
/// - `mask`: optional validity bits, one per **buffer slot**.
///
/// ## Example
/// ```rust
/// use minstride::DenseArray;
///
/// let a = DenseArray::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// let t = a.transpose(&[1, 0]).unwrap();
/// assert_eq!(t.shape(), &[3, 2]);
/// assert_eq!(t.to_vec(), vec![1, 4, 2, 5, 3, 6]);
/// assert!(a.shares_buffer(&t));
/// ```
#[derive(Clone, PartialEq)]
pub struct DenseArray<T> {
    pub data: Arc<Buffer<T>>,
    pub pattern: AccessPattern,
    pub mask: Option<Arc<Bitmask>>,
}

impl<T: Clone> DenseArray<T> {
    /// One-dimensional array over `values`.
    pub fn from_vec(values: Vec<T>) -> Self {
        let pattern = AccessPattern::row_major(&[values.len()]);
        Self {
            data: Arc::new(Buffer::from(values)),
            pattern,
            mask: None,
        }
    }

    /// Row-major array of `shape` over `values`.
    pub fn from_shape_vec(shape: &[usize], values: Vec<T>) -> Result<Self, KernelError> {
        Self::from_shape_vec_in(shape, values, MemoryOrder::RowMajor)
    }

    /// Packed array of `shape` over `values`, laid out in `order`.
    pub fn from_shape_vec_in(
        shape: &[usize],
        values: Vec<T>,
        order: MemoryOrder,
    ) -> Result<Self, KernelError> {
        if shape_size(shape) != values.len() {
            return Err(KernelError::ShapeMismatch {
                lhs: shape.to_vec(),
                rhs: vec![values.len()],
                message: Some(format!(
                    "shape holds {} elements but {} were supplied",
                    shape_size(shape),
                    values.len()
                )),
            });
        }
        Ok(Self {
            data: Arc::new(Buffer::from(values)),
            pattern: AccessPattern::packed(shape, order),
            mask: None,
        })
    }

    /// Assembles an array from raw parts, validating pattern bounds and mask length.
    pub fn from_parts(
        data: Buffer<T>,
        pattern: AccessPattern,
        mask: Option<Bitmask>,
    ) -> Result<Self, KernelError> {
        let out = Self {
            data: Arc::new(data),
            pattern,
            mask: mask.map(Arc::new),
        };
        out.validate()?;
        Ok(out)
    }

    /// Rank-0 array holding `value`.
    pub fn scalar(value: T) -> Self {
        Self {
            data: Arc::new(Buffer::from(vec![value])),
            pattern: AccessPattern::scalar(),
            mask: None,
        }
    }

    /// Row-major array of `shape` with every element set to `value`.
    pub fn filled(shape: &[usize], value: T) -> Self {
        Self {
            data: Arc::new(Buffer::filled(value, shape_size(shape))),
            pattern: AccessPattern::row_major(shape),
            mask: None,
        }
    }

    /// Attaches a validity mask. Its length must equal the buffer length.
    pub fn with_mask(mut self, mask: Bitmask) -> Result<Self, KernelError> {
        if mask.len() != self.data.len() {
            return Err(KernelError::InvalidPattern(format!(
                "mask covers {} slots but buffer holds {}",
                mask.len(),
                self.data.len()
            )));
        }
        self.mask = Some(Arc::new(mask));
        Ok(self)
    }

    /// Mutable access to the whole buffer, cloning it first when shared.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// Logical elements in row-major order, ignoring the mask.
    pub fn to_vec(&self) -> Vec<T> {
        FlatIterator::new(&self.pattern)
            .map(|(off, _)| self.data[off].clone())
            .collect()
    }

    /// Packed row-major copy. The mask, if any, is compacted alongside.
    pub fn to_contiguous(&self) -> Self {
        self.to_contiguous_in(MemoryOrder::RowMajor)
    }

    /// Packed copy laid out in `order`.
    pub fn to_contiguous_in(&self, order: MemoryOrder) -> Self {
        let it = FlatIterator::new(&self.pattern)
            .with_mask(self.mask.as_deref())
            .with_order(order);
        let mut values = Vec::with_capacity(self.len());
        let mut bits = Vec::with_capacity(if self.mask.is_some() { self.len() } else { 0 });
        for (off, valid) in it {
            values.push(self.data[off].clone());
            if self.mask.is_some() {
                bits.push(valid);
            }
        }
        Self {
            data: Arc::new(Buffer::from(values)),
            pattern: AccessPattern::packed(self.shape(), order),
            mask: self.mask.as_ref().map(|_| Arc::new(Bitmask::from_bools(&bits))),
        }
    }

    /// Same elements, in row-major logical order, under a new shape.
    ///
    /// Packed row-major views are reshaped in place; anything else is copied first.
    pub fn reshape(&self, shape: &[usize]) -> Result<Self, KernelError> {
        if shape_size(shape) != self.len() {
            return Err(KernelError::shape_mismatch(self.shape(), shape));
        }
        let base = if self.pattern.is_contiguous() && self.pattern.is_row_major() {
            self.clone()
        } else {
            self.to_contiguous()
        };
        let pattern = base.pattern.reshape_packed(shape)?;
        Ok(Self { pattern, ..base })
    }
}

impl<T> DenseArray<T> {
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.pattern.shape()
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        self.pattern.strides()
    }

    #[inline]
    pub fn pattern(&self) -> &AccessPattern {
        &self.pattern
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.pattern.rank()
    }

    /// Number of logical elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.pattern.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_masked(&self) -> bool {
        self.mask.is_some()
    }

    /// Laid out without gaps in its declared order.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.pattern.is_contiguous()
    }

    /// Whether `self` and `other` are views of one buffer.
    #[inline]
    pub fn shares_buffer(&self, other: &DenseArray<T>) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Checks the pattern stays inside the buffer and the mask covers it.
    pub fn validate(&self) -> Result<(), KernelError> {
        self.pattern.check_bounds(self.data.len())?;
        if let Some(mask) = &self.mask {
            if mask.len() != self.data.len() {
                return Err(KernelError::InvalidPattern(format!(
                    "mask covers {} slots but buffer holds {}",
                    mask.len(),
                    self.data.len()
                )));
            }
        }
        Ok(())
    }

    /// Element at `coord`, or `None` when out of range or masked.
    pub fn get(&self, coord: &[usize]) -> Option<&T> {
        if coord.len() != self.rank() || coord.iter().zip(self.shape()).any(|(&c, &d)| c >= d) {
            return None;
        }
        let off = self.pattern.offset_of(coord);
        if self.mask.as_ref().is_some_and(|m| !m.get(off)) {
            return None;
        }
        self.data.get(off)
    }

    /// Storage cursor over this view, carrying the mask.
    #[inline]
    pub fn cursor(&self) -> FlatIterator<'_> {
        FlatIterator::new(&self.pattern).with_mask(self.mask.as_deref())
    }

    /// Logical elements in row-major order; masked slots yield `None`.
    pub fn iter_logical(&self) -> impl Iterator<Item = Option<&T>> + '_ {
        self.cursor()
            .map(move |(off, valid)| if valid { Some(&self.data[off]) } else { None })
    }

    /// Strided sub-range along `axis`, sharing the buffer.
    pub fn slice(&self, axis: usize, start: usize, end: usize, step: usize) -> Result<Self, KernelError> {
        Ok(self.view(self.pattern.slice(axis, start, end, step)?))
    }

    /// Axis permutation, sharing the buffer.
    pub fn transpose(&self, perm: &[usize]) -> Result<Self, KernelError> {
        Ok(self.view(self.pattern.transpose(perm)?))
    }

    /// Read-only view stretched to `shape` with zero strides on broadcast axes.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self, KernelError> {
        let strides = crate::kernels::broadcast::effective_strides(&self.pattern, shape)?;
        let pattern = AccessPattern::new(
            shape.to_vec(),
            strides,
            self.pattern.offset(),
            self.pattern.order(),
        )?;
        Ok(self.view(pattern))
    }

    #[inline]
    fn view(&self, pattern: AccessPattern) -> Self {
        Self {
            data: Arc::clone(&self.data),
            pattern,
            mask: self.mask.clone(),
        }
    }
}

impl<T: Element> Display for DenseArray<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DenseArray<{}> {:?} [", T::KIND, self.shape())?;
        for (i, v) in self.iter_logical().take(MAX_PREVIEW).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match v {
                Some(v) => write!(f, "{:?}", v)?,
                None => write!(f, "null")?,
            }
        }
        if self.len() > MAX_PREVIEW {
            write!(f, ", ... ({} total)", self.len())?;
        }
        write!(f, "]")
    }
}

impl<T: Element> std::fmt::Debug for DenseArray<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseArray")
            .field("kind", &T::KIND)
            .field("pattern", &self.pattern)
            .field("masked", &self.is_masked())
            .field("values", &self.to_vec())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_shape_vec_checks_size() {
        let err = DenseArray::from_shape_vec(&[2, 2], vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, KernelError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_slice_is_a_view() {
        let a = DenseArray::from_shape_vec(&[2, 4], (0..8).collect()).unwrap();
        let s = a.slice(1, 1, 4, 2).unwrap();
        assert_eq!(s.shape(), &[2, 2]);
        assert_eq!(s.to_vec(), vec![1, 3, 5, 7]);
        assert!(s.shares_buffer(&a));
        assert!(!s.is_contiguous());
        assert_eq!(s.get(&[1, 0]), Some(&5));
        assert_eq!(s.get(&[2, 0]), None);
    }

    #[test]
    fn test_copy_on_write() {
        let a = DenseArray::from_vec(vec![1.0f64, 2.0]);
        let mut b = a.clone();
        b.data_mut()[0] = 9.0;
        assert_eq!(a.to_vec(), vec![1.0, 2.0]);
        assert_eq!(b.to_vec(), vec![9.0, 2.0]);
        assert!(!a.shares_buffer(&b));
    }

    #[test]
    fn test_to_contiguous_compacts_mask() {
        let a = DenseArray::from_vec(vec![1i64, 2, 3, 4])
            .with_mask(Bitmask::from_bools(&[true, false, true, false]))
            .unwrap();
        let evens = a.slice(0, 1, 4, 2).unwrap();
        let packed = evens.to_contiguous();
        assert_eq!(packed.to_vec(), vec![2, 4]);
        assert_eq!(packed.iter_logical().collect::<Vec<_>>(), vec![None, None]);
        assert!(packed.is_contiguous());
    }

    #[test]
    fn test_col_major_layout() {
        let a = DenseArray::from_shape_vec_in(&[2, 3], vec![1, 4, 2, 5, 3, 6], MemoryOrder::ColMajor)
            .unwrap();
        assert_eq!(a.to_vec(), vec![1, 2, 3, 4, 5, 6]);
        let r = a.to_contiguous();
        assert_eq!(r.data.as_slice(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_reshape_and_broadcast_to() {
        let a = DenseArray::from_shape_vec(&[2, 3], (0..6).collect()).unwrap();
        let r = a.reshape(&[3, 2]).unwrap();
        assert_eq!(r.get(&[2, 1]), Some(&5));
        let t = a.transpose(&[1, 0]).unwrap().reshape(&[6]).unwrap();
        assert_eq!(t.to_vec(), vec![0, 3, 1, 4, 2, 5]);
        let row = DenseArray::from_vec(vec![7, 8, 9]);
        let b = row.broadcast_to(&[2, 3]).unwrap();
        assert_eq!(b.to_vec(), vec![7, 8, 9, 7, 8, 9]);
    }

    #[test]
    fn test_from_parts_validates() {
        let bad = AccessPattern::row_major(&[5]);
        assert!(matches!(
            DenseArray::from_parts(Buffer::from(vec![1u8, 2]), bad, None),
            Err(KernelError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_display() {
        let a = DenseArray::from_vec(vec![1i32, 2]);
        assert_eq!(format!("{}", a), "DenseArray<int32> [2] [1, 2]");
    }
}
