//! # **Array Module** - *Kind-erased array container*
//!
//! `Array` is the unified container the dispatcher accepts and returns.
//! One variant per [`NumericKind`], each holding a typed [`DenseArray`].
//!
//! ## Features
//! - `kind()` resolves the variant to its runtime tag.
//! - `downcast` / `as_typed` recover the concrete array when the kind is known.
//! - Views (`slice`, `transpose`) keep the variant and share the buffer.
//! - Simplifies signatures by allowing `impl Into<Array>`.

use std::fmt::{Display, Formatter};

use num_complex::Complex;

use crate::enums::error::KernelError;
use crate::enums::kind::NumericKind;
use crate::structs::access_pattern::AccessPattern;
use crate::traits::type_unions::Element;
use crate::{DenseArray, match_array};

/// # Array
///
/// Closed, kind-tagged wrapper over [`DenseArray`].
///
/// ## Example
/// ```rust
/// use minstride::{Array, DenseArray, NumericKind};
///
/// let arr: Array = DenseArray::from_vec(vec![1.5f32, 2.5]).into();
/// assert_eq!(arr.kind(), NumericKind::Float32);
/// assert_eq!(arr.shape(), &[2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Bool(DenseArray<bool>),
    Int8(DenseArray<i8>),
    Int16(DenseArray<i16>),
    Int32(DenseArray<i32>),
    Int64(DenseArray<i64>),
    Isize(DenseArray<isize>),
    UInt8(DenseArray<u8>),
    UInt16(DenseArray<u16>),
    UInt32(DenseArray<u32>),
    UInt64(DenseArray<u64>),
    Usize(DenseArray<usize>),
    Float32(DenseArray<f32>),
    Float64(DenseArray<f64>),
    Complex64(DenseArray<Complex<f32>>),
    Complex128(DenseArray<Complex<f64>>),
    String(DenseArray<String>),
}

impl Array {
    /// Runtime kind tag of the held array.
    pub fn kind(&self) -> NumericKind {
        match self {
            Array::Bool(_) => NumericKind::Bool,
            Array::Int8(_) => NumericKind::Int8,
            Array::Int16(_) => NumericKind::Int16,
            Array::Int32(_) => NumericKind::Int32,
            Array::Int64(_) => NumericKind::Int64,
            Array::Isize(_) => NumericKind::Isize,
            Array::UInt8(_) => NumericKind::UInt8,
            Array::UInt16(_) => NumericKind::UInt16,
            Array::UInt32(_) => NumericKind::UInt32,
            Array::UInt64(_) => NumericKind::UInt64,
            Array::Usize(_) => NumericKind::Usize,
            Array::Float32(_) => NumericKind::Float32,
            Array::Float64(_) => NumericKind::Float64,
            Array::Complex64(_) => NumericKind::Complex64,
            Array::Complex128(_) => NumericKind::Complex128,
            Array::String(_) => NumericKind::String,
        }
    }

    #[inline]
    pub fn pattern(&self) -> &AccessPattern {
        match_array!(self, a => a.pattern())
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.pattern().shape()
    }

    /// Number of logical elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.pattern().size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_masked(&self) -> bool {
        match_array!(self, a => a.is_masked())
    }

    /// Checks the pattern stays inside the buffer and the mask covers it.
    pub fn validate(&self) -> Result<(), KernelError> {
        match_array!(self, a => a.validate())
    }

    /// Whether both arrays are views over one buffer.
    pub fn shares_buffer(&self, other: &Array) -> bool {
        match (self, other) {
            (Array::Bool(a), Array::Bool(b)) => a.shares_buffer(b),
            (Array::Int8(a), Array::Int8(b)) => a.shares_buffer(b),
            (Array::Int16(a), Array::Int16(b)) => a.shares_buffer(b),
            (Array::Int32(a), Array::Int32(b)) => a.shares_buffer(b),
            (Array::Int64(a), Array::Int64(b)) => a.shares_buffer(b),
            (Array::Isize(a), Array::Isize(b)) => a.shares_buffer(b),
            (Array::UInt8(a), Array::UInt8(b)) => a.shares_buffer(b),
            (Array::UInt16(a), Array::UInt16(b)) => a.shares_buffer(b),
            (Array::UInt32(a), Array::UInt32(b)) => a.shares_buffer(b),
            (Array::UInt64(a), Array::UInt64(b)) => a.shares_buffer(b),
            (Array::Usize(a), Array::Usize(b)) => a.shares_buffer(b),
            (Array::Float32(a), Array::Float32(b)) => a.shares_buffer(b),
            (Array::Float64(a), Array::Float64(b)) => a.shares_buffer(b),
            (Array::Complex64(a), Array::Complex64(b)) => a.shares_buffer(b),
            (Array::Complex128(a), Array::Complex128(b)) => a.shares_buffer(b),
            (Array::String(a), Array::String(b)) => a.shares_buffer(b),
            _ => false,
        }
    }

    /// Consumes the array, returning the typed inner array.
    pub fn downcast<T: Element>(self) -> Result<DenseArray<T>, KernelError> {
        T::try_from_array(self).map_err(|other| KernelError::KindMismatch {
            expected: T::KIND,
            found: other.kind(),
        })
    }

    /// Borrows the typed inner array when the kind matches.
    #[inline]
    pub fn as_typed<T: Element>(&self) -> Option<&DenseArray<T>> {
        T::as_dense(self)
    }

    /// Strided sub-range along `axis`, sharing the buffer.
    pub fn slice(&self, axis: usize, start: usize, end: usize, step: usize) -> Result<Array, KernelError> {
        match_array!(self, a => a.slice(axis, start, end, step).map(Array::from))
    }

    /// Axis permutation, sharing the buffer.
    pub fn transpose(&self, perm: &[usize]) -> Result<Array, KernelError> {
        match_array!(self, a => a.transpose(perm).map(Array::from))
    }

    /// Packed row-major copy.
    pub fn to_contiguous(&self) -> Array {
        match_array!(self, a => Array::from(a.to_contiguous()))
    }
}

impl Display for Array {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match_array!(self, a => write!(f, "{}", a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_downcast() {
        let arr: Array = DenseArray::from_vec(vec![1u16, 2, 3]).into();
        assert_eq!(arr.kind(), NumericKind::UInt16);
        assert_eq!(arr.len(), 3);
        assert!(arr.as_typed::<u16>().is_some());
        assert!(arr.as_typed::<i16>().is_none());
        let err = arr.clone().downcast::<f64>().unwrap_err();
        assert_eq!(
            err,
            KernelError::KindMismatch {
                expected: NumericKind::Float64,
                found: NumericKind::UInt16
            }
        );
        assert_eq!(arr.downcast::<u16>().unwrap().to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_views_keep_variant_and_buffer() {
        let arr: Array = DenseArray::from_shape_vec(&[2, 2], vec![1i8, 2, 3, 4])
            .unwrap()
            .into();
        let t = arr.transpose(&[1, 0]).unwrap();
        assert_eq!(t.kind(), NumericKind::Int8);
        assert!(t.shares_buffer(&arr));
        assert!(!t.to_contiguous().shares_buffer(&arr));
        let s = arr.slice(0, 1, 2, 1).unwrap();
        assert_eq!(s.shape(), &[1, 2]);
    }

    #[test]
    fn test_string_and_complex_variants() {
        let s: Array = DenseArray::from_vec(vec!["a".to_string()]).into();
        assert_eq!(s.kind(), NumericKind::String);
        let c: Array = DenseArray::from_vec(vec![Complex::new(1.0f64, 2.0)]).into();
        assert_eq!(c.kind(), NumericKind::Complex128);
        assert!(!s.shares_buffer(&c));
    }
}
