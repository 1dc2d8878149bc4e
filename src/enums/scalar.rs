//! # **Scalar Module** - *Single Value Container*
//!
//! Contains the `Scalar` type for holding one value of any [`NumericKind`].
//!
//! ## Purpose
//! - Right- or left-hand operand of a broadcasting call, without wrapping
//!   it into a rank-0 array first.
//! - Unifies type signatures when a value of one of several kinds is expected.

use std::fmt::{Display, Formatter};

use num_complex::Complex;

use crate::enums::error::KernelError;
use crate::enums::kind::NumericKind;
use crate::traits::type_unions::Element;
use crate::{Array, DenseArray};

/// # Scalar
///
/// Scalar literals covering every supported kind.
///
/// ## Example
/// ```rust
/// use minstride::{NumericKind, Scalar};
///
/// let s = Scalar::from(3i64);
/// assert_eq!(s.kind(), NumericKind::Int64);
/// assert_eq!(s.try_value::<i64>(), Ok(3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Isize(isize),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Usize(usize),
    Float32(f32),
    Float64(f64),
    Complex64(Complex<f32>),
    Complex128(Complex<f64>),
    String(String),
}

/// Binds the value of any `Scalar` variant to `$v`.
macro_rules! match_scalar {
    ($s:expr, $v:ident => $body:expr) => {
        match $s {
            Scalar::Bool($v) => $body,
            Scalar::Int8($v) => $body,
            Scalar::Int16($v) => $body,
            Scalar::Int32($v) => $body,
            Scalar::Int64($v) => $body,
            Scalar::Isize($v) => $body,
            Scalar::UInt8($v) => $body,
            Scalar::UInt16($v) => $body,
            Scalar::UInt32($v) => $body,
            Scalar::UInt64($v) => $body,
            Scalar::Usize($v) => $body,
            Scalar::Float32($v) => $body,
            Scalar::Float64($v) => $body,
            Scalar::Complex64($v) => $body,
            Scalar::Complex128($v) => $body,
            Scalar::String($v) => $body,
        }
    };
}

impl Scalar {
    /// Runtime kind tag of the held value.
    pub fn kind(&self) -> NumericKind {
        match_scalar!(self, v => kind_of(v))
    }

    /// Extracts the value as `T`, or reports the kind actually held.
    pub fn try_value<T: Element>(self) -> Result<T, KernelError> {
        T::try_from_scalar(self).map_err(|other| KernelError::KindMismatch {
            expected: T::KIND,
            found: other.kind(),
        })
    }

    /// Rank-0 array holding this value.
    pub fn to_array(&self) -> Array {
        match_scalar!(self, v => Array::from(DenseArray::scalar(v.clone())))
    }

    /// Row-major array of `shape` filled with this value.
    pub fn array_from_value(&self, shape: &[usize]) -> Array {
        match_scalar!(self, v => Array::from(DenseArray::filled(shape, v.clone())))
    }
}

#[inline]
fn kind_of<T: Element>(_: &T) -> NumericKind {
    T::KIND
}

impl From<&str> for Scalar {
    #[inline]
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match_scalar!(self, v => write!(f, "{:?}", v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Scalar::from(true).kind(), NumericKind::Bool);
        assert_eq!(Scalar::from(1usize).kind(), NumericKind::Usize);
        assert_eq!(Scalar::from("x").kind(), NumericKind::String);
        assert_eq!(
            Scalar::from(Complex::new(0.0f32, 1.0)).kind(),
            NumericKind::Complex64
        );
    }

    #[test]
    fn test_try_value_mismatch() {
        let err = Scalar::from(1.0f32).try_value::<f64>().unwrap_err();
        assert_eq!(
            err,
            KernelError::KindMismatch {
                expected: NumericKind::Float64,
                found: NumericKind::Float32
            }
        );
    }

    #[test]
    fn test_to_array() {
        let a = Scalar::from(7u8).to_array();
        assert_eq!(a.kind(), NumericKind::UInt8);
        assert!(a.shape().is_empty());
        let f = Scalar::from(2i32).array_from_value(&[2, 2]);
        assert_eq!(f.downcast::<i32>().unwrap().to_vec(), vec![2; 4]);
    }
}
