//! # **Operand Module**
//!
//! One side of a binary call: either an [`Array`] or a [`Scalar`].

use crate::enums::kind::NumericKind;
use crate::structs::access_pattern::AccessPattern;
use crate::{Array, DenseArray, Scalar};
use crate::traits::type_unions::Element;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Array(Array),
    Scalar(Scalar),
}

impl Operand {
    pub fn kind(&self) -> NumericKind {
        match self {
            Operand::Array(a) => a.kind(),
            Operand::Scalar(s) => s.kind(),
        }
    }

    /// Shape of an array side; `[]` for a scalar.
    pub fn shape(&self) -> &[usize] {
        match self {
            Operand::Array(a) => a.shape(),
            Operand::Scalar(_) => &[],
        }
    }

    /// Pattern of an array side; `None` for a scalar.
    pub fn pattern(&self) -> Option<&AccessPattern> {
        match self {
            Operand::Array(a) => Some(a.pattern()),
            Operand::Scalar(_) => None,
        }
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Operand::Scalar(_))
    }

    /// A scalar, or an array holding exactly one element.
    pub fn is_scalar_equivalent(&self) -> bool {
        match self {
            Operand::Array(a) => a.pattern().is_scalar_equivalent(),
            Operand::Scalar(_) => true,
        }
    }
}

impl From<Array> for Operand {
    #[inline]
    fn from(a: Array) -> Self {
        Operand::Array(a)
    }
}

impl From<Scalar> for Operand {
    #[inline]
    fn from(s: Scalar) -> Self {
        Operand::Scalar(s)
    }
}

impl<T: Element> From<DenseArray<T>> for Operand {
    #[inline]
    fn from(a: DenseArray<T>) -> Self {
        Operand::Array(T::into_array(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_shapes() {
        let a: Operand = DenseArray::filled(&[1, 1], 2.0f64).into();
        assert_eq!(a.kind(), NumericKind::Float64);
        assert!(a.is_scalar_equivalent());
        assert!(!a.is_scalar());
        let s: Operand = Scalar::from(2.0f64).into();
        assert!(s.is_scalar());
        assert!(s.shape().is_empty());
        assert!(s.pattern().is_none());
    }
}
