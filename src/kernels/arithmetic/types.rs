// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Operand Arithmetic Operators
//!
//! Implementation of the standard Rust arithmetic operators (Add, Sub, Mul,
//! Div, Rem) for [`Operand`], [`Array`] and [`Scalar`] with broadcasting on.
//!
//! The operand kind is taken from the left side; a right side of another
//! kind is a `KindMismatch`.
//! ```rust
//! use minstride::{Array, DenseArray, Scalar};
//!
//! let a: Array = DenseArray::from_shape_vec(&[2, 1], vec![1i32, 2]).unwrap().into();
//! let b: Array = DenseArray::from_vec(vec![10i32, 20, 30]).into();
//! let sum = (a + b).unwrap();
//! assert_eq!(sum.shape(), &[2, 3]);
//!
//! let scaled = (sum * Scalar::from(2i32)).unwrap();
//! assert_eq!(
//!     scaled.downcast::<i32>().unwrap().to_vec(),
//!     vec![22, 42, 62, 24, 44, 64]
//! );
//! ```

use std::ops::{Add, Div, Mul, Rem, Sub};

use crate::enums::error::KernelError;
use crate::enums::operand::Operand;
use crate::enums::operators::OpName;
use crate::kernels::routing::dispatch;
use crate::structs::func_opts::FuncOpts;
use crate::{Array, Scalar};

/// Broadcasting dispatch with the left operand's kind.
fn apply(op: OpName, lhs: Operand, rhs: Operand) -> Result<Array, KernelError> {
    let kind = lhs.kind();
    dispatch(op, kind, lhs, rhs, FuncOpts::new().broadcast(true))
}

macro_rules! impl_operator {
    ($trait:ident, $method:ident, $op:expr, $lhs:ty, $rhs:ty) => {
        impl $trait<$rhs> for $lhs {
            type Output = Result<Array, KernelError>;

            fn $method(self, rhs: $rhs) -> Self::Output {
                apply($op, Operand::from(self), Operand::from(rhs))
            }
        }
    };
}

macro_rules! impl_operator_set {
    ($trait:ident, $method:ident, $op:expr) => {
        impl_operator!($trait, $method, $op, Operand, Operand);
        impl_operator!($trait, $method, $op, Array, Array);
        impl_operator!($trait, $method, $op, Array, Scalar);
        impl_operator!($trait, $method, $op, Scalar, Array);
    };
}

impl_operator_set!(Add, add, OpName::Add);
impl_operator_set!(Sub, sub, OpName::Sub);
impl_operator_set!(Mul, mul, OpName::Mul);
impl_operator_set!(Div, div, OpName::Div);
impl_operator_set!(Rem, rem, OpName::Mod);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DenseArray;

    fn f64s(v: Vec<f64>) -> Array {
        DenseArray::from_vec(v).into()
    }

    #[test]
    fn test_array_operators() {
        let a = f64s(vec![6.0, 8.0]);
        let b = f64s(vec![2.0, 4.0]);
        assert_eq!((a.clone() + b.clone()).unwrap().downcast::<f64>().unwrap().to_vec(), vec![8.0, 12.0]);
        assert_eq!((a.clone() - b.clone()).unwrap().downcast::<f64>().unwrap().to_vec(), vec![4.0, 4.0]);
        assert_eq!((a.clone() * b.clone()).unwrap().downcast::<f64>().unwrap().to_vec(), vec![12.0, 32.0]);
        assert_eq!((a.clone() / b.clone()).unwrap().downcast::<f64>().unwrap().to_vec(), vec![3.0, 2.0]);
        assert_eq!((a % b).unwrap().downcast::<f64>().unwrap().to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_scalar_on_either_side() {
        let a: Array = DenseArray::from_vec(vec![1i64, 2, 4]).into();
        let out = (Scalar::from(8i64) / a).unwrap();
        assert_eq!(out.downcast::<i64>().unwrap().to_vec(), vec![8, 4, 2]);
    }

    #[test]
    fn test_operator_errors_carry_op() {
        let a: Array = DenseArray::from_vec(vec![1u32, 2]).into();
        let zero = Scalar::from(0u32);
        let err = (a.clone() % zero).unwrap_err();
        assert_eq!(err.to_string(), "Mod: Integer division by zero at element 0.");

        let other: Array = DenseArray::from_vec(vec![1i32, 2]).into();
        let err = (a - other).unwrap_err();
        assert!(matches!(err.root(), KernelError::KindMismatch { .. }));
    }

    #[test]
    fn test_operand_operator() {
        let a: Operand = DenseArray::from_vec(vec!["x".to_string()]).into();
        let b: Operand = Scalar::from("y").into();
        let out = (a + b).unwrap();
        assert_eq!(out.downcast::<String>().unwrap().to_vec(), vec!["xy".to_string()]);
    }
}
