// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Binary Map Module
//!
//! Applies an arbitrary infallible binary function element-wise, outside the
//! fixed operation catalogue, through the same layout planner `dispatch` uses.

use crate::enums::error::KernelError;
use crate::kernels::routing::execute::{ExecConfig, Side, run_assign};
use crate::traits::type_unions::Element;
use crate::DenseArray;

/// Apply `f` element-wise with broadcasting.
///
/// Either side may be strided, masked, or broadcast against the other. The
/// result is a fresh packed array; positions masked on either side are
/// masked in the result.
///
/// # Example
/// ```rust
/// use minstride::{DenseArray, binary_map};
///
/// let col = DenseArray::from_shape_vec(&[2, 1], vec![1.0f64, 2.0]).unwrap();
/// let row = DenseArray::from_vec(vec![10.0f64, 20.0, 30.0]);
/// let out = binary_map(&col, &row, |a, b| a.max(*b) > 15.0).unwrap();
/// assert_eq!(out.shape(), &[2, 3]);
/// assert_eq!(out.to_vec(), vec![false, true, true, false, true, true]);
/// ```
pub fn binary_map<T, U, F>(lhs: &DenseArray<T>, rhs: &DenseArray<T>, f: F) -> Result<DenseArray<U>, KernelError>
where
    T: Element,
    U: Element,
    F: Fn(&T, &T) -> U + Sync,
{
    lhs.validate()?;
    rhs.validate()?;
    let cfg = ExecConfig {
        broadcast: true,
        parallel: true,
    };
    run_assign(Side::Array(lhs), Side::Array(rhs), None, cfg, |a, b| Some(f(a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bitmask;

    #[test]
    fn test_binary_map_same_shape() {
        let a = DenseArray::from_vec(vec![1i32, 2, 3]);
        let b = DenseArray::from_vec(vec![3i32, 2, 1]);
        let out = binary_map(&a, &b, |x, y| x * 10 + y).unwrap();
        assert_eq!(out.to_vec(), vec![13, 22, 31]);
    }

    #[test]
    fn test_binary_map_changes_type() {
        let a = DenseArray::from_vec(vec!["ab".to_string(), "c".to_string()]);
        let b = DenseArray::scalar("abc".to_string());
        let out = binary_map(&a, &b, |x, y| y.starts_with(x.as_str())).unwrap();
        assert_eq!(out.to_vec(), vec![true, false]);
    }

    #[test]
    fn test_binary_map_strided_and_masked() {
        let base = DenseArray::from_vec(vec![1.0f32, 2.0, 3.0, 4.0])
            .with_mask(Bitmask::from_bools(&[true, true, false, true]))
            .unwrap();
        let odd = base.slice(0, 0, 4, 2).unwrap();
        let b = DenseArray::from_vec(vec![1.0f32, 1.0]);
        let out = binary_map(&odd, &b, |x, y| x + y).unwrap();
        let got: Vec<Option<f32>> = out.iter_logical().map(|v| v.copied()).collect();
        assert_eq!(got, vec![Some(2.0), None]);
    }

    #[test]
    fn test_binary_map_incompatible_shapes() {
        let a = DenseArray::from_vec(vec![1u8, 2, 3]);
        let b = DenseArray::from_vec(vec![1u8, 2]);
        let err = binary_map(&a, &b, |x, y| x ^ y).unwrap_err();
        assert!(matches!(err, KernelError::ShapeMismatch { .. }));
    }
}
