// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Comparison Operators
//!
//! Predicates for the six comparison operations, plus adapters turning a
//! predicate into a kernel closure under either output convention:
//!
//! - **Bool**: the result is a dedicated `bool` array.
//! - **Same**: the result is stored in the operand kind through its truthy
//!   encoding (`1`/`0`, `1.0`/`0.0`, `1+0i`, `true`/`false`).

use crate::enums::kind::NumericKind;
use crate::traits::type_unions::{Element, Ordered, Truthy};

/// Output convention of a comparison call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOutput {
    /// Operand kind, truthy encoded
    Same,
    /// `bool` array
    Bool,
}

impl CmpOutput {
    /// Kind of the array a comparison over `operand` kind produces.
    pub fn output_kind(self, operand: NumericKind) -> NumericKind {
        match self {
            CmpOutput::Same => operand,
            CmpOutput::Bool => NumericKind::Bool,
        }
    }
}

#[inline(always)]
pub fn gt<T: Ordered>(a: &T, b: &T) -> bool {
    a > b
}

#[inline(always)]
pub fn gte<T: Ordered>(a: &T, b: &T) -> bool {
    a >= b
}

#[inline(always)]
pub fn lt<T: Ordered>(a: &T, b: &T) -> bool {
    a < b
}

#[inline(always)]
pub fn lte<T: Ordered>(a: &T, b: &T) -> bool {
    a <= b
}

#[inline(always)]
pub fn el_eq<T: Element>(a: &T, b: &T) -> bool {
    a == b
}

#[inline(always)]
pub fn el_ne<T: Element>(a: &T, b: &T) -> bool {
    a != b
}

/// Kernel closure writing the predicate into a `bool` array.
#[inline]
pub fn to_bool<T, P>(pred: P) -> impl Fn(&T, &T) -> Option<bool> + Sync
where
    P: Fn(&T, &T) -> bool + Sync,
{
    move |a, b| Some(pred(a, b))
}

/// Kernel closure writing the predicate in the operand kind.
#[inline]
pub fn to_same<T, P>(pred: P) -> impl Fn(&T, &T) -> Option<T> + Sync
where
    T: Truthy,
    P: Fn(&T, &T) -> bool + Sync,
{
    move |a, b| Some(T::from_truth(pred(a, b)))
}
