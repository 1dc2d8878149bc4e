// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Operation Registry
//!
//! Immutable table of per-operation metadata: symbol, commutativity,
//! identity element, inverse, and the kind predicates deciding which kinds
//! an operation accepts and on which kinds it can fault.
//!
//! The table is a `static` built at compile time and never mutated.
//!
//! ```rust
//! use minstride::{NumericKind, OpName, kernels::registry};
//!
//! let div = registry::get(OpName::Div);
//! assert_eq!(div.symbol, "/");
//! assert_eq!(div.inverse, Some(OpName::Mul));
//! assert!(div.may_fail(NumericKind::Int32));
//! assert!(!div.may_fail(NumericKind::Float32));
//! assert!(!registry::supports(OpName::Lt, NumericKind::Complex64));
//! ```

use num_complex::Complex;

use crate::enums::error::KernelError;
use crate::enums::kind::NumericKind;
use crate::enums::operators::OpName;
use crate::Scalar;

/// Identity element of an operation, resolved per kind by [`identity_scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// Additive identity: `0`, `0.0`, `0+0i`, `""`
    Zero,
    /// Multiplicative identity: `1`, `1.0`, `1+0i`
    One,
}

/// Registry row.
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    pub name: OpName,
    pub symbol: &'static str,
    pub commutative: bool,
    pub identity: Option<Identity>,
    /// Operation undoing this one against the same right operand
    pub inverse: Option<OpName>,
    kinds: fn(NumericKind) -> bool,
    may_fail: fn(NumericKind) -> bool,
}

impl Operation {
    /// Whether the operation is defined for `kind`.
    #[inline]
    pub fn supports(&self, kind: NumericKind) -> bool {
        (self.kinds)(kind)
    }

    /// Whether a kernel over `kind` can stop with an arithmetic fault.
    #[inline]
    pub fn may_fail(&self, kind: NumericKind) -> bool {
        (self.may_fail)(kind)
    }

    /// Kinds accepted by this operation, in catalogue order.
    pub fn kinds(&self) -> impl Iterator<Item = NumericKind> + '_ {
        NumericKind::ALL.into_iter().filter(|&k| self.supports(k))
    }
}

const fn any_kind(_: NumericKind) -> bool {
    true
}

const fn never(_: NumericKind) -> bool {
    false
}

const fn arith(
    name: OpName,
    symbol: &'static str,
    commutative: bool,
    identity: Option<Identity>,
    inverse: Option<OpName>,
    kinds: fn(NumericKind) -> bool,
    may_fail: fn(NumericKind) -> bool,
) -> Operation {
    Operation {
        name,
        symbol,
        commutative,
        identity,
        inverse,
        kinds,
        may_fail,
    }
}

const fn cmp(name: OpName, symbol: &'static str, commutative: bool, kinds: fn(NumericKind) -> bool) -> Operation {
    Operation {
        name,
        symbol,
        commutative,
        identity: None,
        inverse: None,
        kinds,
        may_fail: never,
    }
}

/// One row per [`OpName`], in [`OpName::ALL`] order.
pub static OPERATIONS: [Operation; 12] = [
    arith(OpName::Add, "+", true, Some(Identity::Zero), Some(OpName::Sub), NumericKind::supports_addition, never),
    arith(OpName::Sub, "-", false, Some(Identity::Zero), Some(OpName::Add), NumericKind::is_number, never),
    arith(OpName::Mul, "*", true, Some(Identity::One), Some(OpName::Div), NumericKind::is_number, never),
    arith(OpName::Div, "/", false, Some(Identity::One), Some(OpName::Mul), NumericKind::is_number, NumericKind::div_by_zero_fails),
    arith(OpName::Pow, "^", false, Some(Identity::One), None, NumericKind::is_number, never),
    arith(OpName::Mod, "%", false, None, None, NumericKind::is_non_complex_number, NumericKind::div_by_zero_fails),
    cmp(OpName::Gt, ">", false, NumericKind::is_ordered),
    cmp(OpName::Gte, ">=", false, NumericKind::is_ordered),
    cmp(OpName::Lt, "<", false, NumericKind::is_ordered),
    cmp(OpName::Lte, "<=", false, NumericKind::is_ordered),
    cmp(OpName::ElEq, "==", true, any_kind),
    cmp(OpName::ElNe, "!=", true, any_kind),
];

/// Registry row for `op`.
#[inline]
pub fn get(op: OpName) -> &'static Operation {
    &OPERATIONS[op as usize]
}

#[inline]
pub fn supports(op: OpName, kind: NumericKind) -> bool {
    get(op).supports(kind)
}

/// `UnsupportedKind` unless `op` is defined for `kind`.
pub fn check(op: OpName, kind: NumericKind) -> Result<&'static Operation, KernelError> {
    let row = get(op);
    if row.supports(kind) {
        Ok(row)
    } else {
        Err(KernelError::unsupported(op, kind))
    }
}

/// The identity element of `op` as a scalar of `kind`, when both exist.
pub fn identity_scalar(op: OpName, kind: NumericKind) -> Option<Scalar> {
    let identity = get(op).identity?;
    if !supports(op, kind) {
        return None;
    }
    let one = identity == Identity::One;
    let s = match kind {
        NumericKind::Int8 => Scalar::Int8(one as i8),
        NumericKind::Int16 => Scalar::Int16(one as i16),
        NumericKind::Int32 => Scalar::Int32(one as i32),
        NumericKind::Int64 => Scalar::Int64(one as i64),
        NumericKind::Isize => Scalar::Isize(one as isize),
        NumericKind::UInt8 => Scalar::UInt8(one as u8),
        NumericKind::UInt16 => Scalar::UInt16(one as u16),
        NumericKind::UInt32 => Scalar::UInt32(one as u32),
        NumericKind::UInt64 => Scalar::UInt64(one as u64),
        NumericKind::Usize => Scalar::Usize(one as usize),
        NumericKind::Float32 => Scalar::Float32(if one { 1.0 } else { 0.0 }),
        NumericKind::Float64 => Scalar::Float64(if one { 1.0 } else { 0.0 }),
        NumericKind::Complex64 => Scalar::Complex64(Complex::new(if one { 1.0 } else { 0.0 }, 0.0)),
        NumericKind::Complex128 => Scalar::Complex128(Complex::new(if one { 1.0 } else { 0.0 }, 0.0)),
        NumericKind::String if !one => Scalar::String(String::new()),
        _ => return None,
    };
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_in_opname_order() {
        for (i, op) in OpName::ALL.iter().enumerate() {
            assert_eq!(OPERATIONS[i].name, *op);
            assert_eq!(get(*op).name, *op);
        }
    }

    #[test]
    fn test_inverse_pairs_are_symmetric() {
        for row in OPERATIONS.iter() {
            if let Some(inv) = row.inverse {
                assert_eq!(get(inv).inverse, Some(row.name), "{}", row.name);
                assert_eq!(get(inv).identity, row.identity, "{}", row.name);
            }
        }
    }

    #[test]
    fn test_kind_predicates() {
        assert!(supports(OpName::Add, NumericKind::String));
        assert!(!supports(OpName::Sub, NumericKind::String));
        assert!(!supports(OpName::Mod, NumericKind::Complex128));
        assert!(supports(OpName::Mod, NumericKind::Float32));
        assert!(!supports(OpName::Gt, NumericKind::Bool));
        assert!(supports(OpName::ElEq, NumericKind::Bool));
        assert!(!supports(OpName::Add, NumericKind::Bool));
        assert_eq!(get(OpName::ElNe).kinds().count(), NumericKind::ALL.len());
        assert!(matches!(
            check(OpName::Pow, NumericKind::String),
            Err(KernelError::UnsupportedKind { .. })
        ));
    }

    #[test]
    fn test_may_fail_only_integer_division() {
        for row in OPERATIONS.iter() {
            for k in NumericKind::ALL {
                let expect = matches!(row.name, OpName::Div | OpName::Mod) && k.is_integer();
                assert_eq!(row.may_fail(k), expect, "{} {}", row.name, k);
            }
        }
    }

    #[test]
    fn test_identity_scalars() {
        assert_eq!(identity_scalar(OpName::Add, NumericKind::Int32), Some(Scalar::Int32(0)));
        assert_eq!(identity_scalar(OpName::Mul, NumericKind::UInt8), Some(Scalar::UInt8(1)));
        assert_eq!(identity_scalar(OpName::Add, NumericKind::String), Some(Scalar::String(String::new())));
        assert_eq!(identity_scalar(OpName::Mul, NumericKind::String), None);
        assert_eq!(identity_scalar(OpName::Mod, NumericKind::Int32), None);
        assert_eq!(identity_scalar(OpName::Add, NumericKind::Bool), None);
    }
}
