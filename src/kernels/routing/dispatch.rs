// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Dispatch
//!
//! Runtime entry point: `dispatch(op, kind, a, b, opts)`.
//!
//! Per call, in order:
//! 1. Cancellation check.
//! 2. Validation of options, registry support for `kind`, operand kinds and
//!    operand patterns. Nothing is written before all of it passes.
//! 3. Destination: in-place, reuse, increment or fresh.
//! 4. Kind resolution: the runtime `kind` picks one monomorphised kernel.
//! 5. Execution through the planner in [`execute`](super::execute).
//!
//! Any error leaving this module is wrapped once in `KernelError::Op`.

use num_complex::Complex;
use tracing::debug;

use crate::enums::error::KernelError;
use crate::enums::kind::NumericKind;
use crate::enums::operand::Operand;
use crate::enums::operators::{OpClass, OpName};
use crate::kernels::arithmetic::{add, div, mul, pow, rem, sub};
use crate::kernels::comparison::{CmpOutput, el_eq, el_ne, gt, gte, lt, lte, to_bool, to_same};
use crate::kernels::registry;
use crate::kernels::routing::execute::{
    ExecConfig, Side, Target, run_assign, run_in_place, run_increment,
};
use crate::structs::func_opts::FuncOpts;
use crate::traits::type_unions::{Addable, Element, Truthy};
use crate::{Array, DenseArray, with_kind};

/// Integers, floats and complex.
macro_rules! for_numbers {
    ($kind:expr, |$t:ident| $body:expr, $fallback:expr) => {
        with_kind!($kind, |$t| $body, [
            Int8 => i8, Int16 => i16, Int32 => i32, Int64 => i64, Isize => isize,
            UInt8 => u8, UInt16 => u16, UInt32 => u32, UInt64 => u64, Usize => usize,
            Float32 => f32, Float64 => f64,
            Complex64 => Complex<f32>, Complex128 => Complex<f64>,
        ], $fallback)
    };
}

/// Numbers and `String`.
macro_rules! for_addable {
    ($kind:expr, |$t:ident| $body:expr, $fallback:expr) => {
        with_kind!($kind, |$t| $body, [
            Int8 => i8, Int16 => i16, Int32 => i32, Int64 => i64, Isize => isize,
            UInt8 => u8, UInt16 => u16, UInt32 => u32, UInt64 => u64, Usize => usize,
            Float32 => f32, Float64 => f64,
            Complex64 => Complex<f32>, Complex128 => Complex<f64>,
            String => String,
        ], $fallback)
    };
}

/// Integers and floats.
macro_rules! for_real {
    ($kind:expr, |$t:ident| $body:expr, $fallback:expr) => {
        with_kind!($kind, |$t| $body, [
            Int8 => i8, Int16 => i16, Int32 => i32, Int64 => i64, Isize => isize,
            UInt8 => u8, UInt16 => u16, UInt32 => u32, UInt64 => u64, Usize => usize,
            Float32 => f32, Float64 => f64,
        ], $fallback)
    };
}

/// Integers, floats and `String`.
macro_rules! for_ordered {
    ($kind:expr, |$t:ident| $body:expr, $fallback:expr) => {
        with_kind!($kind, |$t| $body, [
            Int8 => i8, Int16 => i16, Int32 => i32, Int64 => i64, Isize => isize,
            UInt8 => u8, UInt16 => u16, UInt32 => u32, UInt64 => u64, Usize => usize,
            Float32 => f32, Float64 => f64,
            String => String,
        ], $fallback)
    };
}

/// Every kind with a truthy encoding, i.e. all but `String`.
macro_rules! for_truthy {
    ($kind:expr, |$t:ident| $body:expr, $fallback:expr) => {
        with_kind!($kind, |$t| $body, [
            Bool => bool,
            Int8 => i8, Int16 => i16, Int32 => i32, Int64 => i64, Isize => isize,
            UInt8 => u8, UInt16 => u16, UInt32 => u32, UInt64 => u64, Usize => usize,
            Float32 => f32, Float64 => f64,
            Complex64 => Complex<f32>, Complex128 => Complex<f64>,
        ], $fallback)
    };
}

macro_rules! for_all {
    ($kind:expr, |$t:ident| $body:expr, $fallback:expr) => {
        with_kind!($kind, |$t| $body, [
            Bool => bool,
            Int8 => i8, Int16 => i16, Int32 => i32, Int64 => i64, Isize => isize,
            UInt8 => u8, UInt16 => u16, UInt32 => u32, UInt64 => u64, Usize => usize,
            Float32 => f32, Float64 => f64,
            Complex64 => Complex<f32>, Complex128 => Complex<f64>,
            String => String,
        ], $fallback)
    };
}

/// Where the result goes, before kind resolution.
#[derive(Debug)]
enum Destination {
    Fresh,
    Reuse(Array),
    Increment(Array),
    InPlace,
}

impl Destination {
    fn from_opts(reuse: Option<Array>, increment: Option<Array>, unsafe_in_place: bool) -> Self {
        match (reuse, increment) {
            _ if unsafe_in_place => Destination::InPlace,
            (Some(r), _) => Destination::Reuse(r),
            (None, Some(i)) => Destination::Increment(i),
            (None, None) => Destination::Fresh,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Destination::Fresh => "fresh",
            Destination::Reuse(_) => "reuse",
            Destination::Increment(_) => "increment",
            Destination::InPlace => "unsafe",
        }
    }

    /// Kind the caller-supplied array carries, if any.
    fn kind(&self) -> Option<NumericKind> {
        match self {
            Destination::Reuse(a) | Destination::Increment(a) => Some(a.kind()),
            _ => None,
        }
    }
}

/// Operand after kind resolution.
enum Typed<T> {
    Array(DenseArray<T>),
    Scalar(T),
}

impl<T: Element> Typed<T> {
    fn from_operand(op: Operand) -> Result<Self, KernelError> {
        match op {
            Operand::Array(a) => a.downcast::<T>().map(Typed::Array),
            Operand::Scalar(s) => s.try_value::<T>().map(Typed::Scalar),
        }
    }

    #[inline]
    fn side(&self) -> Side<'_, T> {
        match self {
            Typed::Array(a) => Side::Array(a),
            Typed::Scalar(s) => Side::Scalar(s),
        }
    }

    /// A scalar side, or an array of exactly `shape`.
    fn fits(&self, shape: &[usize]) -> bool {
        match self {
            Typed::Array(a) => a.shape() == shape,
            Typed::Scalar(_) => true,
        }
    }
}

/// Whether `operand` is a view of `dest` with the same layout, so writing
/// into it directly is the same as writing into `dest`.
fn aliases<T: Element>(operand: &DenseArray<T>, dest: &DenseArray<T>) -> bool {
    operand.shares_buffer(dest) && operand.pattern == dest.pattern && operand.mask == dest.mask
}

/// Runs `op` over two operands of `kind`.
///
/// ## Example
/// ```rust
/// use minstride::{DenseArray, FuncOpts, NumericKind, OpName, Operand, Scalar, dispatch};
///
/// let a = DenseArray::from_vec(vec![1i32, 2, 3]);
/// let out = dispatch(
///     OpName::Mul,
///     NumericKind::Int32,
///     a.into(),
///     Operand::Scalar(Scalar::from(10i32)),
///     FuncOpts::new(),
/// )
/// .unwrap();
/// assert_eq!(out.downcast::<i32>().unwrap().to_vec(), vec![10, 20, 30]);
/// ```
pub fn dispatch(
    op: OpName,
    kind: NumericKind,
    a: Operand,
    b: Operand,
    opts: FuncOpts,
) -> Result<Array, KernelError> {
    dispatch_inner(op, kind, a, b, opts).map_err(|e| e.with_op(op))
}

fn dispatch_inner(
    op: OpName,
    kind: NumericKind,
    a: Operand,
    b: Operand,
    opts: FuncOpts,
) -> Result<Array, KernelError> {
    opts.check_cancelled()?;
    opts.validate()?;
    let row = registry::check(op, kind)?;
    for side in [&a, &b] {
        if side.kind() != kind {
            return Err(KernelError::KindMismatch {
                expected: kind,
                found: side.kind(),
            });
        }
        if let Operand::Array(arr) = side {
            arr.validate()?;
        }
    }

    let cfg = ExecConfig {
        broadcast: opts.broadcast,
        parallel: !row.may_fail(kind),
    };
    let FuncOpts {
        reuse,
        increment,
        unsafe_in_place,
        as_kind,
        same_kind,
        ..
    } = opts;
    let dest = Destination::from_opts(reuse, increment, unsafe_in_place);
    if let Some(Operand::Array(arr)) = [&a, &b].into_iter().find(|o| !o.is_scalar()) {
        debug!(%op, %kind, destination = dest.label(), shape = ?arr.shape(), "dispatch");
    } else {
        debug!(%op, %kind, destination = dest.label(), "dispatch");
    }

    match op.class() {
        OpClass::Arithmetic => {
            if let Some(k) = as_kind {
                if k != kind {
                    return Err(KernelError::ConflictingOptions(format!(
                        "{} over {} produces {}, not {}",
                        op, kind, kind, k
                    )));
                }
            }
            check_dest_kind(&dest, kind)?;
            arith_kind(op, kind, a, b, dest, cfg)
        }
        OpClass::Comparison => {
            let out = comparison_output(op, kind, as_kind, same_kind)?;
            match &dest {
                Destination::Increment(_) => {
                    return Err(KernelError::ConflictingOptions(
                        "comparison results cannot be accumulated".into(),
                    ));
                }
                Destination::InPlace if out == CmpOutput::Bool => {
                    return Err(KernelError::ConflictingOptions(format!(
                        "in-place {} over {} needs the same-kind output",
                        op, kind
                    )));
                }
                _ => {}
            }
            check_dest_kind(&dest, out.output_kind(kind))?;
            cmp_kind(op, kind, out, a, b, dest, cfg)
        }
    }
}

/// Resolves the output convention of a comparison from `as_kind`/`same_kind`.
///
/// `Bool` is the default. Over `bool` operands both conventions coincide and
/// `Same` is used, so in-place writes stay possible.
fn comparison_output(
    op: OpName,
    kind: NumericKind,
    as_kind: Option<NumericKind>,
    same_kind: bool,
) -> Result<CmpOutput, KernelError> {
    let out = match as_kind {
        Some(NumericKind::Bool) if same_kind && kind != NumericKind::Bool => {
            return Err(KernelError::ConflictingOptions(
                "as_kind(bool) and same_kind select different outputs".into(),
            ));
        }
        Some(NumericKind::Bool) => CmpOutput::Bool,
        Some(k) if k == kind => CmpOutput::Same,
        Some(k) => {
            return Err(KernelError::ConflictingOptions(format!(
                "{} over {} can produce bool or {}, not {}",
                op, kind, kind, k
            )));
        }
        None if same_kind => CmpOutput::Same,
        None => CmpOutput::Bool,
    };
    if kind == NumericKind::Bool {
        return Ok(CmpOutput::Same);
    }
    if out == CmpOutput::Same && !kind.has_truthy_encoding() {
        return Err(KernelError::UnsupportedKind {
            op: Some(op),
            kind,
            message: Some("no truthy encoding for a same-kind result".into()),
        });
    }
    Ok(out)
}

fn check_dest_kind(dest: &Destination, expected: NumericKind) -> Result<(), KernelError> {
    match dest.kind() {
        Some(found) if found != expected => Err(KernelError::KindMismatch { expected, found }),
        _ => Ok(()),
    }
}

fn typed_dest<U: Element>(dest: Destination) -> Result<TypedDest<U>, KernelError> {
    Ok(match dest {
        Destination::Fresh => TypedDest::Fresh,
        Destination::Reuse(a) => TypedDest::Reuse(a.downcast::<U>()?),
        Destination::Increment(a) => TypedDest::Increment(a.downcast::<U>()?),
        Destination::InPlace => TypedDest::InPlace,
    })
}

enum TypedDest<U> {
    Fresh,
    Reuse(DenseArray<U>),
    Increment(DenseArray<U>),
    InPlace,
}

fn arith_kind(
    op: OpName,
    kind: NumericKind,
    a: Operand,
    b: Operand,
    dest: Destination,
    cfg: ExecConfig,
) -> Result<Array, KernelError> {
    let unsupported = || Err(KernelError::unsupported(op, kind));
    match op {
        OpName::Add => for_addable!(kind, |T| arith::<T, _>(a, b, dest, cfg, add::<T>), unsupported()),
        OpName::Sub => for_numbers!(kind, |T| arith::<T, _>(a, b, dest, cfg, sub::<T>), unsupported()),
        OpName::Mul => for_numbers!(kind, |T| arith::<T, _>(a, b, dest, cfg, mul::<T>), unsupported()),
        OpName::Div => for_numbers!(kind, |T| arith::<T, _>(a, b, dest, cfg, div::<T>), unsupported()),
        OpName::Pow => for_numbers!(kind, |T| arith::<T, _>(a, b, dest, cfg, pow::<T>), unsupported()),
        OpName::Mod => for_real!(kind, |T| arith::<T, _>(a, b, dest, cfg, rem::<T>), unsupported()),
        _ => unsupported(),
    }
}

fn cmp_kind(
    op: OpName,
    kind: NumericKind,
    out: CmpOutput,
    a: Operand,
    b: Operand,
    dest: Destination,
    cfg: ExecConfig,
) -> Result<Array, KernelError> {
    let unsupported = || Err(KernelError::unsupported(op, kind));

    macro_rules! ordered {
        ($pred:ident) => {
            match out {
                CmpOutput::Bool => {
                    for_ordered!(kind, |T| cmp_bool::<T, _>(a, b, dest, cfg, $pred::<T>), unsupported())
                }
                CmpOutput::Same => {
                    for_real!(kind, |T| cmp_same::<T, _>(a, b, dest, cfg, $pred::<T>), unsupported())
                }
            }
        };
    }

    macro_rules! equality {
        ($pred:ident) => {
            match out {
                CmpOutput::Bool => {
                    for_all!(kind, |T| cmp_bool::<T, _>(a, b, dest, cfg, $pred::<T>), unsupported())
                }
                CmpOutput::Same => {
                    for_truthy!(kind, |T| cmp_same::<T, _>(a, b, dest, cfg, $pred::<T>), unsupported())
                }
            }
        };
    }

    match op {
        OpName::Gt => ordered!(gt),
        OpName::Gte => ordered!(gte),
        OpName::Lt => ordered!(lt),
        OpName::Lte => ordered!(lte),
        OpName::ElEq => equality!(el_eq),
        OpName::ElNe => equality!(el_ne),
        _ => unsupported(),
    }
}

/// Arithmetic over `T`; the result keeps the operand kind.
fn arith<T, F>(a: Operand, b: Operand, dest: Destination, cfg: ExecConfig, f: F) -> Result<Array, KernelError>
where
    T: Addable,
    F: Fn(&T, &T) -> Option<T> + Sync,
{
    let a = Typed::<T>::from_operand(a)?;
    let b = Typed::<T>::from_operand(b)?;
    let out = match typed_dest::<T>(dest)? {
        TypedDest::Increment(incr) => run_increment(a.side(), b.side(), incr, cfg, f)?,
        other => run_same(a, b, other, cfg, f)?,
    };
    Ok(T::into_array(out))
}

/// Comparison writing the operand kind through its truthy encoding.
fn cmp_same<T, P>(a: Operand, b: Operand, dest: Destination, cfg: ExecConfig, pred: P) -> Result<Array, KernelError>
where
    T: Truthy,
    P: Fn(&T, &T) -> bool + Sync,
{
    let a = Typed::<T>::from_operand(a)?;
    let b = Typed::<T>::from_operand(b)?;
    let out = run_same(a, b, typed_dest::<T>(dest)?, cfg, to_same(pred))?;
    Ok(T::into_array(out))
}

/// Comparison writing a `bool` array.
fn cmp_bool<T, P>(a: Operand, b: Operand, dest: Destination, cfg: ExecConfig, pred: P) -> Result<Array, KernelError>
where
    T: Element,
    P: Fn(&T, &T) -> bool + Sync,
{
    let a = Typed::<T>::from_operand(a)?;
    let b = Typed::<T>::from_operand(b)?;
    let reuse = match typed_dest::<bool>(dest)? {
        TypedDest::Fresh => None,
        TypedDest::Reuse(r) => Some(r),
        TypedDest::Increment(_) | TypedDest::InPlace => {
            return Err(KernelError::ConflictingOptions(
                "a bool comparison result can only be fresh or reused".into(),
            ));
        }
    };
    let out = run_assign(a.side(), b.side(), reuse, cfg, to_bool(pred))?;
    Ok(Array::Bool(out))
}

/// Destinations for results in the operand kind.
///
/// A reuse target that is an exact view of one operand is written in place,
/// with the receiver kernels when it is the right operand.
fn run_same<T, F>(
    a: Typed<T>,
    b: Typed<T>,
    dest: TypedDest<T>,
    cfg: ExecConfig,
    f: F,
) -> Result<DenseArray<T>, KernelError>
where
    T: Element,
    F: Fn(&T, &T) -> Option<T> + Sync,
{
    match dest {
        TypedDest::Fresh => run_assign(a.side(), b.side(), None, cfg, f),
        TypedDest::Reuse(r) => match (a, b) {
            (Typed::Array(x), b) if b.fits(x.shape()) && aliases(&x, &r) => {
                drop(r);
                run_in_place(x, b.side(), Target::Left, cfg.broadcast, f)
            }
            (a, Typed::Array(y)) if a.fits(y.shape()) && aliases(&y, &r) => {
                drop(r);
                run_in_place(y, a.side(), Target::Right, cfg.broadcast, f)
            }
            (a, b) => run_assign(a.side(), b.side(), Some(r), cfg, f),
        },
        TypedDest::InPlace => match (a, b) {
            (Typed::Array(x), b) => run_in_place(x, b.side(), Target::Left, cfg.broadcast, f),
            (a, Typed::Array(y)) => run_in_place(y, a.side(), Target::Right, cfg.broadcast, f),
            (a, b) => run_assign(a.side(), b.side(), None, cfg, f),
        },
        TypedDest::Increment(_) => Err(KernelError::ConflictingOptions(
            "increment needs an additive result kind".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bitmask, CancelToken, Scalar};

    fn arr<T: Element>(v: Vec<T>) -> Operand {
        DenseArray::from_vec(v).into()
    }

    fn scalar<T: Element>(v: T) -> Operand {
        Operand::Scalar(v.into_scalar())
    }

    #[test]
    fn test_arith_fresh() {
        let out = dispatch(OpName::Add, NumericKind::Int32, arr(vec![1, 2]), arr(vec![3, 4]), FuncOpts::new()).unwrap();
        assert_eq!(out.downcast::<i32>().unwrap().to_vec(), vec![4, 6]);
        let out = dispatch(
            OpName::Add,
            NumericKind::String,
            arr(vec!["a".to_string()]),
            scalar("b".to_string()),
            FuncOpts::new(),
        )
        .unwrap();
        assert_eq!(out.downcast::<String>().unwrap().to_vec(), vec!["ab".to_string()]);
    }

    #[test]
    fn test_unsupported_kind_fails_before_work() {
        let err = dispatch(OpName::Mod, NumericKind::Complex64, scalar(Complex::new(1.0f32, 0.0)), scalar(Complex::new(1.0f32, 0.0)), FuncOpts::new())
            .unwrap_err();
        assert!(matches!(err.root(), KernelError::UnsupportedKind { .. }));
        assert!(matches!(err, KernelError::Op { op: OpName::Mod, .. }));
    }

    #[test]
    fn test_kind_mismatch() {
        let err = dispatch(OpName::Add, NumericKind::Int32, arr(vec![1i32]), arr(vec![1i64]), FuncOpts::new()).unwrap_err();
        assert_eq!(
            err.root(),
            &KernelError::KindMismatch {
                expected: NumericKind::Int32,
                found: NumericKind::Int64
            }
        );
    }

    #[test]
    fn test_comparison_conventions() {
        let a = || arr(vec![1.0f64, 5.0]);
        let b = || arr(vec![2.0f64, 2.0]);
        let out = dispatch(OpName::Lt, NumericKind::Float64, a(), b(), FuncOpts::new()).unwrap();
        assert_eq!(out.downcast::<bool>().unwrap().to_vec(), vec![true, false]);
        let out = dispatch(OpName::Lt, NumericKind::Float64, a(), b(), FuncOpts::new().same_kind()).unwrap();
        assert_eq!(out.downcast::<f64>().unwrap().to_vec(), vec![1.0, 0.0]);
        let out = dispatch(OpName::Lt, NumericKind::Float64, a(), b(), FuncOpts::new().as_kind(NumericKind::Float64)).unwrap();
        assert_eq!(out.kind(), NumericKind::Float64);
        let err = dispatch(
            OpName::Lt,
            NumericKind::Float64,
            a(),
            b(),
            FuncOpts::new().same_kind().as_kind(NumericKind::Bool),
        )
        .unwrap_err();
        assert!(matches!(err.root(), KernelError::ConflictingOptions(_)));
    }

    #[test]
    fn test_string_comparisons() {
        let out = dispatch(
            OpName::Gte,
            NumericKind::String,
            arr(vec!["b".to_string(), "a".to_string()]),
            scalar("b".to_string()),
            FuncOpts::new(),
        )
        .unwrap();
        assert_eq!(out.downcast::<bool>().unwrap().to_vec(), vec![true, false]);
        let err = dispatch(
            OpName::ElEq,
            NumericKind::String,
            arr(vec!["b".to_string()]),
            scalar("b".to_string()),
            FuncOpts::new().same_kind(),
        )
        .unwrap_err();
        assert!(matches!(err.root(), KernelError::UnsupportedKind { .. }));
    }

    #[test]
    fn test_bool_equality_is_same_kind() {
        let out = dispatch(OpName::ElEq, NumericKind::Bool, arr(vec![true, false]), scalar(true), FuncOpts::new().unsafe_in_place())
            .unwrap();
        assert_eq!(out.downcast::<bool>().unwrap().to_vec(), vec![true, false]);
    }

    #[test]
    fn test_increment_rejected_for_comparison() {
        let incr: Array = DenseArray::filled(&[2], false).into();
        let err = dispatch(OpName::Gt, NumericKind::Int8, arr(vec![1i8, 2]), scalar(1i8), FuncOpts::new().with_increment(incr))
            .unwrap_err();
        assert!(matches!(err.root(), KernelError::ConflictingOptions(_)));
    }

    #[test]
    fn test_reuse_kind_checked() {
        let reuse: Array = DenseArray::filled(&[2], 0i64).into();
        let err = dispatch(OpName::Add, NumericKind::Int32, arr(vec![1i32, 2]), scalar(1i32), FuncOpts::new().with_reuse(reuse))
            .unwrap_err();
        assert!(matches!(err.root(), KernelError::KindMismatch { .. }));
    }

    #[test]
    fn test_reuse_of_right_operand_uses_receiver() {
        let a = DenseArray::from_vec(vec![10i32, 20, 30]);
        let b = DenseArray::from_vec(vec![1i32, 2, 3]);
        let reuse: Array = b.clone().into();
        let out = dispatch(
            OpName::Sub,
            NumericKind::Int32,
            a.into(),
            b.into(),
            FuncOpts::new().with_reuse(reuse),
        )
        .unwrap();
        assert_eq!(out.downcast::<i32>().unwrap().to_vec(), vec![9, 18, 27]);
    }

    #[test]
    fn test_unsafe_with_scalar_left_writes_right() {
        let b = DenseArray::from_vec(vec![1.0f32, 4.0]);
        let out = dispatch(OpName::Div, NumericKind::Float32, scalar(8.0f32), b.into(), FuncOpts::new().unsafe_in_place())
            .unwrap();
        assert_eq!(out.downcast::<f32>().unwrap().to_vec(), vec![8.0, 2.0]);
        let out = dispatch(OpName::Div, NumericKind::Float32, scalar(8.0f32), scalar(2.0f32), FuncOpts::new().unsafe_in_place())
            .unwrap();
        assert_eq!(out.downcast::<f32>().unwrap().to_vec(), vec![4.0]);
    }

    #[test]
    fn test_division_by_zero_wrapped() {
        let err = dispatch(OpName::Div, NumericKind::UInt16, arr(vec![4u16, 5]), arr(vec![2u16, 0]), FuncOpts::new()).unwrap_err();
        assert_eq!(err.root(), &KernelError::DivisionByZero { index: 1 });
        assert_eq!(err.to_string(), "Div: Integer division by zero at element 1.");
        let ok = dispatch(OpName::Div, NumericKind::Float64, arr(vec![1.0f64]), scalar(0.0f64), FuncOpts::new()).unwrap();
        assert!(ok.downcast::<f64>().unwrap().to_vec()[0].is_infinite());
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let err = dispatch(OpName::Add, NumericKind::Int32, arr(vec![1]), arr(vec![1]), FuncOpts::new().with_context(token))
            .unwrap_err();
        assert_eq!(err.root(), &KernelError::Cancelled);
    }

    #[test]
    fn test_invalid_operand_pattern() {
        let bad = DenseArray {
            data: std::sync::Arc::new(crate::Buffer::from(vec![1i32, 2])),
            pattern: crate::AccessPattern::row_major(&[3]),
            mask: None,
        };
        let err = dispatch(OpName::Add, NumericKind::Int32, bad.into(), scalar(1i32), FuncOpts::new()).unwrap_err();
        assert!(matches!(err.root(), KernelError::InvalidPattern(_)));
    }

    #[test]
    fn test_masked_operand_masks_result() {
        let a = DenseArray::from_vec(vec![1u8, 2])
            .with_mask(Bitmask::from_bools(&[false, true]))
            .unwrap();
        let out = dispatch(OpName::Mul, NumericKind::UInt8, a.into(), Operand::Scalar(Scalar::UInt8(3)), FuncOpts::new())
            .unwrap()
            .downcast::<u8>()
            .unwrap();
        let got: Vec<Option<u8>> = out.iter_logical().map(|v| v.copied()).collect();
        assert_eq!(got, vec![None, Some(6)]);
    }
}
