//! # **Type Unions Module** - *Element type-classes*
//!
//! Compile-time counterparts of the [`NumericKind`] predicates. A kernel is
//! instantiated for a concrete element type, and the bound it asks for
//! (`Number`, `Ordered`, ...) decides which kinds can reach it.
//!
//! | Trait      | Members                                  |
//! |------------|------------------------------------------|
//! | `Element`  | every kind                               |
//! | `Addable`  | numbers and `String`                     |
//! | `Number`   | integers, floats, complex                |
//! | `Modular`  | integers and floats                      |
//! | `Ordered`  | integers, floats and `String`            |
//! | `Truthy`   | every kind except `String`               |
//!
//! Integer arithmetic wraps. Integer division and remainder by zero return
//! `None`, which the kernels surface as `DivisionByZero`.

use std::fmt::Debug;

use num_complex::Complex;
use num_traits::{Float as NumFloat, PrimInt, WrappingAdd, WrappingMul, WrappingSub};

use crate::enums::kind::NumericKind;
use crate::impl_element;
use crate::{Array, DenseArray, Scalar};

/// Any value that can live in an array buffer.
///
/// Links a Rust type to its [`NumericKind`] and to the matching
/// [`Array`] / [`Scalar`] variants.
pub trait Element: Clone + Default + PartialEq + Debug + Send + Sync + 'static {
    const KIND: NumericKind;

    fn into_array(arr: DenseArray<Self>) -> Array;

    /// Unwraps the variant, handing the array back on a kind mismatch.
    fn try_from_array(arr: Array) -> Result<DenseArray<Self>, Array>;

    fn as_dense(arr: &Array) -> Option<&DenseArray<Self>>;

    fn into_scalar(self) -> Scalar;

    fn try_from_scalar(s: Scalar) -> Result<Self, Scalar>;
}

/// Closed under `+`. The additive identity is `Default::default()`.
pub trait Addable: Element {
    fn add_el(&self, rhs: &Self) -> Self;
}

/// Integers, floats and complex numbers.
pub trait Number: Addable + Copy {
    fn sub_el(&self, rhs: &Self) -> Self;
    fn mul_el(&self, rhs: &Self) -> Self;
    /// `None` on integer division by zero.
    fn div_el(&self, rhs: &Self) -> Option<Self>;
    fn pow_el(&self, rhs: &Self) -> Self;
    fn zero() -> Self;
    fn one() -> Self;
}

/// Numbers with a remainder.
pub trait Modular: Number {
    /// `None` on integer remainder by zero.
    fn rem_el(&self, rhs: &Self) -> Option<Self>;
}

/// Totally or partially ordered kinds.
pub trait Ordered: Element + PartialOrd {}

/// Kinds with a `true`/`false` encoding, used when a comparison writes its
/// result in the operand kind.
pub trait Truthy: Element {
    fn from_truth(b: bool) -> Self;
}

/// Trait for types valid as float elements.
///
/// Extends and constrains the *num-traits* `Float` implementation to fit the crate's type universe.
pub trait Float: NumFloat + Copy + Default + Debug + Send + Sync + 'static {}
impl Float for f32 {}
impl Float for f64 {}

/// Trait for types valid as integer elements.
pub trait Integer:
    PrimInt + WrappingAdd + WrappingSub + WrappingMul + Default + Debug + Send + Sync + 'static
{
}

impl Integer for i8 {}
impl Integer for i16 {}
impl Integer for i32 {}
impl Integer for i64 {}
impl Integer for isize {}
impl Integer for u8 {}
impl Integer for u16 {}
impl Integer for u32 {}
impl Integer for u64 {}
impl Integer for usize {}

/// Integer power by repeated squaring, wrapping on overflow.
///
/// A negative exponent truncates towards zero: `1` stays `1`, `-1`
/// alternates sign with the parity of `exp`, everything else gives `0`.
#[inline]
pub fn int_pow<T: Integer>(base: T, exp: T) -> T {
    let zero = T::zero();
    let one = T::one();
    if exp < zero {
        let minus_one = zero.wrapping_sub(&one);
        return if base == one {
            one
        } else if base == minus_one {
            if exp & one == zero { one } else { minus_one }
        } else {
            zero
        };
    }
    let mut acc = one;
    let mut b = base;
    let mut e = exp;
    while e > zero {
        if e & one == one {
            acc = acc.wrapping_mul(&b);
        }
        e = e >> 1;
        if e > zero {
            b = b.wrapping_mul(&b);
        }
    }
    acc
}

#[inline]
pub fn float_pow<T: Float>(base: T, exp: T) -> T {
    base.powf(exp)
}

impl_element!(
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    isize => Isize,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    usize => Usize,
    f32 => Float32,
    f64 => Float64,
    Complex<f32> => Complex64,
    Complex<f64> => Complex128,
    String => String,
);

macro_rules! impl_integer_classes {
    ($($t:ty),*) => {
        $(
            impl Addable for $t {
                #[inline(always)]
                fn add_el(&self, rhs: &Self) -> Self {
                    (*self).wrapping_add(*rhs)
                }
            }

            impl Number for $t {
                #[inline(always)]
                fn sub_el(&self, rhs: &Self) -> Self {
                    (*self).wrapping_sub(*rhs)
                }
                #[inline(always)]
                fn mul_el(&self, rhs: &Self) -> Self {
                    (*self).wrapping_mul(*rhs)
                }
                #[inline(always)]
                fn div_el(&self, rhs: &Self) -> Option<Self> {
                    if *rhs == 0 { None } else { Some((*self).wrapping_div(*rhs)) }
                }
                #[inline(always)]
                fn pow_el(&self, rhs: &Self) -> Self {
                    int_pow(*self, *rhs)
                }
                #[inline(always)]
                fn zero() -> Self {
                    0
                }
                #[inline(always)]
                fn one() -> Self {
                    1
                }
            }

            impl Modular for $t {
                #[inline(always)]
                fn rem_el(&self, rhs: &Self) -> Option<Self> {
                    if *rhs == 0 { None } else { Some((*self).wrapping_rem(*rhs)) }
                }
            }

            impl Ordered for $t {}

            impl Truthy for $t {
                #[inline(always)]
                fn from_truth(b: bool) -> Self {
                    if b { 1 } else { 0 }
                }
            }
        )*
    };
}

macro_rules! impl_float_classes {
    ($($t:ty),*) => {
        $(
            impl Addable for $t {
                #[inline(always)]
                fn add_el(&self, rhs: &Self) -> Self {
                    self + rhs
                }
            }

            impl Number for $t {
                #[inline(always)]
                fn sub_el(&self, rhs: &Self) -> Self {
                    self - rhs
                }
                #[inline(always)]
                fn mul_el(&self, rhs: &Self) -> Self {
                    self * rhs
                }
                #[inline(always)]
                fn div_el(&self, rhs: &Self) -> Option<Self> {
                    Some(self / rhs)
                }
                #[inline(always)]
                fn pow_el(&self, rhs: &Self) -> Self {
                    float_pow(*self, *rhs)
                }
                #[inline(always)]
                fn zero() -> Self {
                    0.0
                }
                #[inline(always)]
                fn one() -> Self {
                    1.0
                }
            }

            impl Modular for $t {
                #[inline(always)]
                fn rem_el(&self, rhs: &Self) -> Option<Self> {
                    Some(self % rhs)
                }
            }

            impl Ordered for $t {}

            impl Truthy for $t {
                #[inline(always)]
                fn from_truth(b: bool) -> Self {
                    if b { 1.0 } else { 0.0 }
                }
            }
        )*
    };
}

macro_rules! impl_complex_classes {
    ($($t:ty),*) => {
        $(
            impl Addable for Complex<$t> {
                #[inline(always)]
                fn add_el(&self, rhs: &Self) -> Self {
                    self + rhs
                }
            }

            impl Number for Complex<$t> {
                #[inline(always)]
                fn sub_el(&self, rhs: &Self) -> Self {
                    self - rhs
                }
                #[inline(always)]
                fn mul_el(&self, rhs: &Self) -> Self {
                    self * rhs
                }
                #[inline(always)]
                fn div_el(&self, rhs: &Self) -> Option<Self> {
                    Some(self / rhs)
                }
                #[inline(always)]
                fn pow_el(&self, rhs: &Self) -> Self {
                    self.powc(*rhs)
                }
                #[inline(always)]
                fn zero() -> Self {
                    Complex::new(0.0, 0.0)
                }
                #[inline(always)]
                fn one() -> Self {
                    Complex::new(1.0, 0.0)
                }
            }

            impl Truthy for Complex<$t> {
                #[inline(always)]
                fn from_truth(b: bool) -> Self {
                    Complex::new(if b { 1.0 } else { 0.0 }, 0.0)
                }
            }
        )*
    };
}

impl_integer_classes!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_float_classes!(f32, f64);
impl_complex_classes!(f32, f64);

impl Addable for String {
    #[inline]
    fn add_el(&self, rhs: &Self) -> Self {
        let mut out = String::with_capacity(self.len() + rhs.len());
        out.push_str(self);
        out.push_str(rhs);
        out
    }
}

impl Ordered for String {}

impl Truthy for bool {
    #[inline(always)]
    fn from_truth(b: bool) -> Self {
        b
    }
}
