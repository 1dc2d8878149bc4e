// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Arithmetic Operators
//!
//! Element functions handed to the kernel family. Each one has the kernel
//! closure shape `Fn(&T, &T) -> Option<T>`; `None` is reserved for integer
//! division and remainder by zero.

pub mod types;

use crate::traits::type_unions::{Addable, Modular, Number};

#[inline(always)]
pub fn add<T: Addable>(a: &T, b: &T) -> Option<T> {
    Some(a.add_el(b))
}

#[inline(always)]
pub fn sub<T: Number>(a: &T, b: &T) -> Option<T> {
    Some(a.sub_el(b))
}

#[inline(always)]
pub fn mul<T: Number>(a: &T, b: &T) -> Option<T> {
    Some(a.mul_el(b))
}

/// Integer kinds yield `None` on a zero divisor.
#[inline(always)]
pub fn div<T: Number>(a: &T, b: &T) -> Option<T> {
    a.div_el(b)
}

#[inline(always)]
pub fn pow<T: Number>(a: &T, b: &T) -> Option<T> {
    Some(a.pow_el(b))
}

/// Remainder with the sign of the dividend; integer kinds yield `None` on zero.
#[inline(always)]
pub fn rem<T: Modular>(a: &T, b: &T) -> Option<T> {
    a.rem_el(b)
}
