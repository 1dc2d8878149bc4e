// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Contiguous Kernels** - *Flat-slice fast path*
//!
//! Operands and destination are equal-length slices already in traversal
//! order, so element `i` of each lines up and no offset arithmetic is needed.
//!
//! With the `parallel_proc` feature the `par_*` entry points split the
//! destination into chunks and run them on the Rayon pool. They are only
//! chosen for operations that cannot fault, so "stop at first error" is
//! never at stake.

use crate::enums::error::KernelError;
use crate::kernels::family::{Accumulate, Assign, Sink, fault};
use crate::traits::type_unions::Addable;

/// Minimum element count before the parallel kernels are worth it.
pub const PARALLEL_THRESHOLD: usize = 1 << 16;

#[cfg(feature = "parallel_proc")]
const PARALLEL_CHUNK: usize = 1 << 14;

#[inline(always)]
pub(crate) fn vv_with<S, T, U, F>(a: &[T], b: &[T], c: &mut [U], f: &F) -> Result<(), KernelError>
where
    S: Sink<U>,
    F: Fn(&T, &T) -> Option<U>,
{
    debug_assert!(a.len() == c.len() && b.len() == c.len());
    for (i, ((x, y), out)) in a.iter().zip(b).zip(c.iter_mut()).enumerate() {
        match f(x, y) {
            Some(v) => S::put(out, v),
            None => return Err(fault(i)),
        }
    }
    Ok(())
}

#[inline(always)]
pub(crate) fn vs_with<S, T, U, F>(a: &[T], s: &T, c: &mut [U], f: &F) -> Result<(), KernelError>
where
    S: Sink<U>,
    F: Fn(&T, &T) -> Option<U>,
{
    debug_assert_eq!(a.len(), c.len());
    for (i, (x, out)) in a.iter().zip(c.iter_mut()).enumerate() {
        match f(x, s) {
            Some(v) => S::put(out, v),
            None => return Err(fault(i)),
        }
    }
    Ok(())
}

#[inline(always)]
pub(crate) fn sv_with<S, T, U, F>(s: &T, b: &[T], c: &mut [U], f: &F) -> Result<(), KernelError>
where
    S: Sink<U>,
    F: Fn(&T, &T) -> Option<U>,
{
    debug_assert_eq!(b.len(), c.len());
    for (i, (y, out)) in b.iter().zip(c.iter_mut()).enumerate() {
        match f(s, y) {
            Some(v) => S::put(out, v),
            None => return Err(fault(i)),
        }
    }
    Ok(())
}

/// `c[i] = a[i] ⊕ b[i]`
pub fn vv<T, U, F>(a: &[T], b: &[T], c: &mut [U], f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    vv_with::<Assign, _, _, _>(a, b, c, &f)
}

/// `c[i] = a[i] ⊕ s`
pub fn vs<T, U, F>(a: &[T], s: &T, c: &mut [U], f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    vs_with::<Assign, _, _, _>(a, s, c, &f)
}

/// `c[i] = s ⊕ b[i]`
pub fn sv<T, U, F>(s: &T, b: &[T], c: &mut [U], f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    sv_with::<Assign, _, _, _>(s, b, c, &f)
}

/// `c[i] += a[i] ⊕ b[i]`
pub fn vv_incr<T, U: Addable, F>(a: &[T], b: &[T], c: &mut [U], f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    vv_with::<Accumulate, _, _, _>(a, b, c, &f)
}

/// `c[i] += a[i] ⊕ s`
pub fn vs_incr<T, U: Addable, F>(a: &[T], s: &T, c: &mut [U], f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    vs_with::<Accumulate, _, _, _>(a, s, c, &f)
}

/// `c[i] += s ⊕ b[i]`
pub fn sv_incr<T, U: Addable, F>(s: &T, b: &[T], c: &mut [U], f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    sv_with::<Accumulate, _, _, _>(s, b, c, &f)
}

/// `dest[i] = dest[i] ⊕ b[i]`
pub fn vv_inplace<T, F>(dest: &mut [T], b: &[T], f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<T>,
{
    debug_assert_eq!(dest.len(), b.len());
    for (i, (d, y)) in dest.iter_mut().zip(b).enumerate() {
        *d = f(&*d, y).ok_or_else(|| fault(i))?;
    }
    Ok(())
}

/// `dest[i] = a[i] ⊕ dest[i]`
///
/// Receiver form for non-commutative operations writing into their right operand.
pub fn vv_recv<T, F>(a: &[T], dest: &mut [T], f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<T>,
{
    debug_assert_eq!(dest.len(), a.len());
    for (i, (x, d)) in a.iter().zip(dest.iter_mut()).enumerate() {
        *d = f(x, &*d).ok_or_else(|| fault(i))?;
    }
    Ok(())
}

/// `dest[i] = dest[i] ⊕ s`
pub fn vs_inplace<T, F>(dest: &mut [T], s: &T, f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<T>,
{
    for (i, d) in dest.iter_mut().enumerate() {
        *d = f(&*d, s).ok_or_else(|| fault(i))?;
    }
    Ok(())
}

/// `dest[i] = s ⊕ dest[i]`
pub fn sv_recv<T, F>(s: &T, dest: &mut [T], f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<T>,
{
    for (i, d) in dest.iter_mut().enumerate() {
        *d = f(s, &*d).ok_or_else(|| fault(i))?;
    }
    Ok(())
}

#[cfg(feature = "parallel_proc")]
mod parallel {
    use rayon::prelude::*;

    use super::*;

    #[inline]
    fn shift(err: KernelError, base: usize) -> KernelError {
        match err {
            KernelError::DivisionByZero { index } => fault(base + index),
            other => other,
        }
    }

    /// Chunked parallel `vv`, assigning or accumulating through `S`.
    pub fn par_vv<S, T, U, F>(a: &[T], b: &[T], c: &mut [U], f: F) -> Result<(), KernelError>
    where
        S: Sink<U>,
        T: Sync,
        U: Send,
        F: Fn(&T, &T) -> Option<U> + Sync,
    {
        c.par_chunks_mut(PARALLEL_CHUNK)
            .enumerate()
            .try_for_each(|(ci, chunk)| {
                let base = ci * PARALLEL_CHUNK;
                let end = base + chunk.len();
                vv_with::<S, _, _, _>(&a[base..end], &b[base..end], chunk, &f)
                    .map_err(|e| shift(e, base))
            })
    }

    /// Chunked parallel `vs`.
    pub fn par_vs<S, T, U, F>(a: &[T], s: &T, c: &mut [U], f: F) -> Result<(), KernelError>
    where
        S: Sink<U>,
        T: Sync,
        U: Send,
        F: Fn(&T, &T) -> Option<U> + Sync,
    {
        c.par_chunks_mut(PARALLEL_CHUNK)
            .enumerate()
            .try_for_each(|(ci, chunk)| {
                let base = ci * PARALLEL_CHUNK;
                let end = base + chunk.len();
                vs_with::<S, _, _, _>(&a[base..end], s, chunk, &f).map_err(|e| shift(e, base))
            })
    }

    /// Chunked parallel `sv`.
    pub fn par_sv<S, T, U, F>(s: &T, b: &[T], c: &mut [U], f: F) -> Result<(), KernelError>
    where
        S: Sink<U>,
        T: Sync,
        U: Send,
        F: Fn(&T, &T) -> Option<U> + Sync,
    {
        c.par_chunks_mut(PARALLEL_CHUNK)
            .enumerate()
            .try_for_each(|(ci, chunk)| {
                let base = ci * PARALLEL_CHUNK;
                let end = base + chunk.len();
                sv_with::<S, _, _, _>(s, &b[base..end], chunk, &f).map_err(|e| shift(e, base))
            })
    }
}

#[cfg(feature = "parallel_proc")]
pub use parallel::{par_sv, par_vs, par_vv};
