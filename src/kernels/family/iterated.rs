// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Iterated Kernels** - *Cursor-driven traversal*
//!
//! Used whenever an operand is strided, masked, laid out in a different
//! order, or stretched by broadcasting. Operands are whole buffers and every
//! position comes from a [`FlatIterator`]; all cursors in one call advance in
//! lockstep over the same shape and order.
//!
//! A result is written only when every participating cursor, the output
//! cursor included, reports the position valid. Invalid positions still
//! advance every cursor.

use crate::enums::error::KernelError;
use crate::kernels::family::{Accumulate, Assign, OutputCursor, Sink, fault};
use crate::structs::flat_iterator::{FlatIterator, end_ok};
use crate::traits::type_unions::Addable;

pub(crate) fn vv_iter_loop<S, T, U, F>(
    a: &[T],
    ia: &mut FlatIterator,
    b: &[T],
    ib: &mut FlatIterator,
    c: &mut [U],
    out: &mut OutputCursor,
    f: &F,
) -> Result<(), KernelError>
where
    S: Sink<U>,
    F: Fn(&T, &T) -> Option<U>,
{
    let mut k = 0usize;
    loop {
        let (oa, va) = ia.next_validity()?;
        let (ob, vb) = ib.next_validity()?;
        let (oc, vc) = out.next(Some(oa), Some(ob), k)?;
        if va && vb && vc {
            match f(&a[oa], &b[ob]) {
                Some(v) => S::put(&mut c[oc], v),
                None => return Err(fault(k)),
            }
        }
        k += 1;
    }
}

pub(crate) fn vs_iter_loop<S, T, U, F>(
    a: &[T],
    ia: &mut FlatIterator,
    s: &T,
    c: &mut [U],
    out: &mut OutputCursor,
    f: &F,
) -> Result<(), KernelError>
where
    S: Sink<U>,
    F: Fn(&T, &T) -> Option<U>,
{
    let mut k = 0usize;
    loop {
        let (oa, va) = ia.next_validity()?;
        let (oc, vc) = out.next(Some(oa), None, k)?;
        if va && vc {
            match f(&a[oa], s) {
                Some(v) => S::put(&mut c[oc], v),
                None => return Err(fault(k)),
            }
        }
        k += 1;
    }
}

pub(crate) fn sv_iter_loop<S, T, U, F>(
    s: &T,
    b: &[T],
    ib: &mut FlatIterator,
    c: &mut [U],
    out: &mut OutputCursor,
    f: &F,
) -> Result<(), KernelError>
where
    S: Sink<U>,
    F: Fn(&T, &T) -> Option<U>,
{
    let mut k = 0usize;
    loop {
        let (ob, vb) = ib.next_validity()?;
        let (oc, vc) = out.next(None, Some(ob), k)?;
        if vb && vc {
            match f(s, &b[ob]) {
                Some(v) => S::put(&mut c[oc], v),
                None => return Err(fault(k)),
            }
        }
        k += 1;
    }
}

/// `c[out] = a[ia] ⊕ b[ib]`
pub fn vv_iter<T, U, F>(
    a: &[T],
    ia: &mut FlatIterator,
    b: &[T],
    ib: &mut FlatIterator,
    c: &mut [U],
    out: &mut OutputCursor,
    f: F,
) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    end_ok(vv_iter_loop::<Assign, _, _, _>(a, ia, b, ib, c, out, &f))
}

/// `c[out] = a[ia] ⊕ s`
pub fn vs_iter<T, U, F>(
    a: &[T],
    ia: &mut FlatIterator,
    s: &T,
    c: &mut [U],
    out: &mut OutputCursor,
    f: F,
) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    end_ok(vs_iter_loop::<Assign, _, _, _>(a, ia, s, c, out, &f))
}

/// `c[out] = s ⊕ b[ib]`
pub fn sv_iter<T, U, F>(
    s: &T,
    b: &[T],
    ib: &mut FlatIterator,
    c: &mut [U],
    out: &mut OutputCursor,
    f: F,
) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    end_ok(sv_iter_loop::<Assign, _, _, _>(s, b, ib, c, out, &f))
}

/// `c[out] += a[ia] ⊕ b[ib]`
pub fn vv_iter_incr<T, U: Addable, F>(
    a: &[T],
    ia: &mut FlatIterator,
    b: &[T],
    ib: &mut FlatIterator,
    c: &mut [U],
    out: &mut OutputCursor,
    f: F,
) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    end_ok(vv_iter_loop::<Accumulate, _, _, _>(a, ia, b, ib, c, out, &f))
}

/// `c[out] += a[ia] ⊕ s`
pub fn vs_iter_incr<T, U: Addable, F>(
    a: &[T],
    ia: &mut FlatIterator,
    s: &T,
    c: &mut [U],
    out: &mut OutputCursor,
    f: F,
) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    end_ok(vs_iter_loop::<Accumulate, _, _, _>(a, ia, s, c, out, &f))
}

/// `c[out] += s ⊕ b[ib]`
pub fn sv_iter_incr<T, U: Addable, F>(
    s: &T,
    b: &[T],
    ib: &mut FlatIterator,
    c: &mut [U],
    out: &mut OutputCursor,
    f: F,
) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    end_ok(sv_iter_loop::<Accumulate, _, _, _>(s, b, ib, c, out, &f))
}

fn vv_iter_inplace_loop<T, F>(
    dest: &mut [T],
    id: &mut FlatIterator,
    b: &[T],
    ib: &mut FlatIterator,
    f: &F,
) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<T>,
{
    let mut k = 0usize;
    loop {
        let (od, vd) = id.next_validity()?;
        let (ob, vb) = ib.next_validity()?;
        if vd && vb {
            dest[od] = f(&dest[od], &b[ob]).ok_or_else(|| fault(k))?;
        }
        k += 1;
    }
}

fn vv_iter_recv_loop<T, F>(
    a: &[T],
    ia: &mut FlatIterator,
    dest: &mut [T],
    id: &mut FlatIterator,
    f: &F,
) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<T>,
{
    let mut k = 0usize;
    loop {
        let (oa, va) = ia.next_validity()?;
        let (od, vd) = id.next_validity()?;
        if va && vd {
            dest[od] = f(&a[oa], &dest[od]).ok_or_else(|| fault(k))?;
        }
        k += 1;
    }
}

/// Scalar against the destination's own slots, scalar on the `left` or right.
fn scalar_iter_self_loop<T, F>(
    dest: &mut [T],
    id: &mut FlatIterator,
    s: &T,
    scalar_left: bool,
    f: &F,
) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<T>,
{
    let mut k = 0usize;
    loop {
        let (od, vd) = id.next_validity()?;
        if vd {
            let v = if scalar_left { f(s, &dest[od]) } else { f(&dest[od], s) };
            dest[od] = v.ok_or_else(|| fault(k))?;
        }
        k += 1;
    }
}

/// `dest[id] = dest[id] ⊕ b[ib]`
///
/// The destination cursor doubles as the left operand cursor.
pub fn vv_iter_inplace<T, F>(
    dest: &mut [T],
    id: &mut FlatIterator,
    b: &[T],
    ib: &mut FlatIterator,
    f: F,
) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<T>,
{
    end_ok(vv_iter_inplace_loop(dest, id, b, ib, &f))
}

/// `dest[id] = a[ia] ⊕ dest[id]`
pub fn vv_iter_recv<T, F>(
    a: &[T],
    ia: &mut FlatIterator,
    dest: &mut [T],
    id: &mut FlatIterator,
    f: F,
) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<T>,
{
    end_ok(vv_iter_recv_loop(a, ia, dest, id, &f))
}

/// `dest[id] = dest[id] ⊕ s`
pub fn vs_iter_inplace<T, F>(dest: &mut [T], id: &mut FlatIterator, s: &T, f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<T>,
{
    end_ok(scalar_iter_self_loop(dest, id, s, false, &f))
}

/// `dest[id] = s ⊕ dest[id]`
pub fn sv_iter_recv<T, F>(s: &T, dest: &mut [T], id: &mut FlatIterator, f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<T>,
{
    end_ok(scalar_iter_self_loop(dest, id, s, true, &f))
}
