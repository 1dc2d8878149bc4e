// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Execution Planner
//!
//! Typed half of the dispatch pipeline. Given two typed operand sides and a
//! destination, picks the kernel family member once per call and runs it:
//!
//! 1. **Layout**: equal shapes pair elementwise; otherwise a broadcast plan
//!    is resolved (when allowed, or when both sides hold one element).
//! 2. **Traversal**: contiguous slices when every array side is packed in
//!    the traversal order and unmasked, cursors otherwise.
//! 3. **Output cursor**: packed range, the operand's own offsets when the
//!    destination shares its pattern, or an independent destination cursor.
//!
//! Output validity is computed in a separate pass before the kernel runs, so
//! kernels stay single-purpose.

use std::sync::Arc;

use tracing::debug;

use crate::enums::error::KernelError;
use crate::kernels::broadcast::{BroadcastPlan, resolve};
use crate::kernels::family::{
    Accumulate, Assign, OutputCursor, Sink, bc_inplace, bc_recv, bc_with, sv_iter_loop,
    sv_iter_recv, sv_recv, sv_with, vs_inplace, vs_iter_inplace, vs_iter_loop, vs_with,
    vv_inplace, vv_iter_inplace, vv_iter_loop, vv_iter_recv, vv_recv, vv_with,
};
use crate::structs::access_pattern::{AccessPattern, MemoryOrder, shape_size};
use crate::structs::flat_iterator::{FlatIterator, end_ok};
use crate::traits::type_unions::{Addable, Element};
use crate::{Bitmask, Buffer, DenseArray};

#[cfg(feature = "parallel_proc")]
use crate::kernels::family::{PARALLEL_THRESHOLD, par_sv, par_vs, par_vv};

/// One typed operand, borrowed for the duration of a call.
pub enum Side<'a, T> {
    Array(&'a DenseArray<T>),
    Scalar(&'a T),
}

impl<T: Element> std::fmt::Debug for Side<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Array(a) => f.debug_tuple("Array").field(a).finish(),
            Side::Scalar(s) => f.debug_tuple("Scalar").field(s).finish(),
        }
    }
}

impl<T> Clone for Side<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Side<'_, T> {}

impl<'a, T> Side<'a, T> {
    #[inline]
    fn array(self) -> Option<&'a DenseArray<T>> {
        match self {
            Side::Array(a) => Some(a),
            Side::Scalar(_) => None,
        }
    }

    #[inline]
    fn is_masked(self) -> bool {
        self.array().is_some_and(|a| a.is_masked())
    }

    /// Scalar, or unmasked array packed in `order`.
    #[inline]
    fn is_packed_in(self, order: MemoryOrder) -> bool {
        match self {
            Side::Array(a) => !a.is_masked() && a.pattern.is_contiguous_in(order),
            Side::Scalar(_) => true,
        }
    }
}

/// Kernel family member picked for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Array with array, equal shapes
    VV,
    /// Array with right-hand scalar
    VS,
    /// Left-hand scalar with array
    SV,
    /// Array with array, broadcast
    BC,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    Contiguous,
    Iterated,
}

/// Index space shared by both operands and the output.
#[derive(Debug, Clone)]
pub enum Layout {
    Elementwise { shape: Vec<usize>, order: MemoryOrder },
    Broadcast(BroadcastPlan),
}

impl Layout {
    #[inline]
    pub fn shape(&self) -> &[usize] {
        match self {
            Layout::Elementwise { shape, .. } => shape,
            Layout::Broadcast(plan) => plan.out_shape(),
        }
    }

    /// Traversal order; broadcast plans walk the output row-major.
    #[inline]
    pub fn order(&self) -> MemoryOrder {
        match self {
            Layout::Elementwise { order, .. } => *order,
            Layout::Broadcast(_) => MemoryOrder::RowMajor,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        shape_size(self.shape())
    }
}

/// Per-call switches resolved by dispatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecConfig {
    pub broadcast: bool,
    /// The operation cannot fault for this kind, so chunks may run concurrently.
    pub parallel: bool,
}

/// Which operand an in-place call writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Left,
    Right,
}

/// Pairs two operand sides into a shared index space.
pub fn resolve_layout<T>(lhs: Side<'_, T>, rhs: Side<'_, T>, broadcast: bool) -> Result<Layout, KernelError> {
    match (lhs, rhs) {
        (Side::Array(a), Side::Array(b)) => {
            if a.shape() == b.shape() {
                let order = if a.pattern.order() == MemoryOrder::ColMajor
                    && b.pattern.order() == MemoryOrder::ColMajor
                {
                    MemoryOrder::ColMajor
                } else {
                    MemoryOrder::RowMajor
                };
                Ok(Layout::Elementwise {
                    shape: a.shape().to_vec(),
                    order,
                })
            } else if broadcast
                || (a.pattern.is_scalar_equivalent() && b.pattern.is_scalar_equivalent())
            {
                Ok(Layout::Broadcast(resolve(&a.pattern, &b.pattern)?))
            } else {
                Err(KernelError::ShapeMismatch {
                    lhs: a.shape().to_vec(),
                    rhs: b.shape().to_vec(),
                    message: Some("shapes differ and broadcasting is off".into()),
                })
            }
        }
        (Side::Array(a), Side::Scalar(_)) | (Side::Scalar(_), Side::Array(a)) => Ok(Layout::Elementwise {
            shape: a.shape().to_vec(),
            order: a.pattern.order(),
        }),
        (Side::Scalar(_), Side::Scalar(_)) => Ok(Layout::Elementwise {
            shape: Vec::new(),
            order: MemoryOrder::RowMajor,
        }),
    }
}

/// Computes `lhs ⊕ rhs` into a fresh array, or overwrites `dest`.
///
/// `dest` must hold as many elements as the result. A packed destination of
/// another shape is reshaped to the result shape.
pub fn run_assign<T, U, F>(
    lhs: Side<'_, T>,
    rhs: Side<'_, T>,
    dest: Option<DenseArray<U>>,
    cfg: ExecConfig,
    f: F,
) -> Result<DenseArray<U>, KernelError>
where
    T: Element,
    U: Element,
    F: Fn(&T, &T) -> Option<U> + Sync,
{
    if let (Side::Scalar(x), Side::Scalar(_)) = (lhs, rhs) {
        let lifted = DenseArray::scalar(x.clone());
        return run_assign(Side::Array(&lifted), rhs, dest, cfg, f);
    }
    let layout = resolve_layout(lhs, rhs, cfg.broadcast)?;
    let reused = dest.is_some();
    let mut out = match dest {
        Some(d) => fit_reuse(d, layout.shape())?,
        None => DenseArray {
            data: Arc::new(Buffer::filled(U::default(), layout.size())),
            pattern: AccessPattern::packed(layout.shape(), layout.order()),
            mask: None,
        },
    };
    let needs_mask = lhs.is_masked() || rhs.is_masked() || (reused && out.is_masked());
    let mask = if needs_mask {
        Some(output_validity(lhs, rhs, &layout, &out)?)
    } else {
        None
    };
    let destination = if reused { "reuse" } else { "fresh" };
    debug!(destination, masked = needs_mask, "assign");
    execute::<Assign, _, _, _>(lhs, rhs, &layout, &mut out, false, cfg.parallel, &f)?;
    if let Some(m) = mask {
        out.mask = Some(Arc::new(m));
    }
    Ok(out)
}

/// Accumulates `lhs ⊕ rhs` into `incr` with `+=`.
///
/// `incr` must already have the result shape. Its mask gates the writes and
/// is left unchanged.
pub fn run_increment<T, U, F>(
    lhs: Side<'_, T>,
    rhs: Side<'_, T>,
    mut incr: DenseArray<U>,
    cfg: ExecConfig,
    f: F,
) -> Result<DenseArray<U>, KernelError>
where
    T: Element,
    U: Addable,
    F: Fn(&T, &T) -> Option<U> + Sync,
{
    if let (Side::Scalar(x), Side::Scalar(_)) = (lhs, rhs) {
        let lifted = DenseArray::scalar(x.clone());
        return run_increment(Side::Array(&lifted), rhs, incr, cfg, f);
    }
    let layout = resolve_layout(lhs, rhs, cfg.broadcast)?;
    if incr.shape() != layout.shape() {
        return Err(KernelError::ShapeMismatch {
            lhs: incr.shape().to_vec(),
            rhs: layout.shape().to_vec(),
            message: Some("increment destination must have the result shape".into()),
        });
    }
    check_writable(&incr.pattern)?;
    debug!(destination = "increment", "assign");
    execute::<Accumulate, _, _, _>(lhs, rhs, &layout, &mut incr, true, cfg.parallel, &f)?;
    Ok(incr)
}

/// Writes `dest ⊕ other` (or `other ⊕ dest`) into `dest`'s own slots.
///
/// Broadcasting may stretch `other` but never `dest`. The destination mask
/// gates the writes and loses every position where `other` is masked.
pub fn run_in_place<T, F>(
    mut dest: DenseArray<T>,
    other: Side<'_, T>,
    target: Target,
    broadcast: bool,
    f: F,
) -> Result<DenseArray<T>, KernelError>
where
    T: Element,
    F: Fn(&T, &T) -> Option<T>,
{
    let layout = match target {
        Target::Left => resolve_layout(Side::Array(&dest), other, broadcast)?,
        Target::Right => resolve_layout(other, Side::Array(&dest), broadcast)?,
    };
    if layout.shape() != dest.shape() {
        return Err(KernelError::ShapeMismatch {
            lhs: dest.shape().to_vec(),
            rhs: layout.shape().to_vec(),
            message: Some("in-place destination cannot be broadcast".into()),
        });
    }
    check_writable(&dest.pattern)?;

    let mask = if other.is_masked() {
        Some(in_place_validity(&dest, other, &layout)?)
    } else {
        None
    };

    let order = layout.order();
    let n = layout.size();
    let DenseArray { data, pattern, mask: dest_mask } = &mut dest;
    let dmask = dest_mask.as_deref();
    let packed = dmask.is_none() && pattern.is_contiguous_in(order) && other.is_packed_in(order);
    let traversal = if packed { Traversal::Contiguous } else { Traversal::Iterated };
    debug!(side = ?target, ?traversal, n, "in-place");
    let buf = Arc::make_mut(data).as_mut_slice();

    match &layout {
        Layout::Elementwise { .. } if packed => {
            let off = pattern.offset();
            let d = &mut buf[off..off + n];
            match (other, target) {
                (Side::Array(o), Target::Left) => vv_inplace(d, packed_slice(o, n), &f)?,
                (Side::Array(o), Target::Right) => vv_recv(packed_slice(o, n), d, &f)?,
                (Side::Scalar(s), Target::Left) => vs_inplace(d, s, &f)?,
                (Side::Scalar(s), Target::Right) => sv_recv(s, d, &f)?,
            }
        }
        Layout::Broadcast(plan) if dmask.is_none() && !other.is_masked() => {
            let o = broadcast_side(other)?;
            match target {
                Target::Left => bc_inplace(buf, o.data.as_slice(), plan, &f)?,
                Target::Right => bc_recv(o.data.as_slice(), buf, plan, &f)?,
            }
        }
        _ => {
            let mut id = FlatIterator::new(pattern).with_mask(dmask).with_order(order);
            match (other, target) {
                (Side::Array(o), _) => {
                    let mut io = side_cursor(o, &layout)?;
                    match target {
                        Target::Left => vv_iter_inplace(buf, &mut id, o.data.as_slice(), &mut io, &f)?,
                        Target::Right => vv_iter_recv(o.data.as_slice(), &mut io, buf, &mut id, &f)?,
                    }
                }
                (Side::Scalar(s), Target::Left) => vs_iter_inplace(buf, &mut id, s, &f)?,
                (Side::Scalar(s), Target::Right) => sv_iter_recv(s, buf, &mut id, &f)?,
            }
        }
    }

    if let Some(m) = mask {
        dest.mask = Some(Arc::new(m));
    }
    Ok(dest)
}

/// Shared body of the assigning and accumulating paths.
///
/// `honour_dest_mask` makes masked destination slots read as invalid, so
/// they are skipped.
fn execute<S, T, U, F>(
    lhs: Side<'_, T>,
    rhs: Side<'_, T>,
    layout: &Layout,
    out: &mut DenseArray<U>,
    honour_dest_mask: bool,
    parallel: bool,
    f: &F,
) -> Result<(), KernelError>
where
    S: Sink<U>,
    T: Element,
    U: Element,
    F: Fn(&T, &T) -> Option<U> + Sync,
{
    let DenseArray { data, pattern, mask } = out;
    let dest_mask = if honour_dest_mask { mask.as_deref() } else { None };
    let order = layout.order();
    let n = layout.size();
    let buf = Arc::make_mut(data).as_mut_slice();

    match layout {
        Layout::Elementwise { .. } => {
            let strategy = match (lhs, rhs) {
                (Side::Scalar(_), _) => Strategy::SV,
                (_, Side::Scalar(_)) => Strategy::VS,
                _ => Strategy::VV,
            };
            let packed = lhs.is_packed_in(order)
                && rhs.is_packed_in(order)
                && dest_mask.is_none()
                && pattern.is_contiguous_in(order);
            if packed {
                debug!(?strategy, traversal = ?Traversal::Contiguous, n, "kernel");
                let off = pattern.offset();
                return contiguous::<S, _, _, _>(lhs, rhs, &mut buf[off..off + n], parallel, f);
            }
            debug!(?strategy, traversal = ?Traversal::Iterated, n, "kernel");
            let (c, mut oc) = output_cursor(
                buf,
                pattern,
                dest_mask,
                order,
                n,
                lhs.array().map(|a| &a.pattern),
                rhs.array().map(|b| &b.pattern),
            );
            match (lhs, rhs) {
                (Side::Array(a), Side::Array(b)) => {
                    let mut ia = side_cursor(a, layout)?;
                    let mut ib = side_cursor(b, layout)?;
                    end_ok(vv_iter_loop::<S, _, _, _>(
                        a.data.as_slice(),
                        &mut ia,
                        b.data.as_slice(),
                        &mut ib,
                        c,
                        &mut oc,
                        f,
                    ))
                }
                (Side::Array(a), Side::Scalar(s)) => {
                    let mut ia = side_cursor(a, layout)?;
                    end_ok(vs_iter_loop::<S, _, _, _>(a.data.as_slice(), &mut ia, s, c, &mut oc, f))
                }
                (Side::Scalar(s), Side::Array(b)) => {
                    let mut ib = side_cursor(b, layout)?;
                    end_ok(sv_iter_loop::<S, _, _, _>(s, b.data.as_slice(), &mut ib, c, &mut oc, f))
                }
                (Side::Scalar(_), Side::Scalar(_)) => Err(KernelError::InvalidPattern(
                    "two scalar operands have no array to traverse".into(),
                )),
            }
        }
        Layout::Broadcast(plan) => {
            let a = broadcast_side(lhs)?;
            let b = broadcast_side(rhs)?;
            let (c, mut oc) = output_cursor(buf, pattern, dest_mask, order, n, None, None);
            if !a.is_masked() && !b.is_masked() {
                debug!(strategy = ?Strategy::BC, traversal = ?Traversal::Contiguous, n, "kernel");
                return bc_with::<S, _, _, _>(a.data.as_slice(), b.data.as_slice(), plan, c, &mut oc, f);
            }
            debug!(strategy = ?Strategy::BC, traversal = ?Traversal::Iterated, n, "kernel");
            let mut ia = side_cursor(a, layout)?;
            let mut ib = side_cursor(b, layout)?;
            end_ok(vv_iter_loop::<S, _, _, _>(
                a.data.as_slice(),
                &mut ia,
                b.data.as_slice(),
                &mut ib,
                c,
                &mut oc,
                f,
            ))
        }
    }
}

#[cfg_attr(not(feature = "parallel_proc"), allow(unused_variables))]
fn contiguous<S, T, U, F>(
    lhs: Side<'_, T>,
    rhs: Side<'_, T>,
    c: &mut [U],
    parallel: bool,
    f: &F,
) -> Result<(), KernelError>
where
    S: Sink<U>,
    T: Element,
    U: Element,
    F: Fn(&T, &T) -> Option<U> + Sync,
{
    let n = c.len();
    #[cfg(feature = "parallel_proc")]
    let parallel = parallel && n >= PARALLEL_THRESHOLD;
    match (lhs, rhs) {
        (Side::Array(a), Side::Array(b)) => {
            let (a, b) = (packed_slice(a, n), packed_slice(b, n));
            #[cfg(feature = "parallel_proc")]
            if parallel {
                return par_vv::<S, _, _, _>(a, b, c, f);
            }
            vv_with::<S, _, _, _>(a, b, c, f)
        }
        (Side::Array(a), Side::Scalar(s)) => {
            let a = packed_slice(a, n);
            #[cfg(feature = "parallel_proc")]
            if parallel {
                return par_vs::<S, _, _, _>(a, s, c, f);
            }
            vs_with::<S, _, _, _>(a, s, c, f)
        }
        (Side::Scalar(s), Side::Array(b)) => {
            let b = packed_slice(b, n);
            #[cfg(feature = "parallel_proc")]
            if parallel {
                return par_sv::<S, _, _, _>(s, b, c, f);
            }
            sv_with::<S, _, _, _>(s, b, c, f)
        }
        (Side::Scalar(_), Side::Scalar(_)) => Err(KernelError::InvalidPattern(
            "two scalar operands have no array to traverse".into(),
        )),
    }
}

/// The `n` packed elements of a contiguous view.
#[inline]
fn packed_slice<T>(a: &DenseArray<T>, n: usize) -> &[T] {
    let off = a.pattern.offset();
    &a.data[off..off + n]
}

/// Cursor over one array side in the layout's index space.
fn side_cursor<'a, T>(a: &'a DenseArray<T>, layout: &Layout) -> Result<FlatIterator<'a>, KernelError> {
    let it = match layout {
        Layout::Elementwise { order, .. } => FlatIterator::new(&a.pattern).with_order(*order),
        Layout::Broadcast(plan) => FlatIterator::broadcast(&a.pattern, plan.out_shape())?,
    };
    Ok(it.with_mask(a.mask.as_deref()))
}

fn broadcast_side<T>(side: Side<'_, T>) -> Result<&DenseArray<T>, KernelError> {
    side.array().ok_or_else(|| {
        KernelError::InvalidPattern("a broadcast plan pairs two arrays, got a scalar".into())
    })
}

/// Chooses the output cursor and the buffer region it indexes.
///
/// A packed, unmasked destination is written as a flat range. One sharing
/// an operand's pattern follows that operand's offsets. Anything else gets
/// its own cursor.
fn output_cursor<'b, 'm, U>(
    buf: &'b mut [U],
    pattern: &AccessPattern,
    mask: Option<&'m Bitmask>,
    order: MemoryOrder,
    n: usize,
    left: Option<&AccessPattern>,
    right: Option<&AccessPattern>,
) -> (&'b mut [U], OutputCursor<'m>) {
    if mask.is_none() {
        if pattern.is_contiguous_in(order) {
            let off = pattern.offset();
            return (&mut buf[off..off + n], OutputCursor::Flat);
        }
        if left == Some(pattern) {
            return (buf, OutputCursor::SameAsLeft);
        }
        if right == Some(pattern) {
            return (buf, OutputCursor::SameAsRight);
        }
    }
    let it = FlatIterator::new(pattern).with_mask(mask).with_order(order);
    (buf, OutputCursor::Iter(it))
}

/// Validity of every output position, written at the destination's storage
/// offsets on top of its current mask (all valid when it has none).
fn output_validity<T, U>(
    lhs: Side<'_, T>,
    rhs: Side<'_, T>,
    layout: &Layout,
    out: &DenseArray<U>,
) -> Result<Bitmask, KernelError> {
    let mut mask = match &out.mask {
        Some(m) => Bitmask::clone(m),
        None => Bitmask::new_set_all(out.data.len(), true),
    };
    let mut ia = lhs.array().map(|a| side_cursor(a, layout)).transpose()?;
    let mut ib = rhs.array().map(|b| side_cursor(b, layout)).transpose()?;
    let od = FlatIterator::new(&out.pattern).with_order(layout.order());
    for (off, _) in od {
        let va = next_valid(ia.as_mut());
        let vb = next_valid(ib.as_mut());
        mask.set(off, va && vb);
    }
    Ok(mask)
}

/// The destination's mask with every position cleared where `other` is masked.
fn in_place_validity<T>(dest: &DenseArray<T>, other: Side<'_, T>, layout: &Layout) -> Result<Bitmask, KernelError> {
    let mut mask = match &dest.mask {
        Some(m) => Bitmask::clone(m),
        None => Bitmask::new_set_all(dest.data.len(), true),
    };
    let mut io = other.array().map(|o| side_cursor(o, layout)).transpose()?;
    let od = FlatIterator::new(&dest.pattern).with_order(layout.order());
    for (off, _) in od {
        if !next_valid(io.as_mut()) {
            mask.set(off, false);
        }
    }
    Ok(mask)
}

/// Validity of the cursor's next position; a scalar side is always valid.
#[inline]
fn next_valid(it: Option<&mut FlatIterator>) -> bool {
    match it {
        Some(it) => it.next().is_some_and(|(_, valid)| valid),
        None => true,
    }
}

/// Reuse destination resized to `shape` without touching its storage.
fn fit_reuse<U>(mut dest: DenseArray<U>, shape: &[usize]) -> Result<DenseArray<U>, KernelError> {
    if dest.len() != shape_size(shape) {
        return Err(KernelError::ShapeMismatch {
            lhs: dest.shape().to_vec(),
            rhs: shape.to_vec(),
            message: Some(format!(
                "reuse destination holds {} elements, result has {}",
                dest.len(),
                shape_size(shape)
            )),
        });
    }
    if dest.shape() != shape {
        if !dest.pattern.is_contiguous() {
            return Err(KernelError::ShapeMismatch {
                lhs: dest.shape().to_vec(),
                rhs: shape.to_vec(),
                message: Some("a strided reuse destination must already have the result shape".into()),
            });
        }
        dest.pattern = dest.pattern.reshape_packed(shape)?;
    }
    check_writable(&dest.pattern)?;
    Ok(dest)
}

/// Rejects destinations where two positions share a storage slot.
fn check_writable(pattern: &AccessPattern) -> Result<(), KernelError> {
    let repeats = pattern
        .shape()
        .iter()
        .zip(pattern.strides())
        .any(|(&d, &s)| d > 1 && s == 0);
    if repeats {
        return Err(KernelError::InvalidPattern(format!(
            "destination {} maps several positions onto one slot",
            pattern
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::arithmetic::{add, div, mul, sub};

    fn cfg(broadcast: bool) -> ExecConfig {
        ExecConfig {
            broadcast,
            parallel: false,
        }
    }

    #[test]
    fn test_side_debug_names_the_operand() {
        let a = DenseArray::from_vec(vec![1i32, 2]);
        let s = 7i32;
        assert_eq!(format!("{:?}", Side::Scalar(&s)), "Scalar(7)");
        let shown = format!("{:?}", Side::Array(&a));
        assert!(shown.starts_with("Array("));
        assert!(shown.contains(&format!("{:?}", a)));
    }

    #[test]
    fn test_layout_resolution() {
        let a = DenseArray::filled(&[2, 3], 1i32);
        let b = DenseArray::filled(&[3], 1i32);
        assert!(matches!(
            resolve_layout(Side::Array(&a), Side::Array(&a), false),
            Ok(Layout::Elementwise { .. })
        ));
        assert!(resolve_layout(Side::Array(&a), Side::Array(&b), false).is_err());
        let l = resolve_layout(Side::Array(&a), Side::Array(&b), true).unwrap();
        assert_eq!(l.shape(), &[2, 3]);
        let one = DenseArray::filled(&[1], 1i32);
        let one2 = DenseArray::filled(&[1, 1], 1i32);
        let l = resolve_layout(Side::Array(&one), Side::Array(&one2), false).unwrap();
        assert_eq!(l.shape(), &[1, 1]);
    }

    #[test]
    fn test_fresh_output_follows_col_major_operands() {
        let a = DenseArray::from_shape_vec_in(&[2, 2], vec![1, 2, 3, 4], MemoryOrder::ColMajor).unwrap();
        let out = run_assign(Side::Array(&a), Side::Array(&a), None, cfg(false), add).unwrap();
        assert_eq!(out.pattern.order(), MemoryOrder::ColMajor);
        assert_eq!(out.data.as_slice(), &[2, 4, 6, 8]);
        assert_eq!(out.to_vec(), vec![2, 6, 4, 8]);
    }

    #[test]
    fn test_mixed_orders_match_logical_result() {
        let a = DenseArray::from_shape_vec(&[2, 2], vec![1, 2, 3, 4]).unwrap();
        let b = DenseArray::from_shape_vec_in(&[2, 2], vec![10, 30, 20, 40], MemoryOrder::ColMajor).unwrap();
        let out = run_assign(Side::Array(&a), Side::Array(&b), None, cfg(false), add).unwrap();
        assert_eq!(out.to_vec(), vec![11, 22, 33, 44]);
    }

    #[test]
    fn test_scalar_sides() {
        let a = DenseArray::from_vec(vec![2.0f64, 4.0]);
        let out = run_assign(Side::Array(&a), Side::Scalar(&2.0), None, cfg(false), div).unwrap();
        assert_eq!(out.to_vec(), vec![1.0, 2.0]);
        let out = run_assign(Side::Scalar(&2.0), Side::Array(&a), None, cfg(false), div).unwrap();
        assert_eq!(out.to_vec(), vec![1.0, 0.5]);
        let out = run_assign(Side::Scalar(&3), Side::Scalar(&4), None, cfg(false), mul).unwrap();
        assert!(out.shape().is_empty());
        assert_eq!(out.to_vec(), vec![12]);
    }

    #[test]
    fn test_reuse_reshapes_packed_destination() {
        let a = DenseArray::from_shape_vec(&[2, 2], vec![1, 2, 3, 4]).unwrap();
        let dest = DenseArray::filled(&[4], 0);
        let out = run_assign(Side::Array(&a), Side::Scalar(&1), Some(dest), cfg(false), add).unwrap();
        assert_eq!(out.shape(), &[2, 2]);
        assert_eq!(out.to_vec(), vec![2, 3, 4, 5]);
        let bad = DenseArray::filled(&[3], 0);
        assert!(matches!(
            run_assign(Side::Array(&a), Side::Scalar(&1), Some(bad), cfg(false), add),
            Err(KernelError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_reuse_strided_destination() {
        let a = DenseArray::from_vec(vec![1, 2, 3]);
        let backing = DenseArray::filled(&[6], -1);
        let dest = backing.slice(0, 0, 6, 2).unwrap();
        drop(backing);
        let out = run_assign(Side::Array(&a), Side::Array(&a), Some(dest), cfg(false), add).unwrap();
        assert_eq!(out.to_vec(), vec![2, 4, 6]);
        assert_eq!(out.data.as_slice(), &[2, -1, 4, -1, 6, -1]);
    }

    #[test]
    fn test_masked_operand_masks_output() {
        let a = DenseArray::from_vec(vec![1, 2, 3])
            .with_mask(Bitmask::from_bools(&[true, false, true]))
            .unwrap();
        let b = DenseArray::from_vec(vec![10, 20, 30]);
        let out = run_assign(Side::Array(&a), Side::Array(&b), None, cfg(false), add).unwrap();
        let got: Vec<Option<i32>> = out.iter_logical().map(|v| v.copied()).collect();
        assert_eq!(got, vec![Some(11), None, Some(33)]);
    }

    #[test]
    fn test_broadcast_with_masked_operand() {
        let col = DenseArray::from_shape_vec(&[2, 1], vec![1, 2])
            .unwrap()
            .with_mask(Bitmask::from_bools(&[true, false]))
            .unwrap();
        let row = DenseArray::from_shape_vec(&[1, 2], vec![10, 20]).unwrap();
        let out = run_assign(Side::Array(&col), Side::Array(&row), None, cfg(true), add).unwrap();
        let got: Vec<Option<i32>> = out.iter_logical().map(|v| v.copied()).collect();
        assert_eq!(got, vec![Some(11), Some(21), None, None]);
    }

    #[test]
    fn test_increment_respects_shape_and_mask() {
        let a = DenseArray::from_vec(vec![1, 2]);
        let incr = DenseArray::from_vec(vec![100, 100])
            .with_mask(Bitmask::from_bools(&[false, true]))
            .unwrap();
        let out = run_increment(Side::Array(&a), Side::Array(&a), incr, cfg(false), mul).unwrap();
        assert_eq!(out.data.as_slice(), &[100, 104]);
        assert!(out.is_masked());
        let wrong = DenseArray::filled(&[1, 2], 0);
        assert!(run_increment(Side::Array(&a), Side::Array(&a), wrong, cfg(false), mul).is_err());
    }

    #[test]
    fn test_in_place_left_and_right() {
        let a = DenseArray::from_vec(vec![10, 20, 30]);
        let b = DenseArray::from_vec(vec![1, 2, 3]);
        let left = run_in_place(a.clone(), Side::Array(&b), Target::Left, false, sub).unwrap();
        assert_eq!(left.to_vec(), vec![9, 18, 27]);
        let right = run_in_place(b.clone(), Side::Array(&a), Target::Right, false, sub).unwrap();
        assert_eq!(right.to_vec(), vec![9, 18, 27]);
        let s = run_in_place(b, Side::Scalar(&100), Target::Right, false, sub).unwrap();
        assert_eq!(s.to_vec(), vec![99, 98, 97]);
        // The original `a` is untouched by copy-on-write
        assert_eq!(a.to_vec(), vec![10, 20, 30]);
    }

    #[test]
    fn test_in_place_broadcast_and_growth() {
        let m = DenseArray::from_shape_vec(&[2, 2], vec![1, 2, 3, 4]).unwrap();
        let row = DenseArray::from_shape_vec(&[1, 2], vec![10, 20]).unwrap();
        let out = run_in_place(m, Side::Array(&row), Target::Left, true, add).unwrap();
        assert_eq!(out.to_vec(), vec![11, 22, 13, 24]);
        let err = run_in_place(row, Side::Array(&out), Target::Left, true, add).unwrap_err();
        assert!(matches!(err, KernelError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_in_place_strided_recv() {
        let m = DenseArray::from_shape_vec(&[2, 2], vec![1, 2, 3, 4]).unwrap();
        let t = m.transpose(&[1, 0]).unwrap();
        drop(m);
        let a = DenseArray::from_shape_vec(&[2, 2], vec![10, 10, 10, 10]).unwrap();
        let out = run_in_place(t, Side::Array(&a), Target::Right, false, sub).unwrap();
        // 10 - [[1, 3], [2, 4]]
        assert_eq!(out.to_vec(), vec![9, 7, 8, 6]);
    }

    #[test]
    fn test_in_place_masks_with_other() {
        let d = DenseArray::from_vec(vec![1, 2, 3]);
        let o = DenseArray::from_vec(vec![1, 1, 1])
            .with_mask(Bitmask::from_bools(&[true, true, false]))
            .unwrap();
        let out = run_in_place(d, Side::Array(&o), Target::Left, false, add).unwrap();
        let got: Vec<Option<i32>> = out.iter_logical().map(|v| v.copied()).collect();
        assert_eq!(got, vec![Some(2), Some(3), None]);
        assert_eq!(out.data.as_slice(), &[2, 3, 3]);
    }

    #[test]
    fn test_zero_stride_destination_rejected() {
        let a = DenseArray::from_vec(vec![1, 2, 3]);
        let stretched = DenseArray::filled(&[1], 0).broadcast_to(&[3]).unwrap();
        let err = run_in_place(stretched, Side::Array(&a), Target::Left, false, add).unwrap_err();
        assert!(matches!(err, KernelError::InvalidPattern(_)));
    }

    #[test]
    fn test_fault_reports_position() {
        let a = DenseArray::from_vec(vec![4, 4, 4]);
        let b = DenseArray::from_vec(vec![1, 0, 1]);
        let err = run_assign(Side::Array(&a), Side::Array(&b), None, cfg(false), div).unwrap_err();
        assert_eq!(err, KernelError::DivisionByZero { index: 1 });
    }
}
