// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Broadcast Kernels** - *Row-major walk of the output index space*
//!
//! Both operands are read through a resolved [`BroadcastPlan`], so a stretched
//! axis re-reads the same source element instead of materialising a copy.
//! Output position `i` is the row-major index into the plan's output shape.

use crate::enums::error::KernelError;
use crate::kernels::broadcast::BroadcastPlan;
use crate::kernels::family::{Accumulate, Assign, OutputCursor, Sink, fault};
use crate::traits::type_unions::Addable;

pub(crate) fn bc_with<S, T, U, F>(
    a: &[T],
    b: &[T],
    plan: &BroadcastPlan,
    c: &mut [U],
    out: &mut OutputCursor,
    f: &F,
) -> Result<(), KernelError>
where
    S: Sink<U>,
    F: Fn(&T, &T) -> Option<U>,
{
    for i in 0..plan.size() {
        let (oa, ob) = plan.offsets(i);
        let (oc, valid) = out.next(Some(oa), Some(ob), i)?;
        if !valid {
            continue;
        }
        match f(&a[oa], &b[ob]) {
            Some(v) => S::put(&mut c[oc], v),
            None => return Err(fault(i)),
        }
    }
    Ok(())
}

/// `c[out] = a[plan.lhs(i)] ⊕ b[plan.rhs(i)]`
pub fn bc<T, U, F>(
    a: &[T],
    b: &[T],
    plan: &BroadcastPlan,
    c: &mut [U],
    out: &mut OutputCursor,
    f: F,
) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    bc_with::<Assign, _, _, _>(a, b, plan, c, out, &f)
}

/// `c[out] += a[plan.lhs(i)] ⊕ b[plan.rhs(i)]`
pub fn bc_incr<T, U: Addable, F>(
    a: &[T],
    b: &[T],
    plan: &BroadcastPlan,
    c: &mut [U],
    out: &mut OutputCursor,
    f: F,
) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<U>,
{
    bc_with::<Accumulate, _, _, _>(a, b, plan, c, out, &f)
}

/// Broadcast into the left operand.
///
/// The left operand must already have the output shape, so no two output
/// positions share a left slot.
pub fn bc_inplace<T, F>(dest: &mut [T], b: &[T], plan: &BroadcastPlan, f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<T>,
{
    debug_assert!(!plan.lhs_collapses());
    for i in 0..plan.size() {
        let (od, ob) = plan.offsets(i);
        dest[od] = f(&dest[od], &b[ob]).ok_or_else(|| fault(i))?;
    }
    Ok(())
}

/// Broadcast into the right operand, keeping `a ⊕ dest` operand order.
pub fn bc_recv<T, F>(a: &[T], dest: &mut [T], plan: &BroadcastPlan, f: F) -> Result<(), KernelError>
where
    F: Fn(&T, &T) -> Option<T>,
{
    debug_assert!(!plan.rhs_collapses());
    for i in 0..plan.size() {
        let (oa, od) = plan.offsets(i);
        dest[od] = f(&a[oa], &dest[od]).ok_or_else(|| fault(i))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::arithmetic::{add, div, sub};
    use crate::kernels::broadcast::resolve;
    use crate::{AccessPattern, FlatIterator};

    #[test]
    fn test_bc_column_plus_row() {
        let pa = AccessPattern::row_major(&[3, 1]);
        let pb = AccessPattern::row_major(&[1, 4]);
        let plan = resolve(&pa, &pb).unwrap();
        let a = [0, 10, 20];
        let b = [1, 2, 3, 4];
        let mut c = vec![0; 12];
        bc(&a, &b, &plan, &mut c, &mut OutputCursor::Flat, add).unwrap();
        assert_eq!(c, vec![1, 2, 3, 4, 11, 12, 13, 14, 21, 22, 23, 24]);
        bc_incr(&a, &b, &plan, &mut c, &mut OutputCursor::Flat, add).unwrap();
        assert_eq!(c[11], 48);
    }

    #[test]
    fn test_bc_into_col_major_destination() {
        let pa = AccessPattern::row_major(&[2, 1]);
        let pb = AccessPattern::row_major(&[3]);
        let plan = resolve(&pa, &pb).unwrap();
        let dest = AccessPattern::col_major(&[2, 3]);
        let mut c = vec![0; 6];
        let mut out = OutputCursor::Iter(FlatIterator::new(&dest));
        bc(&[100, 200], &[1, 2, 3], &plan, &mut c, &mut out, sub).unwrap();
        // Column-major storage of [[99, 98, 97], [199, 198, 197]]
        assert_eq!(c, vec![99, 199, 98, 198, 97, 197]);
    }

    #[test]
    fn test_bc_fault_index_is_output_position() {
        let pa = AccessPattern::row_major(&[2, 2]);
        let pb = AccessPattern::row_major(&[2]);
        let plan = resolve(&pa, &pb).unwrap();
        let mut c = vec![0; 4];
        let err = bc(&[4, 6, 8, 10], &[2, 0], &plan, &mut c, &mut OutputCursor::Flat, div)
            .unwrap_err();
        assert_eq!(err, KernelError::DivisionByZero { index: 1 });
        assert_eq!(c, vec![2, 0, 0, 0]);
    }

    #[test]
    fn test_bc_inplace_and_recv() {
        let pa = AccessPattern::row_major(&[2, 2]);
        let pb = AccessPattern::row_major(&[1, 2]);
        let plan = resolve(&pa, &pb).unwrap();
        let mut d = [10, 20, 30, 40];
        bc_inplace(&mut d, &[1, 2], &plan, sub).unwrap();
        assert_eq!(d, [9, 18, 29, 38]);

        let plan = resolve(&pb, &pa).unwrap();
        let mut d = [1, 2, 3, 4];
        bc_recv(&[10, 10], &mut d, &plan, sub).unwrap();
        assert_eq!(d, [9, 8, 7, 6]);
    }
}
