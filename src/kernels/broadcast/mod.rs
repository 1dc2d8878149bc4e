// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Broadcasting Module
//!
//! Numpy-style two-operand shape resolution.
//!
//! Shapes are right-aligned and the shorter one is padded on the left with
//! extent-1 axes. Each aligned pair must be equal, or one side must be 1.
//! The resolved plan holds the output shape and, per input, effective strides
//! where every broadcast (or padded) axis has stride 0.
//!
//! ```rust
//! use minstride::{AccessPattern, kernels::broadcast::resolve};
//!
//! let a = AccessPattern::row_major(&[3, 1]);
//! let b = AccessPattern::row_major(&[1, 4]);
//! let plan = resolve(&a, &b).unwrap();
//! assert_eq!(plan.out_shape(), &[3, 4]);
//! assert_eq!(plan.offsets(5), (1, 1)); // output (1, 1)
//! ```

use crate::enums::error::KernelError;
use crate::structs::access_pattern::{AccessPattern, MemoryOrder, packed_strides, shape_size};

/// Resolved broadcast between two access patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastPlan {
    out_shape: Vec<usize>,
    lhs_strides: Vec<usize>,
    rhs_strides: Vec<usize>,
    lhs_offset: usize,
    rhs_offset: usize,
    /// Row-major packed strides of the output, i.e. `prod(out_shape[j+1..])`
    out_strides: Vec<usize>,
    /// Output axes of extent > 1
    active: Vec<usize>,
}

/// Output shape of broadcasting `a` against `b`.
pub fn broadcast_shapes(a: &[usize], b: &[usize]) -> Result<Vec<usize>, KernelError> {
    let rank = a.len().max(b.len());
    let mut out = vec![1usize; rank];
    for j in 0..rank {
        let da = dim_from_right(a, rank, j);
        let db = dim_from_right(b, rank, j);
        out[j] = match (da, db) {
            (x, y) if x == y => x,
            (1, y) => y,
            (x, 1) => x,
            _ => {
                return Err(KernelError::ShapeMismatch {
                    lhs: a.to_vec(),
                    rhs: b.to_vec(),
                    message: Some(format!(
                        "axis {} has extents {} and {}, neither is 1",
                        j, da, db
                    )),
                });
            }
        };
    }
    Ok(out)
}

/// Strides of `pattern` when read against `out_shape`.
///
/// Padded axes and extent-1 axes get stride 0.
pub fn effective_strides(
    pattern: &AccessPattern,
    out_shape: &[usize],
) -> Result<Vec<usize>, KernelError> {
    let rank = out_shape.len();
    let shape = pattern.shape();
    if shape.len() > rank {
        return Err(KernelError::shape_mismatch(shape, out_shape));
    }
    let pad = rank - shape.len();
    let mut strides = vec![0usize; rank];
    for j in pad..rank {
        let d = shape[j - pad];
        if d == 1 {
            continue;
        }
        if d != out_shape[j] {
            return Err(KernelError::shape_mismatch(shape, out_shape));
        }
        strides[j] = pattern.strides()[j - pad];
    }
    Ok(strides)
}

/// Resolves the output shape and both operands' effective strides.
pub fn resolve(lhs: &AccessPattern, rhs: &AccessPattern) -> Result<BroadcastPlan, KernelError> {
    let out_shape = broadcast_shapes(lhs.shape(), rhs.shape())?;
    let lhs_strides = effective_strides(lhs, &out_shape)?;
    let rhs_strides = effective_strides(rhs, &out_shape)?;
    let out_strides = packed_strides(&out_shape, MemoryOrder::RowMajor);
    let active = (0..out_shape.len()).filter(|&j| out_shape[j] != 1).collect();
    Ok(BroadcastPlan {
        out_shape,
        lhs_strides,
        rhs_strides,
        lhs_offset: lhs.offset(),
        rhs_offset: rhs.offset(),
        out_strides,
        active,
    })
}

impl BroadcastPlan {
    #[inline]
    pub fn out_shape(&self) -> &[usize] {
        &self.out_shape
    }

    #[inline]
    pub fn lhs_strides(&self) -> &[usize] {
        &self.lhs_strides
    }

    #[inline]
    pub fn rhs_strides(&self) -> &[usize] {
        &self.rhs_strides
    }

    /// Number of output elements.
    #[inline]
    pub fn size(&self) -> usize {
        shape_size(&self.out_shape)
    }

    /// Whether some output positions read the same `lhs` element.
    pub fn lhs_collapses(&self) -> bool {
        self.active.iter().any(|&j| self.lhs_strides[j] == 0)
    }

    /// Whether some output positions read the same `rhs` element.
    pub fn rhs_collapses(&self) -> bool {
        self.active.iter().any(|&j| self.rhs_strides[j] == 0)
    }

    /// Storage offsets into `lhs` and `rhs` for row-major output index `i`.
    ///
    /// For each active axis `j`, `idx = (i / out_strides[j]) % out_shape[j]`,
    /// accumulated only where the operand's stride is non-zero.
    #[inline]
    pub fn offsets(&self, i: usize) -> (usize, usize) {
        let mut off_l = self.lhs_offset;
        let mut off_r = self.rhs_offset;
        for &j in &self.active {
            let idx = (i / self.out_strides[j]) % self.out_shape[j];
            let sl = self.lhs_strides[j];
            if sl != 0 {
                off_l += idx * sl;
            }
            let sr = self.rhs_strides[j];
            if sr != 0 {
                off_r += idx * sr;
            }
        }
        (off_l, off_r)
    }
}

#[inline]
fn dim_from_right(shape: &[usize], rank: usize, j: usize) -> usize {
    let pad = rank - shape.len();
    if j < pad { 1 } else { shape[j - pad] }
}
