//! Copyright © 2025 Peter Garfield Bower. All rights reserved.
//!
//! # Minstride
//!
//! Generic elementwise kernel engine for dense, strided, multi-dimensional
//! arrays.
//!
//! - [`AccessPattern`] maps logical coordinates to buffer offsets.
//! - [`FlatIterator`] walks any pattern in row- or column-major order, with an
//!   optional validity mask.
//! - [`kernels::broadcast`] resolves two shapes into one output shape.
//! - [`kernels::family`] holds the contiguous, iterated and broadcast kernels.
//! - [`kernels::registry`] lists the operations and the kinds each accepts.
//! - [`dispatch`] selects a kernel at runtime from the operation, the kind and
//!   the call options.
//!
//! ```rust
//! use minstride::{DenseArray, FuncOpts, NumericKind, OpName, dispatch};
//!
//! let a = DenseArray::from_shape_vec(&[2, 1], vec![1.0f64, 2.0]).unwrap();
//! let b = DenseArray::from_vec(vec![10.0f64, 20.0, 30.0]);
//! let out = dispatch(
//!     OpName::Add,
//!     NumericKind::Float64,
//!     a.into(),
//!     b.into(),
//!     FuncOpts::new().broadcast(true),
//! )
//! .unwrap();
//! assert_eq!(out.shape(), &[2, 3]);
//! ```

pub mod enums {
    pub mod array;
    pub mod error;
    pub mod kind;
    pub mod operand;
    pub mod operators;
    pub mod scalar;
}

pub mod structs {
    pub mod access_pattern;
    pub mod bitmask;
    pub mod buffer;
    pub mod dense;
    pub mod flat_iterator;
    pub mod func_opts;
}

pub mod traits {
    pub mod print;
    pub mod type_unions;
}

pub mod kernels {
    pub mod arithmetic;
    pub mod broadcast;
    pub mod comparison;
    pub mod family;
    pub mod registry;
    pub mod routing;
}

pub mod macros;

pub use enums::array::Array;
pub use enums::error::KernelError;
pub use enums::kind::NumericKind;
pub use enums::operand::Operand;
pub use enums::operators::{OpClass, OpName};
pub use enums::scalar::Scalar;

pub use structs::access_pattern::{AccessPattern, MemoryOrder};
pub use structs::bitmask::Bitmask;
pub use structs::buffer::Buffer;
pub use structs::dense::DenseArray;
pub use structs::flat_iterator::FlatIterator;
pub use structs::func_opts::{CancelToken, FuncOpts};

pub use kernels::broadcast::BroadcastPlan;
pub use kernels::registry::{OPERATIONS, Operation};
pub use kernels::routing::{binary_map, dispatch};

pub use traits::print::Print;
pub use traits::type_unions::{Addable, Element, Float, Integer, Modular, Number, Ordered, Truthy};
