// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Routing Module
//!
//! Runtime dispatch of catalogue operations, layout planning, and kernel
//! selection for every destination mode.

pub mod binary_map;
pub mod dispatch;
pub mod execute;

pub use binary_map::binary_map;
pub use dispatch::dispatch;
