//! # **Print Module** - *Console output*
//!
//! `Print` for anything with a `Display` impl, plus the preview width the
//! array and buffer `Display` impls truncate at.

use std::fmt::Display;

pub(crate) const MAX_PREVIEW: usize = 50;

/// Writes `Display` output to stdout with a trailing newline.
///
/// ```rust
/// use minstride::{DenseArray, Print};
///
/// let a = DenseArray::from_shape_vec(&[2, 2], vec![1i32, 2, 3, 4]).unwrap();
/// a.print();
/// a.transpose(&[1, 0]).unwrap().print();
/// ```
pub trait Print: Display {
    #[inline]
    fn print(&self) {
        println!("{}", self);
    }
}

impl<T: Display + ?Sized> Print for T {}
