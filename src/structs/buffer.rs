//! # **Buffer** - *Owned, aligned element storage*
//!
//! Buffer backs every `DenseArray<T>` in *Minstride*.
//!
//! ## Design
//! - Backed by [`Vec64<T>`], a 64-byte aligned heap vector, so contiguous kernels
//!   run over aligned slices.
//! - Exactly one logical owner. Arrays share buffers only through an explicit `Arc`,
//!   and mutation of a shared buffer goes through `Arc::make_mut` (copy-on-write),
//!   never implicitly.
//! - `Deref`/`DerefMut` to `[T]` keep call sites slice-shaped.
//!
//! ## Typical use
//! ```rust
//! use minstride::Buffer;
//!
//! let mut b = Buffer::from_slice(&[1u32, 2, 3]);
//! b[0] = 9;
//! assert_eq!(b.as_slice(), &[9, 2, 3]);
//! ```

use std::fmt::{self, Display, Formatter};
use std::ops::{Deref, DerefMut};

use crate::traits::print::MAX_PREVIEW;
use vec64::Vec64;

/// # Buffer
///
/// Contiguous, kind-homogeneous block of elements.
///
/// The element count never changes after construction inside the engine;
/// kernels write through `&mut [T]`.
pub struct Buffer<T> {
    data: Vec64<T>,
}

impl<T: Clone> Buffer<T> {
    /// Construct an owned buffer from a slice, copying the data into an aligned Vec64.
    #[inline]
    pub fn from_slice(slice: &[T]) -> Self {
        let mut v = Vec64::with_capacity(slice.len());
        v.extend_from_slice(slice);
        Buffer::from_vec64(v)
    }

    /// Buffer of `len` copies of `value`.
    #[inline]
    pub fn filled(value: T, len: usize) -> Self {
        let mut v = Vec64::with_capacity(len);
        v.resize(len, value);
        Buffer::from_vec64(v)
    }
}

impl<T: Clone + Default> Buffer<T> {
    /// Buffer of `len` default values, used for fresh destinations.
    #[inline]
    pub fn zeroed(len: usize) -> Self {
        Self::filled(T::default(), len)
    }
}

impl<T> Buffer<T> {
    /// Construct from an owned Vec64<T>.
    #[inline]
    pub fn from_vec64(v: Vec64<T>) -> Self {
        Self { data: v }
    }

    /// Returns the buffer as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    /// Returns a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }

    /// Returns the number of elements in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        Buffer::from_vec64(self.data.clone())
    }
}

impl<T: PartialEq> PartialEq for Buffer<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.deref() == other.deref()
    }
}

impl<T: fmt::Debug> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Buffer").field(&self.as_slice()).finish()
    }
}

impl<T> Default for Buffer<T> {
    #[inline]
    fn default() -> Self {
        Buffer::from_vec64(Vec64::default())
    }
}

impl<T> Deref for Buffer<T> {
    type Target = [T];
    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for Buffer<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> From<Vec64<T>> for Buffer<T> {
    #[inline]
    fn from(v: Vec64<T>) -> Self {
        Buffer::from_vec64(v)
    }
}

impl<T> From<Vec<T>> for Buffer<T> {
    #[inline]
    fn from(v: Vec<T>) -> Self {
        v.into_iter().collect()
    }
}

impl<'a, T> IntoIterator for &'a Buffer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.deref().iter()
    }
}

impl<T> FromIterator<T> for Buffer<T> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(Vec64::from_iter(iter))
    }
}

impl<T> AsRef<[T]> for Buffer<T> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.deref()
    }
}

impl<T> AsMut<[T]> for Buffer<T> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self.deref_mut()
    }
}

impl<T: Display> Display for Buffer<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let len = self.len();

        writeln!(f, "Buffer [{} elements]", len)?;

        write!(f, "[")?;

        for i in 0..usize::min(len, MAX_PREVIEW) {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self[i])?;
        }

        if len > MAX_PREVIEW {
            write!(f, ", … ({} total)", len)?;
        }

        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_and_index() {
        let mut buf = Buffer::from_slice(&[1, 2, 3]);
        assert_eq!(buf.len(), 3);
        buf[1] = 20;
        assert_eq!(&buf[..], &[1, 20, 3]);
    }

    #[test]
    fn test_alignment() {
        let buf = Buffer::<f64>::zeroed(17);
        assert_eq!(buf.as_slice().as_ptr() as usize % 64, 0);
        assert!(buf.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_from_vec_and_iter() {
        let buf: Buffer<String> = vec!["a".to_string(), "b".to_string()].into();
        let joined: Vec<&str> = (&buf).into_iter().map(|s| s.as_str()).collect();
        assert_eq!(joined, vec!["a", "b"]);
    }

    #[test]
    fn test_equality_and_clone() {
        let a = Buffer::filled(7u8, 4);
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.len(), 4);
    }

    #[test]
    fn test_display_preview() {
        let buf = Buffer::from_slice(&[1, 2]);
        assert_eq!(format!("{}", buf), "Buffer [2 elements]\n[1, 2]");
    }

    #[test]
    fn test_length_fixed_at_construction() {
        let mut b: Buffer<i16> = Buffer::zeroed(3);
        b.as_mut_slice()[2] = 9;
        assert_eq!(b.as_slice(), &[0, 0, 9]);
        assert!(Buffer::<i16>::zeroed(0).is_empty());
        assert_eq!(Buffer::from_vec64(Vec64::from_iter([1u8, 2])).len(), 2);
    }
}
