//! # **Bitmask Module** - *Packed validity mask*
//!
//! Bit-packed validity mask with 64-byte aligned storage.
//!
//! ## Purpose
//! - Marks which storage slots of a `DenseArray` hold valid elements (1 = valid,
//!   0 = masked).
//! - Indexed by **storage offset**, not logical position, so it stays correct
//!   under any strided view of the same buffer.
//!
//! ## Behaviour
//! - LSB corresponds to the first slot.
//! - Trailing padding bits are always masked off.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::Buffer;
use vec64::Vec64;

/// # Bitmask
///
/// 64-byte aligned packed bitmask.
///
/// # Example
/// ```rust
/// use minstride::Bitmask;
///
/// let mut m = Bitmask::new_set_all(10, true);
/// m.set(3, false);
/// assert!(!m.get(3) && m.get(4));
/// assert_eq!(m.count_zeros(), 1);
/// ```
#[derive(Clone, PartialEq, Default)]
pub struct Bitmask {
    pub bits: Buffer<u8>,
    pub len: usize,
}

impl Bitmask {
    /// Ensures all unused bits above self.len are zeroed.
    #[inline]
    pub fn mask_trailing_bits(&mut self) {
        if self.len == 0 || (self.len & 7) == 0 {
            return;
        }
        let last = self.bits.len() - 1;
        let mask = (1u8 << (self.len & 7)) - 1;
        self.bits[last] &= mask;
    }

    /// Create new mask, length = `len`, all bits set if `set` else cleared.
    #[inline]
    pub fn new_set_all(len: usize, set: bool) -> Self {
        let n_bytes = len.div_ceil(8);
        let mut data = Vec64::with_capacity(n_bytes);
        let fill = if set { 0xFF } else { 0 };
        data.resize(n_bytes, fill);
        let mut mask = Self {
            bits: data.into(),
            len,
        };
        mask.mask_trailing_bits();
        mask
    }

    /// Builds a mask from one `bool` per slot.
    pub fn from_bools(bits: &[bool]) -> Self {
        let mut mask = Bitmask::new_set_all(bits.len(), false);
        for (i, &b) in bits.iter().enumerate() {
            if b {
                mask.set(i, true);
            }
        }
        mask
    }

    /// Returns the logical length of the bitmask
    ///
    /// *Excludes padding*
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bit at `idx`. Positions past `len` read as masked.
    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        (self.bits[idx >> 3] >> (idx & 7)) & 1 != 0
    }

    /// Sets the bit at `i`.
    ///
    /// # Panics
    /// When `i >= len`.
    #[inline]
    pub fn set(&mut self, i: usize, value: bool) {
        assert!(i < self.len, "Bitmask::set out of bounds (idx={i}, len={})", self.len);
        let byte = &mut self.bits[i >> 3];
        let bit = 1u8 << (i & 7);
        if value {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
    }

    pub fn count_ones(&self) -> usize {
        let full_bytes = self.len / 8;
        let mut count = self.bits[..full_bytes]
            .iter()
            .map(|&b| b.count_ones() as usize)
            .sum::<usize>();
        let rem = self.len & 7;
        if rem != 0 {
            let mask = (1u8 << rem) - 1;
            count += (self.bits[full_bytes] & mask).count_ones() as usize;
        }
        count
    }

    #[inline]
    pub fn count_zeros(&self) -> usize {
        self.len - self.count_ones()
    }

    /// True when every slot is valid.
    #[inline]
    pub fn all_set(&self) -> bool {
        self.count_ones() == self.len
    }
}

impl Debug for Bitmask {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Bitmask[")?;
        for i in 0..self.len {
            write!(f, "{}", if self.get(i) { '1' } else { '0' })?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_set_all_trailing_bits() {
        let m = Bitmask::new_set_all(10, true);
        assert_eq!(m.bits.len(), 2);
        assert_eq!(m.bits[1], 0b11);
        assert_eq!(m.count_ones(), 10);
        assert!(m.all_set());
    }

    #[test]
    fn test_set_get_and_bounds() {
        let mut m = Bitmask::new_set_all(9, false);
        m.set(8, true);
        m.set(0, true);
        assert!(m.get(0) && m.get(8));
        assert!(!m.get(4));
        assert!(!m.get(100));
        assert_eq!(m.count_zeros(), 7);
    }

    #[test]
    fn test_from_bools_debug() {
        let m = Bitmask::from_bools(&[true, false, true]);
        assert_eq!(format!("{:?}", m), "Bitmask[101]");
    }

    #[test]
    #[should_panic]
    fn test_set_out_of_bounds_panics() {
        let mut m = Bitmask::new_set_all(3, false);
        m.set(3, true);
    }
}
