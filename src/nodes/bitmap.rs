// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Presence vector for one level of the trie.
//!
//! A branch addresses 64 child slots but only stores the occupied ones, in
//! a compacted array. The [`Bitmap`] records which slots are occupied, and
//! [`Bitmap::index`] maps a slot to its position in the compacted array by
//! counting the occupied slots below it.
//!
//! Slots are named by one-hot `u64` masks as returned by
//! [`Bitmap::position`].

use std::fmt;

use bitmaps::Bitmap as Bits;

use crate::config::{HASH_LEVEL_SIZE, HASH_WIDTH, MAX_OFFSET};

const LEVEL_MASK: u64 = (HASH_WIDTH - 1) as u64;

/// A 64 slot presence vector.
///
/// `Bitmap` is a value type: [`next`][Bitmap::next] and
/// [`without`][Bitmap::without] return a new bitmap and leave the receiver
/// alone.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bitmap {
    bits: Bits<HASH_WIDTH>,
}

impl Bitmap {
    /// Construct an empty bitmap.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Bitmap { bits: Bits::new() }
    }

    /// Construct a bitmap from its raw `u64` representation.
    #[inline]
    #[must_use]
    pub fn from_value(value: u64) -> Self {
        Bitmap {
            bits: Bits::from_value(value),
        }
    }

    /// The raw `u64` representation of the bitmap.
    #[inline]
    #[must_use]
    pub fn into_value(self) -> u64 {
        self.bits.into_value()
    }

    /// The one-hot mask for the slot `hash` occupies at depth `offset`.
    ///
    /// Takes the six bits of `hash` starting at bit `offset * 6`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is greater than [`MAX_OFFSET`][crate::MAX_OFFSET].
    /// A deeper offset means the caller kept descending after the hash was
    /// exhausted.
    #[inline]
    #[must_use]
    pub fn position(hash: u64, offset: usize) -> u64 {
        assert!(
            offset <= MAX_OFFSET,
            "Bitmap::position: offset {} out of range 0..={}",
            offset,
            MAX_OFFSET
        );
        1 << ((hash >> (offset * HASH_LEVEL_SIZE)) & LEVEL_MASK)
    }

    /// Test whether any slot in `mask` is occupied.
    #[inline]
    #[must_use]
    pub fn has(self, mask: u64) -> bool {
        self.into_value() & mask != 0
    }

    /// A new bitmap with the slots in `mask` occupied.
    #[inline]
    #[must_use]
    pub fn next(self, mask: u64) -> Self {
        Self::from_value(self.into_value() | mask)
    }

    /// A new bitmap with the slots in `mask` cleared.
    #[inline]
    #[must_use]
    pub fn without(self, mask: u64) -> Self {
        Self::from_value(self.into_value() & !mask)
    }

    /// The compacted array index of the slot named by `mask`: the number of
    /// occupied slots strictly below the mask's highest bit.
    ///
    /// Returns `None` for an empty mask, which names no slot at all.
    #[inline]
    #[must_use]
    pub fn index(self, mask: u64) -> Option<usize> {
        if mask == 0 {
            return None;
        }
        let top = u64::BITS - 1 - mask.leading_zeros();
        let below = (1u64 << top) - 1;
        Some((self.into_value() & below).count_ones() as usize)
    }

    /// The number of occupied slots.
    #[inline]
    #[must_use]
    pub fn len(self) -> usize {
        self.bits.len()
    }

    /// Test whether no slot is occupied.
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.bits.is_empty()
    }

    /// The one-hot masks of the occupied slots, lowest first.
    pub(crate) fn masks(self) -> impl Iterator<Item = u64> {
        let mut rest = self.into_value();
        std::iter::from_fn(move || {
            if rest == 0 {
                return None;
            }
            let mask = rest & rest.wrapping_neg();
            rest &= rest - 1;
            Some(mask)
        })
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmap({:#066b})", self.into_value())
    }
}
