// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Structural hashing.
//!
//! [`digest`] turns a value into the 64 bit hash the trie is keyed on. The
//! digest depends only on a value's structure and contents, never on memory
//! addresses, the platform's word size or byte order, so equal values hash
//! equally everywhere.
//!
//! The rules, all built on FNV-1a:
//!
//! - numbers are hashed as their little-endian bytes, with `isize` and
//!   `usize` widened to 64 bits and `bool` hashed as one byte;
//! - strings are hashed as their UTF-8 bytes;
//! - references, boxes and shared pointers are looked through, and `None`
//!   hashes to [`NIL_DIGEST`];
//! - sequences fold their elements' digests with [`combine_ordered`], so
//!   order matters;
//! - maps and sets combine each key with its value and XOR the results, so
//!   order doesn't;
//! - records XOR their type name's digest with one combined digest per
//!   public field (see [`RecordDigest`] and [`structural_record!`]).
//!
//! A type that knows better can compute its own digest, either by
//! implementing [`StructuralHash`] directly or through the fallible
//! [`Hashable`] hook.
//!
//! [`structural_record!`]: crate::structural_record

use std::hash::Hasher;

use fnv::FnvHasher;
use thiserror::Error;

mod impls;
mod record;

pub use self::impls::Opaque;
pub use self::record::RecordDigest;

/// The digest of nothing: FNV-1a over zero bytes.
///
/// `None`, unit, empty records and [`Opaque`] values all hash to this.
pub const NIL_DIGEST: u64 = 0xcbf2_9ce4_8422_2325;

/// A value with a structural 64 bit digest.
pub trait StructuralHash {
    fn structural_hash(&self) -> u64;
}

/// Compute the structural digest of a value.
///
/// Never fails: values with nothing to hash get [`NIL_DIGEST`].
///
/// # Examples
///
/// ```
/// # use hamt_digest::digest::digest;
/// # use std::collections::HashMap;
/// assert_ne!(digest(&[1, 2, 3]), digest(&[3, 2, 1]));
///
/// let left: HashMap<&str, i32> = vec![("a", 1), ("b", 2)].into_iter().collect();
/// let right: HashMap<&str, i32> = vec![("b", 2), ("a", 1)].into_iter().collect();
/// assert_eq!(digest(&left), digest(&right));
/// ```
#[inline]
#[must_use]
pub fn digest<T: StructuralHash + ?Sized>(value: &T) -> u64 {
    value.structural_hash()
}

/// Combine two digests so that `combine_ordered(a, b)` and
/// `combine_ordered(b, a)` differ.
#[inline]
#[must_use]
pub fn combine_ordered(first: u64, second: u64) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(&first.to_le_bytes());
    hasher.write(&second.to_le_bytes());
    hasher.finish()
}

/// FNV-1a over a byte string, from a fresh accumulator.
#[inline]
pub(crate) fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(bytes);
    hasher.finish()
}

/// Fold digests in order. An empty sequence folds to `0`.
pub(crate) fn fold_ordered<I: IntoIterator<Item = u64>>(digests: I) -> u64 {
    digests.into_iter().fold(0, combine_ordered)
}

/// Combine key and value digests pairwise and XOR the pairs together.
pub(crate) fn fold_unordered<I: IntoIterator<Item = (u64, u64)>>(pairs: I) -> u64 {
    pairs
        .into_iter()
        .fold(0, |acc, (key, value)| acc ^ combine_ordered(key, value))
}

/// An error from a type computing its own digest.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DigestError {
    #[error("value cannot be encoded for hashing: {0}")]
    Encoding(String),
    #[error("digest unavailable: {0}")]
    Unavailable(String),
}

/// A type that computes its own digest, bypassing the structural rules.
///
/// Hook a `Hashable` type into [`digest`] with
/// [`structural_hash_via!`][crate::structural_hash_via]. A failed digest
/// hashes as `0` in its own position only. Sequences, maps and records
/// holding it keep folding around that `0`, so hashing as a whole never
/// fails.
pub trait Hashable {
    fn digest(&self) -> Result<u64, DigestError>;
}

/// Implement [`StructuralHash`] for types implementing [`Hashable`].
///
/// # Examples
///
/// ```
/// # use hamt_digest::digest::{digest, DigestError, Hashable};
/// # use hamt_digest::structural_hash_via;
/// struct Ticket(u64);
///
/// impl Hashable for Ticket {
///     fn digest(&self) -> Result<u64, DigestError> {
///         Ok(self.0)
///     }
/// }
///
/// structural_hash_via!(Ticket);
///
/// assert_eq!(1234, digest(&Ticket(1234)));
/// ```
#[macro_export]
macro_rules! structural_hash_via {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::digest::StructuralHash for $ty {
                fn structural_hash(&self) -> u64 {
                    $crate::digest::Hashable::digest(self).unwrap_or(0)
                }
            }
        )+
    };
}
