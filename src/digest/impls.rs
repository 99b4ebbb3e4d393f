// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use archery::{SharedPointer, SharedPointerKind};

use super::{fold_ordered, fold_unordered, hash_bytes, StructuralHash, NIL_DIGEST};

// Numbers

macro_rules! impl_le_bytes {
    ($($ty:ty),*) => {
        $(
            impl StructuralHash for $ty {
                #[inline]
                fn structural_hash(&self) -> u64 {
                    hash_bytes(&self.to_le_bytes())
                }
            }
        )*
    };
}

impl_le_bytes!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64);

// Word sized integers hash as their 64 bit counterparts on every platform.
impl StructuralHash for isize {
    #[inline]
    fn structural_hash(&self) -> u64 {
        (*self as i64).structural_hash()
    }
}

impl StructuralHash for usize {
    #[inline]
    fn structural_hash(&self) -> u64 {
        (*self as u64).structural_hash()
    }
}

impl StructuralHash for bool {
    #[inline]
    fn structural_hash(&self) -> u64 {
        (*self as i8).structural_hash()
    }
}

impl StructuralHash for char {
    #[inline]
    fn structural_hash(&self) -> u64 {
        (*self as u32).structural_hash()
    }
}

// Strings

impl StructuralHash for str {
    #[inline]
    fn structural_hash(&self) -> u64 {
        hash_bytes(self.as_bytes())
    }
}

impl StructuralHash for String {
    #[inline]
    fn structural_hash(&self) -> u64 {
        self.as_str().structural_hash()
    }
}

// Time

/// Instants hash as whole seconds since the Unix epoch (`i64`) followed by
/// the nanoseconds into that second (`u32`). Instants before the epoch get
/// negative seconds and a non-negative nanosecond part, so every instant has
/// exactly one encoding.
impl StructuralHash for SystemTime {
    fn structural_hash(&self) -> u64 {
        let (secs, nanos) = match self.duration_since(UNIX_EPOCH) {
            Ok(since) => (since.as_secs() as i64, since.subsec_nanos()),
            Err(err) => {
                let before = err.duration();
                let secs = (before.as_secs() as i64).wrapping_neg();
                match before.subsec_nanos() {
                    0 => (secs, 0),
                    nanos => (secs.wrapping_sub(1), 1_000_000_000 - nanos),
                }
            }
        };
        let mut bytes = [0; 12];
        bytes[..8].copy_from_slice(&secs.to_le_bytes());
        bytes[8..].copy_from_slice(&nanos.to_le_bytes());
        hash_bytes(&bytes)
    }
}

// Wrappers are transparent

macro_rules! impl_transparent {
    ($($ty:ty),*) => {
        $(
            impl<T: StructuralHash + ?Sized> StructuralHash for $ty {
                #[inline]
                fn structural_hash(&self) -> u64 {
                    (**self).structural_hash()
                }
            }
        )*
    };
}

impl_transparent!(&T, &mut T, Box<T>, Rc<T>, Arc<T>);

impl<T, P> StructuralHash for SharedPointer<T, P>
where
    T: StructuralHash,
    P: SharedPointerKind,
{
    #[inline]
    fn structural_hash(&self) -> u64 {
        (**self).structural_hash()
    }
}

impl<'a, B> StructuralHash for Cow<'a, B>
where
    B: StructuralHash + ToOwned + ?Sized,
{
    #[inline]
    fn structural_hash(&self) -> u64 {
        self.as_ref().structural_hash()
    }
}

impl<T: StructuralHash> StructuralHash for Option<T> {
    #[inline]
    fn structural_hash(&self) -> u64 {
        match self {
            None => NIL_DIGEST,
            Some(value) => value.structural_hash(),
        }
    }
}

// Nothing to hash

impl StructuralHash for () {
    #[inline]
    fn structural_hash(&self) -> u64 {
        NIL_DIGEST
    }
}

impl<T: ?Sized> StructuralHash for PhantomData<T> {
    #[inline]
    fn structural_hash(&self) -> u64 {
        NIL_DIGEST
    }
}

/// A wrapper for values with no meaningful structure to hash, such as
/// closures, channels or handles.
///
/// Every `Opaque` hashes to [`NIL_DIGEST`], whatever it holds. Use it to
/// keep such fields in a hashed record; expect them to collide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opaque<T>(pub T);

impl<T> StructuralHash for Opaque<T> {
    #[inline]
    fn structural_hash(&self) -> u64 {
        NIL_DIGEST
    }
}

// Sequences: order matters

impl<T: StructuralHash> StructuralHash for [T] {
    fn structural_hash(&self) -> u64 {
        fold_ordered(self.iter().map(StructuralHash::structural_hash))
    }
}

impl<T: StructuralHash, const N: usize> StructuralHash for [T; N] {
    #[inline]
    fn structural_hash(&self) -> u64 {
        self[..].structural_hash()
    }
}

impl<T: StructuralHash> StructuralHash for Vec<T> {
    #[inline]
    fn structural_hash(&self) -> u64 {
        self.as_slice().structural_hash()
    }
}

impl<T: StructuralHash> StructuralHash for VecDeque<T> {
    fn structural_hash(&self) -> u64 {
        fold_ordered(self.iter().map(StructuralHash::structural_hash))
    }
}

macro_rules! impl_tuple {
    ($($name:ident)+) => {
        impl<$($name: StructuralHash),+> StructuralHash for ($($name,)+) {
            #[allow(non_snake_case)]
            fn structural_hash(&self) -> u64 {
                let ($($name,)+) = self;
                fold_ordered(vec![$($name.structural_hash()),+])
            }
        }
    };
}

impl_tuple!(A);
impl_tuple!(A B);
impl_tuple!(A B C);
impl_tuple!(A B C D);
impl_tuple!(A B C D E);
impl_tuple!(A B C D E F);
impl_tuple!(A B C D E F G);
impl_tuple!(A B C D E F G H);

// Maps and sets: order doesn't matter

impl<K: StructuralHash, V: StructuralHash, S> StructuralHash for HashMap<K, V, S> {
    fn structural_hash(&self) -> u64 {
        fold_unordered(
            self.iter()
                .map(|(key, value)| (key.structural_hash(), value.structural_hash())),
        )
    }
}

impl<K: StructuralHash, V: StructuralHash> StructuralHash for BTreeMap<K, V> {
    fn structural_hash(&self) -> u64 {
        fold_unordered(
            self.iter()
                .map(|(key, value)| (key.structural_hash(), value.structural_hash())),
        )
    }
}

// A set hashes like a map from its members to `()`.
impl<T: StructuralHash, S> StructuralHash for HashSet<T, S> {
    fn structural_hash(&self) -> u64 {
        fold_unordered(self.iter().map(|item| (item.structural_hash(), NIL_DIGEST)))
    }
}

impl<T: StructuralHash> StructuralHash for BTreeSet<T> {
    fn structural_hash(&self) -> u64 {
        fold_unordered(self.iter().map(|item| (item.structural_hash(), NIL_DIGEST)))
    }
}
