// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! # Persistent hash tries keyed on structural digests
//!
//! This library provides a persistent [hash array mapped trie][hamt]
//! together with the hashing it is keyed on.
//!
//! ## The trie
//!
//! A trie is a tree of [`NodeRef`]s. Every update returns a new root and
//! leaves the old one untouched: only the nodes on the path from the root
//! to the changed slot are copied, and everything else is shared between
//! versions. An update which changes nothing returns the very node it was
//! called on, so [`NodeRef::ptr_eq`] tells you whether anything happened.
//!
//! A 64 bit hash is consumed six bits at a time. The six bits at a given
//! *offset* pick one of 64 slots in a branch node, and a [`Bitmap`] records
//! which slots are occupied so that a branch only stores the children it
//! has. Offsets run from `0` to [`MAX_OFFSET`].
//!
//! There are three kinds of node:
//!
//! - a leaf holds one key, one value and the key's hash;
//! - a collision node holds several entries sharing one hash;
//! - a branch holds a bitmap and its children in slot order.
//!
//! The trie never compares keys. Two keys are the same key exactly when
//! their hashes are equal, which is why the hash has to be a good one.
//!
//! ## The hash
//!
//! The [`digest`][digest::digest] function computes a 64 bit FNV-1a based
//! digest from a value's structure and contents. It is independent of
//! memory addresses and platform, so equal values give equal digests
//! across runs and machines. Maps and sets hash the same whatever order
//! their entries are visited in; sequences don't. See the [`digest`]
//! module for the rules.
//!
//! ## Sets
//!
//! [`Set`] wraps a trie into a persistent set keyed on digests. It keeps
//! its length and offers the usual conversions, and cloning it is O(1).
//!
//! ```
//! # #[macro_use] extern crate hamt_digest;
//! # use hamt_digest::Set;
//! # fn main() {
//! let colours = set!["red", "green"];
//! let more = colours.update("blue");
//! assert_eq!(2, colours.len());
//! assert_eq!(3, more.len());
//! assert!(more.contains("blue"));
//! # }
//! ```
//!
//! ## Working with the trie directly
//!
//! ```
//! # use hamt_digest::{digest::digest, shared_ptr::DefaultSharedPtr, NodeRef};
//! let root: NodeRef<&str, i32, DefaultSharedPtr> = NodeRef::leaf(digest("a"), "a", 1);
//! let root = root.set("b", 2, digest("b"), 0);
//! assert_eq!(Some(&2), root.get(digest("b"), 0));
//!
//! let (rest, removed) = root.remove(digest("a"), 0);
//! assert!(removed);
//! let rest = rest.unwrap();
//! assert_eq!(None, rest.get(digest("a"), 0));
//! assert_eq!(Some(&2), rest.get(digest("b"), 0));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! | ------- | ----------- |
//! | [`debug`](https://doc.rust-lang.org/cargo/reference/features.html) | Exposes `NodeRef::assert_invariants` for checking trie structure |
//! | [`proptest`](https://crates.io/crates/proptest) | Strategies for [`Set`] in the [`proptest`](crate::proptest) module |
//! | [`quickcheck`](https://crates.io/crates/quickcheck) | [`quickcheck::Arbitrary`](https://docs.rs/quickcheck/latest/quickcheck/trait.Arbitrary.html) implementation for [`Set`] |
//! | [`arbitrary`](https://crates.io/crates/arbitrary/) | [`arbitrary::Arbitrary`](https://docs.rs/arbitrary/latest/arbitrary/trait.Arbitrary.html) implementation for [`Set`] |
//!
//! [hamt]: https://en.wikipedia.org/wiki/Hash_array_mapped_trie

#![forbid(rust_2018_idioms)]
#![deny(nonstandard_style)]

#[macro_use]
mod util;

mod config;
pub mod digest;
pub mod nodes;
pub mod set;
pub mod shared_ptr;

#[cfg(any(test, feature = "proptest"))]
pub mod proptest;

#[cfg(feature = "arbitrary")]
#[doc(hidden)]
pub mod arbitrary;

#[cfg(feature = "quickcheck")]
#[doc(hidden)]
pub mod quickcheck;


pub use crate::config::MAX_OFFSET;
pub use crate::digest::{digest, StructuralHash};
pub use crate::nodes::bitmap::Bitmap;
pub use crate::nodes::hamt::{Entry, Node, NodeRef};
pub use crate::set::{GenericSet, Set};
