//! About shared pointers. Re-export the [`archery`] crate.
//!
//! Every trie node lives behind a [`SharedPointer`], so untouched subtrees
//! can be aliased between versions of a trie. The pointer kind is a type
//! parameter: [`ArcK`] for tries that cross threads, [`RcK`] for tries that
//! don't.
//!
//! [`archery`]: https://docs.rs/archery/latest/

pub use archery::{ArcK, RcK, SharedPointer, SharedPointerKind};

/// Default shared pointer used by the tries and sets in this crate.
///
/// [`ArcK`]: https://docs.rs/archery/latest/archery/shared_pointer/kind/struct.ArcK.html
pub type DefaultSharedPtr = ArcK;

#[cfg(feature = "triomphe")]
pub use archery::ArcTK;
