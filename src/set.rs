// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A persistent set keyed on structural digests.
//!
//! A [`Set`] stores its values in a [hash array mapped trie][1] keyed on
//! each value's [`digest`][crate::digest::digest]. Updates copy only the
//! path to the changed slot and share the rest with the previous version,
//! so cloning is O(1) and old versions stay valid.
//!
//! Two values are the same member exactly when their digests are equal;
//! `Eq` and `Hash` play no part. Inserting a value whose digest is already
//! present replaces the stored value.
//!
//! Values come out in slot order, which follows the bits of each digest.
//! It's stable for a given set of values but unrelated to insertion order.
//!
//! [1]: https://en.wikipedia.org/wiki/Hash_array_mapped_trie

use std::borrow::Borrow;
use std::fmt::{Debug, Error, Formatter};
use std::iter::{FromIterator, FusedIterator};

use archery::SharedPointerKind;

use crate::digest::{digest, fold_unordered, StructuralHash, NIL_DIGEST};
use crate::nodes::hamt::{Iter as NodeIter, NodeRef};
use crate::shared_ptr::DefaultSharedPtr;

/// Construct a set from a sequence of values.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate hamt_digest;
/// # use hamt_digest::Set;
/// # fn main() {
/// assert_eq!(
///   set![1, 2, 3],
///   Set::from(vec![1, 2, 3])
/// );
/// # }
/// ```
#[macro_export]
macro_rules! set {
    () => { $crate::set::Set::new() };

    ( $($x:expr),* ) => {{
        let mut l = $crate::set::Set::new();
        $(
            l.insert($x);
        )*
            l
    }};

    ( $($x:expr ,)* ) => {{
        let mut l = $crate::set::Set::new();
        $(
            l.insert($x);
        )*
            l
    }};
}

/// Type alias for [`GenericSet`] that uses [`DefaultSharedPtr`] as the
/// pointer type.
pub type Set<A> = GenericSet<A, DefaultSharedPtr>;

/// A persistent set keyed on structural digests.
///
/// See the [module documentation][crate::set] for how membership works.
pub struct GenericSet<A, P: SharedPointerKind> {
    root: Option<NodeRef<A, (), P>>,
    size: usize,
}

impl<A, P: SharedPointerKind> GenericSet<A, P> {
    /// Construct an empty set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        GenericSet {
            root: None,
            size: 0,
        }
    }

    /// Test whether a set is empty.
    ///
    /// Time: O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate hamt_digest;
    /// # use hamt_digest::Set;
    /// assert!(
    ///   !set![1, 2, 3].is_empty()
    /// );
    /// assert!(
    ///   Set::<i32>::new().is_empty()
    /// );
    /// ```
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the size of a set.
    ///
    /// Time: O(1)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Test whether two sets refer to the same content in memory.
    ///
    /// This is true for a set and its clones until either side changes, and
    /// for two empty sets.
    ///
    /// Time: O(1)
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Get the root node of the set's trie, if it has any values.
    #[must_use]
    pub fn root(&self) -> Option<&NodeRef<A, (), P>> {
        self.root.as_ref()
    }

    /// Discard all elements from the set.
    pub fn clear(&mut self) {
        self.root = None;
        self.size = 0;
    }

    /// Get an iterator over the values in a set, in slot order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, A, P> {
        Iter {
            it: match &self.root {
                Some(root) => NodeIter::new(root),
                None => NodeIter::empty(),
            },
            remaining: self.size,
        }
    }
}

impl<A, P> GenericSet<A, P>
where
    A: StructuralHash,
    P: SharedPointerKind,
{
    /// Test if a value is part of a set.
    ///
    /// The query is any borrowed form of the element type with the same
    /// digest, so a `Set<String>` can be queried with a `&str`.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate hamt_digest;
    /// # use hamt_digest::Set;
    /// let set: Set<String> = set!["alpha".to_string()];
    /// assert!(set.contains("alpha"));
    /// assert!(!set.contains("beta"));
    /// ```
    #[must_use]
    pub fn contains<BA>(&self, a: &BA) -> bool
    where
        BA: StructuralHash + ?Sized,
        A: Borrow<BA>,
    {
        match &self.root {
            Some(root) => root.get(digest(a), 0).is_some(),
            None => false,
        }
    }

    /// Get the stored member with the same digest as `a`.
    #[must_use]
    pub fn get<BA>(&self, a: &BA) -> Option<&A>
    where
        BA: StructuralHash + ?Sized,
        A: Borrow<BA>,
    {
        self.root
            .as_ref()
            .and_then(|root| root.get_entry(digest(a), 0))
            .map(|(key, _)| key)
    }
}

impl<A, P> GenericSet<A, P>
where
    A: StructuralHash + Clone,
    P: SharedPointerKind,
{
    /// Construct a set with a single value.
    #[inline]
    #[must_use]
    pub fn unit(a: A) -> Self {
        GenericSet::new().update(a)
    }

    /// Insert a value into a set.
    ///
    /// Returns `true` if no member had the value's digest before. Otherwise
    /// the stored member is replaced and the length is unchanged.
    ///
    /// Time: O(log n)
    pub fn insert(&mut self, a: A) -> bool {
        let hash = digest(&a);
        match &self.root {
            None => {
                self.root = Some(NodeRef::leaf(hash, a, ()));
                self.size = 1;
                true
            }
            Some(root) => {
                let added = root.get(hash, 0).is_none();
                self.root = Some(root.set(a, (), hash, 0));
                if added {
                    self.size += 1;
                }
                added
            }
        }
    }

    /// Remove a value from a set if it exists.
    ///
    /// Returns `true` if a member was removed. When nothing was removed the
    /// set keeps its root, so it stays [`ptr_eq`][GenericSet::ptr_eq] to its
    /// clones.
    ///
    /// Time: O(log n)
    pub fn remove<BA>(&mut self, a: &BA) -> bool
    where
        BA: StructuralHash + ?Sized,
        A: Borrow<BA>,
    {
        let (root, removed) = match &self.root {
            Some(root) => root.remove(digest(a), 0),
            None => return false,
        };
        if removed {
            self.root = root;
            self.size -= 1;
        }
        removed
    }

    /// Construct a new set from the current set with the given value
    /// added.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate hamt_digest;
    /// # use hamt_digest::Set;
    /// let set = set![123];
    /// assert_eq!(
    ///   set.update(456),
    ///   set![123, 456]
    /// );
    /// assert_eq!(1, set.len());
    /// ```
    #[must_use]
    pub fn update(&self, a: A) -> Self {
        let mut out = self.clone();
        out.insert(a);
        out
    }

    /// Construct a new set with the given value removed if it's in
    /// the set.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn without<BA>(&self, a: &BA) -> Self
    where
        BA: StructuralHash + ?Sized,
        A: Borrow<BA>,
    {
        let mut out = self.clone();
        out.remove(a);
        out
    }

    /// Copy the values of a set into a vector, in slot order.
    ///
    /// Time: O(n)
    #[must_use]
    pub fn to_vec(&self) -> Vec<A> {
        match &self.root {
            Some(root) => root.flatten().into_iter().map(|entry| entry.key).collect(),
            None => Vec::new(),
        }
    }
}

// Core traits

impl<A, P: SharedPointerKind> Clone for GenericSet<A, P> {
    /// Clone a set.
    ///
    /// Time: O(1)
    #[inline]
    fn clone(&self) -> Self {
        GenericSet {
            root: self.root.clone(),
            size: self.size,
        }
    }
}

impl<A, P: SharedPointerKind> Default for GenericSet<A, P> {
    fn default() -> Self {
        GenericSet::new()
    }
}

impl<A, P1, P2> PartialEq<GenericSet<A, P2>> for GenericSet<A, P1>
where
    A: StructuralHash,
    P1: SharedPointerKind,
    P2: SharedPointerKind,
{
    fn eq(&self, other: &GenericSet<A, P2>) -> bool {
        self.len() == other.len() && self.iter().all(|value| other.contains(value))
    }
}

impl<A: StructuralHash, P: SharedPointerKind> Eq for GenericSet<A, P> {}

/// A set hashes like any other set: the XOR of its members' digests each
/// combined with the digest of `()`.
impl<A: StructuralHash, P: SharedPointerKind> StructuralHash for GenericSet<A, P> {
    fn structural_hash(&self) -> u64 {
        fold_unordered(self.iter().map(|value| (digest(value), NIL_DIGEST)))
    }
}

impl<A, R, P> Extend<R> for GenericSet<A, P>
where
    A: StructuralHash + Clone + From<R>,
    P: SharedPointerKind,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = R>,
    {
        for value in iter {
            self.insert(From::from(value));
        }
    }
}

impl<A, P> Debug for GenericSet<A, P>
where
    A: Debug,
    P: SharedPointerKind,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        f.debug_set().entries(self.iter()).finish()
    }
}

// Iterators

/// An iterator over the elements of a set.
pub struct Iter<'a, A, P: SharedPointerKind> {
    it: NodeIter<'a, A, (), P>,
    remaining: usize,
}

// We impl Clone instead of deriving it, because we want Clone even if A isn't.
impl<'a, A, P: SharedPointerKind> Clone for Iter<'a, A, P> {
    fn clone(&self) -> Self {
        Iter {
            it: self.it.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, A, P> Iterator for Iter<'a, A, P>
where
    A: 'a,
    P: SharedPointerKind,
{
    type Item = &'a A;

    fn next(&mut self) -> Option<Self::Item> {
        let (value, _) = self.it.next()?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, A, P: SharedPointerKind> ExactSizeIterator for Iter<'a, A, P> {}

impl<'a, A, P: SharedPointerKind> FusedIterator for Iter<'a, A, P> {}

impl<A, RA, P> FromIterator<RA> for GenericSet<A, P>
where
    A: StructuralHash + Clone + From<RA>,
    P: SharedPointerKind,
{
    fn from_iter<T>(i: T) -> Self
    where
        T: IntoIterator<Item = RA>,
    {
        let mut set = Self::default();
        set.extend(i);
        set
    }
}

impl<'a, A, P> IntoIterator for &'a GenericSet<A, P>
where
    A: 'a,
    P: SharedPointerKind,
{
    type Item = &'a A;
    type IntoIter = Iter<'a, A, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Conversions

impl<A, const N: usize, P> From<[A; N]> for GenericSet<A, P>
where
    A: StructuralHash + Clone,
    P: SharedPointerKind,
{
    fn from(arr: [A; N]) -> Self {
        IntoIterator::into_iter(arr).collect()
    }
}

impl<'a, A, P> From<&'a [A]> for GenericSet<A, P>
where
    A: StructuralHash + Clone,
    P: SharedPointerKind,
{
    fn from(slice: &'a [A]) -> Self {
        slice.iter().cloned().collect()
    }
}

impl<A, P> From<Vec<A>> for GenericSet<A, P>
where
    A: StructuralHash + Clone,
    P: SharedPointerKind,
{
    fn from(vec: Vec<A>) -> Self {
        vec.into_iter().collect()
    }
}

impl<A, P> From<&Vec<A>> for GenericSet<A, P>
where
    A: StructuralHash + Clone,
    P: SharedPointerKind,
{
    fn from(vec: &Vec<A>) -> Self {
        vec.iter().cloned().collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::proptest::set;
    use crate::shared_ptr::RcK;
    use ::proptest::{collection, num::i16, prelude::any, proptest};
    use pretty_assertions::assert_eq;
    use proptest_derive::Arbitrary;
    use rand::{rngs::SmallRng, Rng, SeedableRng};
    use static_assertions::{assert_impl_all, assert_not_impl_any};
    use std::collections::{self, HashSet};

    assert_impl_all!(Set<i32>: Send, Sync);
    assert_not_impl_any!(GenericSet<i32, RcK>: Send, Sync);
    assert_covariant!(Set<T> in T);

    #[test]
    fn empty_set_has_no_root() {
        let set: Set<i32> = Set::new();
        assert!(set.root().is_none());
        assert!(set.is_empty());
        assert!(!set.contains(&1));
        assert_eq!(0, set.iter().count());
        assert!(set.to_vec().is_empty());
    }

    #[test]
    fn first_insert_installs_a_leaf() {
        let set = Set::unit("hello");
        let root = set.root().expect("a root after insert");
        let leaf = root.as_leaf().expect("a leaf root");
        assert_eq!(digest("hello"), leaf.hash());
        assert_eq!(&"hello", leaf.key());
    }

    #[test]
    fn removing_the_last_value_drops_the_root() {
        let mut set = set![1, 2];
        assert!(set.remove(&1));
        assert!(set.root().is_some());
        assert!(set.remove(&2));
        assert!(set.root().is_none());
        assert!(set.is_empty());
        assert!(!set.remove(&2));
    }

    #[test]
    fn insert_reports_new_members() {
        let mut set = Set::new();
        assert!(set.insert(5));
        assert!(!set.insert(5));
        assert!(set.insert(6));
        assert_eq!(2, set.len());
    }

    #[test]
    fn update_leaves_the_original_alone() {
        let one = set![1];
        let two = one.update(2);
        let none = two.without(&1).without(&2);
        assert_eq!(vec![1], one.to_vec());
        assert_eq!(2, two.len());
        assert!(two.contains(&1) && two.contains(&2));
        assert!(none.is_empty());
        assert_eq!(2, two.len());
    }

    #[test]
    fn removing_an_absent_value_keeps_sharing() {
        let set = set!["a", "b", "c"];
        let mut copy = set.clone();
        assert!(set.ptr_eq(&copy));
        assert!(!copy.remove("z"));
        assert!(set.ptr_eq(&copy));
        assert!(copy.remove("a"));
        assert!(!set.ptr_eq(&copy));
    }

    #[test]
    fn match_strings_with_string_slices() {
        let mut set: Set<String> = set!["foo".to_string(), "bar".to_string()];
        set = set.without("bar");
        assert!(!set.contains("bar"));
        assert_eq!(Some(&"foo".to_string()), set.get("foo"));
        set.remove("foo");
        assert!(!set.contains("foo"));
    }

    #[test]
    fn macro_allows_trailing_comma() {
        let set1 = set! {"foo", "bar"};
        let set2 = set! {
            "foo",
            "bar",
        };
        assert_eq!(set1, set2);
    }

    #[test]
    fn conversions() {
        let from_vec: Set<i32> = Set::from(vec![3, 1, 2, 1]);
        let from_slice: Set<i32> = Set::from(&[1, 2, 3][..]);
        let from_array: Set<i32> = Set::from([2, 3, 1]);
        let collected: Set<i32> = (1..=3).collect();
        assert_eq!(3, from_vec.len());
        assert_eq!(from_vec, from_slice);
        assert_eq!(from_vec, from_array);
        assert_eq!(from_vec, collected);
        assert_ne!(from_vec, from_vec.update(4));
    }

    #[test]
    fn equality_ignores_pointer_kind() {
        let arc: Set<i32> = set![1, 2, 3];
        let rc: GenericSet<i32, RcK> = vec![3, 2, 1].into_iter().collect();
        assert!(arc == rc);
    }

    #[test]
    fn proper_formatting() {
        assert_eq!("{1}", format!("{:?}", set![1]));
        assert_eq!("{}", format!("{:?}", Set::<i32>::new()));
    }

    #[test]
    fn digest_matches_std_sets() {
        let set: Set<&str> = set!["x", "y", "z"];
        let std: HashSet<&str> = vec!["z", "y", "x"].into_iter().collect();
        assert_eq!(digest(&std), digest(&set));
        assert_eq!(0, digest(&Set::<i32>::new()));
    }

    #[test]
    fn iteration_follows_slot_order() {
        let set: Set<i32> = (0..200).collect();
        let iterated: Vec<i32> = set.iter().cloned().collect();
        assert_eq!(set.to_vec(), iterated);
        assert_eq!(200, set.iter().len());
        let mut sorted = iterated;
        sorted.sort_unstable();
        assert_eq!((0..200).collect::<Vec<_>>(), sorted);
    }

    #[test]
    fn random_inserts_and_removes() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut set: Set<u32> = Set::new();
        let mut nat = HashSet::new();
        for _ in 0..10_000 {
            let value = rng.random_range(0..2_000);
            if rng.random_bool(0.4) {
                assert_eq!(nat.remove(&value), set.remove(&value));
            } else {
                assert_eq!(nat.insert(value), set.insert(value));
            }
            assert_eq!(nat.len(), set.len());
        }
        if let Some(root) = set.root() {
            root.assert_invariants();
        }
        let values: collections::HashSet<u32> = set.iter().cloned().collect();
        assert_eq!(nat, values);
    }

    #[test]
    fn safe_mutation() {
        let v1: Set<usize> = (0..10_000usize).collect();
        let mut v2 = v1.clone();
        v2.remove(&5_000);
        v2.insert(20_000);
        assert!(v1.contains(&5_000));
        assert!(!v1.contains(&20_000));
        assert!(!v2.contains(&5_000));
        assert_eq!(v1.len(), v2.len());
    }

    #[test]
    fn untyped_literals_take_the_element_type() {
        let mut set: Set<u64> = Set::new();
        set.insert(7u64);
        assert!(set.contains(&7));
        assert_eq!(Some(&7), set.get(&7));
        assert_eq!(0, set.without(&7).len());
        assert!(set.remove(&7));
        assert!(set.is_empty());

        let wide: Set<usize> = set![1, 2, 3];
        assert!(wide.contains(&2));
        assert!(!wide.contains(&4));
    }

    #[derive(Arbitrary, Debug, Clone)]
    enum Action {
        Insert(i16),
        Remove(i16),
    }

    proptest! {
        #[test]
        fn proptest_a_set(ref s in set(".*", 10..100)) {
            assert!(s.len() < 100);
            assert!(s.len() >= 10);
        }

        #[test]
        fn behaves_like_std(ref actions in collection::vec(any::<Action>(), 0..300)) {
            let mut set: Set<i16> = Set::new();
            let mut nat = collections::HashSet::new();
            for action in actions {
                match action {
                    Action::Insert(value) => {
                        assert_eq!(nat.insert(*value), set.insert(*value));
                    }
                    Action::Remove(value) => {
                        assert_eq!(nat.remove(value), set.remove(value));
                    }
                }
                assert_eq!(nat.len(), set.len());
            }
            for value in &nat {
                assert!(set.contains(value));
            }
            let values: collections::HashSet<i16> = set.iter().cloned().collect();
            assert_eq!(nat, values);
        }

        #[test]
        fn versions_are_independent(ref values in collection::vec(i16::ANY, 1..200)) {
            let full: Set<i16> = values.iter().cloned().collect();
            let mut shrinking = full.clone();
            for value in values {
                shrinking.remove(value);
            }
            assert!(shrinking.is_empty());
            for value in values {
                assert!(full.contains(value));
            }
        }
    }
}
