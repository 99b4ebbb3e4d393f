// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Persistent hash array mapped trie nodes.
//!
//! A trie is a tree of [`Node`]s reached through [`NodeRef`] handles. Nodes
//! are never modified once built: [`set`][NodeRef::set] and
//! [`remove`][NodeRef::remove] build new nodes along the path to the changed
//! slot and alias every other subtree, so old and new roots share all the
//! structure the change didn't touch.
//!
//! Callers hash a key once and pass the same hash at every call. Each level
//! of the trie consumes six bits of it, starting from the least significant
//! bits at `offset` 0.

use std::fmt;
use std::iter::FusedIterator;
use std::ops::Deref;
use std::slice::Iter as SliceIter;

use archery::{SharedPointer, SharedPointerKind};

use crate::nodes::bitmap::Bitmap;
use crate::util::{insert_at, remove_at, replace_at};

/// A key and value pair pulled out of a trie by [`NodeRef::flatten`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Entry<K, V> {
    #[inline]
    #[must_use]
    pub fn new(key: K, value: V) -> Self {
        Entry { key, value }
    }
}

impl<K, V> From<(K, V)> for Entry<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Entry { key, value }
    }
}

/// A trie node.
///
/// The set of variants is closed: a [`Leaf`][Node::Leaf] holds one entry, a
/// [`Collision`][Node::Collision] holds entries whose hashes are identical,
/// and a [`Branch`][Node::Branch] fans out to up to 64 children.
pub enum Node<K, V, P: SharedPointerKind> {
    Leaf(LeafNode<K, V>),
    Collision(CollisionNode<K, V>),
    Branch(BranchNode<K, V, P>),
}

/// A terminal node holding a single hash, key and value.
pub struct LeafNode<K, V> {
    hash: u64,
    key: K,
    value: V,
}

/// A terminal node for entries that share their entire hash.
///
/// Lookups only ever see the first entry; see [`NodeRef::get`].
pub struct CollisionNode<K, V> {
    hash: u64,
    entries: Vec<Entry<K, V>>,
}

/// An internal node: a bitmap of occupied slots and one child per set bit,
/// ordered by ascending slot.
pub struct BranchNode<K, V, P: SharedPointerKind> {
    bitmap: Bitmap,
    children: Vec<NodeRef<K, V, P>>,
}

/// A shared handle to a trie node.
///
/// Cloning a `NodeRef` clones the pointer, not the node. Two handles are
/// the same node when [`ptr_eq`][NodeRef::ptr_eq] says so, which is how an
/// operation that changed nothing reports it: it hands back the node it
/// was called on.
pub struct NodeRef<K, V, P: SharedPointerKind> {
    ptr: SharedPointer<Node<K, V, P>, P>,
}

// We impl Clone instead of deriving it, because we want Clone even if K and V aren't.
impl<K, V, P: SharedPointerKind> Clone for NodeRef<K, V, P> {
    fn clone(&self) -> Self {
        NodeRef {
            ptr: self.ptr.clone(),
        }
    }
}

impl<K, V, P: SharedPointerKind> Deref for NodeRef<K, V, P> {
    type Target = Node<K, V, P>;

    fn deref(&self) -> &Self::Target {
        &self.ptr
    }
}

impl<K, V, P: SharedPointerKind> From<Node<K, V, P>> for NodeRef<K, V, P> {
    fn from(node: Node<K, V, P>) -> Self {
        NodeRef {
            ptr: SharedPointer::new(node),
        }
    }
}

impl<K, V, P: SharedPointerKind> NodeRef<K, V, P> {
    /// Construct a leaf node.
    #[must_use]
    pub fn leaf(hash: u64, key: K, value: V) -> Self {
        Node::Leaf(LeafNode { hash, key, value }).into()
    }

    /// Construct a collision node.
    ///
    /// Every entry is taken to have the hash `hash`.
    #[must_use]
    pub fn collision(hash: u64, entries: Vec<Entry<K, V>>) -> Self {
        Node::Collision(CollisionNode { hash, entries }).into()
    }

    /// Construct a branch node.
    ///
    /// # Panics
    ///
    /// Panics unless there is exactly one child per bit set in `bitmap`.
    #[must_use]
    pub fn branch(bitmap: Bitmap, children: Vec<NodeRef<K, V, P>>) -> Self {
        assert_eq!(
            bitmap.len(),
            children.len(),
            "NodeRef::branch: bitmap and children disagree"
        );
        Node::Branch(BranchNode { bitmap, children }).into()
    }

    /// Test whether two handles point at the same node.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        SharedPointer::ptr_eq(&self.ptr, &other.ptr)
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&LeafNode<K, V>> {
        match &**self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_collision(&self) -> Option<&CollisionNode<K, V>> {
        match &**self {
            Node::Collision(coll) => Some(coll),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_branch(&self) -> Option<&BranchNode<K, V, P>> {
        match &**self {
            Node::Branch(branch) => Some(branch),
            _ => None,
        }
    }

    /// The key of a leaf, or of the first entry of a collision node.
    /// Branches have no key of their own.
    #[must_use]
    pub fn key(&self) -> Option<&K> {
        match &**self {
            Node::Leaf(leaf) => Some(&leaf.key),
            Node::Collision(coll) => coll.entries.first().map(|entry| &entry.key),
            Node::Branch(_) => None,
        }
    }

    /// The value of a leaf, or of the first entry of a collision node.
    /// Branches have no value of their own.
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        match &**self {
            Node::Leaf(leaf) => Some(&leaf.value),
            Node::Collision(coll) => coll.entries.first().map(|entry| &entry.value),
            Node::Branch(_) => None,
        }
    }

    /// Look up the value stored under `hash`.
    ///
    /// Keys are never compared: a stored entry whose hash equals `hash` is a
    /// match. A collision node answers with its first entry whatever key the
    /// caller had in mind.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn get(&self, hash: u64, offset: usize) -> Option<&V> {
        match &**self {
            Node::Leaf(leaf) => leaf.get(hash),
            Node::Collision(coll) => coll.get(hash),
            Node::Branch(branch) => branch.get(hash, offset),
        }
    }

    /// Look up the whole entry stored under `hash`.
    #[must_use]
    pub fn get_entry(&self, hash: u64, offset: usize) -> Option<(&K, &V)> {
        match &**self {
            Node::Leaf(leaf) if leaf.hash == hash => Some((&leaf.key, &leaf.value)),
            Node::Leaf(_) => None,
            Node::Collision(coll) if coll.hash == hash => {
                coll.entries.first().map(|entry| (&entry.key, &entry.value))
            }
            Node::Collision(_) => None,
            Node::Branch(branch) => {
                let mask = Bitmap::position(hash, offset);
                if !branch.bitmap.has(mask) {
                    return None;
                }
                branch.children[branch.slot(mask)].get_entry(hash, offset + 1)
            }
        }
    }

    /// Iterate over the entries below this node, in slot order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        Iter::new(self)
    }

    /// Count the entries below this node.
    ///
    /// Time: O(n)
    #[must_use]
    pub fn count(&self) -> usize {
        match &**self {
            Node::Leaf(_) => 1,
            Node::Collision(coll) => coll.entries.len(),
            Node::Branch(branch) => branch.children.iter().map(NodeRef::count).sum(),
        }
    }
}

impl<K, V, P> NodeRef<K, V, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    /// Construct a new trie from this one with `key` and `value` stored
    /// under `hash`.
    ///
    /// An entry already stored under `hash` is replaced. Only the nodes on
    /// the path to the changed slot are rebuilt.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn set(&self, key: K, value: V, hash: u64, offset: usize) -> Self {
        match &**self {
            Node::Leaf(leaf) => leaf.set(self, key, value, hash, offset),
            Node::Collision(coll) => coll.set(key, value, hash),
            Node::Branch(branch) => branch.set(self, key, value, hash, offset),
        }
    }

    /// Construct a new trie from this one without the entry stored under
    /// `hash`.
    ///
    /// Returns the new root, or `None` if nothing is left, and whether
    /// anything was removed. When nothing was removed the root is this very
    /// node.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn remove(&self, hash: u64, offset: usize) -> (Option<Self>, bool) {
        match &**self {
            Node::Leaf(leaf) => {
                if leaf.hash == hash {
                    (None, true)
                } else {
                    (Some(self.clone()), false)
                }
            }
            Node::Collision(coll) => coll.remove(self, hash),
            Node::Branch(branch) => branch.remove(self, hash, offset),
        }
    }

    /// Copy every entry below this node into a vector, in slot order.
    ///
    /// Slot order follows the bits of each key's hash, not insertion or key
    /// order.
    ///
    /// Time: O(n)
    #[must_use]
    pub fn flatten(&self) -> Vec<Entry<K, V>> {
        match &**self {
            Node::Leaf(leaf) => vec![Entry::new(leaf.key.clone(), leaf.value.clone())],
            Node::Collision(coll) => coll.entries.clone(),
            Node::Branch(branch) => branch.children.iter().flat_map(NodeRef::flatten).collect(),
        }
    }
}

impl<K, V> LeafNode<K, V> {
    #[inline]
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    fn get(&self, hash: u64) -> Option<&V> {
        if self.hash == hash {
            Some(&self.value)
        } else {
            None
        }
    }

    fn set<P>(
        &self,
        this: &NodeRef<K, V, P>,
        key: K,
        value: V,
        hash: u64,
        offset: usize,
    ) -> NodeRef<K, V, P>
    where
        K: Clone,
        V: Clone,
        P: SharedPointerKind,
    {
        if self.hash == hash {
            return NodeRef::leaf(hash, key, value);
        }
        let existing = Bitmap::position(self.hash, offset);
        let incoming = Bitmap::position(hash, offset);
        let bitmap = Bitmap::new().next(existing);
        if existing == incoming {
            // Both hashes land in the same slot here; split them one level down.
            let child = self.set(this, key, value, hash, offset + 1);
            NodeRef::branch(bitmap, vec![child])
        } else {
            NodeRef::branch(bitmap, vec![this.clone()]).set(key, value, hash, offset)
        }
    }
}

impl<K, V> CollisionNode<K, V> {
    #[inline]
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[Entry<K, V>] {
        &self.entries
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, hash: u64) -> Option<&V> {
        if self.hash != hash {
            return None;
        }
        self.entries.first().map(|entry| &entry.value)
    }

    fn set<P>(&self, key: K, value: V, hash: u64) -> NodeRef<K, V, P>
    where
        K: Clone,
        V: Clone,
        P: SharedPointerKind,
    {
        if self.hash != hash {
            // Collision nodes sit at the bottom of the trie and can't branch.
            return NodeRef::leaf(hash, key, value);
        }
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.extend_from_slice(&self.entries);
        entries.push(Entry::new(key, value));
        NodeRef::collision(hash, entries)
    }

    fn remove<P>(&self, this: &NodeRef<K, V, P>, hash: u64) -> (Option<NodeRef<K, V, P>>, bool)
    where
        K: Clone,
        V: Clone,
        P: SharedPointerKind,
    {
        if self.hash != hash || self.entries.is_empty() {
            return (Some(this.clone()), false);
        }
        match &self.entries[1..] {
            [] => (None, true),
            [last] => (
                Some(NodeRef::leaf(
                    self.hash,
                    last.key.clone(),
                    last.value.clone(),
                )),
                true,
            ),
            rest => (Some(NodeRef::collision(self.hash, rest.to_vec())), true),
        }
    }
}

impl<K, V, P: SharedPointerKind> BranchNode<K, V, P> {
    #[inline]
    #[must_use]
    pub fn bitmap(&self) -> Bitmap {
        self.bitmap
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeRef<K, V, P>] {
        &self.children
    }

    #[inline]
    fn slot(&self, mask: u64) -> usize {
        self.bitmap
            .index(mask)
            .expect("nodes::hamt::BranchNode::slot: empty position mask")
    }

    fn get(&self, hash: u64, offset: usize) -> Option<&V> {
        let mask = Bitmap::position(hash, offset);
        if !self.bitmap.has(mask) {
            return None;
        }
        self.children[self.slot(mask)].get(hash, offset + 1)
    }
}

impl<K, V, P> BranchNode<K, V, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    fn set(
        &self,
        this: &NodeRef<K, V, P>,
        key: K,
        value: V,
        hash: u64,
        offset: usize,
    ) -> NodeRef<K, V, P> {
        let mask = Bitmap::position(hash, offset);
        let index = self.slot(mask);
        if self.bitmap.has(mask) {
            let target = &self.children[index];
            let next = target.set(key, value, hash, offset + 1);
            if next.ptr_eq(target) {
                return this.clone();
            }
            NodeRef::branch(self.bitmap, replace_at(&self.children, index, next))
        } else {
            let leaf = NodeRef::leaf(hash, key, value);
            NodeRef::branch(
                self.bitmap.next(mask),
                insert_at(&self.children, index, leaf),
            )
        }
    }

    fn remove(
        &self,
        this: &NodeRef<K, V, P>,
        hash: u64,
        offset: usize,
    ) -> (Option<NodeRef<K, V, P>>, bool) {
        let mask = Bitmap::position(hash, offset);
        if !self.bitmap.has(mask) {
            return (Some(this.clone()), false);
        }
        let index = self.slot(mask);
        let target = &self.children[index];
        match target.remove(hash, offset + 1) {
            (_, false) => (Some(this.clone()), false),
            (Some(next), true) if next.ptr_eq(target) => (Some(this.clone()), false),
            (None, true) => {
                if self.children.len() == 1 {
                    return (None, true);
                }
                let node = NodeRef::branch(
                    self.bitmap.without(mask),
                    remove_at(&self.children, index),
                );
                (Some(node), true)
            }
            (Some(next), true) => {
                let node = NodeRef::branch(self.bitmap, replace_at(&self.children, index, next));
                (Some(node), true)
            }
        }
    }
}

#[cfg(any(test, feature = "debug"))]
impl<K, V, P: SharedPointerKind> NodeRef<K, V, P> {
    /// Walk the subtree below this node and panic on the first broken
    /// structural invariant.
    pub fn assert_invariants(&self) {
        self.check_invariants(&mut Vec::new());
    }

    fn check_invariants(&self, path: &mut Vec<u64>) {
        let hash = match &**self {
            Node::Leaf(leaf) => leaf.hash,
            Node::Collision(coll) => {
                assert!(!coll.entries.is_empty(), "collision node has no entries");
                coll.hash
            }
            Node::Branch(branch) => {
                assert!(!branch.children.is_empty(), "branch node has no children");
                assert_eq!(
                    branch.bitmap.len(),
                    branch.children.len(),
                    "branch bitmap and children disagree"
                );
                for (mask, child) in branch.bitmap.masks().zip(&branch.children) {
                    path.push(mask);
                    child.check_invariants(path);
                    path.pop();
                }
                return;
            }
        };
        for (offset, mask) in path.iter().enumerate() {
            assert_eq!(
                Bitmap::position(hash, offset),
                *mask,
                "hash {:#x} sits in the wrong slot at offset {}",
                hash,
                offset
            );
        }
    }
}

// Ref iterator

/// An iterator over the entries below a node.
pub struct Iter<'a, K, V, P: SharedPointerKind> {
    stack: Vec<SliceIter<'a, NodeRef<K, V, P>>>,
    collision: Option<SliceIter<'a, Entry<K, V>>>,
}

// We impl Clone instead of deriving it, because we want Clone even if K and V aren't.
impl<'a, K, V, P: SharedPointerKind> Clone for Iter<'a, K, V, P> {
    fn clone(&self) -> Self {
        Iter {
            stack: self.stack.clone(),
            collision: self.collision.clone(),
        }
    }
}

impl<'a, K, V, P: SharedPointerKind> Iter<'a, K, V, P> {
    pub(crate) fn new(root: &'a NodeRef<K, V, P>) -> Self {
        let mut stack = Vec::with_capacity(crate::config::MAX_OFFSET + 2);
        stack.push(std::slice::from_ref(root).iter());
        Iter {
            stack,
            collision: None,
        }
    }

    pub(crate) fn empty() -> Self {
        Iter {
            stack: Vec::new(),
            collision: None,
        }
    }
}

impl<'a, K, V, P: SharedPointerKind> Iterator for Iter<'a, K, V, P> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        'outer: loop {
            if let Some(coll) = &mut self.collision {
                match coll.next() {
                    None => self.collision = None,
                    Some(entry) => return Some((&entry.key, &entry.value)),
                }
            }

            while let Some(current) = self.stack.last_mut() {
                match current.next() {
                    Some(node) => match &**node {
                        Node::Leaf(leaf) => return Some((&leaf.key, &leaf.value)),
                        Node::Collision(coll) => {
                            self.collision = Some(coll.entries.iter());
                            continue 'outer;
                        }
                        Node::Branch(branch) => self.stack.push(branch.children.iter()),
                    },
                    None => {
                        self.stack.pop();
                    }
                }
            }
            return None;
        }
    }
}

impl<'a, K, V, P: SharedPointerKind> FusedIterator for Iter<'a, K, V, P> {}

impl<K: fmt::Debug, V: fmt::Debug, P: SharedPointerKind> fmt::Debug for Node<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Node::Leaf(leaf) => write!(
                f,
                "Leaf({:?} => {:?} :: {:#x})",
                leaf.key, leaf.value, leaf.hash
            ),
            Node::Collision(coll) => {
                write!(f, "Coll[ ")?;
                for entry in &coll.entries {
                    write!(f, "{:?} => {:?}, ", entry.key, entry.value)?;
                }
                write!(f, "] :: {:#x}", coll.hash)
            }
            Node::Branch(branch) => {
                write!(f, "Node[ ")?;
                for (mask, child) in branch.bitmap.masks().zip(&branch.children) {
                    write!(f, "{}: {:?}, ", mask.trailing_zeros(), child)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, P: SharedPointerKind> fmt::Debug for NodeRef<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        fmt::Debug::fmt(&**self, f)
    }
}
