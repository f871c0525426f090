//! Persistent (immutable) binary search tree.
//!
//! This module provides [`Bst`], an unbalanced binary search tree whose
//! updates never touch existing nodes.
//!
//! # Overview
//!
//! A tree is either [`Bst::Empty`] or a shared [`Node`] holding a key, a value
//! and two subtrees. `put`, `delete`, `delete_smallest` and `delete_largest`
//! rebuild only the nodes on the path from the root to the change and share
//! every other subtree with the original, which stays valid and unchanged.
//!
//! - O(height) `has`, `find`, `put`, `delete`
//! - O(height) `smallest`/`largest` and their deletions
//! - O(N) `size`, `height` and in-order export (nothing is cached)
//! - O(N log N) `balanced`
//!
//! The tree never rebalances itself. Call [`Bst::balanced`] to rebuild it with
//! height `floor(log2(size))`.
//!
//! # Examples
//!
//! ```rust
//! use fork_bst::tree::Bst;
//!
//! let tree = Bst::new()
//!     .put(30, "John")
//!     .put(40, "Mary")
//!     .put(25, "Peter");
//!
//! let updated = tree.put(30, "Kathy");
//! assert_eq!(tree.find(&30), Some(&"John")); // Original unchanged
//! assert_eq!(updated.find(&30), Some(&"Kathy"));
//!
//! let keys: Vec<&i32> = updated.keys().collect();
//! assert_eq!(keys, vec![&25, &30, &40]);
//! ```

use super::{Entry, Iter, Keys, Node, ReferenceCounter, Values};
use crate::error::{BstError, Side};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// =============================================================================
// Balance Strategy
// =============================================================================

/// How [`Bst::balanced_with`] rebuilds a tree from its sorted entries.
///
/// Both strategies pick the lower midpoint `(begin + end) / 2` of every
/// range as the subtree root, so they produce trees of the same shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BalanceStrategy {
    /// Inserts the midpoint into a fresh empty tree with `put`, then the
    /// midpoints of the lower and upper halves, recursively.
    #[default]
    MidpointInsertion,
    /// Links the nodes directly from the sorted entries without going
    /// through `put`.
    DirectBuild,
}

// =============================================================================
// Bst Definition
// =============================================================================

/// A persistent (immutable) binary search tree.
///
/// Keys must implement `Ord`. Each key appears at most once; putting an
/// existing key replaces its value.
///
/// # Time Complexity
///
/// | Operation                | Complexity |
/// |--------------------------|------------|
/// | `new`                    | O(1)       |
/// | `has` / `find`           | O(h)       |
/// | `put` / `delete`         | O(h)       |
/// | `smallest` / `largest`   | O(h)       |
/// | `size` / `height`        | O(N)       |
/// | `balanced`               | O(N log N) |
///
/// where `h` is the current height of the tree.
///
/// # Examples
///
/// ```rust
/// use fork_bst::tree::Bst;
///
/// let tree: Bst<i32, &str> = Bst::new();
/// assert!(tree.is_empty());
/// assert_eq!(tree.size(), 0);
/// assert_eq!(tree.height(), -1);
///
/// let tree = tree.put(30, "John");
/// assert_eq!(tree.size(), 1);
/// assert_eq!(tree.height(), 0);
/// ```
pub enum Bst<K, V> {
    /// The empty tree.
    Empty,
    /// A tree with at least one entry.
    Node(ReferenceCounter<Node<K, V>>),
}

impl<K, V> Bst<K, V> {
    /// Creates a new empty tree.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::Empty
    }

    /// Returns `true` if the tree holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the number of entries.
    ///
    /// # Complexity
    ///
    /// O(N), the size is recomputed on every call.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Node(node) => 1 + node.left.size() + node.right.size(),
        }
    }

    /// Returns the number of edges on the longest root-to-leaf path.
    ///
    /// A single node has height 0 and the empty tree has height -1.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fork_bst::tree::Bst;
    ///
    /// let tree = Bst::new().put(1, ()).put(2, ()).put(3, ());
    /// assert_eq!(tree.height(), 2);
    /// assert_eq!(tree.balanced().height(), 1);
    /// ```
    #[must_use]
    pub fn height(&self) -> isize {
        match self {
            Self::Empty => -1,
            Self::Node(node) => 1 + node.left.height().max(node.right.height()),
        }
    }

    /// Returns the root node, if any.
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<&Node<K, V>> {
        match self {
            Self::Empty => None,
            Self::Node(node) => Some(&**node),
        }
    }

    /// Returns the root key.
    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.root().map(Node::key)
    }

    /// Returns the root value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.root().map(Node::value)
    }

    /// Returns the left subtree of the root.
    #[inline]
    #[must_use]
    pub fn left(&self) -> Option<&Self> {
        self.root().map(Node::left)
    }

    /// Returns the right subtree of the root.
    #[inline]
    #[must_use]
    pub fn right(&self) -> Option<&Self> {
        self.root().map(Node::right)
    }

    /// Returns the entry with the smallest key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fork_bst::tree::{Bst, Entry};
    ///
    /// let tree = Bst::new().put(20, "John").put(10, "Akvi").put(30, "Jaco");
    /// assert_eq!(tree.smallest(), Some(Entry::new(&10, &"Akvi")));
    /// assert_eq!(Bst::<i32, &str>::new().smallest(), None);
    /// ```
    #[must_use]
    pub fn smallest(&self) -> Option<Entry<&K, &V>> {
        let node = self.root()?;
        node.left
            .smallest()
            .or_else(|| Some(Entry::new(&node.key, &node.value)))
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn largest(&self) -> Option<Entry<&K, &V>> {
        let node = self.root()?;
        node.right
            .largest()
            .or_else(|| Some(Entry::new(&node.key, &node.value)))
    }

    /// Returns an iterator over entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fork_bst::tree::Bst;
    ///
    /// let tree = Bst::new().put(3, "three").put(1, "one").put(2, "two");
    /// let entries: Vec<(&i32, &&str)> = tree.iter().collect();
    /// assert_eq!(entries, vec![(&1, &"one"), (&2, &"two"), (&3, &"three")]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Returns an iterator over keys in ascending order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Returns an iterator over values in ascending key order.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }
}

impl<K: Ord, V> Bst<K, V> {
    /// Links a node whose ordering is guaranteed by the caller's algorithm.
    fn fork(key: K, value: V, left: Self, right: Self) -> Self {
        debug_assert!(left.smaller(&key), "left subtree out of order");
        debug_assert!(right.bigger(&key), "right subtree out of order");
        Self::Node(ReferenceCounter::new(Node {
            key,
            value,
            left,
            right,
        }))
    }

    /// Returns `true` if every key in the tree is strictly smaller than
    /// `bound`. Always `true` for the empty tree.
    ///
    /// Only the right spine is visited: the largest key lives at its end.
    #[must_use]
    pub fn smaller<Q>(&self, bound: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self {
            Self::Empty => true,
            Self::Node(node) => node.key.borrow() < bound && node.right.smaller(bound),
        }
    }

    /// Returns `true` if every key in the tree is strictly bigger than
    /// `bound`. Always `true` for the empty tree.
    #[must_use]
    pub fn bigger<Q>(&self, bound: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self {
            Self::Empty => true,
            Self::Node(node) => node.key.borrow() > bound && node.left.bigger(bound),
        }
    }

    /// Returns `true` if the tree contains `key`.
    #[must_use]
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Returns the value stored under `key`.
    ///
    /// The key may be any borrowed form of the tree's key type, as long as
    /// the ordering on the borrowed form matches the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fork_bst::tree::Bst;
    ///
    /// let tree = Bst::new().put("hello".to_string(), 42);
    /// assert_eq!(tree.find("hello"), Some(&42));
    /// assert_eq!(tree.find("world"), None);
    /// ```
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.root()?;
        match key.cmp(node.key.borrow()) {
            Ordering::Less => node.left.find(key),
            Ordering::Greater => node.right.find(key),
            Ordering::Equal => Some(&node.value),
        }
    }
}

impl<K: Ord + fmt::Debug, V> Bst<K, V> {
    /// Builds a node from a key, a value and two subtrees, checking the
    /// ordering bound.
    ///
    /// # Errors
    ///
    /// Returns [`BstError::InvariantViolation`] when some key of `left` is not
    /// strictly smaller than `key`, or some key of `right` is not strictly
    /// bigger.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fork_bst::tree::Bst;
    ///
    /// let tree = Bst::try_node(20, "John", Bst::singleton(10, "Akvi"), Bst::new());
    /// assert_eq!(tree.map(|tree| tree.size()), Ok(2));
    ///
    /// let broken = Bst::try_node(20, "John", Bst::singleton(30, "Jaco"), Bst::new());
    /// assert!(broken.is_err());
    /// ```
    pub fn try_node(key: K, value: V, left: Self, right: Self) -> Result<Self, BstError> {
        if !left.smaller(&key) {
            return Err(BstError::invariant_violation(Side::Left, &key));
        }
        if !right.bigger(&key) {
            return Err(BstError::invariant_violation(Side::Right, &key));
        }
        Ok(Self::Node(ReferenceCounter::new(Node {
            key,
            value,
            left,
            right,
        })))
    }

    /// Builds a node from a key, a value and two subtrees.
    ///
    /// # Panics
    ///
    /// Panics when the subtrees do not respect the ordering bound around
    /// `key`. Use [`Bst::try_node`] to get the error instead.
    #[must_use]
    pub fn node(key: K, value: V, left: Self, right: Self) -> Self {
        match Self::try_node(key, value, left, right) {
            Ok(tree) => tree,
            Err(error) => {
                tracing::error!(%error, "refusing to build an out-of-order node");
                panic!("{error}");
            }
        }
    }
}

impl<K: Clone + Ord, V: Clone> Bst<K, V> {
    /// Creates a tree containing a single entry.
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::fork(key, value, Self::Empty, Self::Empty)
    }

    /// Returns a tree with `key` bound to `value`.
    ///
    /// If `key` is already present its value is replaced and the size stays
    /// the same. Only the nodes on the search path are rebuilt.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fork_bst::tree::Bst;
    ///
    /// let before = Bst::new().put(1, "one");
    /// let after = before.put(2, "two");
    /// assert_eq!(before.size(), 1);
    /// assert_eq!(after.size(), 2);
    /// ```
    #[must_use]
    pub fn put(&self, key: K, value: V) -> Self {
        let Self::Node(node) = self else {
            return Self::singleton(key, value);
        };
        match key.cmp(&node.key) {
            Ordering::Less => {
                let (node_key, node_value) = node.cloned_parts();
                Self::fork(node_key, node_value, node.left.put(key, value), node.right.clone())
            }
            Ordering::Greater => {
                let (node_key, node_value) = node.cloned_parts();
                Self::fork(node_key, node_value, node.left.clone(), node.right.put(key, value))
            }
            Ordering::Equal => Self::fork(key, value, node.left.clone(), node.right.clone()),
        }
    }

    /// Returns a tree without `key`, or `None` if `key` is absent.
    ///
    /// When the removed node has two children, the largest entry of its left
    /// subtree takes its place.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fork_bst::tree::Bst;
    ///
    /// let tree = Bst::new().put(20, "John").put(10, "Akvi").put(30, "Jaco");
    /// let removed = tree.delete(&20).unwrap();
    /// assert_eq!(removed.key(), Some(&10));
    /// assert_eq!(tree.size(), 3); // Original unchanged
    /// assert!(tree.delete(&99).is_none());
    /// ```
    #[must_use]
    pub fn delete<Q>(&self, key: &Q) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.root()?;
        match key.cmp(node.key.borrow()) {
            Ordering::Less => node.left.delete(key).map(|left| {
                let (node_key, node_value) = node.cloned_parts();
                Self::fork(node_key, node_value, left, node.right.clone())
            }),
            Ordering::Greater => node.right.delete(key).map(|right| {
                let (node_key, node_value) = node.cloned_parts();
                Self::fork(node_key, node_value, node.left.clone(), right)
            }),
            Ordering::Equal => Some(Self::without_root(node)),
        }
    }

    /// Joins the two subtrees of a removed node.
    fn without_root(node: &Node<K, V>) -> Self {
        match (&node.left, &node.right) {
            (Self::Empty, right) => right.clone(),
            (left, Self::Empty) => left.clone(),
            (left, right) => match left.pop_largest() {
                Some((largest, rest)) => {
                    let (key, value) = largest.into_parts();
                    Self::fork(key, value, rest, right.clone())
                }
                None => right.clone(),
            },
        }
    }

    /// Returns the tree without its smallest entry, or `None` if empty.
    #[must_use]
    pub fn delete_smallest(&self) -> Option<Self> {
        self.pop_smallest().map(|(_, rest)| rest)
    }

    /// Returns the tree without its largest entry, or `None` if empty.
    #[must_use]
    pub fn delete_largest(&self) -> Option<Self> {
        self.pop_largest().map(|(_, rest)| rest)
    }

    /// Removes the smallest entry, returning it with the remaining tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fork_bst::tree::{Bst, Entry};
    ///
    /// let tree = Bst::new().put(2, 'b').put(1, 'a');
    /// let (smallest, rest) = tree.pop_smallest().unwrap();
    /// assert_eq!(smallest, Entry::new(1, 'a'));
    /// assert_eq!(rest.size(), 1);
    /// ```
    #[must_use]
    pub fn pop_smallest(&self) -> Option<(Entry<K, V>, Self)> {
        let node = self.root()?;
        Some(match node.left.pop_smallest() {
            None => {
                let (key, value) = node.cloned_parts();
                (Entry::new(key, value), node.right.clone())
            }
            Some((smallest, left)) => {
                let (key, value) = node.cloned_parts();
                (smallest, Self::fork(key, value, left, node.right.clone()))
            }
        })
    }

    /// Removes the largest entry, returning it with the remaining tree.
    #[must_use]
    pub fn pop_largest(&self) -> Option<(Entry<K, V>, Self)> {
        let node = self.root()?;
        Some(match node.right.pop_largest() {
            None => {
                let (key, value) = node.cloned_parts();
                (Entry::new(key, value), node.left.clone())
            }
            Some((largest, right)) => {
                let (key, value) = node.cloned_parts();
                (largest, Self::fork(key, value, node.left.clone(), right))
            }
        })
    }

    /// Writes every entry into `buffer` in ascending key order, starting at
    /// slot 0, and returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns [`BstError::BufferTooSmall`] if `buffer` has fewer than
    /// `size()` slots. Nothing is written in that case.
    pub fn save_in_order(&self, buffer: &mut [Option<Entry<K, V>>]) -> Result<usize, BstError> {
        self.save_in_order_at(buffer, 0)
    }

    /// Writes every entry into `buffer[start..start + size()]` in ascending
    /// key order and returns the number of entries written.
    ///
    /// Slots outside that range are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BstError::BufferTooSmall`] if `start + size()` exceeds the
    /// buffer length. Nothing is written in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fork_bst::tree::{Bst, Entry};
    ///
    /// let tree = Bst::new().put(2, "two").put(1, "one");
    /// let mut buffer = vec![None; 3];
    /// assert_eq!(tree.save_in_order_at(&mut buffer, 1), Ok(2));
    /// assert_eq!(
    ///     buffer,
    ///     vec![None, Some(Entry::new(1, "one")), Some(Entry::new(2, "two"))]
    /// );
    /// ```
    pub fn save_in_order_at(
        &self,
        buffer: &mut [Option<Entry<K, V>>],
        start: usize,
    ) -> Result<usize, BstError> {
        let size = self.size();
        let required = start.saturating_add(size);
        let available = buffer.len();
        let Some(slots) = buffer.get_mut(start..required) else {
            return Err(BstError::BufferTooSmall {
                required,
                available,
            });
        };
        for (slot, (key, value)) in slots.iter_mut().zip(self.iter()) {
            *slot = Some(Entry::new(key.clone(), value.clone()));
        }
        Ok(size)
    }

    /// Returns a tree with the same entries and height `floor(log2(size))`.
    ///
    /// Equivalent to `balanced_with(BalanceStrategy::MidpointInsertion)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fork_bst::tree::Bst;
    ///
    /// let degenerate: Bst<i32, i32> = (0..15).map(|key| (key, key)).collect();
    /// assert_eq!(degenerate.height(), 14);
    ///
    /// let balanced = degenerate.balanced();
    /// assert_eq!(balanced.height(), 3);
    /// assert_eq!(balanced, degenerate);
    /// ```
    #[must_use]
    pub fn balanced(&self) -> Self {
        self.balanced_with(BalanceStrategy::default())
    }

    /// Returns a tree with the same entries and minimal height, built with
    /// the given strategy.
    #[must_use]
    pub fn balanced_with(&self, strategy: BalanceStrategy) -> Self {
        let size = self.size();
        if size == 0 {
            return Self::Empty;
        }

        let mut buffer = vec![None; size];
        let written = self.save_in_order(&mut buffer).unwrap_or_default();
        let entries: Vec<Entry<K, V>> = buffer.into_iter().take(written).flatten().collect();

        let balanced = match strategy {
            BalanceStrategy::MidpointInsertion => Self::insert_midpoints(Self::Empty, &entries),
            BalanceStrategy::DirectBuild => Self::build_from_sorted(&entries),
        };
        tracing::debug!(
            size,
            ?strategy,
            height = balanced.height(),
            "rebuilt balanced tree"
        );
        balanced
    }

    /// Puts the lower midpoint of `entries` into `tree`, then both halves.
    fn insert_midpoints(tree: Self, entries: &[Entry<K, V>]) -> Self {
        let Some((lower, middle, upper)) = split_at_midpoint(entries) else {
            return tree;
        };
        let (key, value) = middle.clone().into_parts();
        let tree = tree.put(key, value);
        let tree = Self::insert_midpoints(tree, lower);
        Self::insert_midpoints(tree, upper)
    }

    /// Links the lower midpoint of `entries` above the trees built from both
    /// halves.
    fn build_from_sorted(entries: &[Entry<K, V>]) -> Self {
        let Some((lower, middle, upper)) = split_at_midpoint(entries) else {
            return Self::Empty;
        };
        let (key, value) = middle.clone().into_parts();
        Self::fork(
            key,
            value,
            Self::build_from_sorted(lower),
            Self::build_from_sorted(upper),
        )
    }
}

/// Splits a sorted slice around its lower midpoint.
fn split_at_midpoint<T>(entries: &[T]) -> Option<(&[T], &T, &[T])> {
    let middle = entries.len().checked_sub(1)? / 2;
    let (lower, rest) = entries.split_at(middle);
    let (pivot, upper) = rest.split_first()?;
    Some((lower, pivot, upper))
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Clone for Bst<K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Node(node) => Self::Node(ReferenceCounter::clone(node)),
        }
    }
}

impl<K, V> Default for Bst<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Ord, V: Clone> FromIterator<(K, V)> for Bst<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |tree, (key, value)| tree.put(key, value))
    }
}

impl<'a, K, V> IntoIterator for &'a Bst<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Two trees are equal when they hold the same entries, whatever their shape.
impl<K: PartialEq, V: PartialEq> PartialEq for Bst<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for Bst<K, V> {}

/// Hashes the entries in key order, so equal trees hash equally regardless
/// of their shape.
impl<K: Hash, V: Hash> Hash for Bst<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut count = 0_usize;
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
            count += 1;
        }
        count.hash(state);
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Bst<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Bst<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for Bst<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

#[cfg(feature = "serde")]
struct BstVisitor<K, V> {
    marker: std::marker::PhantomData<(K, V)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for BstVisitor<K, V>
where
    K: serde::Deserialize<'de> + Clone + Ord,
    V: serde::Deserialize<'de> + Clone,
{
    type Value = Bst<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut tree = Bst::new();
        while let Some((key, value)) = access.next_entry()? {
            tree = tree.put(key, value);
        }
        Ok(tree)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for Bst<K, V>
where
    K: serde::Deserialize<'de> + Clone + Ord,
    V: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(BstVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    /// Eight people keyed by number, rooted at 20.
    #[fixture]
    fn people() -> Bst<i32, &'static str> {
        Bst::singleton(20, "John")
            .put(10, "Akvi")
            .put(30, "Jaco")
            .put(50, "Tim")
            .put(60, "Mary")
            .put(15, "Jill")
            .put(35, "Anna")
            .put(18, "Greg")
    }

    fn assert_ordered<K: Ord + Clone, V>(tree: &Bst<K, V>) {
        if let Bst::Node(node) = tree {
            assert!(node.left.smaller(&node.key));
            assert!(node.right.bigger(&node.key));
            assert_ordered(&node.left);
            assert_ordered(&node.right);
        }
    }

    // =========================================================================
    // Empty Tree
    // =========================================================================

    #[rstest]
    fn test_empty_tree_queries() {
        let tree: Bst<i32, &str> = Bst::new();
        assert!(tree.is_empty());
        assert!(!tree.has(&1));
        assert_eq!(tree.find(&1), None);
        assert_eq!(tree.smallest(), None);
        assert_eq!(tree.largest(), None);
        assert!(tree.delete(&1).is_none());
        assert!(tree.delete_smallest().is_none());
        assert!(tree.delete_largest().is_none());
        assert_eq!(tree.size(), 0);
        assert_eq!(tree.height(), -1);
        assert!(tree.balanced().is_empty());
    }

    #[rstest]
    fn test_empty_tree_accessors_are_absent() {
        let tree: Bst<i32, &str> = Bst::default();
        assert_eq!(tree.key(), None);
        assert_eq!(tree.value(), None);
        assert!(tree.left().is_none());
        assert!(tree.right().is_none());
    }

    #[rstest]
    fn test_empty_tree_bounds_are_vacuous() {
        let tree: Bst<i32, ()> = Bst::new();
        assert!(tree.smaller(&i32::MIN));
        assert!(tree.bigger(&i32::MAX));
    }

    // =========================================================================
    // Bounds
    // =========================================================================

    #[rstest]
    fn test_smaller_and_bigger(people: Bst<i32, &'static str>) {
        assert!(people.smaller(&61));
        assert!(!people.smaller(&60));
        assert!(people.bigger(&9));
        assert!(!people.bigger(&10));
    }

    #[rstest]
    fn test_smaller_checks_the_whole_right_spine() {
        let tree = Bst::singleton(20, "John")
            .put(10, "Akvi")
            .put(30, "Jaco");
        assert!(!tree.smaller(&30));
        assert!(!tree.put(50, "Tim").put(60, "Mary").smaller(&51));
        assert!(!Bst::singleton(20, "John").put(10, "Akvi").bigger(&20));
    }

    // =========================================================================
    // Node Construction
    // =========================================================================

    #[rstest]
    fn test_node_accepts_ordered_children() {
        let tree = Bst::node(20, "John", Bst::singleton(10, "Akvi"), Bst::singleton(30, "Jaco"));
        assert_eq!(tree.size(), 3);
        assert_eq!(tree.key(), Some(&20));
        assert_eq!(tree.left().and_then(Bst::key), Some(&10));
        assert_eq!(tree.right().and_then(Bst::key), Some(&30));
    }

    #[rstest]
    #[case(Bst::singleton(20, "x"), Bst::new(), Side::Left)]
    #[case(Bst::singleton(25, "x"), Bst::new(), Side::Left)]
    #[case(Bst::new(), Bst::singleton(20, "x"), Side::Right)]
    #[case(Bst::new(), Bst::singleton(5, "x"), Side::Right)]
    fn test_try_node_rejects_out_of_order_children(
        #[case] left: Bst<i32, &'static str>,
        #[case] right: Bst<i32, &'static str>,
        #[case] side: Side,
    ) {
        let result = Bst::try_node(20, "John", left, right);
        assert_eq!(
            result.err(),
            Some(BstError::InvariantViolation {
                side,
                key: "20".to_string(),
            })
        );
    }

    #[rstest]
    #[should_panic(expected = "left subtree of key 20 is not strictly smaller than the key")]
    fn test_node_panics_on_violation() {
        let _ = Bst::node(20, "John", Bst::singleton(30, "Jaco"), Bst::new());
    }

    // =========================================================================
    // Put and Find
    // =========================================================================

    #[rstest]
    fn test_put_into_empty_builds_a_leaf() {
        let tree = Bst::new().put(30, "John");
        assert_eq!(tree.size(), 1);
        assert_eq!(tree.height(), 0);
        assert!(tree.root().is_some_and(Node::is_leaf));
    }

    #[rstest]
    fn test_find_and_has(people: Bst<i32, &'static str>) {
        assert!(people.has(&30));
        assert_eq!(people.find(&15), Some(&"Jill"));
        assert_eq!(people.find(&16), None);
        assert!(!people.has(&16));
    }

    #[rstest]
    fn test_put_replaces_value_keeping_size(people: Bst<i32, &'static str>) {
        let updated = people.put(35, "Anne");
        assert_eq!(updated.size(), people.size());
        assert_eq!(updated.find(&35), Some(&"Anne"));
        assert_eq!(people.find(&35), Some(&"Anna"));
    }

    #[rstest]
    fn test_put_shares_untouched_subtrees(people: Bst<i32, &'static str>) {
        let updated = people.put(12, "Lena");
        let (Some(Bst::Node(old_right)), Some(Bst::Node(new_right))) =
            (people.right(), updated.right())
        else {
            panic!("both trees have a right subtree");
        };
        assert!(ReferenceCounter::ptr_eq(old_right, new_right));

        let (Some(Bst::Node(old_left)), Some(Bst::Node(new_left))) =
            (people.left(), updated.left())
        else {
            panic!("both trees have a left subtree");
        };
        assert!(!ReferenceCounter::ptr_eq(old_left, new_left));
    }

    #[rstest]
    fn test_put_keeps_order(people: Bst<i32, &'static str>) {
        assert_ordered(&people);
        assert_ordered(&people.put(19, "x").put(0, "y").put(55, "z"));
    }

    // =========================================================================
    // Extrema
    // =========================================================================

    #[rstest]
    fn test_smallest_and_largest(people: Bst<i32, &'static str>) {
        assert_eq!(people.smallest(), Some(Entry::new(&10, &"Akvi")));
        assert_eq!(people.largest(), Some(Entry::new(&60, &"Mary")));
    }

    #[rstest]
    fn test_delete_largest_then_smallest(people: Bst<i32, &'static str>) {
        let without_largest = people.delete_largest().unwrap();
        assert_eq!(without_largest.largest().map(|entry| **entry.key()), Some(50));

        let without_smallest = without_largest.delete_smallest().unwrap();
        assert_eq!(without_smallest.smallest().map(|entry| **entry.key()), Some(15));
        assert_eq!(without_largest.smallest().map(|entry| **entry.key()), Some(10));
    }

    #[rstest]
    fn test_delete_smallest_at_root_promotes_right_child() {
        let tree = Bst::singleton(1, 'a').put(3, 'c').put(2, 'b');
        let rest = tree.delete_smallest().unwrap();
        assert_eq!(rest.key(), Some(&3));
        assert_eq!(rest.size(), 2);
    }

    #[rstest]
    fn test_pop_largest_returns_entry_and_rest(people: Bst<i32, &'static str>) {
        let (largest, rest) = people.pop_largest().unwrap();
        assert_eq!(largest, Entry::new(60, "Mary"));
        assert!(!rest.has(&60));
        assert_eq!(rest.size(), 7);
    }

    // =========================================================================
    // Delete
    // =========================================================================

    #[rstest]
    fn test_delete_absent_key_is_none(people: Bst<i32, &'static str>) {
        assert!(people.delete(&11).is_none());
        assert_eq!(people.size(), 8);
    }

    #[rstest]
    fn test_delete_leaf(people: Bst<i32, &'static str>) {
        let removed = people.delete(&18).unwrap();
        assert!(!removed.has(&18));
        assert_eq!(removed.size(), 7);
        assert_ordered(&removed);
    }

    #[rstest]
    fn test_delete_node_with_one_child_lifts_the_child(people: Bst<i32, &'static str>) {
        // 10 has only a right child (15).
        let removed = people.delete(&10).unwrap();
        assert_eq!(removed.left().and_then(Bst::key), Some(&15));
        assert_eq!(removed.smallest().map(|entry| **entry.key()), Some(15));
    }

    #[rstest]
    fn test_delete_with_two_children_promotes_largest_of_left(people: Bst<i32, &'static str>) {
        // Root 20: left subtree {10, 15, 18}, right subtree {30, 35, 50, 60}.
        let removed = people.delete(&20).unwrap();
        assert_eq!(removed.key(), Some(&18));
        assert_eq!(removed.value(), Some(&"Greg"));
        assert_eq!(removed.size(), 7);
        assert_ordered(&removed);
    }

    #[rstest]
    fn test_delete_shares_the_other_side(people: Bst<i32, &'static str>) {
        let removed = people.delete(&50).unwrap();
        let (Some(Bst::Node(old_left)), Some(Bst::Node(new_left))) =
            (people.left(), removed.left())
        else {
            panic!("both trees have a left subtree");
        };
        assert!(ReferenceCounter::ptr_eq(old_left, new_left));
    }

    // =========================================================================
    // Size and Height
    // =========================================================================

    #[rstest]
    #[case(&[], 0, -1)]
    #[case(&[1], 1, 0)]
    #[case(&[2, 1], 2, 1)]
    #[case(&[2, 1, 3], 3, 1)]
    #[case(&[1, 2, 3, 4], 4, 3)]
    fn test_size_and_height(#[case] keys: &[i32], #[case] size: usize, #[case] height: isize) {
        let tree: Bst<i32, ()> = keys.iter().map(|&key| (key, ())).collect();
        assert_eq!(tree.size(), size);
        assert_eq!(tree.height(), height);
    }

    // =========================================================================
    // In-order Export
    // =========================================================================

    #[rstest]
    fn test_save_in_order_fills_exactly_size_slots(people: Bst<i32, &'static str>) {
        let mut buffer = vec![None; 8];
        assert_eq!(people.save_in_order(&mut buffer), Ok(8));
        let keys: Vec<i32> = buffer.iter().flatten().map(|entry| *entry.key()).collect();
        assert_eq!(keys, vec![10, 15, 18, 20, 30, 35, 50, 60]);
    }

    #[rstest]
    fn test_save_in_order_at_leaves_other_slots_alone() {
        let tree = Bst::new().put(2, "two").put(1, "one");
        let sentinel = Some(Entry::new(0, "sentinel"));
        let mut buffer = vec![sentinel; 5];
        assert_eq!(tree.save_in_order_at(&mut buffer, 2), Ok(2));
        assert_eq!(buffer[0], sentinel);
        assert_eq!(buffer[1], sentinel);
        assert_eq!(buffer[2], Some(Entry::new(1, "one")));
        assert_eq!(buffer[3], Some(Entry::new(2, "two")));
        assert_eq!(buffer[4], sentinel);
    }

    #[rstest]
    #[case(2, 0)]
    #[case(8, 1)]
    fn test_save_in_order_rejects_short_buffers(
        people: Bst<i32, &'static str>,
        #[case] length: usize,
        #[case] start: usize,
    ) {
        let mut buffer = vec![None; length];
        assert_eq!(
            people.save_in_order_at(&mut buffer, start),
            Err(BstError::BufferTooSmall {
                required: start + 8,
                available: length,
            })
        );
        assert!(buffer.iter().all(Option::is_none));
    }

    #[rstest]
    fn test_save_in_order_of_empty_tree_writes_nothing() {
        let tree: Bst<i32, i32> = Bst::new();
        let mut buffer: Vec<Option<Entry<i32, i32>>> = Vec::new();
        assert_eq!(tree.save_in_order(&mut buffer), Ok(0));
    }

    // =========================================================================
    // Balancing
    // =========================================================================

    #[rstest]
    fn test_balanced_keeps_entries_and_bounds_height(people: Bst<i32, &'static str>) {
        let balanced = people.balanced();
        assert_eq!(balanced.size(), 8);
        assert_eq!(balanced.height(), 3);
        assert_eq!(balanced, people);
        assert_eq!(balanced.largest().map(|entry| **entry.value()), Some("Mary"));
        assert_ordered(&balanced);
    }

    #[rstest]
    fn test_balanced_roots_the_lower_midpoint() {
        let tree: Bst<i32, ()> = (1..=6).map(|key| (key, ())).collect();
        let balanced = tree.balanced();
        // Sorted keys 1..=6, indices 0..=5, lower midpoint index 2.
        assert_eq!(balanced.key(), Some(&3));
        assert_eq!(balanced.left().and_then(Bst::key), Some(&1));
        assert_eq!(balanced.right().and_then(Bst::key), Some(&5));
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(7)]
    #[case(8)]
    #[case(100)]
    fn test_balance_strategies_build_the_same_shape(#[case] size: i32) {
        let tree: Bst<i32, i32> = (0..size).map(|key| (key, key * 10)).collect();
        let inserted = tree.balanced_with(BalanceStrategy::MidpointInsertion);
        let built = tree.balanced_with(BalanceStrategy::DirectBuild);
        assert_eq!(inserted.fancy_string(), built.fancy_string());
        assert_eq!(inserted.height(), built.height());
    }

    #[rstest]
    fn test_balanced_does_not_touch_the_original() {
        let tree: Bst<i32, ()> = (0..10).map(|key| (key, ())).collect();
        let _ = tree.balanced();
        assert_eq!(tree.height(), 9);
    }

    // =========================================================================
    // Traits
    // =========================================================================

    #[rstest]
    fn test_display_and_debug() {
        let tree = Bst::new().put(2, "two").put(1, "one");
        assert_eq!(format!("{tree}"), "{1: one, 2: two}");
        assert_eq!(format!("{tree:?}"), "{1: \"one\", 2: \"two\"}");
        assert_eq!(format!("{}", Bst::<i32, i32>::new()), "{}");
    }

    #[rstest]
    fn test_equality_ignores_shape() {
        let ascending: Bst<i32, i32> = (0..5).map(|key| (key, key)).collect();
        let descending: Bst<i32, i32> = (0..5).rev().map(|key| (key, key)).collect();
        assert_ne!(ascending.height(), descending.balanced().height());
        assert_eq!(ascending, descending);
        assert_ne!(ascending, descending.put(0, 99));
    }
}
