//! Ordered table backed by a persistent binary search tree.
//!
//! [`OrderedTable`] exposes a key-value table API on top of [`Bst`]. Each
//! operation delegates to the tree; operations that change content wrap the
//! new tree in a new table and leave the old table untouched.
//!
//! # Examples
//!
//! ```rust
//! use fork_bst::table::OrderedTable;
//!
//! let table = OrderedTable::new()
//!     .put("apple", 3)
//!     .put("pear", 5)
//!     .put("plum", 3);
//!
//! assert!(table.contains_key("pear"));
//! assert_eq!(table.get("apple"), Some(&3));
//!
//! // Equal values under distinct keys collapse into one
//! assert_eq!(table.keys().len(), 3);
//! assert_eq!(table.values().len(), 2);
//! ```

use crate::tree::{Bst, Entry, Iter};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// A persistent key-value table with ordered keys.
///
/// # Time Complexity
///
/// | Operation                | Complexity |
/// |--------------------------|------------|
/// | `contains_key` / `get`   | O(h)       |
/// | `put` / `remove`         | O(h)       |
/// | `size`                   | O(N)       |
/// | `is_empty`               | O(1)       |
/// | `keys` / `values`        | O(N log N) |
///
/// where `h` is the height of the underlying tree.
#[derive(Clone)]
pub struct OrderedTable<K, V> {
    bst: Bst<K, V>,
}

impl<K, V> OrderedTable<K, V> {
    /// Creates a new empty table.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { bst: Bst::new() }
    }

    /// Returns `true` if the table has no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bst.is_empty()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bst.size()
    }

    /// Returns the tree backing this table.
    #[inline]
    #[must_use]
    pub const fn as_bst(&self) -> &Bst<K, V> {
        &self.bst
    }

    /// Unwraps the tree backing this table.
    #[inline]
    #[must_use]
    pub fn into_bst(self) -> Bst<K, V> {
        self.bst
    }

    /// Returns an iterator over entries in ascending key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.bst.iter()
    }
}

impl<K: Ord, V> OrderedTable<K, V> {
    /// Returns `true` if the table has an entry for `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.bst.has(key)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.bst.find(key)
    }
}

impl<K: Clone + Ord, V: Clone> OrderedTable<K, V> {
    /// Returns a table with `key` bound to `value`, replacing any previous
    /// value.
    #[must_use]
    pub fn put(&self, key: K, value: V) -> Self {
        Self {
            bst: self.bst.put(key, value),
        }
    }

    /// Returns a table without `key`, or `None` if there is nothing to remove.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fork_bst::table::OrderedTable;
    ///
    /// let table = OrderedTable::new().put(1, "one");
    /// let emptied = table.remove(&1).unwrap();
    /// assert!(emptied.is_empty());
    /// assert!(table.remove(&2).is_none());
    /// assert_eq!(table.size(), 1); // Original unchanged
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if !self.bst.has(key) {
            tracing::trace!("remove skipped: key absent from table");
            return None;
        }
        self.bst.delete(key).map(|bst| Self { bst })
    }

    /// Returns the set of keys.
    #[must_use]
    pub fn keys(&self) -> BTreeSet<K> {
        self.entries_in_order()
            .into_iter()
            .map(|entry| entry.into_parts().0)
            .collect()
    }

    /// Returns the set of distinct values.
    ///
    /// Values stored under several keys appear once, so the result can be
    /// smaller than [`keys`](Self::keys).
    #[must_use]
    pub fn values(&self) -> BTreeSet<V>
    where
        V: Ord,
    {
        self.entries_in_order()
            .into_iter()
            .map(|entry| entry.into_parts().1)
            .collect()
    }

    /// Exports the entries through a buffer of exactly `size()` slots.
    fn entries_in_order(&self) -> Vec<Entry<K, V>> {
        let mut buffer = vec![None; self.size()];
        let written = self.bst.save_in_order(&mut buffer).unwrap_or_default();
        buffer.into_iter().take(written).flatten().collect()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for OrderedTable<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> From<Bst<K, V>> for OrderedTable<K, V> {
    fn from(bst: Bst<K, V>) -> Self {
        Self { bst }
    }
}

impl<K: Clone + Ord, V: Clone> FromIterator<(K, V)> for OrderedTable<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            bst: iter.into_iter().collect(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedTable<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedTable<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.bst == other.bst
    }
}

impl<K: Eq, V: Eq> Eq for OrderedTable<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedTable<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.bst, formatter)
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for OrderedTable<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.bst, formatter)
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for OrderedTable<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde::Serialize::serialize(&self.bst, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for OrderedTable<K, V>
where
    K: serde::Deserialize<'de> + Clone + Ord,
    V: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <Bst<K, V> as serde::Deserialize<'de>>::deserialize(deserializer).map(Self::from)
    }
}

// =============================================================================
// Tests
// =============================================================================
