//! Key-value pairs extracted from a tree.

use std::fmt;

/// An immutable key-value pair.
///
/// Entries are produced by traversals and extrema queries; the tree itself
/// stores keys and values directly in its nodes. Extrema queries hand out the
/// borrowed form `Entry<&K, &V>`, which [`Entry::cloned`] turns into an owned
/// entry.
///
/// # Examples
///
/// ```rust
/// use fork_bst::tree::{Bst, Entry};
///
/// let tree = Bst::new().put(2, "two").put(1, "one");
/// let smallest: Entry<i32, &str> = tree.smallest().unwrap().cloned();
/// assert_eq!(smallest, Entry::new(1, "one"));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    /// Creates a new entry.
    #[inline]
    #[must_use]
    pub const fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Returns the key.
    #[inline]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Returns the value.
    #[inline]
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// Splits the entry into its key and value.
    #[inline]
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }

    /// Borrows both halves of the entry.
    #[inline]
    pub const fn as_borrowed(&self) -> Entry<&K, &V> {
        Entry {
            key: &self.key,
            value: &self.value,
        }
    }
}

impl<K: Clone, V: Clone> Entry<&K, &V> {
    /// Clones the borrowed key and value into an owned entry.
    #[must_use]
    pub fn cloned(&self) -> Entry<K, V> {
        Entry {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

impl<K, V> From<(K, V)> for Entry<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

impl<K, V> From<Entry<K, V>> for (K, V) {
    fn from(entry: Entry<K, V>) -> Self {
        entry.into_parts()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:?} => {:?}", self.key, self.value)
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Entry<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {}", self.key, self.value)
    }
}
