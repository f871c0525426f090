//! The non-empty tree node.

use super::Bst;

/// A non-empty tree: one key, one value and two subtrees.
///
/// Every key in `left` is strictly smaller than `key` and every key in
/// `right` is strictly bigger. Nodes can only be created through [`Bst`],
/// which checks that bound, and are never mutated afterwards; a changed tree
/// is a new chain of nodes pointing into the old ones.
pub struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Bst<K, V>,
    pub(crate) right: Bst<K, V>,
}

impl<K, V> Node<K, V> {
    /// Returns the node key.
    #[inline]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Returns the node value.
    #[inline]
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// Returns the subtree holding the smaller keys.
    #[inline]
    pub const fn left(&self) -> &Bst<K, V> {
        &self.left
    }

    /// Returns the subtree holding the bigger keys.
    #[inline]
    pub const fn right(&self) -> &Bst<K, V> {
        &self.right
    }

    /// Returns `true` when both subtrees are empty.
    #[inline]
    pub const fn is_leaf(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

impl<K: Clone, V: Clone> Node<K, V> {
    /// Clones the key and value, keeping the children out of it.
    pub(crate) fn cloned_parts(&self) -> (K, V) {
        (self.key.clone(), self.value.clone())
    }
}
