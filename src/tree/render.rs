//! Sideways text rendering of a tree.

use super::Bst;
use std::fmt;

/// Indentation added per tree level.
const DEPTH_STEP: usize = 4;

/// Renders a [`Bst`] sideways: right subtree first, one `key value` pair per
/// line, each level indented by four more spaces than its parent.
///
/// Read with the head tilted left, the root sits in the first column and
/// bigger keys are above smaller ones.
///
/// # Examples
///
/// ```rust
/// use fork_bst::tree::Bst;
///
/// let tree = Bst::new().put(20, "John").put(10, "Akvi").put(30, "Jaco");
/// assert_eq!(tree.fancy_string(), "    30 Jaco\n20 John\n    10 Akvi\n");
/// ```
pub struct Fancy<'a, K, V> {
    tree: &'a Bst<K, V>,
}

impl<K: fmt::Display, V: fmt::Display> Fancy<'_, K, V> {
    fn write_at(tree: &Bst<K, V>, depth: usize, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(node) = tree.root() else {
            return Ok(());
        };
        Self::write_at(node.right(), depth + DEPTH_STEP, formatter)?;
        writeln!(formatter, "{:depth$}{} {}", "", node.key(), node.value())?;
        Self::write_at(node.left(), depth + DEPTH_STEP, formatter)
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Fancy<'_, K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write_at(self.tree, 0, formatter)
    }
}

impl<K, V> Bst<K, V> {
    /// Returns a [`Display`](fmt::Display) adapter drawing the tree shape.
    #[must_use]
    pub const fn fancy(&self) -> Fancy<'_, K, V> {
        Fancy { tree: self }
    }
}

impl<K: fmt::Display, V: fmt::Display> Bst<K, V> {
    /// Draws the tree shape into a string. See [`Fancy`].
    #[must_use]
    pub fn fancy_string(&self) -> String {
        self.fancy().to_string()
    }
}
