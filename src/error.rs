//! Error types for the tree and table.
//!
//! Absent keys are never errors: every lookup or removal that can miss
//! returns an `Option`. The errors in this module describe misuse by the
//! caller, such as building a node whose children break the ordering.

use thiserror::Error;

/// The side of a node whose subtree violated the ordering bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The left subtree, whose keys must all be smaller than the node key.
    Left,
    /// The right subtree, whose keys must all be bigger than the node key.
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(formatter, "left"),
            Self::Right => write!(formatter, "right"),
        }
    }
}

/// Errors raised by [`Bst`](crate::tree::Bst) operations.
///
/// # Examples
///
/// ```rust
/// use fork_bst::error::BstError;
/// use fork_bst::tree::Bst;
///
/// let right = Bst::singleton(1, "one");
/// let error = Bst::try_node(5, "five", Bst::new(), right).unwrap_err();
/// assert!(matches!(error, BstError::InvariantViolation { .. }));
/// assert_eq!(
///     error.to_string(),
///     "right subtree of key 5 is not strictly bigger than the key"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BstError {
    /// A node was built with a child that does not respect the BST ordering.
    #[error("{side} subtree of key {key} is not strictly {} than the key", side_bound(.side))]
    InvariantViolation {
        /// Which child broke the bound.
        side: Side,
        /// The offending node key, rendered with `Debug`.
        key: String,
    },

    /// An in-order export did not fit in the buffer it was given.
    #[error("buffer too small: {required} slots required, {available} available")]
    BufferTooSmall {
        /// `start + size()` of the exported tree.
        required: usize,
        /// Length of the caller's buffer.
        available: usize,
    },
}

const fn side_bound(side: &Side) -> &'static str {
    match side {
        Side::Left => "smaller",
        Side::Right => "bigger",
    }
}

impl BstError {
    /// Builds an [`BstError::InvariantViolation`] for `key`.
    pub(crate) fn invariant_violation<K: std::fmt::Debug>(side: Side, key: &K) -> Self {
        Self::InvariantViolation {
            side,
            key: format!("{key:?}"),
        }
    }
}
