//! Persistent binary search tree.
//!
//! This module provides [`Bst`], an immutable binary search tree whose
//! updates return new trees sharing unchanged subtrees with the old ones,
//! together with the [`Entry`] pairs it hands out and its iterators.
//!
//! # Structural Sharing
//!
//! A tree is a graph of reference-counted, never-mutated [`Node`]s. `put`
//! and the deletions rebuild the nodes on one root-to-leaf path and point
//! the rest of the new tree at the old nodes, so every earlier version stays
//! valid and unchanged.
//!
//! # Examples
//!
//! ```rust
//! use fork_bst::tree::Bst;
//!
//! let t1 = Bst::new().put(30, "John");
//! let t2 = t1.put(40, "Mary").put(25, "Peter");
//!
//! // Structural sharing: the original tree is preserved
//! assert_eq!(t1.size(), 1);
//! assert_eq!(t2.size(), 3);
//!
//! // Explicit, whole-tree rebalancing
//! let degenerate: Bst<i32, ()> = (0..7).map(|key| (key, ())).collect();
//! assert_eq!(degenerate.height(), 6);
//! assert_eq!(degenerate.balanced().height(), 2);
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type shared by tree nodes.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which lets trees cross threads but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub type ReferenceCounter<T> = std::sync::Arc<T>;

/// Reference-counted smart pointer type shared by tree nodes.
#[cfg(not(feature = "arc"))]
pub type ReferenceCounter<T> = std::rc::Rc<T>;

mod bst;
mod entry;
mod iter;
mod node;
mod render;

pub use bst::BalanceStrategy;
pub use bst::Bst;
pub use entry::Entry;
pub use iter::Iter;
pub use iter::Keys;
pub use iter::Values;
pub use node::Node;
pub use render::Fancy;

// Trees can only cross threads when nodes are shared through `Arc`.
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(Bst<i32, String>: Send, Sync);
#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(Bst<i32, String>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================
