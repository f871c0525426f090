//! # fork-bst
//!
//! A persistent binary search tree and an ordered table built on it.
//!
//! ## Overview
//!
//! - **[`tree::Bst`]**: an immutable binary search tree. `put` and the
//!   deletions return new trees that share every untouched subtree with the
//!   old one. Balancing is explicit: [`tree::Bst::balanced`] rebuilds the tree
//!   with height `floor(log2(size))`.
//! - **[`table::OrderedTable`]**: a key-value table delegating to a `Bst`,
//!   with `keys()` and `values()` exported as sorted sets.
//! - **[`error::BstError`]**: the errors raised for out-of-order node
//!   construction and undersized export buffers. Missing keys are reported
//!   as `None`, never as errors.
//!
//! ## Feature Flags
//!
//! - `arc`: share nodes through `Arc` so trees are `Send + Sync`
//! - `serde`: `Serialize`/`Deserialize` for trees, tables and entries
//! - `demo`: build the `bst-demo` binary
//! - `full`: `arc` and `serde`
//!
//! ## Example
//!
//! ```rust
//! use fork_bst::prelude::*;
//!
//! let t1 = Bst::new().put(30, "John");
//! let t2 = t1
//!     .put(40, "Mary")
//!     .put(25, "Peter")
//!     .put(37, "Monica")
//!     .put(34, "Nicolas")
//!     .put(31, "Martin");
//! assert_eq!(t1.size(), 1);
//! assert_eq!(t2.size(), 6);
//!
//! let t3 = t2.put(31, "Kathy");
//! assert_eq!(t3.size(), 6);
//! assert_eq!(t3.find(&31), Some(&"Kathy"));
//! assert!(t3.balanced().height() <= 2);
//!
//! let table = OrderedTable::from(t3);
//! assert!(table.contains_key(&37));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use fork_bst::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::BstError;
    pub use crate::table::OrderedTable;
    pub use crate::tree::{BalanceStrategy, Bst, Entry};
}

pub mod error;
pub mod table;
pub mod tree;
