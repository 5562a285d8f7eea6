//! In-memory mirror of a directory tree.
//!
//! A [`TreeNode`] is an immutable snapshot built by [`build`]. The
//! [`TreeStore`] holds the snapshot that is current right now and swaps in
//! a new one after every rebuild.
//!
//! # Architecture
//!
//! ```text
//! build(root) ──> TreeNode ──> TreeStore::replace
//!                                   │
//!                      current() ───┴──> Arc<TreeNode> (readers)
//! ```

mod error;
mod node;
mod store;

pub use error::TreeError;
pub use node::{TreeNode, build};
pub use store::TreeStore;
