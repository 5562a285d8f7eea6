//! Shared slot holding the current snapshot.

use std::sync::Arc;

use parking_lot::RwLock;

use super::TreeNode;

/// Holds the snapshot that readers should render right now.
///
/// Readers take a cheap `Arc` clone and never observe a half-built tree;
/// a replacement only swaps the pointer while holding the write lock.
#[derive(Debug)]
pub struct TreeStore {
    current: RwLock<Arc<TreeNode>>,
}

impl TreeStore {
    /// Create a store seeded with the initial snapshot.
    pub fn new(initial: TreeNode) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The snapshot current at the time of the call.
    pub fn current(&self) -> Arc<TreeNode> {
        Arc::clone(&self.current.read())
    }

    /// Swap in a new snapshot.
    pub fn replace(&self, tree: TreeNode) {
        let tree = Arc::new(tree);
        let previous = std::mem::replace(&mut *self.current.write(), tree);
        // dropped outside the lock
        drop(previous);
    }
}
