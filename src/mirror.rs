//! Rebuild trigger: keeps the [`TreeStore`] in step with the filesystem.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::subscribers::{NotifyReport, SubscriberRegistry, Subscription};
use crate::tree::{self, TreeError, TreeNode, TreeStore};
use crate::watcher::{WatchAdapter, WatchError, WatchEvent};

/// Startup failures. Steady-state errors are logged instead.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Cannot resolve root {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Watch(#[from] WatchError),
}

/// Live mirror of a directory tree.
///
/// Owns the snapshot store and the subscriber registry. Cloning shares both.
#[derive(Debug, Clone)]
pub struct TreeMirror {
    root: Arc<PathBuf>,
    store: Arc<TreeStore>,
    subscribers: SubscriberRegistry,
}

impl TreeMirror {
    /// Resolve `root` and build the initial snapshot.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, MirrorError> {
        let root = root.as_ref();
        let root = std::fs::canonicalize(root).map_err(|source| MirrorError::Root {
            path: root.to_path_buf(),
            source,
        })?;

        let initial = tree::build(&root)?;
        crate::log_event!(
            "mirror",
            "loaded",
            "{} files in {} directories",
            initial.file_count(),
            initial.dir_count()
        );

        Ok(Self {
            root: Arc::new(root),
            store: Arc::new(TreeStore::new(initial)),
            subscribers: SubscriberRegistry::new(),
        })
    }

    /// Canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The snapshot current right now.
    pub fn current(&self) -> Arc<TreeNode> {
        self.store.current()
    }

    pub fn subscribers(&self) -> &SubscriberRegistry {
        &self.subscribers
    }

    /// Register a new live client.
    pub fn subscribe(&self) -> Subscription {
        self.subscribers.subscribe()
    }

    /// Open a watch adapter over this mirror's root.
    pub fn watch(&self, channel_capacity: usize) -> Result<WatchAdapter, MirrorError> {
        Ok(WatchAdapter::new(&self.root, channel_capacity)?)
    }

    /// Rescan the root, swap the result in and ping subscribers.
    ///
    /// On error the previous snapshot stays and nobody is notified.
    pub fn rebuild(&self) -> Result<NotifyReport, TreeError> {
        let tree = tree::build(&self.root)?;
        crate::debug_event!(
            "mirror",
            "rebuilt",
            "{} files in {} directories",
            tree.file_count(),
            tree.dir_count()
        );
        self.store.replace(tree);
        Ok(self.subscribers.notify_all())
    }

    /// Consume watch events until the adapter is closed.
    pub async fn run(&self, mut adapter: WatchAdapter) {
        crate::log_event!("mirror", "started");

        while let Some(event) = adapter.recv().await {
            match event {
                WatchEvent::NewDirectory(dir) => self.register_directory(&mut adapter, &dir),
                WatchEvent::Changed => {
                    // Fold anything already queued into this rebuild
                    while let Some(queued) = adapter.try_recv() {
                        if let WatchEvent::NewDirectory(dir) = queued {
                            self.register_directory(&mut adapter, &dir);
                        }
                    }
                    self.rebuild_in_background().await;
                }
            }
        }

        crate::log_event!("mirror", "stopped");
    }

    fn register_directory(&self, adapter: &mut WatchAdapter, dir: &Path) {
        match adapter.watch_new_directory(dir) {
            Ok(count) => {
                crate::debug_event!("mirror", "watching", "{} (+{count})", dir.display())
            }
            Err(e) => tracing::warn!("{e}"),
        }
    }

    async fn rebuild_in_background(&self) {
        let mirror = self.clone();
        match tokio::task::spawn_blocking(move || mirror.rebuild()).await {
            Ok(Ok(report)) => {
                crate::debug_event!("mirror", "notified", "{} subscribers", report.delivered)
            }
            Ok(Err(e)) => tracing::error!("rebuild failed, keeping previous tree: {e}"),
            Err(e) => tracing::error!("rebuild task failed: {e}"),
        }
    }
}
