//! Adapter between `notify` and the tree mirror.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use walkdir::WalkDir;

use super::error::WatchError;
use super::event::{FsOp, WatchEvent};

/// Watches a root directory and yields normalized [`WatchEvent`]s.
///
/// Watches are registered per directory (non-recursive), so directories
/// created later must be added through [`WatchAdapter::watch_new_directory`].
pub struct WatchAdapter {
    /// Root of the watched subtree.
    root: PathBuf,
    /// The underlying file watcher. `None` after [`WatchAdapter::close`].
    watcher: Option<RecommendedWatcher>,
    /// Raw events from the notify thread.
    event_rx: mpsc::Receiver<Event>,
    /// Backend errors from the notify thread.
    error_rx: mpsc::Receiver<notify::Error>,
    errors_open: bool,
    /// Normalized events not yet handed out.
    pending: VecDeque<WatchEvent>,
}

impl WatchAdapter {
    /// Open a watcher on `root` and every directory beneath it.
    ///
    /// Any failure here is fatal to the caller: serving without a watched
    /// root would leave the page silently stale.
    pub fn new(root: &Path, channel_capacity: usize) -> Result<Self, WatchError> {
        let (event_tx, event_rx) = mpsc::channel(channel_capacity.max(1));
        let (error_tx, error_rx) = mpsc::channel(channel_capacity.max(1));

        // Runs on the notify thread, outside the tokio runtime
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = event_tx.blocking_send(event);
            }
            Err(e) => {
                let _ = error_tx.blocking_send(e);
            }
        })?;

        let mut adapter = Self {
            root: root.to_path_buf(),
            watcher: Some(watcher),
            event_rx,
            error_rx,
            errors_open: true,
            pending: VecDeque::new(),
        };

        let mut count = 0usize;
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| WatchError::PathWatchFailed {
                path: e.path().unwrap_or(root).to_path_buf(),
                reason: e.to_string(),
            })?;
            if entry.file_type().is_dir() {
                adapter.watch_directory(entry.path())?;
                count += 1;
            }
        }

        crate::log_event!(
            "watcher",
            "monitoring",
            "{count} directories under {}",
            root.display()
        );

        Ok(adapter)
    }

    /// Register a directory that appeared after startup, plus any
    /// subdirectories created along with it.
    ///
    /// Returns the number of directories now watched. Fails only if `dir`
    /// itself cannot be watched; nested failures are logged.
    pub fn watch_new_directory(&mut self, dir: &Path) -> Result<usize, WatchError> {
        self.watch_directory(dir)?;
        let mut count = 1;

        for entry in WalkDir::new(dir).min_depth(1) {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => {
                    match self.watch_directory(entry.path()) {
                        Ok(()) => count += 1,
                        Err(e) => tracing::warn!("{e}"),
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("cannot walk {}: {e}", dir.display()),
            }
        }

        Ok(count)
    }

    fn watch_directory(&mut self, dir: &Path) -> Result<(), WatchError> {
        let watcher = self.watcher.as_mut().ok_or_else(|| WatchError::PathWatchFailed {
            path: dir.to_path_buf(),
            reason: "watcher is closed".to_string(),
        })?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;

        crate::debug_event!("watcher", "watching", "{}", dir.display());
        Ok(())
    }

    /// Wait for the next normalized event.
    ///
    /// Returns `None` once the event channel is closed and drained.
    pub async fn recv(&mut self) -> Option<WatchEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            tokio::select! {
                event = self.event_rx.recv() => match event {
                    Some(event) => self.classify(event),
                    None => {
                        crate::debug_event!("watcher", "event channel closed");
                        return None;
                    }
                },
                err = self.error_rx.recv(), if self.errors_open => match err {
                    Some(e) => {
                        let err = WatchError::EventError { details: e.to_string() };
                        tracing::warn!("{err}");
                    }
                    None => self.errors_open = false,
                },
            }
        }
    }

    /// Take an already-queued event without waiting.
    pub fn try_recv(&mut self) -> Option<WatchEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            match self.event_rx.try_recv() {
                Ok(event) => self.classify(event),
                Err(_) => return None,
            }
        }
    }

    /// Stop watching. Pending events are still delivered, then `recv`
    /// returns `None`.
    pub fn close(&mut self) {
        if self.watcher.take().is_some() {
            crate::debug_event!("watcher", "closed");
        }
    }

    #[cfg(test)]
    pub(crate) fn push_event(&mut self, event: WatchEvent) {
        self.pending.push_back(event);
    }

    fn classify(&mut self, event: Event) {
        // The kernel queue overflowed and events were lost: re-walk the
        // whole root for unwatched directories, then rebuild.
        if event.need_rescan() {
            tracing::warn!("event queue overflowed, rescanning {}", self.root.display());
            self.pending.push_back(WatchEvent::NewDirectory(self.root.clone()));
            self.pending.push_back(WatchEvent::Changed);
            return;
        }

        let op = FsOp::from_kind(&event.kind);
        if !op.triggers_rebuild() {
            crate::debug_event!("watcher", "ignored", "{:?} {:?}", event.kind, event.paths);
            return;
        }

        crate::debug_event!("watcher", "changed", "{op:?} {:?}", event.paths);

        // Directories first so they are watched before the rebuild scans them
        if op.may_add_directory() {
            for path in event.paths {
                if path.is_dir() {
                    self.pending.push_back(WatchEvent::NewDirectory(path));
                }
            }
        }
        self.pending.push_back(WatchEvent::Changed);
    }
}
