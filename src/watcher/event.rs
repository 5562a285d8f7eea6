//! Normalized watch events.

use std::path::PathBuf;

use notify::EventKind;
use notify::event::ModifyKind;

/// Structural operation carried by a raw notify event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Create,
    Remove,
    Rename,
    /// Content or metadata edit in place.
    Modify,
    /// Access, unknown, or backend-specific.
    Other,
}

impl FsOp {
    /// Classify a raw notify event kind.
    pub fn from_kind(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => FsOp::Create,
            EventKind::Remove(_) => FsOp::Remove,
            EventKind::Modify(ModifyKind::Name(_)) => FsOp::Rename,
            EventKind::Modify(_) => FsOp::Modify,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => FsOp::Other,
        }
    }

    /// Whether this operation changes the shape of the tree.
    pub fn triggers_rebuild(self) -> bool {
        match self {
            FsOp::Create | FsOp::Remove | FsOp::Rename => true,
            FsOp::Modify | FsOp::Other => false,
        }
    }

    /// Whether a directory may have appeared at the event path.
    pub fn may_add_directory(self) -> bool {
        match self {
            FsOp::Create | FsOp::Rename => true,
            FsOp::Remove | FsOp::Modify | FsOp::Other => false,
        }
    }
}

/// Signal emitted by [`WatchAdapter`](super::WatchAdapter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Something was created, removed or renamed; the tree must be rebuilt.
    Changed,
    /// A directory appeared and needs its own watch.
    NewDirectory(PathBuf),
}
