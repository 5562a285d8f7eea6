//! Filesystem watching for the tree mirror.
//!
//! This module wraps a single `notify::RecommendedWatcher` and turns its raw
//! events into the two signals the mirror cares about.
//!
//! # Architecture
//!
//! ```text
//! notify callback thread
//!   - events  ──> mpsc (bounded)
//!   - errors  ──> mpsc (bounded)
//!         |
//!   WatchAdapter::recv
//!   - FsOp classification
//!   - WatchEvent::{NewDirectory, Changed}
//! ```

mod adapter;
mod error;
mod event;

pub use adapter::WatchAdapter;
pub use error::WatchError;
pub use event::{FsOp, WatchEvent};
