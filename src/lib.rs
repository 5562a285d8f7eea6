//! Live-updating web view of a directory tree.
//!
//! The core is the tree mirror: [`tree`] builds immutable snapshots,
//! [`watcher`] turns filesystem events into rebuild signals, [`mirror`]
//! swaps new snapshots into the store and [`subscribers`] pings every live
//! client. [`render`] and [`server`] project snapshots to HTML and HTTP.

pub mod checksums;
pub mod cli;
pub mod config;
pub mod logging;
pub mod mirror;
pub mod render;
#[cfg(feature = "http-server")]
pub mod server;
pub mod subscribers;
pub mod tree;
pub mod watcher;

pub use config::Settings;
pub use mirror::{MirrorError, TreeMirror};
pub use subscribers::{SubscriberRegistry, Subscription};
pub use tree::{TreeError, TreeNode, TreeStore};
pub use watcher::{WatchAdapter, WatchError, WatchEvent};
