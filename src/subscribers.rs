//! Fan-out of "tree changed" pings to live clients.
//!
//! Every subscriber owns a one-slot channel. [`SubscriberRegistry::notify_all`]
//! uses `try_send`, so a subscriber that has not consumed its previous ping
//! simply keeps that one; the notifier never waits on a slow client.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Identifier of a registered sink.
pub type SubscriberId = u64;

#[derive(Debug, Default)]
struct Sinks {
    next_id: SubscriberId,
    senders: HashMap<SubscriberId, mpsc::Sender<()>>,
}

/// Outcome of a single [`SubscriberRegistry::notify_all`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    /// Sinks that received a fresh ping.
    pub delivered: usize,
    /// Sinks that already held an unread ping.
    pub coalesced: usize,
    /// Sinks whose receiver was gone and were pruned.
    pub pruned: usize,
}

/// Registry of active notification sinks.
///
/// Cloning shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct SubscriberRegistry {
    sinks: Arc<Mutex<Sinks>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new sink with room for exactly one pending ping.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(1);
        let mut sinks = self.sinks.lock();
        let id = sinks.next_id;
        sinks.next_id += 1;
        sinks.senders.insert(id, tx);
        let count = sinks.senders.len();
        drop(sinks);

        crate::debug_event!("subscribers", "subscribed", "#{id} ({count} active)");

        Subscription {
            id,
            receiver: rx,
            registry: Arc::downgrade(&self.sinks),
        }
    }

    /// Remove a sink. Returns `false` if it was already removed.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        remove_sink(&self.sinks, subscription.id)
    }

    /// Ping every registered sink without blocking.
    pub fn notify_all(&self) -> NotifyReport {
        let mut report = NotifyReport::default();
        let mut sinks = self.sinks.lock();

        sinks.senders.retain(|_, tx| match tx.try_send(()) {
            Ok(()) => {
                report.delivered += 1;
                true
            }
            Err(TrySendError::Full(())) => {
                report.coalesced += 1;
                true
            }
            Err(TrySendError::Closed(())) => {
                report.pruned += 1;
                false
            }
        });
        drop(sinks);

        crate::debug_event!(
            "subscribers",
            "notified",
            "{} delivered, {} coalesced, {} pruned",
            report.delivered,
            report.coalesced,
            report.pruned
        );
        report
    }

    /// Number of active sinks.
    pub fn len(&self) -> usize {
        self.sinks.lock().senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn remove_sink(sinks: &Mutex<Sinks>, id: SubscriberId) -> bool {
    let removed = sinks.lock().senders.remove(&id).is_some();
    if removed {
        crate::debug_event!("subscribers", "unsubscribed", "#{id}");
    }
    removed
}

/// A live subscriber: receives pings until unsubscribed or dropped.
///
/// Dropping the subscription removes its sink from the registry, which is how
/// a disconnected client is cleaned up.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<()>,
    registry: Weak<Mutex<Sinks>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next ping.
    ///
    /// Returns `false` once the sink has been removed and no ping is pending.
    pub async fn changed(&mut self) -> bool {
        self.receiver.recv().await.is_some()
    }

    /// Consume a pending ping if there is one.
    pub fn try_changed(&mut self) -> bool {
        self.receiver.try_recv().is_ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(sinks) = self.registry.upgrade() {
            remove_sink(&sinks, self.id);
        }
    }
}
