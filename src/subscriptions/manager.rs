//! Subscription manager for broadcasting ledger events.

use crate::state::MergeReport;
use crate::types::StateSummary;
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{
    DropReason, LedgerEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
};

/// Internal subscription state.
///
/// The channel holds one slot more than `config.buffer_size`, kept free
/// for the final [`LedgerEvent::Dropped`] notice.
struct Subscription {
    config: SubscriptionConfig,
    sender: Sender<LedgerEvent>,
}

impl Subscription {
    /// Try to send an event. Returns false if the buffer is full or the
    /// receiver is gone.
    fn try_send(&self, event: LedgerEvent) -> bool {
        if self.sender.len() >= self.config.buffer_size {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }

    fn matches_operation(&self, name: &str) -> bool {
        match self.config.filter.operations {
            Some(ref names) => names.iter().any(|n| n == name),
            None => true,
        }
    }

    fn wants_imports(&self) -> bool {
        !self.config.filter.exclude_imports
    }
}

/// Manages subscriptions and broadcasts events.
pub struct SubscriptionManager {
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
    next_id: AtomicU64,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a new subscription. Events start with the next change.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(config.buffer_size.saturating_add(1));

        self.subscriptions
            .write()
            .insert(id, Subscription { config, sender });

        SubscriptionHandle { id, receiver }
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if let Some(sub) = self.subscriptions.write().remove(&id) {
            let _ = sub.sender.try_send(LedgerEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Broadcast a snapshot replacement caused by `operation`.
    pub fn broadcast_replaced(&self, operation: &str, summary: StateSummary) {
        let event = LedgerEvent::Replaced {
            operation: operation.to_string(),
            summary,
        };
        self.broadcast(|sub| sub.matches_operation(operation), event);
    }

    /// Broadcast a completed import.
    pub fn broadcast_imported(&self, report: MergeReport, summary: StateSummary) {
        let event = LedgerEvent::Imported { report, summary };
        self.broadcast(Subscription::wants_imports, event);
    }

    /// Send to every matching subscriber, dropping those that cannot keep up.
    fn broadcast<F>(&self, filter: F, event: LedgerEvent)
    where
        F: Fn(&Subscription) -> bool,
    {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if filter(sub) && !sub.try_send(event.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for id in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    tracing::warn!(subscription = id.0, "dropping slow subscriber");
                    let _ = sub.sender.try_send(LedgerEvent::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}
