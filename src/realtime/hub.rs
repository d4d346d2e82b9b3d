//! # Change Feed Hub
//!
//! In-process fan-out of change notifications. Every subscription owns a
//! broadcast receiver and a forwarding task that applies the subscription's
//! filter and hands matching notifications to its listener, one at a time and
//! in the order they were published.

use crate::backend::LiveFeed;
use crate::realtime::{ChangeEvent, SubscriptionFilter};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Observer for pushed change notifications.
#[async_trait]
pub trait ChangeListener: Send + Sync {
    async fn on_change(&self, change: ChangeEvent);
}

/// Cloneable publisher/subscriber endpoint of the change feed.
#[derive(Clone)]
pub struct RealtimeHub {
    sender: broadcast::Sender<ChangeEvent>,
    active: Arc<AtomicUsize>,
    next_subscription: Arc<AtomicU64>,
}

impl RealtimeHub {
    /// Creates a hub whose subscribers may fall `capacity` notifications behind
    /// before they start missing pushes.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            active: Arc::new(AtomicUsize::new(0)),
            next_subscription: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Publishes a notification to every live subscription.
    ///
    /// Returns the number of subscriptions the notification was queued for.
    pub fn publish(&self, change: ChangeEvent) -> usize {
        debug!(table = %change.table, kind = %change.kind, "Publish");
        match self.sender.send(change) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!("No subscribers");
                0
            }
        }
    }

    /// Registers `listener` for notifications matching `filter`.
    ///
    /// Notifications published after this call returns are delivered until the
    /// returned handle is unsubscribed or dropped.
    pub fn subscribe(
        &self,
        filter: SubscriptionFilter,
        listener: Arc<dyn ChangeListener>,
    ) -> SubscriptionHandle {
        let id = self.next_subscription.fetch_add(1, Ordering::SeqCst);
        let mut receiver = self.sender.subscribe();
        self.active.fetch_add(1, Ordering::SeqCst);
        info!(subscription = id, %filter, "Subscribed");

        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(change) => {
                        if filter.matches(&change) {
                            listener.on_change(change).await;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(subscription = id, skipped, "Subscriber lagged, pushes were missed");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!(subscription = id, "Feed closed");
        });

        SubscriptionHandle {
            id,
            task: Some(task),
            active: self.active.clone(),
        }
    }

    /// Number of subscriptions that have not been unsubscribed yet.
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl LiveFeed for RealtimeHub {
    fn subscribe(
        &self,
        filter: SubscriptionFilter,
        listener: Arc<dyn ChangeListener>,
    ) -> SubscriptionHandle {
        RealtimeHub::subscribe(self, filter, listener)
    }
}

/// Registration of one listener. The owner must unsubscribe it; dropping the
/// handle does so as well.
#[derive(Debug)]
pub struct SubscriptionHandle {
    id: u64,
    task: Option<tokio::task::JoinHandle<()>>,
    active: Arc<AtomicUsize>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Stops delivery to the listener.
    ///
    /// Returns `false` if the handle was already unsubscribed.
    pub fn unsubscribe(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                self.active.fetch_sub(1, Ordering::SeqCst);
                info!(subscription = self.id, "Unsubscribed");
                true
            }
            None => false,
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
