//! Collaborator interfaces consumed by the order tracker.
//!
//! The tracker never reaches for a shared backend client. Both collaborators are
//! passed in at construction, which lets tests substitute fakes:
//!
//! - [`OrderStore`] - snapshot and history reads
//! - [`LiveFeed`] - push subscriptions for row changes

use crate::model::{OrderId, OrderSnapshot, StatusEvent};
use crate::realtime::{ChangeListener, SubscriptionFilter, SubscriptionHandle};
use async_trait::async_trait;
use std::sync::Arc;

/// Errors returned by an [`OrderStore`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// No order exists with the requested id.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The store could not be reached or failed to answer.
    #[error("Order store unavailable: {0}")]
    Transport(String),
}

/// Read access to orders and their recorded status events.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Current status, estimated delivery and placement time of an order.
    async fn get_order(&self, order_id: &OrderId) -> Result<OrderSnapshot, StoreError>;

    /// Recorded status events of an order, oldest first.
    async fn list_status_events(&self, order_id: &OrderId) -> Result<Vec<StatusEvent>, StoreError>;
}

/// Push subscriptions for row changes.
pub trait LiveFeed: Send + Sync {
    /// Registers `listener` for changes matching `filter`. The caller owns the
    /// returned handle and must unsubscribe it.
    fn subscribe(
        &self,
        filter: SubscriptionFilter,
        listener: Arc<dyn ChangeListener>,
    ) -> SubscriptionHandle;
}
