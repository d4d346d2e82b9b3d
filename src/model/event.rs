use crate::model::{OrderId, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable record of one status transition of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

impl StatusEvent {
    pub fn new(order_id: OrderId, status: OrderStatus, timestamp: DateTime<Utc>) -> Self {
        Self {
            order_id,
            status,
            timestamp,
        }
    }
}
