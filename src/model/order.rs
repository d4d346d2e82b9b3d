use crate::model::{OrderStatus, StatusEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for orders (e.g. `ORD-1001`). Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId(String);

/// Returned when an order identifier is empty.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Order id must not be empty")]
pub struct InvalidOrderId;

impl OrderId {
    /// Parses an identifier, rejecting empty or whitespace-only input.
    pub fn parse(id: impl Into<String>) -> Result<Self, InvalidOrderId> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(InvalidOrderId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrderId {
    type Error = InvalidOrderId;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::parse(id)
    }
}

/// Numbered ids generated by the order store: `1001` becomes `ORD-1001`.
impl From<u64> for OrderId {
    fn from(n: u64) -> Self {
        Self(format!("ORD-{}", n))
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents a customer order as held by the order store.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](crate::framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](crate::framework::ResourceActor).
///
/// See [`impl ActorEntity for OrderRecord`](#impl-ActorEntity-for-OrderRecord) for details on:
/// - Creation parameters ([`OrderCreate`])
/// - Update parameters ([`OrderUpdate`])
/// - Custom actions ([`OrderAction`](crate::order_actor::OrderAction))
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: OrderId,
    pub customer_id: String,
    pub total: f64,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    /// Recorded status events, oldest first.
    pub history: Vec<StatusEvent>,
}

/// Payload for placing a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer_id: String,
    pub total: f64,
    /// Defaults to the time the store accepts the order.
    pub placed_at: Option<DateTime<Utc>>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Payload for updating an existing order.
///
/// `estimated_delivery` replaces the stored value; `None` clears it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Read projection of an order: what a tracking screen needs besides history.
///
/// This is also the record carried by `orders` change notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub placed_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Creates a new order in the `processing` state with no recorded history.
    pub fn new(id: OrderId, params: OrderCreate) -> Self {
        Self {
            id,
            customer_id: params.customer_id,
            total: params.total,
            status: OrderStatus::Processing,
            placed_at: params.placed_at.unwrap_or_else(Utc::now),
            estimated_delivery: params.estimated_delivery,
            history: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            order_id: self.id.clone(),
            status: self.status,
            estimated_delivery: self.estimated_delivery,
            placed_at: self.placed_at,
        }
    }

    /// The most recently recorded event, if any.
    pub fn last_event(&self) -> Option<&StatusEvent> {
        self.history.last()
    }
}
