use crate::model::{record_order_id, OrderId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;

/// Table a change notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Orders,
    StatusEvents,
}

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
}

/// A pushed notification: a row of `table` was inserted or updated.
///
/// `record` is the changed row exactly as the transport delivered it. Consumers
/// parse it with the helpers in [`crate::model::payload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    pub record: Value,
}

impl ChangeEvent {
    pub fn new(table: Table, kind: ChangeKind, record: Value) -> Self {
        Self { table, kind, record }
    }
}

/// Selects the notifications one subscription is interested in.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionFilter {
    pub table: Table,
    pub kind: ChangeKind,
    pub order_id: OrderId,
}

impl SubscriptionFilter {
    /// New status events recorded for `order_id`.
    pub fn status_inserts(order_id: OrderId) -> Self {
        Self {
            table: Table::StatusEvents,
            kind: ChangeKind::Insert,
            order_id,
        }
    }

    /// Updates to the order record of `order_id`.
    pub fn order_updates(order_id: OrderId) -> Self {
        Self {
            table: Table::Orders,
            kind: ChangeKind::Update,
            order_id,
        }
    }

    pub fn matches(&self, change: &ChangeEvent) -> bool {
        change.table == self.table
            && change.kind == self.kind
            && record_order_id(&change.record) == Some(self.order_id.as_str())
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Table::Orders => f.write_str("orders"),
            Table::StatusEvents => f.write_str("status_events"),
        }
    }
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Insert => f.write_str("insert"),
            ChangeKind::Update => f.write_str("update"),
        }
    }
}

impl Display for SubscriptionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} order_id={}", self.table, self.kind, self.order_id)
    }
}
