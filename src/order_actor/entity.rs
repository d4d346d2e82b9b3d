//! ActorEntity trait implementation for [`OrderRecord`].
//!
//! Every successful mutation is announced on the [`RealtimeHub`] passed to the
//! actor as its context:
//!
//! | Operation | Notifications |
//! |-----------|---------------|
//! | create | `orders/insert` |
//! | update | `orders/update` |
//! | record status / cancel | `status_events/insert`, then `orders/update` |

use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::framework::ActorEntity;
use crate::model::{OrderCreate, OrderId, OrderRecord, OrderStatus, OrderUpdate, StatusEvent};
use crate::realtime::{ChangeEvent, ChangeKind, RealtimeHub, Table};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

#[async_trait]
impl ActorEntity for OrderRecord {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = RealtimeHub;
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        if params.customer_id.trim().is_empty() {
            return Err(OrderError::ValidationError("customer_id must not be empty".into()));
        }
        if !params.total.is_finite() || params.total < 0.0 {
            return Err(OrderError::ValidationError(format!("invalid total {}", params.total)));
        }
        Ok(Self::new(id, params))
    }

    async fn on_create(&mut self, hub: &RealtimeHub) -> Result<(), Self::Error> {
        publish(hub, Table::Orders, ChangeKind::Insert, &self.snapshot());
        Ok(())
    }

    /// Replaces the estimated delivery time.
    async fn on_update(&mut self, update: OrderUpdate, hub: &RealtimeHub) -> Result<(), Self::Error> {
        self.estimated_delivery = update.estimated_delivery;
        publish(hub, Table::Orders, ChangeKind::Update, &self.snapshot());
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        hub: &RealtimeHub,
    ) -> Result<OrderActionResult, Self::Error> {
        match action {
            OrderAction::RecordStatus { status, at } => {
                let event = self.record_status(status, at)?;
                announce(hub, self, &event);
                Ok(OrderActionResult::Recorded(event))
            }
            OrderAction::Cancel { at } => {
                let event = self.record_status(OrderStatus::Cancelled, at)?;
                announce(hub, self, &event);
                Ok(OrderActionResult::Recorded(event))
            }
            OrderAction::StatusHistory => Ok(OrderActionResult::History(self.history.clone())),
        }
    }
}

impl OrderRecord {
    /// Appends a status event, keeping the history a valid prefix of the
    /// delivery sequence with non-decreasing timestamps.
    fn record_status(&mut self, status: OrderStatus, at: DateTime<Utc>) -> Result<StatusEvent, OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::TerminalStatus(self.status));
        }
        let last = self.last_event();
        if let Some(last) = last {
            if at < last.timestamp {
                return Err(OrderError::OutOfOrder {
                    at: at.to_rfc3339(),
                    last: last.timestamp.to_rfc3339(),
                });
            }
        }
        if !OrderStatus::can_follow(last.map(|e| e.status), status) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: status,
            });
        }

        let event = StatusEvent::new(self.id.clone(), status, at);
        self.history.push(event.clone());
        self.status = status;
        Ok(event)
    }
}

fn announce(hub: &RealtimeHub, order: &OrderRecord, event: &StatusEvent) {
    publish(hub, Table::StatusEvents, ChangeKind::Insert, event);
    publish(hub, Table::Orders, ChangeKind::Update, &order.snapshot());
}

fn publish<R: Serialize>(hub: &RealtimeHub, table: Table, kind: ChangeKind, record: &R) {
    match serde_json::to_value(record) {
        Ok(record) => {
            let receivers = hub.publish(ChangeEvent::new(table, kind, record));
            debug!(%table, %kind, receivers, "Change published");
        }
        Err(e) => warn!(%table, %kind, error = %e, "Could not encode change record"),
    }
}
