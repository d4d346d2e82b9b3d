use crate::model::{OrderId, OrderStatus, StatusEvent};
use chrono::{DateTime, Utc};

/// Lifecycle of a view.
///
/// `Uninitialized → Loading → {Ready | Errored}`. Live updates mutate a `Ready`
/// view in place without changing its state, and nothing leads back to `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Errored,
}

/// In-memory projection of one order's delivery status, owned by one tracker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderStatusView {
    pub order_id: Option<OrderId>,
    pub state: ViewState,
    /// Status of the most recent event.
    pub current_status: Option<OrderStatus>,
    /// Status events in the order they were received, oldest first.
    pub status_history: Vec<StatusEvent>,
    /// Taken from the order record, never computed.
    pub estimated_delivery: Option<DateTime<Utc>>,
    /// Message describing why loading failed.
    pub error: Option<String>,
}

/// One row of the tracking timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineStep {
    pub status: OrderStatus,
    /// When the order first reached this status, `None` if it has not yet.
    pub reached_at: Option<DateTime<Utc>>,
}

impl OrderStatusView {
    pub fn loading(&self) -> bool {
        self.state == ViewState::Loading
    }

    pub fn is_ready(&self) -> bool {
        self.state == ViewState::Ready
    }

    /// True once the order was delivered or cancelled.
    pub fn is_terminal(&self) -> bool {
        self.current_status.is_some_and(|s| s.is_terminal())
    }

    /// The delivery sequence with the time each step was reached. A cancelled
    /// order gets a trailing `cancelled` row.
    pub fn timeline(&self) -> Vec<TimelineStep> {
        let reached = |status: OrderStatus| {
            self.status_history
                .iter()
                .find(|e| e.status == status)
                .map(|e| e.timestamp)
        };

        let mut steps: Vec<TimelineStep> = OrderStatus::SEQUENCE
            .into_iter()
            .map(|status| TimelineStep {
                status,
                reached_at: reached(status),
            })
            .collect();

        if let Some(cancelled_at) = reached(OrderStatus::Cancelled) {
            steps.push(TimelineStep {
                status: OrderStatus::Cancelled,
                reached_at: Some(cancelled_at),
            });
        }
        steps
    }
}
