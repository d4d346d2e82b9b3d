//! Custom actions for the Order actor.
//!
//! Status changes are actions rather than plain updates because each one is
//! validated against the recorded history and produces a status event.

use crate::model::{OrderStatus, StatusEvent};
use chrono::{DateTime, Utc};

/// Custom actions for order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Records the order reaching `status` at `at`.
    ///
    /// # Errors
    /// Fails if `status` cannot follow the recorded history or `at` is older
    /// than the last recorded event.
    RecordStatus {
        status: OrderStatus,
        at: DateTime<Utc>,
    },
    /// Cancels the order. Allowed from any non-terminal status.
    Cancel { at: DateTime<Utc> },
    /// Returns the recorded status history, oldest first.
    StatusHistory,
}

/// Results from OrderActions
#[derive(Debug, Clone)]
pub enum OrderActionResult {
    /// The event that was recorded by `RecordStatus` or `Cancel`.
    Recorded(StatusEvent),
    /// Result of `StatusHistory`.
    History(Vec<StatusEvent>),
}
