//! # Order Tracker
//!
//! Keeps an [`OrderStatusView`] of one order current for a tracking screen.
//!
//! ## Data Flow
//!
//! 1. [`OrderTracker::open`] opens two subscriptions on the [`LiveFeed`]:
//!    inserted status events and updates of the order record. Pushes are
//!    held back until the initial load has landed.
//! 2. The order snapshot and the status history are read concurrently.
//! 3. Once the view is `Ready`, held-back pushes are replayed. Inserted events
//!    the history already contains are skipped, and any number of held-back
//!    order updates collapse into one snapshot read.
//! 4. From then on an inserted event is appended to the history and becomes
//!    the current status. An order update triggers a fresh snapshot read that
//!    overwrites the current status and the estimated delivery, leaving
//!    history alone.
//! 5. [`OrderTracker::close`] (or dropping the tracker) releases both
//!    subscriptions.
//!
//! ## Failure Handling
//!
//! Failures of the initial reads end in `Errored` with a message in
//! [`OrderStatusView::error`]. Nothing is retried. Failures while handling a
//! push (malformed record, failed re-read) are logged and the view keeps its
//! last state.
//!
//! Live events are applied in the order the feed delivers them. They are not
//! reordered or deduplicated once the view is `Ready`.
//!
//! ## Observing the View
//!
//! The view lives in a [`tokio::sync::watch`] channel. Presentation code can
//! take a snapshot with [`OrderTracker::view`] or re-render on every change
//! through [`OrderTracker::watch`].

mod view;

pub use view::*;

use crate::backend::{LiveFeed, OrderStore};
use crate::model::{parse_order_change, parse_status_event, OrderId, OrderSnapshot, StatusEvent};
use crate::realtime::{ChangeEvent, ChangeListener, SubscriptionFilter, SubscriptionHandle, Table};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Synchronizes one order's status view with the backend.
pub struct OrderTracker {
    shared: Arc<TrackerShared>,
    feed: Arc<dyn LiveFeed>,
    subscriptions: Mutex<Vec<SubscriptionHandle>>,
}

/// State reachable from the live listeners.
struct TrackerShared {
    store: Arc<dyn OrderStore>,
    view: watch::Sender<OrderStatusView>,
    closed: AtomicBool,
    /// Pushes received before the initial load landed. `None` once replayed.
    held_back: Mutex<Option<Vec<ChangeEvent>>>,
}

impl OrderTracker {
    pub fn new(store: Arc<dyn OrderStore>, feed: Arc<dyn LiveFeed>) -> Self {
        let (view, _) = watch::channel(OrderStatusView::default());
        Self {
            shared: Arc::new(TrackerShared {
                store,
                view,
                closed: AtomicBool::new(false),
                held_back: Mutex::new(Some(Vec::new())),
            }),
            feed,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Loads the order and starts following its live updates.
    ///
    /// Never fails: problems are reported through the returned view's `state`
    /// and `error`. Only the first call on a tracker does anything.
    #[instrument(skip(self))]
    pub async fn open(&self, order_id: &str) -> OrderStatusView {
        if self.is_closed() {
            warn!("Tracker already closed");
            return self.view();
        }

        let started = self.shared.view.send_if_modified(|view| {
            if view.state != ViewState::Uninitialized {
                return false;
            }
            view.state = ViewState::Loading;
            true
        });
        if !started {
            warn!(state = ?self.view().state, "Tracker already opened");
            return self.view();
        }

        let order_id = match OrderId::parse(order_id) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Rejected order id");
                self.shared.fail(e.to_string());
                return self.view();
            }
        };
        self.shared
            .view
            .send_modify(|view| view.order_id = Some(order_id.clone()));
        self.subscribe(&order_id);

        let store = &self.shared.store;
        let (snapshot, history) = tokio::join!(
            store.get_order(&order_id),
            store.list_status_events(&order_id)
        );

        if self.is_closed() {
            debug!("Closed while loading, results discarded");
            return self.view();
        }

        match snapshot.and_then(|snapshot| history.map(|history| (snapshot, history))) {
            Ok((snapshot, history)) => {
                let refresh = self.shared.load_and_replay(&order_id, snapshot, history);
                if refresh {
                    self.shared.refresh_snapshot(&order_id).await;
                }
            }
            Err(e) => {
                warn!(error = %e, "Initial load failed");
                self.release_subscriptions();
                self.shared.fail(e.to_string());
                return self.view();
            }
        }

        let view = self.view();
        info!(
            current_status = ?view.current_status,
            events = view.status_history.len(),
            "Tracker ready"
        );
        view
    }

    /// Releases the live subscriptions. Safe to call any number of times,
    /// including before `open` has finished.
    pub fn close(&self) {
        let first = !self.shared.closed.swap(true, Ordering::SeqCst);
        self.release_subscriptions();
        if first {
            info!(order_id = ?self.view().order_id, "Tracker closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Current contents of the view.
    pub fn view(&self) -> OrderStatusView {
        self.shared.view.borrow().clone()
    }

    /// Receiver that is notified on every change of the view.
    pub fn watch(&self) -> watch::Receiver<OrderStatusView> {
        self.shared.view.subscribe()
    }

    fn release_subscriptions(&self) {
        let mut subscriptions = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for mut handle in subscriptions.drain(..) {
            handle.unsubscribe();
        }
    }

    fn subscribe(&self, order_id: &OrderId) {
        let mut subscriptions = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // close() flips the flag before taking the lock
        if self.is_closed() {
            return;
        }

        subscriptions.push(self.feed.subscribe(
            SubscriptionFilter::status_inserts(order_id.clone()),
            Arc::new(StatusInserts {
                order_id: order_id.clone(),
                shared: self.shared.clone(),
            }),
        ));
        subscriptions.push(self.feed.subscribe(
            SubscriptionFilter::order_updates(order_id.clone()),
            Arc::new(OrderUpdates {
                order_id: order_id.clone(),
                shared: self.shared.clone(),
            }),
        ));
    }
}

impl Drop for OrderTracker {
    fn drop(&mut self) {
        self.close();
    }
}

impl TrackerShared {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Seeds the view and replays the pushes held back while loading.
    ///
    /// Returns whether an order update was held back, in which case the
    /// snapshot must be read again.
    fn load_and_replay(&self, order_id: &OrderId, snapshot: OrderSnapshot, history: Vec<StatusEvent>) -> bool {
        // Pushes arriving meanwhile wait on the lock and are applied after the replay
        let mut held_back = self.held_back.lock().unwrap_or_else(PoisonError::into_inner);
        self.load(snapshot, history);

        let mut refresh = false;
        for change in held_back.take().unwrap_or_default() {
            match change.table {
                Table::StatusEvents => {
                    let Some(event) = self.parse_status_insert(order_id, &change) else {
                        continue;
                    };
                    if self.view.borrow().status_history.contains(&event) {
                        debug!(%order_id, status = %event.status, "Held-back event already loaded");
                        continue;
                    }
                    self.append(event);
                }
                Table::Orders => {
                    refresh |= matches!(
                        parse_order_change(&change.record),
                        Ok(changed) if changed.order_id == *order_id
                    );
                }
            }
        }
        refresh
    }

    fn load(&self, snapshot: OrderSnapshot, mut history: Vec<StatusEvent>) {
        history.sort_by_key(|event| event.timestamp);
        if history.is_empty() {
            debug!(order_id = %snapshot.order_id, "No recorded history, using snapshot status");
            history.push(StatusEvent::new(
                snapshot.order_id.clone(),
                snapshot.status,
                snapshot.placed_at,
            ));
        }

        let current_status = history.last().map(|event| event.status);
        if current_status != Some(snapshot.status) {
            debug!(
                snapshot = %snapshot.status,
                latest = ?current_status,
                "Snapshot status differs from latest event"
            );
        }

        self.view.send_modify(|view| {
            view.state = ViewState::Ready;
            view.current_status = current_status;
            view.status_history = history;
            view.estimated_delivery = snapshot.estimated_delivery;
            view.error = None;
        });
    }

    fn fail(&self, message: String) {
        self.view.send_modify(|view| {
            view.state = ViewState::Errored;
            view.error = Some(message);
            view.current_status = None;
            view.status_history.clear();
        });
    }

    /// Holds `change` back if the initial load has not landed yet.
    fn hold_back(&self, change: &ChangeEvent) -> bool {
        let mut held_back = self.held_back.lock().unwrap_or_else(PoisonError::into_inner);
        match held_back.as_mut() {
            Some(pending) => {
                pending.push(change.clone());
                true
            }
            None => false,
        }
    }

    fn parse_status_insert(&self, order_id: &OrderId, change: &ChangeEvent) -> Option<StatusEvent> {
        let event = match parse_status_event(&change.record) {
            Ok(event) => event,
            Err(e) => {
                warn!(%order_id, error = %e, "Ignoring malformed status event");
                return None;
            }
        };
        if event.order_id != *order_id {
            debug!(%order_id, other = %event.order_id, "Ignoring status event for another order");
            return None;
        }
        Some(event)
    }

    fn append(&self, event: StatusEvent) {
        debug!(order_id = %event.order_id, status = %event.status, "Status event applied");
        self.view.send_modify(|view| {
            view.current_status = Some(event.status);
            view.status_history.push(event);
        });
    }

    fn apply_status_insert(&self, order_id: &OrderId, change: &ChangeEvent) {
        if self.is_closed() || self.hold_back(change) {
            return;
        }
        if let Some(event) = self.parse_status_insert(order_id, change) {
            self.append(event);
        }
    }

    async fn apply_order_update(&self, order_id: &OrderId, change: &ChangeEvent) {
        if self.is_closed() || self.hold_back(change) {
            return;
        }
        match parse_order_change(&change.record) {
            Ok(changed) if changed.order_id != *order_id => {
                debug!(%order_id, other = %changed.order_id, "Ignoring update for another order");
            }
            Ok(_) => self.refresh_snapshot(order_id).await,
            Err(e) => warn!(%order_id, error = %e, "Ignoring malformed order update"),
        }
    }

    async fn refresh_snapshot(&self, order_id: &OrderId) {
        match self.store.get_order(order_id).await {
            Ok(snapshot) => {
                if self.is_closed() {
                    return;
                }
                debug!(%order_id, status = %snapshot.status, "Snapshot refreshed");
                self.view.send_modify(|view| {
                    view.current_status = Some(snapshot.status);
                    view.estimated_delivery = snapshot.estimated_delivery;
                });
            }
            Err(e) => warn!(%order_id, error = %e, "Snapshot refresh failed"),
        }
    }
}

struct StatusInserts {
    order_id: OrderId,
    shared: Arc<TrackerShared>,
}

#[async_trait]
impl ChangeListener for StatusInserts {
    async fn on_change(&self, change: ChangeEvent) {
        self.shared.apply_status_insert(&self.order_id, &change);
    }
}

struct OrderUpdates {
    order_id: OrderId,
    shared: Arc<TrackerShared>,
}

#[async_trait]
impl ChangeListener for OrderUpdates {
    async fn on_change(&self, change: ChangeEvent) {
        self.shared.apply_order_update(&self.order_id, &change).await;
    }
}
