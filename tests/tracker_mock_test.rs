use async_trait::async_trait;
use chrono::{Duration, Utc};
use order_tracking::backend::{OrderStore, StoreError};
use order_tracking::clients::OrderClient;
use order_tracking::framework::mock::MockClient;
use order_tracking::framework::FrameworkError;
use order_tracking::model::{OrderCreate, OrderId, OrderRecord, OrderSnapshot, OrderStatus, StatusEvent};
use order_tracking::order_actor::OrderActionResult;
use order_tracking::realtime::RealtimeHub;
use order_tracking::tracker::{OrderTracker, ViewState};
use std::sync::Arc;
use tokio::sync::Notify;

fn order_id() -> OrderId {
    OrderId::parse("ORD-1001").unwrap()
}

fn tracker_over(mock: &MockClient<OrderRecord>, hub: &RealtimeHub) -> OrderTracker {
    OrderTracker::new(
        Arc::new(OrderClient::new(mock.client())),
        Arc::new(hub.clone()),
    )
}

#[tokio::test]
async fn test_open_with_mocked_store() {
    let t0 = Utc::now() - Duration::minutes(30);
    let mut order = OrderRecord::new(
        order_id(),
        OrderCreate {
            customer_id: "cust_7".to_string(),
            total: 12.5,
            placed_at: Some(t0),
            estimated_delivery: Some(t0 + Duration::minutes(45)),
        },
    );
    order.status = OrderStatus::Packed;
    let history = vec![
        StatusEvent::new(order_id(), OrderStatus::Processing, t0),
        StatusEvent::new(order_id(), OrderStatus::Packed, t0 + Duration::minutes(5)),
    ];

    let mut mock = MockClient::<OrderRecord>::new();
    mock.expect_get(order_id()).return_ok(Some(order));
    mock.expect_action(order_id())
        .return_ok(OrderActionResult::History(history.clone()));
    let hub = RealtimeHub::new(16);

    let tracker = tracker_over(&mock, &hub);
    let view = tracker.open("ORD-1001").await;

    assert_eq!(view.state, ViewState::Ready);
    assert_eq!(view.status_history, history);
    assert_eq!(view.current_status, Some(OrderStatus::Packed));
    assert_eq!(view.estimated_delivery, Some(t0 + Duration::minutes(45)));
    assert_eq!(hub.active_subscriptions(), 2);
    mock.verify();
}

#[tokio::test]
async fn test_transport_failure_ends_in_error_state() {
    let mut mock = MockClient::<OrderRecord>::new();
    mock.expect_get(order_id()).return_err(FrameworkError::ActorClosed);
    mock.expect_action(order_id())
        .return_ok(OrderActionResult::History(Vec::new()));
    let hub = RealtimeHub::new(16);

    let tracker = tracker_over(&mock, &hub);
    let view = tracker.open("ORD-1001").await;

    assert_eq!(view.state, ViewState::Errored);
    assert!(!view.loading());
    assert!(view.error.unwrap().contains("unavailable"));
    assert!(view.status_history.is_empty());
    assert_eq!(hub.active_subscriptions(), 0);
    mock.verify();
}

#[tokio::test]
async fn test_history_failure_ends_in_error_state() {
    let order = OrderRecord::new(
        order_id(),
        OrderCreate {
            customer_id: "cust_7".to_string(),
            total: 12.5,
            placed_at: None,
            estimated_delivery: None,
        },
    );
    let mut mock = MockClient::<OrderRecord>::new();
    mock.expect_get(order_id()).return_ok(Some(order));
    mock.expect_action(order_id())
        .return_err(FrameworkError::NotFound(order_id().to_string()));
    let hub = RealtimeHub::new(16);

    let tracker = tracker_over(&mock, &hub);
    let view = tracker.open("ORD-1001").await;

    assert_eq!(view.state, ViewState::Errored);
    assert_eq!(view.error.as_deref(), Some("Order not found: ORD-1001"));
    assert!(view.current_status.is_none());
    mock.verify();
}

/// Store whose reads block until released.
struct GatedStore {
    gate: Arc<Notify>,
    placed_at: chrono::DateTime<Utc>,
}

#[async_trait]
impl OrderStore for GatedStore {
    async fn get_order(&self, order_id: &OrderId) -> Result<OrderSnapshot, StoreError> {
        self.gate.notified().await;
        Ok(OrderSnapshot {
            order_id: order_id.clone(),
            status: OrderStatus::Processing,
            estimated_delivery: None,
            placed_at: self.placed_at,
        })
    }

    async fn list_status_events(&self, _order_id: &OrderId) -> Result<Vec<StatusEvent>, StoreError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_close_before_initial_load_completes() {
    let gate = Arc::new(Notify::new());
    let hub = RealtimeHub::new(16);
    let tracker = Arc::new(OrderTracker::new(
        Arc::new(GatedStore {
            gate: gate.clone(),
            placed_at: Utc::now(),
        }),
        Arc::new(hub.clone()),
    ));

    let opening = {
        let tracker = tracker.clone();
        tokio::spawn(async move { tracker.open("ORD-1001").await })
    };
    let mut updates = tracker.watch();
    updates
        .wait_for(|view| view.loading())
        .await
        .expect("Tracker dropped its view");

    tracker.close();
    // notify_one stores a permit if the read has not started waiting yet
    gate.notify_one();

    let view = opening.await.expect("Open task panicked");
    assert_ne!(view.state, ViewState::Ready);
    assert!(view.status_history.is_empty());
    assert_eq!(hub.active_subscriptions(), 0);
}

#[tokio::test]
async fn test_open_after_close_does_nothing() {
    let mock = MockClient::<OrderRecord>::new();
    let hub = RealtimeHub::new(16);

    let tracker = tracker_over(&mock, &hub);
    tracker.close();
    let view = tracker.open("ORD-1001").await;

    assert_eq!(view.state, ViewState::Uninitialized);
    assert_eq!(hub.active_subscriptions(), 0);
    // No request reached the store
    mock.verify();
}
