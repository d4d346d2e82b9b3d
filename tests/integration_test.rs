use chrono::{Duration, Utc};
use order_tracking::lifecycle::{OrderSystem, SystemConfig};
use order_tracking::model::{OrderCreate, OrderStatus};
use order_tracking::order_actor::OrderError;
use order_tracking::tracker::{OrderStatusView, OrderTracker};

async fn wait_until(
    tracker: &OrderTracker,
    predicate: impl Fn(&OrderStatusView) -> bool,
) -> OrderStatusView {
    let mut updates = tracker.watch();
    let view = tokio::time::timeout(
        std::time::Duration::from_secs(2),
        updates.wait_for(|view| predicate(view)),
    )
    .await
    .expect("Timed out waiting for the view")
    .expect("Tracker dropped its view")
    .clone();
    view
}

fn new_order(customer_id: &str) -> OrderCreate {
    OrderCreate {
        customer_id: customer_id.to_string(),
        total: 31.0,
        placed_at: Some(Utc::now() - Duration::minutes(20)),
        estimated_delivery: None,
    }
}

#[tokio::test]
async fn test_full_delivery_followed_live() {
    let system = OrderSystem::new(SystemConfig::default().with_first_order_number(500));
    let client = system.order_client.clone();
    let order_id = client.place_order(new_order("cust_1")).await.unwrap();
    assert_eq!(order_id.as_str(), "ORD-500");

    let tracker = system.tracker();
    let opened = tracker.open(order_id.as_str()).await;
    assert_eq!(opened.status_history.len(), 1, "Synthesized from the snapshot");

    for status in OrderStatus::SEQUENCE {
        client.advance_status(order_id.clone(), status).await.unwrap();
    }

    let view = wait_until(&tracker, |v| {
        v.status_history.last().map(|e| e.status) == Some(OrderStatus::Delivered)
    })
    .await;
    assert!(view.is_terminal());
    let timeline = view.timeline();
    assert!(timeline.iter().all(|step| step.reached_at.is_some()));

    // Terminal orders reject further changes
    let rejected = client.advance_status(order_id.clone(), OrderStatus::InTransit).await;
    assert_eq!(rejected, Err(OrderError::TerminalStatus(OrderStatus::Delivered)));

    drop(client);
    drop(tracker);
    system.shutdown().await.expect("Failed to shutdown system");
}

#[tokio::test]
async fn test_cancellation_reaches_every_tracker_of_the_order() {
    let system = OrderSystem::new(SystemConfig::default());
    let client = system.order_client.clone();
    let first = client.place_order(new_order("cust_1")).await.unwrap();
    let second = client.place_order(new_order("cust_2")).await.unwrap();
    client.advance_status(first.clone(), OrderStatus::Processing).await.unwrap();
    client.advance_status(second.clone(), OrderStatus::Processing).await.unwrap();

    let screen_a = system.tracker();
    let screen_b = system.tracker();
    let other = system.tracker();
    screen_a.open(first.as_str()).await;
    screen_b.open(first.as_str()).await;
    other.open(second.as_str()).await;
    assert_eq!(system.hub.active_subscriptions(), 6);

    client.cancel_order(first.clone()).await.unwrap();

    for screen in [&screen_a, &screen_b] {
        let view = wait_until(screen, |v| {
            v.status_history.last().map(|e| e.status) == Some(OrderStatus::Cancelled)
        })
        .await;
        assert_eq!(view.current_status, Some(OrderStatus::Cancelled));
        assert_eq!(view.timeline().last().unwrap().status, OrderStatus::Cancelled);
    }
    assert_eq!(other.view().current_status, Some(OrderStatus::Processing));
    assert_eq!(other.view().status_history.len(), 1);

    screen_a.close();
    assert_eq!(system.hub.active_subscriptions(), 4);

    drop(client);
    drop(screen_a);
    drop(screen_b);
    drop(other);
    assert_eq!(system.hub.active_subscriptions(), 0);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_rejected_transitions_leave_store_unchanged() {
    let system = OrderSystem::new(SystemConfig::default());
    let client = system.order_client.clone();
    let order_id = client.place_order(new_order("cust_1")).await.unwrap();

    let skipped = client.advance_status(order_id.clone(), OrderStatus::Packed).await;
    assert!(matches!(skipped, Err(OrderError::InvalidTransition { .. })));

    let now = Utc::now();
    client.record_status(order_id.clone(), OrderStatus::Processing, now).await.unwrap();
    let stale = client
        .record_status(order_id.clone(), OrderStatus::Packed, now - Duration::minutes(1))
        .await;
    assert!(matches!(stale, Err(OrderError::OutOfOrder { .. })));

    let history = client.status_history(order_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, OrderStatus::Processing);

    drop(client);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_order_is_rejected() {
    let system = OrderSystem::new(SystemConfig::default());

    let result = system.order_client.place_order(new_order("")).await;
    assert!(matches!(result, Err(OrderError::ValidationError(_))));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_each_step_appears_once_in_history() {
    let system = OrderSystem::new(SystemConfig::default());
    let client = system.order_client.clone();
    let placed_at = Utc::now() - Duration::minutes(5);
    let order_id = client.place_order(new_order("cust_1")).await.unwrap();
    client
        .record_status(order_id.clone(), OrderStatus::Processing, placed_at)
        .await
        .unwrap();

    let tracker = system.tracker();
    let opened = tracker.open(order_id.as_str()).await;
    assert_eq!(opened.status_history.len(), 1);

    for status in OrderStatus::SEQUENCE.into_iter().skip(1) {
        client.advance_status(order_id.clone(), status).await.unwrap();
    }

    let view = wait_until(&tracker, |v| {
        v.status_history.last().map(|e| e.status) == Some(OrderStatus::Delivered)
    })
    .await;
    let statuses: Vec<_> = view.status_history.iter().map(|e| e.status).collect();
    assert_eq!(statuses, OrderStatus::SEQUENCE.to_vec());

    drop(client);
    drop(tracker);
    system.shutdown().await.unwrap();
}
