//! Demo: place an order, track it, and drive it through delivery.

use chrono::{Duration, Utc};
use order_tracking::lifecycle::{setup_tracing, OrderSystem, SystemConfig};
use order_tracking::model::{OrderCreate, OrderStatus};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    info!("Starting order tracking demo");
    let system = OrderSystem::new(SystemConfig::default());

    let placed_at = Utc::now();
    let order = OrderCreate {
        customer_id: "cust_42".to_string(),
        total: 18.75,
        placed_at: Some(placed_at),
        estimated_delivery: Some(placed_at + Duration::minutes(45)),
    };
    let order_id = system
        .order_client
        .place_order(order)
        .await
        .map_err(|e| e.to_string())?;
    system
        .order_client
        .record_status(order_id.clone(), OrderStatus::Processing, placed_at)
        .await
        .map_err(|e| e.to_string())?;
    info!(%order_id, "Order placed");

    // The tracking screen
    let tracker = system.tracker();
    let view = tracker.open(order_id.as_str()).await;
    if let Some(error) = view.error {
        error!(%error, "Tracking failed");
        return Err(error);
    }

    let mut updates = tracker.watch();
    let screen = tokio::spawn(
        async move {
            while updates.changed().await.is_ok() {
                let view = updates.borrow_and_update().clone();
                let label = view.current_status.map(|s| s.label()).unwrap_or("-");
                info!(
                    status = label,
                    events = view.status_history.len(),
                    eta = ?view.estimated_delivery,
                    "View updated"
                );
                if view.is_terminal() {
                    break;
                }
            }
        }
        .instrument(tracing::info_span!("tracking_screen")),
    );

    // The fulfilment side
    let rider = async {
        // Processing was recorded with the order
        for status in OrderStatus::SEQUENCE.into_iter().skip(1) {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            system
                .order_client
                .advance_status(order_id.clone(), status)
                .await
                .map_err(|e| e.to_string())?;
            if status == OrderStatus::RiderPickup {
                system
                    .order_client
                    .set_estimated_delivery(order_id.clone(), Some(Utc::now() + Duration::minutes(15)))
                    .await
                    .map_err(|e| e.to_string())?;
            }
        }
        Ok::<(), String>(())
    };
    rider.instrument(tracing::info_span!("fulfilment")).await?;

    if let Err(e) = screen.await {
        error!(error = %e, "Tracking screen failed");
    }

    for step in tracker.view().timeline() {
        info!(status = %step.status, reached_at = ?step.reached_at, "Timeline");
    }

    tracker.close();
    drop(tracker);
    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
