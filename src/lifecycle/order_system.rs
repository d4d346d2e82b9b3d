use crate::clients::OrderClient;
use crate::lifecycle::SystemConfig;
use crate::realtime::RealtimeHub;
use crate::tracker::OrderTracker;
use std::sync::Arc;
use tracing::{error, info};

/// The runtime of the in-process order backend.
///
/// `OrderSystem` is responsible for:
/// - **Lifecycle Management**: Starting and stopping the order actor
/// - **Dependency Wiring**: Handing the change feed to the actor as its context
/// - **Tracker Construction**: Building trackers bound to this system's store and feed
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::new(SystemConfig::default());
///
/// let order_id = system.order_client.place_order(order).await?;
/// let tracker = system.tracker();
/// tracker.open(order_id.as_str()).await;
///
/// // Trackers hold store clients; close and drop them first
/// drop(tracker);
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    /// Client for interacting with the Order actor
    pub order_client: OrderClient,

    /// Change feed the order actor publishes to
    pub hub: RealtimeHub,

    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    /// Creates the change feed and spawns the order actor.
    pub fn new(config: SystemConfig) -> Self {
        info!(?config, "Starting order system");
        let hub = RealtimeHub::new(config.feed_capacity);
        let (order_actor, order_client) =
            crate::order_actor::new(config.actor_buffer, config.first_order_number);

        // The actor publishes every accepted change on the hub
        let order_handle = tokio::spawn(order_actor.run(hub.clone()));

        Self {
            order_client,
            hub,
            handles: vec![order_handle],
        }
    }

    /// A tracker reading from this system's store and following its feed.
    pub fn tracker(&self) -> OrderTracker {
        OrderTracker::new(Arc::new(self.order_client.clone()), Arc::new(self.hub.clone()))
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the client closes the actor's channel, so the actor exits once
    /// every other clone of the client (including those held by trackers) is
    /// gone as well.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the actor shut down cleanly
    /// - `Err(String)` if the actor task failed or panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        drop(self.order_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!(
            subscriptions = self.hub.active_subscriptions(),
            "System shutdown complete."
        );
        Ok(())
    }
}
