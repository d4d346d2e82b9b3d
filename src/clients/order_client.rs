use crate::backend::{OrderStore, StoreError};
use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{OrderCreate, OrderId, OrderRecord, OrderSnapshot, OrderStatus, OrderUpdate, StatusEvent};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

/// Client for interacting with the Order actor.
///
/// Besides the write operations used by the fulfilment side (placing orders,
/// recording status changes), this is the [`OrderStore`] trackers read from.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<OrderRecord>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<OrderRecord>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, order))]
    pub async fn place_order(&self, order: OrderCreate) -> Result<OrderId, OrderError> {
        debug!(?order, "place_order called");
        info!("Sending place_order to actor");
        self.inner.create(order).await.map_err(Self::map_error)
    }

    /// Records `status` as reached at `at`.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn record_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<StatusEvent, OrderError> {
        debug!("Sending request");
        let result = self
            .inner
            .perform_action(id, OrderAction::RecordStatus { status, at })
            .await
            .map_err(Self::map_error)?;
        Self::expect_recorded(result)
    }

    /// Records `status` as reached now.
    pub async fn advance_status(&self, id: OrderId, status: OrderStatus) -> Result<StatusEvent, OrderError> {
        self.record_status(id, status, Utc::now()).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: OrderId) -> Result<StatusEvent, OrderError> {
        debug!("Sending request");
        let result = self
            .inner
            .perform_action(id, OrderAction::Cancel { at: Utc::now() })
            .await
            .map_err(Self::map_error)?;
        Self::expect_recorded(result)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn set_estimated_delivery(
        &self,
        id: OrderId,
        estimated_delivery: Option<DateTime<Utc>>,
    ) -> Result<OrderRecord, OrderError> {
        debug!("Sending request");
        self.inner
            .update(id, OrderUpdate { estimated_delivery })
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn status_history(&self, id: OrderId) -> Result<Vec<StatusEvent>, OrderError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(id, OrderAction::StatusHistory)
            .await
            .map_err(Self::map_error)?
        {
            OrderActionResult::History(history) => Ok(history),
            other => Err(OrderError::ActorCommunicationError(format!(
                "unexpected response {:?}",
                other
            ))),
        }
    }

    fn expect_recorded(result: OrderActionResult) -> Result<StatusEvent, OrderError> {
        match result {
            OrderActionResult::Recorded(event) => Ok(event),
            other => Err(OrderError::ActorCommunicationError(format!(
                "unexpected response {:?}",
                other
            ))),
        }
    }
}

#[async_trait]
impl ActorClient<OrderRecord> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<OrderRecord> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::EntityError(source) => match source.downcast::<OrderError>() {
                Ok(order_error) => *order_error,
                Err(other) => OrderError::ActorCommunicationError(other.to_string()),
            },
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

#[async_trait]
impl OrderStore for OrderClient {
    async fn get_order(&self, order_id: &OrderId) -> Result<OrderSnapshot, StoreError> {
        match ActorClient::get(self, order_id.clone()).await {
            Ok(Some(order)) => Ok(order.snapshot()),
            Ok(None) => Err(StoreError::NotFound(order_id.to_string())),
            Err(e) => Err(StoreError::Transport(e.to_string())),
        }
    }

    async fn list_status_events(&self, order_id: &OrderId) -> Result<Vec<StatusEvent>, StoreError> {
        self.status_history(order_id.clone()).await.map_err(|e| match e {
            OrderError::NotFound(id) => StoreError::NotFound(id),
            other => StoreError::Transport(other.to_string()),
        })
    }
}
