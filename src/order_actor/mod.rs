//! Order-specific resource logic: status recording and change announcements.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::OrderClient;
use crate::framework::ResourceActor;
use crate::model::{OrderId, OrderRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Creates a new Order actor and its client.
///
/// Order ids are `ORD-<n>`, counting up from `first_number`.
pub fn new(buffer_size: usize, first_number: u64) -> (ResourceActor<OrderRecord>, OrderClient) {
    let order_number = Arc::new(AtomicU64::new(first_number));
    let next_order_id = move || {
        OrderId::from(order_number.fetch_add(1, Ordering::SeqCst))
    };

    let (actor, generic_client) = ResourceActor::new(buffer_size, next_order_id);
    let client = OrderClient::new(generic_client);

    (actor, client)
}
