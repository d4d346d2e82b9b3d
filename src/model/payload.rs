//! Parsing of loosely-typed change-feed records into model types.
//!
//! Records pushed by the change feed are plain JSON. Nothing from a record
//! reaches a view until it has been parsed into one of the typed records here.

use crate::model::{OrderSnapshot, StatusEvent};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A change-feed record that does not have the expected shape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayloadError {
    #[error("Record is missing an order_id")]
    MissingOrderId,
    #[error("Malformed record: {0}")]
    Malformed(String),
}

/// Parses a `status_events` insert record.
pub fn parse_status_event(record: &Value) -> Result<StatusEvent, PayloadError> {
    parse(record)
}

/// Parses an `orders` change record.
pub fn parse_order_change(record: &Value) -> Result<OrderSnapshot, PayloadError> {
    parse(record)
}

/// Reads the `order_id` field of a raw record without parsing the rest.
pub fn record_order_id(record: &Value) -> Option<&str> {
    record.get("order_id").and_then(Value::as_str)
}

fn parse<T: DeserializeOwned>(record: &Value) -> Result<T, PayloadError> {
    if record_order_id(record).is_none() {
        return Err(PayloadError::MissingOrderId);
    }
    T::deserialize(record).map_err(|e| PayloadError::Malformed(e.to_string()))
}
