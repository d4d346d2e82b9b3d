//! Delivery status of an order.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Status of an order on its way to the customer.
///
/// The in-sequence steps always advance in the order of [`OrderStatus::SEQUENCE`].
/// `Cancelled` sits outside the sequence and may follow any non-terminal step.
///
/// On the wire the variants are kebab-case (`"rider-pickup"`, `"in-transit"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Processing,
    Packed,
    RiderPickup,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The fixed delivery sequence, first step to last.
    pub const SEQUENCE: [OrderStatus; 5] = [
        OrderStatus::Processing,
        OrderStatus::Packed,
        OrderStatus::RiderPickup,
        OrderStatus::InTransit,
        OrderStatus::Delivered,
    ];

    /// Zero-based position in [`OrderStatus::SEQUENCE`], `None` for `Cancelled`.
    pub fn step(&self) -> Option<usize> {
        Self::SEQUENCE.iter().position(|s| s == self)
    }

    /// The step that follows this one, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        self.step().and_then(|i| Self::SEQUENCE.get(i + 1).copied())
    }

    /// Returns true once nothing can follow this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Label shown on the tracking screen.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Order processing",
            OrderStatus::Packed => "Packed",
            OrderStatus::RiderPickup => "Picked up by rider",
            OrderStatus::InTransit => "On the way",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Packed => "packed",
            OrderStatus::RiderPickup => "rider-pickup",
            OrderStatus::InTransit => "in-transit",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Checks whether `to` may be recorded after `from`.
    ///
    /// `from` is `None` for an order with no recorded history, in which case the
    /// first event must open the sequence (or cancel the order outright).
    pub fn can_follow(from: Option<OrderStatus>, to: OrderStatus) -> bool {
        match from {
            None => matches!(to, OrderStatus::Processing | OrderStatus::Cancelled),
            Some(prev) if prev.is_terminal() => false,
            Some(_) if to == OrderStatus::Cancelled => true,
            Some(prev) => prev.next() == Some(to),
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known status.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(OrderStatus::Processing),
            "packed" => Ok(OrderStatus::Packed),
            "rider-pickup" => Ok(OrderStatus::RiderPickup),
            "in-transit" => Ok(OrderStatus::InTransit),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
