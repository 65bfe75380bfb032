//! Order status state machine.
//!
//! An order moves `Pending -> PartiallyFilled -> FullyFilled` as it trades, or
//! to `OverFilled` when traded quantity exceeds the order quantity. Any
//! tradeable status can be moved to `Cancelled`, which is terminal.

use crate::orderbook::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Accepted, nothing traded yet.
    Pending,
    /// Some, but not all, of the quantity has traded.
    PartiallyFilled,
    /// Traded quantity equals the order quantity.
    FullyFilled,
    /// Traded quantity exceeds the order quantity.
    OverFilled,
    /// Cancelled by request. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Resolves the status implied by an order's quantities.
    ///
    /// Cancellation is never produced here; it is set directly by the
    /// canceller and overrides whatever the quantities imply.
    #[must_use]
    pub fn resolve(quantity: u64, traded: u64) -> Self {
        if traded == 0 {
            OrderStatus::Pending
        } else if traded < quantity {
            OrderStatus::PartiallyFilled
        } else if traded == quantity {
            OrderStatus::FullyFilled
        } else {
            OrderStatus::OverFilled
        }
    }

    /// Returns `true` if an order in this status may still trade.
    #[must_use]
    #[inline]
    pub fn is_tradeable(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::PartiallyFilled)
    }

    /// Returns `true` if no further transition is possible.
    #[must_use]
    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_tradeable()
    }

    /// Textual name, as used on the wire and in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::PartiallyFilled => "PartiallyFilled",
            OrderStatus::FullyFilled => "FullyFilled",
            OrderStatus::OverFilled => "OverFilled",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "PartiallyFilled" => Ok(OrderStatus::PartiallyFilled),
            "FullyFilled" => Ok(OrderStatus::FullyFilled),
            "OverFilled" => Ok(OrderStatus::OverFilled),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}
