//! Order lifecycle events.
//!
//! Every payload carries the same header (`event_type`, `id`, `occurred`,
//! `version`) flattened into its JSON object, followed by the fields specific
//! to its kind. [`OrderEvent`] is the closed set of kinds the book and the
//! event log exchange.

use crate::orderbook::events::error::EventError;
use crate::orderbook::order::{Order, OrderId, Price, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminator of an order event, as written in `event_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderEventType {
    /// The order was accepted by the exchange.
    #[serde(rename = "OrderAccepted")]
    Accepted,
    /// The order quantity was amended.
    #[serde(rename = "OrderAmended")]
    Amended,
    /// The order was cancelled.
    #[serde(rename = "OrderCancelled")]
    Cancelled,
    /// The order traded.
    #[serde(rename = "OrderTraded")]
    Traded,
    /// An event for the order was written to the event log.
    #[serde(rename = "OrderEventStored")]
    Stored,
}

impl OrderEventType {
    /// Wire name of the event type
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderEventType::Accepted => "OrderAccepted",
            OrderEventType::Amended => "OrderAmended",
            OrderEventType::Cancelled => "OrderCancelled",
            OrderEventType::Traded => "OrderTraded",
            OrderEventType::Stored => "OrderEventStored",
        }
    }
}

impl fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderEventType {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OrderAccepted" => Ok(OrderEventType::Accepted),
            "OrderAmended" => Ok(OrderEventType::Amended),
            "OrderCancelled" => Ok(OrderEventType::Cancelled),
            "OrderTraded" => Ok(OrderEventType::Traded),
            "OrderEventStored" => Ok(OrderEventType::Stored),
            other => Err(EventError::UnknownEventType(other.to_string())),
        }
    }
}

/// Fields shared by every order event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHeader {
    /// Kind of the event
    pub event_type: OrderEventType,
    /// Order the event belongs to
    pub id: OrderId,
    /// When the event happened
    pub occurred: DateTime<Utc>,
    /// Event schema version
    pub version: u32,
}

impl EventHeader {
    /// Header stamped with the current time
    pub fn now(event_type: OrderEventType, id: OrderId, version: u32) -> Self {
        Self {
            event_type,
            id,
            occurred: Utc::now(),
            version,
        }
    }
}

/// An order was accepted by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAccepted {
    /// Common header
    #[serde(flatten)]
    pub header: EventHeader,
    /// Instrument symbol
    pub symbol: String,
    /// Limit price
    pub price: Price,
    /// Accepted quantity
    pub quantity: u64,
    /// Order direction
    pub direction: Side,
}

/// A resting order was amended to a new total quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAmended {
    /// Common header
    #[serde(flatten)]
    pub header: EventHeader,
    /// New total quantity
    pub quantity: u64,
}

/// A resting order was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    /// Common header
    #[serde(flatten)]
    pub header: EventHeader,
}

/// One side of a match: the order traded `quantity` at `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTraded {
    /// Common header
    #[serde(flatten)]
    pub header: EventHeader,
    /// Execution price (always the resting order's price)
    pub price: Price,
    /// Traded quantity
    pub quantity: u64,
}

/// Acknowledgement that an event for the order reached the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEventStored {
    /// Common header
    #[serde(flatten)]
    pub header: EventHeader,
}

/// The closed set of order events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderEvent {
    /// See [`OrderAccepted`]
    Accepted(OrderAccepted),
    /// See [`OrderAmended`]
    Amended(OrderAmended),
    /// See [`OrderCancelled`]
    Cancelled(OrderCancelled),
    /// See [`OrderTraded`]
    Traded(OrderTraded),
    /// See [`OrderEventStored`]
    Stored(OrderEventStored),
}

impl OrderEvent {
    /// Acceptance of `order` as it stands now.
    pub fn accepted(order: &Order, version: u32) -> Self {
        OrderEvent::Accepted(OrderAccepted {
            header: EventHeader::now(OrderEventType::Accepted, order.id(), version),
            symbol: order.symbol().to_string(),
            price: order.price(),
            quantity: order.quantity(),
            direction: order.side(),
        })
    }

    /// Amendment of order `id` to a new total `quantity`.
    pub fn amended(id: OrderId, quantity: u64, version: u32) -> Self {
        OrderEvent::Amended(OrderAmended {
            header: EventHeader::now(OrderEventType::Amended, id, version),
            quantity,
        })
    }

    /// Cancellation of order `id`.
    pub fn cancelled(id: OrderId, version: u32) -> Self {
        OrderEvent::Cancelled(OrderCancelled {
            header: EventHeader::now(OrderEventType::Cancelled, id, version),
        })
    }

    /// A fill of `quantity` at `price` for order `id`.
    pub fn traded(id: OrderId, price: Price, quantity: u64, version: u32) -> Self {
        OrderEvent::Traded(OrderTraded {
            header: EventHeader::now(OrderEventType::Traded, id, version),
            price,
            quantity,
        })
    }

    /// Storage acknowledgement for order `id`.
    pub fn stored(id: OrderId, version: u32) -> Self {
        OrderEvent::Stored(OrderEventStored {
            header: EventHeader::now(OrderEventType::Stored, id, version),
        })
    }

    /// Common header of the event
    pub fn header(&self) -> &EventHeader {
        match self {
            OrderEvent::Accepted(e) => &e.header,
            OrderEvent::Amended(e) => &e.header,
            OrderEvent::Cancelled(e) => &e.header,
            OrderEvent::Traded(e) => &e.header,
            OrderEvent::Stored(e) => &e.header,
        }
    }

    fn header_mut(&mut self) -> &mut EventHeader {
        match self {
            OrderEvent::Accepted(e) => &mut e.header,
            OrderEvent::Amended(e) => &mut e.header,
            OrderEvent::Cancelled(e) => &mut e.header,
            OrderEvent::Traded(e) => &mut e.header,
            OrderEvent::Stored(e) => &mut e.header,
        }
    }

    /// Replaces the occurrence time.
    #[must_use]
    pub fn at(mut self, occurred: DateTime<Utc>) -> Self {
        self.header_mut().occurred = occurred;
        self
    }

    /// Kind of the event
    #[inline]
    pub fn event_type(&self) -> OrderEventType {
        self.header().event_type
    }

    /// Order the event belongs to
    #[inline]
    pub fn order_id(&self) -> OrderId {
        self.header().id
    }

    /// When the event happened
    #[inline]
    pub fn occurred(&self) -> DateTime<Utc> {
        self.header().occurred
    }

    /// Serializes the specific payload of the event to JSON.
    ///
    /// # Errors
    /// Returns [`EventError::Serialization`] if serialization fails.
    pub fn payload_json(&self) -> Result<String, EventError> {
        let json = match self {
            OrderEvent::Accepted(e) => serde_json::to_string(e),
            OrderEvent::Amended(e) => serde_json::to_string(e),
            OrderEvent::Cancelled(e) => serde_json::to_string(e),
            OrderEvent::Traded(e) => serde_json::to_string(e),
            OrderEvent::Stored(e) => serde_json::to_string(e),
        }?;
        Ok(json)
    }
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        write!(
            f,
            "{}: [{}] {} v{}",
            header.event_type, header.id, header.occurred, header.version
        )?;
        match self {
            OrderEvent::Accepted(e) => {
                write!(f, " {}@{} {} {}", e.symbol, e.price, e.direction, e.quantity)
            }
            OrderEvent::Amended(e) => write!(f, " qty {}", e.quantity),
            OrderEvent::Traded(e) => write!(f, " {}@{}", e.quantity, e.price),
            OrderEvent::Cancelled(_) | OrderEvent::Stored(_) => Ok(()),
        }
    }
}
