//! Rebuilding order state from its event stream.
//!
//! The live book is authoritative for matching; the aggregate here is the
//! eventually-consistent view a projector derives from the event log.

use crate::orderbook::events::envelope::OrderEventEnvelope;
use crate::orderbook::events::error::AggregateError;
use crate::orderbook::events::types::{OrderEvent, OrderEventType};
use crate::orderbook::order::{OrderId, Price, Side};
use crate::orderbook::status::OrderStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// One fill recorded against an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeRecord {
    /// Execution price
    pub price: Price,
    /// Filled quantity
    pub quantity: u64,
    /// When the fill happened
    pub occurred: DateTime<Utc>,
}

/// One applied event, as kept in the order's action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLog {
    /// Event type that was applied
    pub action: OrderEventType,
    /// When it happened
    pub occurred: DateTime<Utc>,
}

/// Order state reconstructed from events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderAggregate {
    /// Order identifier
    pub id: OrderId,
    /// Instrument symbol
    pub symbol: String,
    /// Limit price
    pub price: Price,
    /// Total quantity after the latest amendment
    pub quantity: u64,
    /// Quantity filled so far
    pub traded: u64,
    /// Volume-weighted average execution price, zero before the first fill
    pub traded_price: Price,
    /// Buy or sell
    pub direction: Side,
    /// Status derived from the applied events
    pub status: OrderStatus,
    /// Time of acceptance
    pub created: DateTime<Utc>,
    /// Time of the latest applied event
    pub updated: DateTime<Utc>,
    /// Fills, oldest first
    pub trades: Vec<TradeRecord>,
    /// One line per applied event
    pub logs: Vec<OrderLog>,
}

impl OrderAggregate {
    fn log(&mut self, action: OrderEventType, occurred: DateTime<Utc>) {
        self.updated = occurred;
        self.logs.push(OrderLog { action, occurred });
    }

    fn amend(&mut self, quantity: u64, occurred: DateTime<Utc>) {
        self.quantity = quantity;
        self.status = OrderStatus::resolve(self.quantity, self.traded);
        self.log(OrderEventType::Amended, occurred);
    }

    fn trade(&mut self, price: Price, quantity: u64, occurred: DateTime<Utc>) {
        self.traded = self.traded.saturating_add(quantity);
        self.trades.push(TradeRecord {
            price,
            quantity,
            occurred,
        });
        self.traded_price = volume_weighted_price(&self.trades);
        self.status = OrderStatus::resolve(self.quantity, self.traded);
        self.log(OrderEventType::Traded, occurred);
    }

    fn cancel(&mut self, occurred: DateTime<Utc>) {
        self.status = OrderStatus::Cancelled;
        self.log(OrderEventType::Cancelled, occurred);
    }
}

fn volume_weighted_price(trades: &[TradeRecord]) -> Price {
    let (notional, volume) = trades
        .iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(notional, volume), t| {
            let quantity = Decimal::from(t.quantity);
            (notional + t.price * quantity, volume + quantity)
        });
    notional.checked_div(volume).unwrap_or(Decimal::ZERO)
}

/// Replays an order's events, oldest first, into an [`OrderAggregate`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EventAggregator;

impl EventAggregator {
    /// Folds `events` into the aggregate of the order they belong to.
    ///
    /// # Errors
    /// - [`AggregateError::Empty`] for an empty stream
    /// - [`AggregateError::MissingAcceptance`] if the stream does not open with
    ///   `OrderAccepted`
    /// - [`AggregateError::AlreadyAccepted`] for a second acceptance
    /// - [`AggregateError::OrderMismatch`] for an event of another order
    /// - [`AggregateError::UnsupportedEvent`] for `OrderEventStored`
    pub fn aggregate(events: &[OrderEvent]) -> Result<OrderAggregate, AggregateError> {
        let (first, rest) = events.split_first().ok_or(AggregateError::Empty)?;

        let mut aggregate = match first {
            OrderEvent::Accepted(accepted) => OrderAggregate {
                id: accepted.header.id,
                symbol: accepted.symbol.clone(),
                price: accepted.price,
                quantity: accepted.quantity,
                traded: 0,
                traded_price: Decimal::ZERO,
                direction: accepted.direction,
                status: OrderStatus::Pending,
                created: accepted.header.occurred,
                updated: accepted.header.occurred,
                trades: Vec::new(),
                logs: vec![OrderLog {
                    action: OrderEventType::Accepted,
                    occurred: accepted.header.occurred,
                }],
            },
            OrderEvent::Stored(_) => {
                return Err(AggregateError::UnsupportedEvent(OrderEventType::Stored));
            }
            other => return Err(AggregateError::MissingAcceptance(other.event_type())),
        };

        for event in rest {
            if event.order_id() != aggregate.id {
                return Err(AggregateError::OrderMismatch {
                    expected: aggregate.id,
                    found: event.order_id(),
                });
            }
            match event {
                OrderEvent::Accepted(_) => {
                    return Err(AggregateError::AlreadyAccepted(aggregate.id));
                }
                OrderEvent::Amended(e) => aggregate.amend(e.quantity, e.header.occurred),
                OrderEvent::Traded(e) => aggregate.trade(e.price, e.quantity, e.header.occurred),
                OrderEvent::Cancelled(e) => aggregate.cancel(e.header.occurred),
                OrderEvent::Stored(_) => {
                    return Err(AggregateError::UnsupportedEvent(OrderEventType::Stored));
                }
            }
            debug!(order_id = %aggregate.id, event_type = %event.event_type(), "event aggregated");
        }

        Ok(aggregate)
    }

    /// Decodes envelopes and aggregates the resulting events.
    ///
    /// # Errors
    /// [`AggregateError::Event`] if an envelope fails to decode, otherwise as
    /// [`EventAggregator::aggregate`].
    pub fn aggregate_envelopes(
        envelopes: &[OrderEventEnvelope],
    ) -> Result<OrderAggregate, AggregateError> {
        let events = envelopes
            .iter()
            .map(OrderEventEnvelope::decode)
            .collect::<Result<Vec<_>, _>>()?;
        Self::aggregate(&events)
    }
}

/// Net traded quantity of a symbol across a set of orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Instrument symbol
    pub symbol: String,
    /// Bought minus sold
    pub quantity: i64,
    /// Latest update among the contributing orders
    pub updated: Option<DateTime<Utc>>,
}

/// Nets the traded quantity of every aggregate on `symbol`: buys add, sells
/// subtract. Aggregates of other symbols are ignored.
pub fn aggregate_position(symbol: &str, orders: &[OrderAggregate]) -> Position {
    orders
        .iter()
        .filter(|order| order.symbol == symbol)
        .fold(
            Position {
                symbol: symbol.to_string(),
                quantity: 0,
                updated: None,
            },
            |mut position, order| {
                let traded = i64::try_from(order.traded).unwrap_or(i64::MAX);
                position.quantity = match order.direction {
                    Side::Buy => position.quantity.saturating_add(traded),
                    Side::Sell => position.quantity.saturating_sub(traded),
                };
                position.updated = position.updated.max(Some(order.updated));
                position
            },
        )
}
