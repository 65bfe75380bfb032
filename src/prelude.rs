//! Prelude module that re-exports commonly used types and traits.
//!
//! ```rust
//! use matchbook::prelude::*;
//! ```

// Core order book types
pub use crate::orderbook::book::OrderBook;
pub use crate::orderbook::config::BookConfig;
pub use crate::orderbook::error::{OrderBookError, ValidationError};
pub use crate::orderbook::manager::{BookManager, SubmitOutcome};

// Orders and levels
pub use crate::orderbook::arena::OrderHandle;
pub use crate::orderbook::level::{LevelDepth, SymbolDepth};
pub use crate::orderbook::order::{AmendRequest, NewOrderRequest, Order, OrderId, Price, Side};
pub use crate::orderbook::status::OrderStatus;

// Events
pub use crate::orderbook::events::{
    AggregateError, ChannelEventPublisher, EventAggregator, EventError, EventPublisher,
    InMemoryEventStore, NoopPublisher, OrderAggregate, OrderEvent, OrderEventEnvelope,
    OrderEventType, Position, PublishError, aggregate_position,
};

// NATS integration types
#[cfg(feature = "nats")]
pub use crate::orderbook::events::NatsEventPublisher;
