//! # Price-Time Priority Limit Order Book
//!
//! An in-memory central limit order book and matching engine for plain limit
//! orders, with an event-sourced record of every order's lifecycle.
//!
//! ## Key Features
//!
//! - **Sorted Price Levels**: each symbol keeps an ascending sequence of price
//!   levels, located by binary search and extended by positional insertion.
//!
//! - **Price-Time Priority Matching**: an incoming order crosses the best
//!   opposite levels first and, within a level, the earliest resting orders
//!   first. Every fill executes at the resting order's price.
//!
//! - **Arena-Backed Orders**: resting orders live in one arena; the identifier
//!   index and the level queues share stable handles into it, so a fill, an
//!   amendment or a cancellation is visible through both.
//!
//! - **One Lock, Atomic Submissions**: [`BookManager`] guards the whole book
//!   with a single mutex. Matching an order and resting its remainder happen
//!   in the same critical section.
//!
//! - **Event Sourcing**: every acceptance, amendment, cancellation and fill is
//!   emitted as an [`OrderEvent`] wrapped in a JSON `{event_type, payload}`
//!   envelope. Events are published outside the book lock, in mutation
//!   order, and a publish failure never rolls back the book.
//!
//! - **Replay**: [`EventAggregator`] folds an order's event stream back into
//!   its state, and [`aggregate_position`] nets traded quantity per symbol.
//!
//! ## Order Lifecycle
//!
//! ```text
//! Pending ──fill──▶ PartiallyFilled ──fill──▶ FullyFilled
//!    │                    │                  (or OverFilled)
//!    └──────cancel────────┴──────▶ Cancelled
//! ```
//!
//! Only `Pending` and `PartiallyFilled` orders can trade. Filled and cancelled
//! orders remain addressable by identifier; they leave their level's queue
//! when the level is next crossed.
//!
//! ## Example
//!
//! ```rust
//! use matchbook::prelude::*;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! let store = Arc::new(InMemoryEventStore::new());
//! let manager = BookManager::new(Arc::clone(&store));
//!
//! let ask = Order::new(Uuid::new_v4(), "TT", Decimal::new(19999, 2), 10, Side::Sell);
//! manager.submit(ask.clone()).unwrap();
//!
//! let bid = Order::new(Uuid::new_v4(), "TT", Decimal::new(20000, 2), 4, Side::Buy);
//! let outcome = manager.submit(bid).unwrap();
//! assert_eq!(outcome.executed, 4);
//! assert_eq!(outcome.order.status(), OrderStatus::FullyFilled);
//!
//! let aggregate = store.aggregate(&ask.id()).unwrap();
//! assert_eq!(aggregate.traded, 4);
//! assert_eq!(aggregate.status, OrderStatus::PartiallyFilled);
//! ```
//!
//! ## Features
//!
//! - `nats`: [`NatsEventPublisher`](orderbook::events) writes envelopes to NATS
//!   JetStream under `{prefix}.{event_type}`.

pub mod orderbook;

pub mod prelude;

pub use orderbook::events::{
    AggregateError, ChannelEventPublisher, EventAggregator, EventError, EventPublisher,
    InMemoryEventStore, NoopPublisher, OrderAggregate, OrderEvent, OrderEventEnvelope,
    OrderEventType, Position, PublishError, aggregate_position,
};
#[cfg(feature = "nats")]
pub use orderbook::events::NatsEventPublisher;
pub use orderbook::{
    AmendRequest, BookConfig, BookManager, NewOrderRequest, Order, OrderBook, OrderBookError,
    OrderHandle, OrderId, OrderStatus, Price, Side, SubmitOutcome, ValidationError,
};
