//! Order lifecycle events: their wire envelope, the publishers that carry them
//! off the book, and the aggregator that replays them.

pub mod aggregate;
mod channel;
pub mod envelope;
pub mod error;
#[cfg(feature = "nats")]
mod nats;
mod publisher;
mod store;
pub mod types;

pub use aggregate::{EventAggregator, OrderAggregate, OrderLog, Position, TradeRecord, aggregate_position};
pub use channel::ChannelEventPublisher;
pub use envelope::OrderEventEnvelope;
pub use error::{AggregateError, EventError, PublishError};
#[cfg(feature = "nats")]
pub use nats::NatsEventPublisher;
pub use publisher::{EventPublisher, NoopPublisher};
pub use store::InMemoryEventStore;
pub use types::{
    EventHeader, OrderAccepted, OrderAmended, OrderCancelled, OrderEvent, OrderEventStored,
    OrderEventType, OrderTraded,
};
