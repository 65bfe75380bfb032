//! Error types for event encoding, publication and aggregation.

use crate::orderbook::events::types::OrderEventType;
use crate::orderbook::order::OrderId;
use thiserror::Error;

/// Failures encoding or decoding order events.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EventError {
    /// JSON (de)serialization failed.
    #[error("event serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The envelope named an event type outside the known set.
    #[error("unknown order event type: {0:?}")]
    UnknownEventType(String),

    /// The payload's own `event_type` disagrees with its envelope.
    #[error("envelope declares {envelope} but payload is {payload}")]
    TypeMismatch {
        /// Type named by the envelope
        envelope: OrderEventType,
        /// Type found inside the payload
        payload: OrderEventType,
    },
}

/// Failures delivering an envelope to the event bus.
///
/// These are logged by the book manager and never roll back a book mutation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PublishError {
    /// The publisher has been closed.
    #[error("publisher is closed")]
    Closed,

    /// The receiving end of a channel publisher was dropped.
    #[error("event channel closed")]
    ChannelClosed,

    /// The envelope could not be encoded or decoded.
    #[error("event encoding failed: {0}")]
    Encoding(#[from] EventError),

    /// The transport refused the message.
    #[error("transport error: {message}")]
    Transport {
        /// Underlying error message
        message: String,
    },
}

/// Failures rebuilding an order aggregate from its events.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AggregateError {
    /// No events were supplied.
    #[error("no events to aggregate")]
    Empty,

    /// The first event was not an acceptance.
    #[error("{0} received before OrderAccepted")]
    MissingAcceptance(OrderEventType),

    /// A second acceptance arrived for the same order.
    #[error("order {0} accepted twice")]
    AlreadyAccepted(OrderId),

    /// The event kind cannot be applied to an order aggregate.
    #[error("event type not supported for aggregation: {0}")]
    UnsupportedEvent(OrderEventType),

    /// An event for another order was mixed into the stream.
    #[error("event for order {found} in stream of order {expected}")]
    OrderMismatch {
        /// Order being aggregated
        expected: OrderId,
        /// Order named by the offending event
        found: OrderId,
    },

    /// An envelope in the stream could not be decoded.
    #[error(transparent)]
    Event(#[from] EventError),
}
