//! Order book error types

use crate::orderbook::order::OrderId;
use crate::orderbook::status::OrderStatus;
use thiserror::Error;

/// Errors that can occur within the OrderBook
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OrderBookError {
    /// The order is not `Pending` and the book refuses to rest it.
    #[error("order {order_id} is not pending (status {status})")]
    NotPending {
        /// The rejected order
        order_id: OrderId,
        /// Its status at the time of the request
        status: OrderStatus,
    },

    /// An order with the same identifier is already known to the book.
    #[error("order {0} already exists in the book")]
    DuplicateOrder(OrderId),

    /// The request was malformed and never reached the book.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An internal consistency check failed. This is a programming error,
    /// never an expected runtime outcome.
    #[error("order book invariant violated: {message}")]
    InvariantViolation {
        /// Description of the broken invariant
        message: String,
    },

    /// Another thread panicked while holding the book lock.
    #[error("order book lock poisoned")]
    LockPoisoned,
}

/// Rejections of malformed input, raised before anything reaches the book.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// Direction text was neither `Buy` nor `Sell`.
    #[error("invalid direction: {0:?}")]
    InvalidDirection(String),

    /// Identifier text was not a UUID.
    #[error("invalid order id: {0:?}")]
    InvalidOrderId(String),

    /// Status text did not name a known status.
    #[error("invalid order status: {0:?}")]
    InvalidStatus(String),

    /// Order quantity must be positive.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(u64),

    /// Price text was not a decimal, or was not positive.
    #[error("invalid price: {0:?}")]
    InvalidPrice(String),
}
