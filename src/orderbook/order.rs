//! Orders, their direction, and the request shapes that create or amend them.

use crate::orderbook::error::ValidationError;
use crate::orderbook::status::OrderStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque, unique order identifier.
pub type OrderId = Uuid;

/// Limit price. Decimal so that level equality is exact.
pub type Price = Decimal;

/// Direction of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bid
    Buy,
    /// Ask
    Sell,
}

impl Side {
    /// The side an order of this direction trades against.
    #[must_use]
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Textual name, as used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(Side::Buy),
            "Sell" => Ok(Side::Sell),
            other => Err(ValidationError::InvalidDirection(other.to_string())),
        }
    }
}

/// A limit order.
///
/// `status` is kept in step with `(quantity, traded)` by every mutator except
/// [`Order::cancel`], which sets the terminal status directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    symbol: String,
    price: Price,
    quantity: u64,
    traded: u64,
    side: Side,
    status: OrderStatus,
}

impl Order {
    /// Creates a new, untraded order.
    pub fn new(id: OrderId, symbol: impl Into<String>, price: Price, quantity: u64, side: Side) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            price,
            quantity,
            traded: 0,
            side,
            status: OrderStatus::Pending,
        }
    }

    /// Creates an order with every field given explicitly.
    ///
    /// The status is taken as-is; no resolution against the quantities is
    /// performed.
    pub fn with_state(
        id: OrderId,
        symbol: impl Into<String>,
        price: Price,
        quantity: u64,
        traded: u64,
        side: Side,
        status: OrderStatus,
    ) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            price,
            quantity,
            traded,
            side,
            status,
        }
    }

    /// Order identifier
    #[inline]
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Instrument symbol
    #[inline]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Limit price
    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Original (possibly amended) quantity
    #[inline]
    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Quantity traded so far
    #[inline]
    pub fn traded(&self) -> u64 {
        self.traded
    }

    /// Direction
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Current status
    #[inline]
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Quantity still open. Zero once filled or over-filled.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.quantity.saturating_sub(self.traded)
    }

    /// Returns `true` while the order may still trade.
    #[inline]
    pub fn is_tradeable(&self) -> bool {
        self.status.is_tradeable()
    }

    /// Records a fill of `quantity` and resolves the new status.
    pub fn fill(&mut self, quantity: u64) {
        self.traded = self.traded.saturating_add(quantity);
        self.status = OrderStatus::resolve(self.quantity, self.traded);
    }

    /// Grows the order quantity by `delta` and resolves the new status.
    pub fn grow(&mut self, delta: u64) {
        self.quantity = self.quantity.saturating_add(delta);
        self.status = OrderStatus::resolve(self.quantity, self.traded);
    }

    /// Marks the order cancelled.
    pub fn cancel(&mut self) {
        self.status = OrderStatus::Cancelled;
    }

    pub(crate) fn set_symbol(&mut self, symbol: String) {
        self.symbol = symbol;
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}@{} {} {} {}",
            self.id, self.symbol, self.price, self.side, self.quantity, self.status
        )
    }
}

/// A new-order request as it arrives from an external caller, before any
/// field has been validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderRequest {
    /// Order identifier (UUID text)
    pub id: String,
    /// Instrument symbol
    pub symbol: String,
    /// Order quantity
    pub quantity: u64,
    /// `Buy` or `Sell`
    pub direction: String,
    /// Limit price (decimal text)
    pub price: String,
}

impl TryFrom<NewOrderRequest> for Order {
    type Error = ValidationError;

    fn try_from(request: NewOrderRequest) -> Result<Self, Self::Error> {
        let side: Side = request.direction.parse()?;
        let id = Uuid::parse_str(&request.id)
            .map_err(|_| ValidationError::InvalidOrderId(request.id.clone()))?;
        let price = Decimal::from_str(&request.price)
            .map_err(|_| ValidationError::InvalidPrice(request.price.clone()))?;
        if price <= Decimal::ZERO {
            return Err(ValidationError::InvalidPrice(request.price));
        }
        if request.quantity == 0 {
            return Err(ValidationError::InvalidQuantity(request.quantity));
        }
        Ok(Order::new(id, request.symbol, price, request.quantity, side))
    }
}

/// A request to grow a resting order.
///
/// `symbol`, `price` and `side` locate the order; `quantity` is the requested
/// new total quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmendRequest {
    /// Target order
    pub id: OrderId,
    /// Symbol the order rests on
    pub symbol: String,
    /// Exact price level the order rests at
    pub price: Price,
    /// Side the order rests on
    pub side: Side,
    /// Requested new total quantity
    pub quantity: u64,
}

impl AmendRequest {
    /// Builds an amendment that targets `order` and asks for `quantity`.
    pub fn for_order(order: &Order, quantity: u64) -> Self {
        Self {
            id: order.id(),
            symbol: order.symbol().to_string(),
            price: order.price(),
            side: order.side(),
            quantity,
        }
    }
}
