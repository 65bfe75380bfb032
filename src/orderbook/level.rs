//! Price levels and their per-side order queues.

use crate::orderbook::arena::{OrderArena, OrderHandle};
use crate::orderbook::order::{Price, Side};
use serde::Serialize;

/// Orders resting on one side of a price level, in arrival order.
///
/// `quantity` is the sum of `remaining()` over the queued orders that are
/// still tradeable. Queue membership alone does not imply tradeability: a
/// cancelled order stays queued until the next [`OrderQueue::compact`].
#[derive(Debug, Clone, Default)]
pub struct OrderQueue {
    quantity: u64,
    orders: Vec<OrderHandle>,
}

impl OrderQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate open quantity of the tradeable orders in the queue
    #[inline]
    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Queued handles in time priority
    #[inline]
    pub fn orders(&self) -> &[OrderHandle] {
        &self.orders
    }

    /// Number of queued handles, tradeable or not
    #[inline]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Returns `true` if nothing is queued
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of queued orders that can still trade
    pub fn tradeable_count(&self, arena: &OrderArena) -> usize {
        self.orders
            .iter()
            .filter(|handle| arena.get(**handle).is_some_and(|o| o.is_tradeable()))
            .count()
    }

    /// Queue an order at the back and add its open quantity
    pub fn push(&mut self, handle: OrderHandle, remaining: u64) {
        self.quantity = self.quantity.saturating_add(remaining);
        self.orders.push(handle);
    }

    /// Returns `true` if `handle` is queued here
    pub fn contains(&self, handle: OrderHandle) -> bool {
        self.orders.contains(&handle)
    }

    pub(crate) fn add_quantity(&mut self, delta: u64) {
        self.quantity = self.quantity.saturating_add(delta);
    }

    pub(crate) fn remove_quantity(&mut self, delta: u64) {
        self.quantity = self.quantity.saturating_sub(delta);
    }

    /// Drops every non-tradeable order from the queue and recomputes the
    /// aggregate quantity from what is left.
    ///
    /// This is the only place handles leave a queue.
    pub fn compact(&mut self, arena: &OrderArena) {
        self.orders
            .retain(|handle| arena.get(*handle).is_some_and(|order| order.is_tradeable()));
        self.quantity = self
            .orders
            .iter()
            .filter_map(|handle| arena.get(*handle))
            .map(|order| order.remaining())
            .sum();
    }

    /// Sum of `remaining()` over tradeable queued orders, computed from scratch
    pub fn open_quantity(&self, arena: &OrderArena) -> u64 {
        self.orders
            .iter()
            .filter_map(|handle| arena.get(*handle))
            .filter(|order| order.is_tradeable())
            .map(|order| order.remaining())
            .sum()
    }
}

/// A single price with its buy and sell queues.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Price,
    buy: OrderQueue,
    sell: OrderQueue,
}

impl PriceLevel {
    /// Create an empty level at `price`
    pub fn new(price: Price) -> Self {
        Self {
            price,
            buy: OrderQueue::new(),
            sell: OrderQueue::new(),
        }
    }

    /// The level's price
    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Queue for the given side
    #[inline]
    pub fn queue(&self, side: Side) -> &OrderQueue {
        match side {
            Side::Buy => &self.buy,
            Side::Sell => &self.sell,
        }
    }

    /// Mutable queue for the given side
    #[inline]
    pub fn queue_mut(&mut self, side: Side) -> &mut OrderQueue {
        match side {
            Side::Buy => &mut self.buy,
            Side::Sell => &mut self.sell,
        }
    }

    /// Depth summary of this level
    pub fn depth(&self, arena: &OrderArena) -> LevelDepth {
        LevelDepth {
            price: self.price,
            buy_quantity: self.buy.quantity(),
            buy_depth: self.buy.tradeable_count(arena),
            sell_quantity: self.sell.quantity(),
            sell_depth: self.sell.tradeable_count(arena),
        }
    }
}

/// Locates `price` in an ascending sequence of levels.
///
/// Returns `(true, index)` when a level with exactly that price exists, and
/// `(false, index)` with the position a new level must be inserted at to keep
/// the sequence ascending otherwise.
pub fn find_price_index(levels: &[PriceLevel], price: Price) -> (bool, usize) {
    match levels.binary_search_by(|level| level.price.cmp(&price)) {
        Ok(index) => (true, index),
        Err(index) => (false, index),
    }
}

/// Aggregated view of one price level, as served to book queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelDepth {
    /// Level price
    pub price: Price,
    /// Open buy quantity
    pub buy_quantity: u64,
    /// Number of tradeable buy orders
    pub buy_depth: usize,
    /// Open sell quantity
    pub sell_quantity: u64,
    /// Number of tradeable sell orders
    pub sell_depth: usize,
}

/// Aggregated view of every price level of a symbol, ascending by price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolDepth {
    /// Instrument symbol
    pub symbol: String,
    /// Levels, ascending by price
    pub prices: Vec<LevelDepth>,
}
