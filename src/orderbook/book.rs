//! Core OrderBook state and its read side

use super::arena::{OrderArena, OrderHandle};
use super::config::BookConfig;
use super::error::OrderBookError;
use super::events::OrderEvent;
use super::level::{PriceLevel, SymbolDepth, find_price_index};
use super::order::{Order, OrderId, Price, Side};
use std::collections::HashMap;

/// Limit order book for any number of symbols.
///
/// Each symbol owns an ascending sequence of [`PriceLevel`]s, and every order
/// the book has ever rested lives in one [`OrderArena`]. The identifier index
/// and the level queues both hold [`OrderHandle`]s into that arena.
///
/// The book itself is single-threaded (`&mut self` for every mutation).
/// [`BookManager`](super::BookManager) puts it behind one lock.
#[derive(Debug)]
pub struct OrderBook {
    /// Price levels per symbol, ascending by price
    pub(super) symbols: HashMap<String, Vec<PriceLevel>>,

    /// Every order ever rested, by identifier. Entries are never removed.
    pub(super) index: HashMap<OrderId, OrderHandle>,

    pub(super) arena: OrderArena,

    /// Events produced by mutations and not yet drained
    pub(super) outbox: Vec<OrderEvent>,

    /// Schema version stamped on emitted events
    pub(super) event_version: u32,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Create an empty book with default settings
    pub fn new() -> Self {
        Self::with_config(&BookConfig::default())
    }

    /// Create an empty book sized and versioned by `config`
    pub fn with_config(config: &BookConfig) -> Self {
        Self {
            symbols: HashMap::new(),
            index: HashMap::new(),
            arena: OrderArena::with_capacity(config.arena_capacity),
            outbox: Vec::new(),
            event_version: config.event_version,
        }
    }

    /// Schema version stamped on emitted events
    #[inline]
    pub fn event_version(&self) -> u32 {
        self.event_version
    }

    /// Known symbols, sorted
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.symbols.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Price levels of `symbol`, ascending by price
    pub fn levels(&self, symbol: &str) -> Option<&[PriceLevel]> {
        self.symbols.get(symbol).map(Vec::as_slice)
    }

    /// The level of `symbol` at exactly `price`
    pub fn level(&self, symbol: &str, price: Price) -> Option<&PriceLevel> {
        let levels = self.symbols.get(symbol)?;
        match find_price_index(levels, price) {
            (true, index) => levels.get(index),
            (false, _) => None,
        }
    }

    /// Orders queued on one side of a level, in time priority.
    ///
    /// Includes orders that are no longer tradeable but have not been
    /// compacted away yet.
    pub fn queued_orders(&self, symbol: &str, price: Price, side: Side) -> Vec<&Order> {
        self.level(symbol, price)
            .map(|level| {
                level
                    .queue(side)
                    .orders()
                    .iter()
                    .filter_map(|handle| self.arena.get(*handle))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Depth view of one symbol
    pub fn depth(&self, symbol: &str) -> Option<SymbolDepth> {
        self.symbols.get(symbol).map(|levels| SymbolDepth {
            symbol: symbol.to_string(),
            prices: levels.iter().map(|level| level.depth(&self.arena)).collect(),
        })
    }

    /// Depth view of every symbol, sorted by symbol
    pub fn depths(&self) -> Vec<SymbolDepth> {
        self.symbols()
            .iter()
            .filter_map(|symbol| self.depth(symbol))
            .collect()
    }

    /// Look up an order by identifier, including filled and cancelled ones
    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.index.get(id).and_then(|handle| self.arena.get(*handle))
    }

    /// Returns `true` if the identifier is known to the book
    #[inline]
    pub fn contains(&self, id: &OrderId) -> bool {
        self.index.contains_key(id)
    }

    /// Number of orders in the identifier index
    #[inline]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// The order arena, for inspection
    #[inline]
    pub fn arena(&self) -> &OrderArena {
        &self.arena
    }

    /// Number of events waiting to be drained
    #[inline]
    pub fn pending_events(&self) -> usize {
        self.outbox.len()
    }

    /// Checks the structural invariants of the book.
    ///
    /// - every symbol's levels are strictly ascending by price
    /// - every side aggregate equals the open quantity of its tradeable orders
    /// - every tradeable indexed order is queued at its own level and side
    ///
    /// # Errors
    /// Returns [`OrderBookError::InvariantViolation`] naming the first broken
    /// invariant found.
    pub fn validate(&self) -> Result<(), OrderBookError> {
        for (symbol, levels) in &self.symbols {
            for pair in levels.windows(2) {
                if pair[0].price() >= pair[1].price() {
                    return Err(invariant(format!(
                        "{symbol}: levels {} and {} are not strictly ascending",
                        pair[0].price(),
                        pair[1].price()
                    )));
                }
            }
            for level in levels {
                for side in [Side::Buy, Side::Sell] {
                    let queue = level.queue(side);
                    let open = queue.open_quantity(&self.arena);
                    if queue.quantity() != open {
                        return Err(invariant(format!(
                            "{symbol}@{} {side}: aggregate {} but open quantity {open}",
                            level.price(),
                            queue.quantity()
                        )));
                    }
                }
            }
        }

        for (id, handle) in &self.index {
            let Some(order) = self.arena.get(*handle) else {
                return Err(invariant(format!("order {id} indexed but not stored")));
            };
            if !order.is_tradeable() {
                continue;
            }
            let queued = self
                .level(order.symbol(), order.price())
                .is_some_and(|level| level.queue(order.side()).contains(*handle));
            if !queued {
                return Err(invariant(format!(
                    "tradeable order {id} is not queued at {}@{}",
                    order.symbol(),
                    order.price()
                )));
            }
        }
        Ok(())
    }
}

fn invariant(message: String) -> OrderBookError {
    OrderBookError::InvariantViolation { message }
}
