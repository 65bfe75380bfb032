//! Contains the core matching engine logic for the order book.
//!
//! An incoming order crosses the opposite side of its symbol in price-time
//! priority: best price first, and within a level, earliest arrival first.
//! Every fill executes at the resting order's price.

use super::arena::OrderArena;
use super::book::OrderBook;
use super::events::OrderEvent;
use super::level::PriceLevel;
use super::order::{Order, Side};
use tracing::{debug, trace};

impl OrderBook {
    /// Matches `incoming` against the book and returns the quantity executed.
    ///
    /// A buy walks the levels upward from the cheapest and stops at the first
    /// level priced above its limit; a sell walks downward from the most
    /// expensive and stops at the first level priced below its limit. Each
    /// crossed level has its opposite side compacted afterwards.
    ///
    /// `incoming` is updated in place and never rested here: resting a
    /// still-tradeable remainder is up to the caller.
    pub fn trade(&mut self, incoming: &mut Order) -> u64 {
        let Some(levels) = self.symbols.get_mut(incoming.symbol()) else {
            trace!(symbol = %incoming.symbol(), "trade: no levels for symbol");
            return 0;
        };

        let side = incoming.side();
        let count = levels.len();
        let mut executed = 0u64;

        for step in 0..count {
            if !incoming.is_tradeable() {
                break;
            }
            let index = match side {
                Side::Buy => step,
                Side::Sell => count - 1 - step,
            };
            let level = &mut levels[index];
            let eligible = match side {
                Side::Buy => level.price() <= incoming.price(),
                Side::Sell => level.price() >= incoming.price(),
            };
            if !eligible {
                break;
            }
            executed += Self::cross_level(
                level,
                incoming,
                &mut self.arena,
                &mut self.outbox,
                self.event_version,
            );
        }

        if executed > 0 {
            debug!(
                order_id = %incoming.id(),
                executed,
                remaining = incoming.remaining(),
                status = %incoming.status(),
                "order matched"
            );
        }
        executed
    }

    /// Fills `incoming` against the opposite queue of one level, then
    /// compacts that queue.
    fn cross_level(
        level: &mut PriceLevel,
        incoming: &mut Order,
        arena: &mut OrderArena,
        outbox: &mut Vec<OrderEvent>,
        version: u32,
    ) -> u64 {
        let queue = level.queue_mut(incoming.side().opposite());
        let mut crossed = 0u64;

        for &handle in queue.orders() {
            if !incoming.is_tradeable() {
                break;
            }
            let Some(resting) = arena.get_mut(handle) else {
                continue;
            };
            if !resting.is_tradeable() {
                continue;
            }

            let quantity = resting.remaining().min(incoming.remaining());
            if quantity == 0 {
                continue;
            }
            let price = resting.price();
            resting.fill(quantity);
            incoming.fill(quantity);

            outbox.push(OrderEvent::traded(resting.id(), price, quantity, version));
            outbox.push(OrderEvent::traded(incoming.id(), price, quantity, version));
            crossed += quantity;
            trace!(
                resting = %resting.id(),
                incoming = %incoming.id(),
                %price,
                quantity,
                "fill"
            );
        }

        queue.compact(arena);
        crossed
    }
}
