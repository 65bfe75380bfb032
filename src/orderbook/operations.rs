//! Order book operations: appending, amending and cancelling resting orders

use super::arena::OrderHandle;
use super::book::OrderBook;
use super::error::{OrderBookError, ValidationError};
use super::events::OrderEvent;
use super::level::{PriceLevel, find_price_index};
use super::order::{AmendRequest, Order, OrderId};
use super::status::OrderStatus;
use tracing::{debug, error, trace};

impl OrderBook {
    /// Rests a new order in the book.
    ///
    /// The order is queued at the back of its side at `order.price()`; the
    /// level is created and spliced in at its sorted position if needed.
    ///
    /// # Errors
    /// - [`OrderBookError::NotPending`] if the order is not `Pending`
    /// - [`OrderBookError::DuplicateOrder`] if the identifier is already known
    /// - [`OrderBookError::Validation`] if nothing is left to fill
    ///
    /// No failure mutates the book.
    pub fn append(&mut self, order: Order) -> Result<OrderHandle, OrderBookError> {
        if order.status() != OrderStatus::Pending {
            debug!(order_id = %order.id(), status = %order.status(), "append rejected: not pending");
            return Err(OrderBookError::NotPending {
                order_id: order.id(),
                status: order.status(),
            });
        }
        self.rest(order)
    }

    /// Rests a tradeable order, pending or partially filled.
    pub(crate) fn rest(&mut self, order: Order) -> Result<OrderHandle, OrderBookError> {
        if self.index.contains_key(&order.id()) {
            debug!(order_id = %order.id(), "rest rejected: duplicate id");
            return Err(OrderBookError::DuplicateOrder(order.id()));
        }
        if !order.is_tradeable() {
            return Err(OrderBookError::NotPending {
                order_id: order.id(),
                status: order.status(),
            });
        }
        if order.remaining() == 0 {
            debug!(order_id = %order.id(), "rest rejected: nothing left to fill");
            return Err(ValidationError::InvalidQuantity(order.quantity()).into());
        }

        let (id, price, side, remaining) = (order.id(), order.price(), order.side(), order.remaining());
        let levels = self.symbols.entry(order.symbol().to_string()).or_default();
        let (found, index) = find_price_index(levels, price);
        if !found {
            trace!(symbol = %order.symbol(), %price, index, "new price level");
            levels.insert(index, PriceLevel::new(price));
        }

        let handle = self.arena.insert(order);
        levels[index].queue_mut(side).push(handle, remaining);
        self.index.insert(id, handle);

        trace!(order_id = %id, %price, %side, remaining, "order rested");
        Ok(handle)
    }

    /// Grows a resting order to `request.quantity`.
    ///
    /// The order is located by symbol, exact price, side and identifier.
    /// Returns `false` without mutating anything if it cannot be found, is no
    /// longer tradeable, or the requested quantity does not exceed its current
    /// quantity.
    pub fn amend(&mut self, request: &AmendRequest) -> bool {
        let Some(levels) = self.symbols.get_mut(&request.symbol) else {
            debug!(symbol = %request.symbol, "amend: symbol not found");
            return false;
        };
        let (found, index) = find_price_index(levels, request.price);
        if !found {
            debug!(price = %request.price, "amend: price not found");
            return false;
        }

        let queue = levels[index].queue_mut(request.side);
        let arena = &mut self.arena;
        let Some(handle) = queue
            .orders()
            .iter()
            .copied()
            .find(|handle| arena.get(*handle).is_some_and(|o| o.id() == request.id))
        else {
            debug!(order_id = %request.id, "amend: order not found");
            return false;
        };
        let Some(order) = arena.get_mut(handle) else {
            return false;
        };

        if !order.is_tradeable() {
            debug!(order_id = %request.id, status = %order.status(), "amend: order not tradeable");
            return false;
        }
        if request.quantity <= order.quantity() {
            debug!(
                order_id = %request.id,
                current = order.quantity(),
                requested = request.quantity,
                "amend: quantity must grow"
            );
            return false;
        }

        let delta = request.quantity - order.quantity();
        order.grow(delta);
        queue.add_quantity(delta);
        self.outbox
            .push(OrderEvent::amended(request.id, order.quantity(), self.event_version));
        trace!(order_id = %request.id, quantity = order.quantity(), "order amended");
        true
    }

    /// Cancels a tradeable order.
    ///
    /// Returns `false` if the identifier is unknown or the order can no longer
    /// trade. The side aggregate drops by the order's open quantity at once;
    /// the handle itself leaves its queue at the next compaction.
    pub fn cancel(&mut self, id: &OrderId) -> bool {
        let Some(&handle) = self.index.get(id) else {
            debug!(order_id = %id, "cancel: order not found");
            return false;
        };
        let Some(order) = self.arena.get_mut(handle) else {
            error!(order_id = %id, "cancel: indexed order missing from arena");
            return false;
        };
        if !order.is_tradeable() {
            debug!(order_id = %id, status = %order.status(), "cancel: order not tradeable");
            return false;
        }

        let remaining = order.remaining();
        order.cancel();

        let queue = self
            .symbols
            .get_mut(order.symbol())
            .and_then(|levels| match find_price_index(levels, order.price()) {
                (true, index) => levels.get_mut(index),
                (false, _) => None,
            })
            .map(|level| level.queue_mut(order.side()))
            .filter(|queue| queue.contains(handle));
        match queue {
            Some(queue) => queue.remove_quantity(remaining),
            None => error!(order_id = %id, "cancel: tradeable order was not queued"),
        }

        self.outbox.push(OrderEvent::cancelled(*id, self.event_version));
        trace!(order_id = %id, remaining, "order cancelled");
        true
    }

    /// Records the acceptance of an incoming order.
    pub(crate) fn record_accepted(&mut self, order: &Order) {
        self.outbox.push(OrderEvent::accepted(order, self.event_version));
    }

    /// Takes every event produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.outbox)
    }
}
