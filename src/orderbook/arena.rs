//! Slot arena holding every order the book has ever rested.
//!
//! The identifier index and the price-level queues both refer to orders by
//! [`OrderHandle`], so a mutation made through one path is seen by the other.
//! Slots are never freed: the identifier index keeps answering for filled and
//! cancelled orders.

use crate::orderbook::order::Order;

/// Stable index of an order inside an [`OrderArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderHandle(usize);

impl OrderHandle {
    /// Raw slot index
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Append-only storage of orders.
#[derive(Debug, Default)]
pub struct OrderArena {
    slots: Vec<Order>,
}

impl OrderArena {
    /// Create an arena with room for `capacity` orders before reallocating
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Store an order and return its handle
    #[inline]
    pub fn insert(&mut self, order: Order) -> OrderHandle {
        let handle = OrderHandle(self.slots.len());
        self.slots.push(order);
        handle
    }

    /// Get the order behind a handle
    #[inline]
    pub fn get(&self, handle: OrderHandle) -> Option<&Order> {
        self.slots.get(handle.0)
    }

    /// Get the order behind a handle for mutation
    #[inline]
    pub fn get_mut(&mut self, handle: OrderHandle) -> Option<&mut Order> {
        self.slots.get_mut(handle.0)
    }

    /// Number of stored orders
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no order was ever stored
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate over every stored order with its handle
    pub fn iter(&self) -> impl Iterator<Item = (OrderHandle, &Order)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, order)| (OrderHandle(index), order))
    }
}
