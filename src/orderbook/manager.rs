//! Thread-safe facade over the order book with event publication.
//!
//! [`BookManager`] serializes every operation on one book-wide lock and hands
//! the events each operation produced to an [`EventPublisher`]. Each batch of
//! events draws a publication sequence number while the book lock is held;
//! publication happens after the lock is released, one batch at a time in
//! sequence order, so envelopes leave in exactly the order the book was
//! mutated and a slow publisher never holds up the book.

use crate::orderbook::arena::OrderHandle;
use crate::orderbook::book::OrderBook;
use crate::orderbook::config::BookConfig;
use crate::orderbook::error::{OrderBookError, ValidationError};
use crate::orderbook::events::{EventPublisher, OrderEvent, OrderEventEnvelope, PublishError};
use crate::orderbook::level::SymbolDepth;
use crate::orderbook::order::{AmendRequest, NewOrderRequest, Order, OrderId};
use crate::orderbook::status::OrderStatus;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

/// Result of submitting an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// The submitted order as it stands after matching
    pub order: Order,
    /// Quantity executed against resting orders
    pub executed: u64,
    /// Handle of the rested remainder, if any
    pub resting: Option<OrderHandle>,
}

impl SubmitOutcome {
    /// Returns `true` if part of the order now rests in the book
    #[inline]
    pub fn is_resting(&self) -> bool {
        self.resting.is_some()
    }
}

/// Hands out publication turns in the order they were drawn.
#[derive(Debug, Default)]
struct PublishSequence {
    /// Next sequence number to draw, only advanced under the book lock
    next: AtomicU64,
    /// Sequence number whose turn it is to publish
    serving: Mutex<u64>,
    turn: Condvar,
}

impl PublishSequence {
    fn draw(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Blocks until `sequence` is being served.
    fn wait_turn(&self, sequence: u64) -> PublishTurn<'_> {
        let mut serving = self.serving.lock().unwrap_or_else(PoisonError::into_inner);
        while *serving != sequence {
            serving = self
                .turn
                .wait(serving)
                .unwrap_or_else(PoisonError::into_inner);
        }
        PublishTurn { sequence: self }
    }
}

/// Passes the turn to the next sequence number when dropped, even if the
/// publisher panicked.
struct PublishTurn<'a> {
    sequence: &'a PublishSequence,
}

impl Drop for PublishTurn<'_> {
    fn drop(&mut self) {
        let mut serving = self
            .sequence
            .serving
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *serving += 1;
        self.sequence.turn.notify_all();
    }
}

/// Concurrent entry point to an [`OrderBook`].
#[derive(Debug)]
pub struct BookManager {
    book: Mutex<OrderBook>,
    sequence: PublishSequence,
    publisher: Arc<dyn EventPublisher>,
    config: BookConfig,
}

impl BookManager {
    /// Create a manager with default configuration
    pub fn new<P: EventPublisher + 'static>(publisher: P) -> Self {
        Self::with_config(publisher, BookConfig::default())
    }

    /// Create a manager with the given configuration
    pub fn with_config<P: EventPublisher + 'static>(publisher: P, config: BookConfig) -> Self {
        info!(
            event_version = config.event_version,
            uppercase_symbols = config.uppercase_symbols,
            "book manager created"
        );
        Self {
            book: Mutex::new(OrderBook::with_config(&config)),
            sequence: PublishSequence::default(),
            publisher: Arc::new(publisher),
            config,
        }
    }

    /// Active configuration
    #[inline]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Open the publisher.
    ///
    /// # Errors
    /// Whatever the publisher reports.
    pub fn open(&self) -> Result<(), PublishError> {
        self.publisher.open()?;
        info!("event publisher opened");
        Ok(())
    }

    /// Close the publisher. The book stays usable; later events fail to
    /// publish and are logged.
    ///
    /// # Errors
    /// Whatever the publisher reports.
    pub fn close(&self) -> Result<(), PublishError> {
        self.publisher.close()?;
        info!("event publisher closed");
        Ok(())
    }

    /// Accepts a new order, matches it and rests any tradeable remainder, all
    /// in one critical section.
    ///
    /// An `OrderAccepted` event precedes the fills. A partially filled
    /// remainder is rested even though it is no longer `Pending`.
    ///
    /// # Errors
    /// - [`OrderBookError::NotPending`] if the order is not `Pending`
    /// - [`OrderBookError::DuplicateOrder`] if its identifier is known
    /// - [`OrderBookError::Validation`] if its quantity is zero
    /// - [`OrderBookError::LockPoisoned`] if the book lock is poisoned
    ///
    /// A rejected order leaves no trace in the book and emits no event.
    pub fn submit(&self, order: Order) -> Result<SubmitOutcome, OrderBookError> {
        let order = self.normalize(order);
        self.mutate(|book| Self::submit_locked(book, order))?
    }

    /// Validates a raw request and submits the resulting order.
    ///
    /// # Errors
    /// [`OrderBookError::Validation`] for a malformed request, otherwise as
    /// [`BookManager::submit`].
    pub fn submit_request(&self, request: NewOrderRequest) -> Result<SubmitOutcome, OrderBookError> {
        let order = Order::try_from(request)?;
        self.submit(order)
    }

    fn submit_locked(book: &mut OrderBook, mut order: Order) -> Result<SubmitOutcome, OrderBookError> {
        if order.status() != OrderStatus::Pending {
            return Err(OrderBookError::NotPending {
                order_id: order.id(),
                status: order.status(),
            });
        }
        if book.contains(&order.id()) {
            return Err(OrderBookError::DuplicateOrder(order.id()));
        }
        if order.quantity() == 0 {
            return Err(ValidationError::InvalidQuantity(0).into());
        }

        book.record_accepted(&order);
        let executed = book.trade(&mut order);
        let resting = if order.is_tradeable() {
            Some(book.rest(order.clone())?)
        } else {
            None
        };
        debug!(order_id = %order.id(), executed, resting = resting.is_some(), "order submitted");
        Ok(SubmitOutcome {
            order,
            executed,
            resting,
        })
    }

    /// Rests a `Pending` order without matching it.
    ///
    /// # Errors
    /// As [`OrderBook::append`], plus [`OrderBookError::LockPoisoned`].
    pub fn append(&self, order: Order) -> Result<OrderHandle, OrderBookError> {
        let order = self.normalize(order);
        self.mutate(|book| book.append(order))?
    }

    /// Matches `order` against the book without resting it.
    ///
    /// # Errors
    /// [`OrderBookError::LockPoisoned`] if the book lock is poisoned.
    pub fn trade(&self, order: &mut Order) -> Result<u64, OrderBookError> {
        if self.config.uppercase_symbols {
            order.set_symbol(self.config.normalize_symbol(order.symbol()));
        }
        self.mutate(|book| book.trade(order))
    }

    /// Grows a resting order. `Ok(false)` means not found or not amendable.
    ///
    /// # Errors
    /// [`OrderBookError::LockPoisoned`] if the book lock is poisoned.
    pub fn amend(&self, request: &AmendRequest) -> Result<bool, OrderBookError> {
        if self.config.uppercase_symbols {
            let mut request = request.clone();
            request.symbol = self.config.normalize_symbol(&request.symbol);
            return self.mutate(|book| book.amend(&request));
        }
        self.mutate(|book| book.amend(request))
    }

    /// Cancels a resting order. `Ok(false)` means not found or not tradeable.
    ///
    /// # Errors
    /// [`OrderBookError::LockPoisoned`] if the book lock is poisoned.
    pub fn cancel(&self, id: &OrderId) -> Result<bool, OrderBookError> {
        self.mutate(|book| book.cancel(id))
    }

    /// Snapshot of one order.
    ///
    /// # Errors
    /// [`OrderBookError::LockPoisoned`] if the book lock is poisoned.
    pub fn order(&self, id: &OrderId) -> Result<Option<Order>, OrderBookError> {
        Ok(self.lock_book()?.order(id).cloned())
    }

    /// Depth of one symbol.
    ///
    /// # Errors
    /// [`OrderBookError::LockPoisoned`] if the book lock is poisoned.
    pub fn depth(&self, symbol: &str) -> Result<Option<SymbolDepth>, OrderBookError> {
        let symbol = self.config.normalize_symbol(symbol);
        Ok(self.lock_book()?.depth(&symbol))
    }

    /// Depth of every symbol.
    ///
    /// # Errors
    /// [`OrderBookError::LockPoisoned`] if the book lock is poisoned.
    pub fn depths(&self) -> Result<Vec<SymbolDepth>, OrderBookError> {
        Ok(self.lock_book()?.depths())
    }

    /// Known symbols.
    ///
    /// # Errors
    /// [`OrderBookError::LockPoisoned`] if the book lock is poisoned.
    pub fn symbols(&self) -> Result<Vec<String>, OrderBookError> {
        Ok(self.lock_book()?.symbols())
    }

    /// Number of orders ever rested.
    ///
    /// # Errors
    /// [`OrderBookError::LockPoisoned`] if the book lock is poisoned.
    pub fn order_count(&self) -> Result<usize, OrderBookError> {
        Ok(self.lock_book()?.order_count())
    }

    /// Runs [`OrderBook::validate`] under the lock.
    ///
    /// # Errors
    /// [`OrderBookError::InvariantViolation`] or [`OrderBookError::LockPoisoned`].
    pub fn validate(&self) -> Result<(), OrderBookError> {
        self.lock_book()?.validate()
    }

    /// Runs `read` against the book under the lock.
    ///
    /// # Errors
    /// [`OrderBookError::LockPoisoned`] if the book lock is poisoned.
    pub fn with_book<R>(&self, read: impl FnOnce(&OrderBook) -> R) -> Result<R, OrderBookError> {
        let book = self.lock_book()?;
        Ok(read(&book))
    }

    fn lock_book(&self) -> Result<MutexGuard<'_, OrderBook>, OrderBookError> {
        self.book.lock().map_err(|_| {
            error!("order book lock poisoned");
            OrderBookError::LockPoisoned
        })
    }

    fn normalize(&self, mut order: Order) -> Order {
        if self.config.uppercase_symbols {
            let symbol = self.config.normalize_symbol(order.symbol());
            order.set_symbol(symbol);
        }
        order
    }

    /// Applies `op` under the book lock, then publishes the events it produced.
    fn mutate<R>(&self, op: impl FnOnce(&mut OrderBook) -> R) -> Result<R, OrderBookError> {
        let mut book = self.lock_book()?;
        let result = op(&mut book);
        let events = book.drain_events();
        if events.is_empty() {
            return Ok(result);
        }

        // Drawn under the book lock so sequence order is mutation order.
        let sequence = self.sequence.draw();
        drop(book);

        let _turn = self.sequence.wait_turn(sequence);
        self.publish_all(&events);
        Ok(result)
    }

    fn publish_all(&self, events: &[OrderEvent]) {
        for event in events {
            let outcome = OrderEventEnvelope::from_event(event)
                .map_err(PublishError::from)
                .and_then(|envelope| self.publisher.publish(&envelope));
            if let Err(e) = outcome {
                error!(
                    order_id = %event.order_id(),
                    event_type = %event.event_type(),
                    error = %e,
                    "failed to publish order event"
                );
            }
        }
    }
}
