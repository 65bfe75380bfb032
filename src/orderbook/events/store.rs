//! In-process append-only event log.

use crate::orderbook::events::aggregate::{EventAggregator, OrderAggregate};
use crate::orderbook::events::envelope::OrderEventEnvelope;
use crate::orderbook::events::error::{AggregateError, PublishError};
use crate::orderbook::events::publisher::EventPublisher;
use crate::orderbook::events::types::OrderEvent;
use crate::orderbook::order::OrderId;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::trace;

/// Event log keyed by order id, each order's stream kept in arrival order.
///
/// Stands in for the relational event store: publishing an envelope decodes
/// it and appends the event to its order's stream. Streams are never edited.
#[derive(Debug)]
pub struct InMemoryEventStore {
    streams: DashMap<OrderId, Vec<OrderEvent>>,
    open: AtomicBool,
    stored: AtomicUsize,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventStore {
    /// Create an open, empty store
    pub fn new() -> Self {
        Self {
            streams: DashMap::new(),
            open: AtomicBool::new(true),
            stored: AtomicUsize::new(0),
        }
    }

    /// Append an event directly, bypassing the envelope.
    pub fn append(&self, event: OrderEvent) {
        self.streams.entry(event.order_id()).or_default().push(event);
        self.stored.fetch_add(1, Ordering::Relaxed);
    }

    /// Every event stored for `id`, oldest first
    pub fn events_for(&self, id: &OrderId) -> Vec<OrderEvent> {
        self.streams
            .get(id)
            .map(|stream| stream.value().clone())
            .unwrap_or_default()
    }

    /// The stream of `id` re-wrapped as envelopes, as a consumer would read it
    ///
    /// # Errors
    /// Returns [`PublishError::Encoding`] if an event cannot be serialized.
    pub fn envelopes_for(&self, id: &OrderId) -> Result<Vec<OrderEventEnvelope>, PublishError> {
        self.events_for(id)
            .iter()
            .map(|event| OrderEventEnvelope::from_event(event).map_err(PublishError::from))
            .collect()
    }

    /// Rebuilds the aggregate of order `id` from its stream.
    ///
    /// # Errors
    /// Fails as [`EventAggregator::aggregate`] does, including
    /// [`AggregateError::Empty`] for an unknown id.
    pub fn aggregate(&self, id: &OrderId) -> Result<OrderAggregate, AggregateError> {
        EventAggregator::aggregate(&self.events_for(id))
    }

    /// Ids that have at least one stored event
    pub fn order_ids(&self) -> Vec<OrderId> {
        self.streams.iter().map(|entry| *entry.key()).collect()
    }

    /// Total number of stored events
    pub fn len(&self) -> usize {
        self.stored.load(Ordering::Relaxed)
    }

    /// Returns `true` if nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` while the store accepts envelopes
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

impl EventPublisher for InMemoryEventStore {
    fn open(&self) -> Result<(), PublishError> {
        self.open.store(true, Ordering::Release);
        Ok(())
    }

    fn close(&self) -> Result<(), PublishError> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }

    fn publish(&self, envelope: &OrderEventEnvelope) -> Result<(), PublishError> {
        if !self.is_open() {
            return Err(PublishError::Closed);
        }
        let event = envelope.decode()?;
        trace!(order_id = %event.order_id(), event_type = %event.event_type(), "event stored");
        self.append(event);
        Ok(())
    }
}
