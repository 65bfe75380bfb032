//! The seam between the book and the event bus.

use crate::orderbook::events::envelope::OrderEventEnvelope;
use crate::orderbook::events::error::PublishError;
use std::sync::Arc;

/// Destination for order event envelopes.
///
/// Publication is fire-and-forget from the book's point of view: the book
/// manager calls [`EventPublisher::publish`] after the mutation has been
/// applied and only logs a failure.
pub trait EventPublisher: Send + Sync + std::fmt::Debug {
    /// Prepare the publisher for use. The default does nothing.
    ///
    /// # Errors
    /// Returns a [`PublishError`] if the underlying transport cannot be opened.
    fn open(&self) -> Result<(), PublishError> {
        Ok(())
    }

    /// Release the publisher. The default does nothing.
    ///
    /// # Errors
    /// Returns a [`PublishError`] if the underlying transport fails to close.
    fn close(&self) -> Result<(), PublishError> {
        Ok(())
    }

    /// Deliver one envelope.
    ///
    /// # Errors
    /// Returns a [`PublishError`] if the envelope could not be handed off.
    fn publish(&self, envelope: &OrderEventEnvelope) -> Result<(), PublishError>;
}

impl<P: EventPublisher + ?Sized> EventPublisher for Arc<P> {
    fn open(&self) -> Result<(), PublishError> {
        (**self).open()
    }

    fn close(&self) -> Result<(), PublishError> {
        (**self).close()
    }

    fn publish(&self, envelope: &OrderEventEnvelope) -> Result<(), PublishError> {
        (**self).publish(envelope)
    }
}

/// Publisher that drops every envelope.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _envelope: &OrderEventEnvelope) -> Result<(), PublishError> {
        Ok(())
    }
}
