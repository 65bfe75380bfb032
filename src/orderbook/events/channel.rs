//! Publisher that forwards envelopes to a Tokio channel.

use crate::orderbook::events::envelope::OrderEventEnvelope;
use crate::orderbook::events::error::PublishError;
use crate::orderbook::events::publisher::EventPublisher;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::info;

/// Sends every envelope down an unbounded Tokio mpsc channel.
///
/// `publish` never blocks, so it is safe to call from the book manager's
/// synchronous publication path; a consumer task drains the receiver.
#[derive(Debug)]
pub struct ChannelEventPublisher {
    sender: UnboundedSender<OrderEventEnvelope>,
    open: AtomicBool,
}

impl ChannelEventPublisher {
    /// Create a publisher and the receiver its envelopes arrive on
    pub fn new() -> (Self, UnboundedReceiver<OrderEventEnvelope>) {
        let (sender, receiver) = unbounded_channel();
        (
            Self {
                sender,
                open: AtomicBool::new(true),
            },
            receiver,
        )
    }

    /// Wrap an existing sender
    pub fn from_sender(sender: UnboundedSender<OrderEventEnvelope>) -> Self {
        Self {
            sender,
            open: AtomicBool::new(true),
        }
    }
}

impl EventPublisher for ChannelEventPublisher {
    fn open(&self) -> Result<(), PublishError> {
        if self.sender.is_closed() {
            return Err(PublishError::ChannelClosed);
        }
        self.open.store(true, Ordering::Release);
        info!("event channel opened");
        Ok(())
    }

    fn close(&self) -> Result<(), PublishError> {
        self.open.store(false, Ordering::Release);
        info!("event channel closed");
        Ok(())
    }

    fn publish(&self, envelope: &OrderEventEnvelope) -> Result<(), PublishError> {
        if !self.open.load(Ordering::Acquire) {
            return Err(PublishError::Closed);
        }
        self.sender
            .send(envelope.clone())
            .map_err(|_| PublishError::ChannelClosed)
    }
}
