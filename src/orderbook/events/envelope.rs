//! The `{event_type, payload}` envelope carried on the event bus.

use crate::orderbook::events::error::EventError;
use crate::orderbook::events::types::{
    OrderAccepted, OrderAmended, OrderCancelled, OrderEvent, OrderEventStored, OrderEventType,
    OrderTraded,
};
use serde::{Deserialize, Serialize};

/// Wire envelope: the event type and the JSON text of the specific event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEventEnvelope {
    /// Event type name, e.g. `OrderTraded`
    pub event_type: String,
    /// JSON-serialized specific event
    pub payload: String,
}

impl OrderEventEnvelope {
    /// Wraps an event.
    ///
    /// # Errors
    /// Returns [`EventError::Serialization`] if the payload cannot be encoded.
    pub fn from_event(event: &OrderEvent) -> Result<Self, EventError> {
        Ok(Self {
            event_type: event.event_type().as_str().to_string(),
            payload: event.payload_json()?,
        })
    }

    /// Decodes the payload into the event named by `event_type`.
    ///
    /// # Errors
    /// - [`EventError::UnknownEventType`] if `event_type` is not recognised
    /// - [`EventError::Serialization`] if the payload does not parse as that type
    /// - [`EventError::TypeMismatch`] if the payload names another type
    pub fn decode(&self) -> Result<OrderEvent, EventError> {
        let event_type: OrderEventType = self.event_type.parse()?;
        let event = match event_type {
            OrderEventType::Accepted => {
                OrderEvent::Accepted(serde_json::from_str::<OrderAccepted>(&self.payload)?)
            }
            OrderEventType::Amended => {
                OrderEvent::Amended(serde_json::from_str::<OrderAmended>(&self.payload)?)
            }
            OrderEventType::Cancelled => {
                OrderEvent::Cancelled(serde_json::from_str::<OrderCancelled>(&self.payload)?)
            }
            OrderEventType::Traded => {
                OrderEvent::Traded(serde_json::from_str::<OrderTraded>(&self.payload)?)
            }
            OrderEventType::Stored => {
                OrderEvent::Stored(serde_json::from_str::<OrderEventStored>(&self.payload)?)
            }
        };

        if event.event_type() != event_type {
            return Err(EventError::TypeMismatch {
                envelope: event_type,
                payload: event.event_type(),
            });
        }
        Ok(event)
    }

    /// Serializes the envelope itself, as written to the bus.
    ///
    /// # Errors
    /// Returns [`EventError::Serialization`] on failure.
    pub fn to_json(&self) -> Result<String, EventError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses an envelope read from the bus.
    ///
    /// # Errors
    /// Returns [`EventError::Serialization`] on malformed input.
    pub fn from_json(data: &str) -> Result<Self, EventError> {
        Ok(serde_json::from_str(data)?)
    }
}

impl TryFrom<&OrderEvent> for OrderEventEnvelope {
    type Error = EventError;

    fn try_from(event: &OrderEvent) -> Result<Self, Self::Error> {
        Self::from_event(event)
    }
}
