//! NATS JetStream order event publisher.
//!
//! [`NatsEventPublisher`] writes each [`OrderEventEnvelope`] as JSON to the
//! subject `{prefix}.{event_type}`, e.g. `orders.OrderTraded`.
//!
//! `publish` only serializes the envelope and assigns a sequence number; the
//! network round trip is spawned onto a Tokio runtime and retried there with
//! exponential backoff. A failure after the last retry is counted and logged,
//! never reported back to the book.
//!
//! Only available with the `nats` feature.

use crate::orderbook::events::envelope::OrderEventEnvelope;
use crate::orderbook::events::error::PublishError;
use crate::orderbook::events::publisher::EventPublisher;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{error, info, trace, warn};

/// Default maximum number of retry attempts for transient NATS publish failures.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base delay in milliseconds for exponential backoff between retries.
const BASE_RETRY_DELAY_MS: u64 = 10;

#[derive(Debug, Default)]
struct Counters {
    sequence: AtomicU64,
    published: AtomicU64,
    failed: AtomicU64,
}

/// Publishes order event envelopes to NATS JetStream.
///
/// ```rust,no_run
/// use matchbook::orderbook::events::NatsEventPublisher;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = async_nats::connect("nats://localhost:4222").await?;
/// let jetstream = async_nats::jetstream::new(client);
/// let publisher = NatsEventPublisher::new(
///     jetstream,
///     "orders".to_string(),
///     tokio::runtime::Handle::current(),
/// );
/// # Ok(())
/// # }
/// ```
pub struct NatsEventPublisher {
    jetstream: async_nats::jetstream::Context,
    subject_prefix: String,
    runtime: tokio::runtime::Handle,
    counters: Arc<Counters>,
    open: AtomicBool,
    max_retries: u32,
}

impl NatsEventPublisher {
    /// Create a publisher writing under `subject_prefix`.
    #[inline]
    pub fn new(
        jetstream: async_nats::jetstream::Context,
        subject_prefix: String,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        Self {
            jetstream,
            subject_prefix,
            runtime,
            counters: Arc::new(Counters::default()),
            open: AtomicBool::new(true),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the maximum number of retry attempts. 0 disables retries.
    #[must_use = "builders do nothing unless consumed"]
    #[inline]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Number of acknowledged messages.
    #[must_use]
    #[inline]
    pub fn publish_count(&self) -> u64 {
        self.counters.published.load(Ordering::Relaxed)
    }

    /// Number of messages dropped after all retries.
    #[must_use]
    #[inline]
    pub fn error_count(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }

    /// Next sequence number to be assigned.
    #[must_use]
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.counters.sequence.load(Ordering::Relaxed)
    }

    /// Subject an envelope of `event_type` is published to.
    pub fn subject_for(&self, event_type: &str) -> String {
        subject(&self.subject_prefix, event_type)
    }

    async fn publish_with_retry(
        jetstream: async_nats::jetstream::Context,
        counters: Arc<Counters>,
        subject: String,
        payload: bytes::Bytes,
        seq: u64,
        max_retries: u32,
    ) {
        let mut headers = async_nats::HeaderMap::new();
        headers.insert("Nats-Sequence", seq.to_string().as_str());
        let max_attempts = max_retries.saturating_add(1);

        for attempt in 0..max_attempts {
            match jetstream
                .publish_with_headers(subject.clone(), headers.clone(), payload.clone())
                .await
            {
                Ok(ack_future) => match ack_future.await {
                    Ok(_) => {
                        counters.published.fetch_add(1, Ordering::Relaxed);
                        trace!(seq, subject = %subject, "order event published to NATS");
                        return;
                    }
                    Err(e) => {
                        warn!(attempt = attempt + 1, max = max_attempts, subject = %subject, error = %e, "NATS ack failed, retrying");
                    }
                },
                Err(e) => {
                    warn!(attempt = attempt + 1, max = max_attempts, subject = %subject, error = %e, "NATS publish failed, retrying");
                }
            }

            if attempt + 1 < max_attempts {
                tokio::time::sleep(std::time::Duration::from_millis(backoff_ms(attempt))).await;
            }
        }

        counters.failed.fetch_add(1, Ordering::Relaxed);
        error!(seq, subject = %subject, "NATS publish failed after all retries");
    }
}

fn subject(prefix: &str, event_type: &str) -> String {
    format!("{prefix}.{event_type}")
}

/// Backoff before retry `attempt + 1`: 10ms, 20ms, 40ms, ...
fn backoff_ms(attempt: u32) -> u64 {
    BASE_RETRY_DELAY_MS.saturating_mul(1u64 << attempt.min(16))
}

impl EventPublisher for NatsEventPublisher {
    fn open(&self) -> Result<(), PublishError> {
        self.open.store(true, Ordering::Release);
        info!(prefix = %self.subject_prefix, "NATS event publisher opened");
        Ok(())
    }

    fn close(&self) -> Result<(), PublishError> {
        self.open.store(false, Ordering::Release);
        info!(prefix = %self.subject_prefix, "NATS event publisher closed");
        Ok(())
    }

    fn publish(&self, envelope: &OrderEventEnvelope) -> Result<(), PublishError> {
        if !self.open.load(Ordering::Acquire) {
            return Err(PublishError::Closed);
        }
        let payload = envelope.to_json().inspect_err(|_| {
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
        })?;

        let seq = self.counters.sequence.fetch_add(1, Ordering::Relaxed);
        self.runtime.spawn(Self::publish_with_retry(
            self.jetstream.clone(),
            Arc::clone(&self.counters),
            self.subject_for(&envelope.event_type),
            bytes::Bytes::from(payload),
            seq,
            self.max_retries,
        ));
        Ok(())
    }
}

impl std::fmt::Debug for NatsEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsEventPublisher")
            .field("subject_prefix", &self.subject_prefix)
            .field("sequence", &self.sequence())
            .field("publish_count", &self.publish_count())
            .field("error_count", &self.error_count())
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
