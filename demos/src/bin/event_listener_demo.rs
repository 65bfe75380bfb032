//! Streams order events to an async consumer through a channel publisher and
//! folds them into per-order aggregates as they arrive.

use matchbook::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    info!("=== Event Listener Demo ===");

    let (publisher, mut receiver) = ChannelEventPublisher::new();
    let manager = Arc::new(BookManager::new(publisher));

    let consumer = tokio::spawn(async move {
        let mut streams: HashMap<OrderId, Vec<OrderEventEnvelope>> = HashMap::new();
        while let Some(envelope) = receiver.recv().await {
            match envelope.decode() {
                Ok(event) => {
                    info!("<- {}", event);
                    streams.entry(event.order_id()).or_default().push(envelope);
                }
                Err(e) => warn!("undecodable envelope: {}", e),
            }
        }
        streams
    });

    let producer = {
        let manager = Arc::clone(&manager);
        tokio::task::spawn_blocking(move || {
            for i in 0..5i64 {
                let ask = Order::new(Uuid::new_v4(), "ETH/USD", Decimal::new(3_000 + i, 0), 10, Side::Sell);
                if let Err(e) = manager.submit(ask) {
                    warn!("ask rejected: {}", e);
                }
            }
            let taker = Order::new(Uuid::new_v4(), "ETH/USD", Decimal::new(3_003, 0), 35, Side::Buy);
            if let Err(e) = manager.submit(taker) {
                warn!("taker rejected: {}", e);
            }
        })
    };
    if let Err(e) = producer.await {
        warn!("producer task failed: {}", e);
    }

    // The consumer loop ends once the last manager, and with it the sender, is dropped.
    if let Err(e) = manager.close() {
        warn!("close failed: {}", e);
    }
    drop(manager);

    let streams = match consumer.await {
        Ok(streams) => streams,
        Err(e) => {
            warn!("consumer task failed: {}", e);
            return;
        }
    };

    let aggregates: Vec<OrderAggregate> = streams
        .values()
        .filter_map(|envelopes| EventAggregator::aggregate_envelopes(envelopes).ok())
        .collect();
    for aggregate in &aggregates {
        info!(
            "{} {} {}/{} @ vwap {} -> {}",
            aggregate.id,
            aggregate.direction,
            aggregate.traded,
            aggregate.quantity,
            aggregate.traded_price,
            aggregate.status
        );
    }
    let position = aggregate_position("ETH/USD", &aggregates);
    info!("net position on {}: {}", position.symbol, position.quantity);
}
