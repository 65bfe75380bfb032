//! Walks through resting, crossing, amending and cancelling orders on a
//! single symbol and prints the depth after every step.

use matchbook::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    info!("=== Matching Demo ===");

    let store = Arc::new(InMemoryEventStore::new());
    let manager = BookManager::new(Arc::clone(&store));

    // Step 1: liquidity on both sides
    let asks = [(19_999, 5), (20_001, 5), (20_005, 10)];
    let bids = [(19_990, 8), (19_985, 12)];
    for (price, quantity) in asks {
        submit(&manager, Side::Sell, price, quantity);
    }
    for (price, quantity) in bids {
        submit(&manager, Side::Buy, price, quantity);
    }
    print_depth(&manager, "after seeding liquidity");

    // Step 2: a buy that sweeps two ask levels and rests the remainder
    let sweep = submit(&manager, Side::Buy, 20_001, 14);
    print_depth(&manager, "after sweeping buy");

    // Step 3: grow the resting remainder
    if let Ok(Some(resting)) = manager.order(&sweep) {
        let request = AmendRequest::for_order(&resting, resting.quantity() + 6);
        match manager.amend(&request) {
            Ok(amended) => info!("amend of {} applied: {}", sweep, amended),
            Err(e) => info!("amend failed: {}", e),
        }
    }
    print_depth(&manager, "after amend");

    // Step 4: cancel it
    match manager.cancel(&sweep) {
        Ok(cancelled) => info!("cancel of {} applied: {}", sweep, cancelled),
        Err(e) => info!("cancel failed: {}", e),
    }
    print_depth(&manager, "after cancel");

    match store.aggregate(&sweep) {
        Ok(aggregate) => info!(
            "replayed {}: quantity={} traded={} vwap={} status={}",
            aggregate.id, aggregate.quantity, aggregate.traded, aggregate.traded_price, aggregate.status
        ),
        Err(e) => info!("replay failed: {}", e),
    }
    info!("events stored: {}", store.len());
}

fn submit(manager: &BookManager, side: Side, cents: i64, quantity: u64) -> OrderId {
    let order = Order::new(Uuid::new_v4(), "BTC/USD", Decimal::new(cents, 2), quantity, side);
    let id = order.id();
    match manager.submit(order) {
        Ok(outcome) => info!(
            "{} {} @ {}: executed={} status={} resting={}",
            side,
            quantity,
            Decimal::new(cents, 2),
            outcome.executed,
            outcome.order.status(),
            outcome.is_resting()
        ),
        Err(e) => info!("submit rejected: {}", e),
    }
    id
}

fn print_depth(manager: &BookManager, label: &str) {
    info!("--- depth {} ---", label);
    if let Ok(Some(depth)) = manager.depth("BTC/USD") {
        for level in depth.prices.iter().rev() {
            if level.buy_quantity == 0 && level.sell_quantity == 0 {
                continue;
            }
            info!(
                "{:>10} | bid {:>4} ({}) | ask {:>4} ({})",
                level.price, level.buy_quantity, level.buy_depth, level.sell_quantity, level.sell_depth
            );
        }
    }
}
