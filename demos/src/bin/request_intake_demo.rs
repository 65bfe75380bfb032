//! Validates JSON order requests before they reach the book and shows the
//! rejections a malformed request produces.

use matchbook::prelude::*;
use tracing::{info, warn};

const REQUESTS: &str = r#"[
    {"id": "6f1c3a52-8d0e-4c1f-9a43-3a9a1c7e2b10", "symbol": "sol/usd", "quantity": 40, "direction": "Sell", "price": "142.50"},
    {"id": "a3e4b6c1-2f7d-4b8e-8c1a-5d6e7f809a1b", "symbol": "SOL/USD", "quantity": 25, "direction": "Buy", "price": "142.55"},
    {"id": "not-a-uuid", "symbol": "SOL/USD", "quantity": 10, "direction": "Buy", "price": "142.00"},
    {"id": "0b9d2e7a-4c3f-4a1b-9e8d-7c6b5a493827", "symbol": "SOL/USD", "quantity": 0, "direction": "Buy", "price": "142.00"},
    {"id": "1c2d3e4f-5a6b-4c7d-8e9f-0a1b2c3d4e5f", "symbol": "SOL/USD", "quantity": 10, "direction": "Hold", "price": "142.00"}
]"#;

fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    info!("=== Request Intake Demo ===");

    let config = BookConfig::default().with_uppercase_symbols(true);
    let manager = BookManager::with_config(NoopPublisher, config);

    let requests: Vec<NewOrderRequest> = match serde_json::from_str(REQUESTS) {
        Ok(requests) => requests,
        Err(e) => {
            warn!("malformed batch: {}", e);
            return;
        }
    };

    for request in requests {
        let id = request.id.clone();
        match manager.submit_request(request) {
            Ok(outcome) => info!(
                "{} accepted: executed={} status={}",
                id,
                outcome.executed,
                outcome.order.status()
            ),
            Err(e) => warn!("{} rejected: {}", id, e),
        }
    }

    if let Ok(depths) = manager.depths() {
        for depth in depths {
            for level in depth.prices {
                info!(
                    "{} {}: bid {} ask {}",
                    depth.symbol, level.price, level.buy_quantity, level.sell_quantity
                );
            }
        }
    }
}
