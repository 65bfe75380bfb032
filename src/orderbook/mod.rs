//! Limit order book: orders, price levels, matching and event publication.

pub mod arena;
pub mod book;
/// Book manager settings.
pub mod config;
pub mod error;
/// Order lifecycle events, publishers and replay.
pub mod events;
pub mod level;
/// Thread-safe book facade with event publication.
pub mod manager;
pub mod matching;
pub mod operations;
pub mod order;
/// Order status state machine.
pub mod status;

pub use arena::{OrderArena, OrderHandle};
pub use book::OrderBook;
pub use config::BookConfig;
pub use error::{OrderBookError, ValidationError};
pub use level::{LevelDepth, OrderQueue, PriceLevel, SymbolDepth, find_price_index};
pub use manager::{BookManager, SubmitOutcome};
pub use order::{AmendRequest, NewOrderRequest, Order, OrderId, Price, Side};
pub use status::OrderStatus;
