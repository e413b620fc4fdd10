//! Local order book mirror
//!
//! - PriceLevelMap: one side of a book, price -> quantity
//! - OrderBookState: both sides plus sequence bookkeeping
//! - SharedOrderBook: lock-guarded handle shared with the reporter

mod metrics;
mod price_level_map;
mod shared_book;

pub use metrics::{BookMetrics, SentimentReport};
pub use price_level_map::PriceLevelMap;
pub use shared_book::{OrderBookState, SharedOrderBook};
