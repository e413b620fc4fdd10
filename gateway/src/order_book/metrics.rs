//! Market-sentiment metrics derived from a consistent read of a book

use std::fmt;
use trading_core::Symbol;

use super::price_level_map::PriceLevelMap;

/// Depth and top-of-book figures at one point in time.
///
/// Best prices and spread are only defined while both sides hold at
/// least one level; a one-sided book reports none of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookMetrics {
    pub total_bid_qty: f64,
    pub total_ask_qty: f64,
    pub best_bid: Option<f64>,
    pub best_ask: Option<f64>,
    pub spread: Option<f64>,
}

impl BookMetrics {
    pub fn compute(bids: &PriceLevelMap, asks: &PriceLevelMap) -> Self {
        let (best_bid, best_ask, spread) = match (bids.best_price(), asks.best_price()) {
            (Some(bid), Some(ask)) => (Some(bid), Some(ask), Some(ask - bid)),
            _ => (None, None, None),
        };

        BookMetrics {
            total_bid_qty: bids.total_quantity(),
            total_ask_qty: asks.total_quantity(),
            best_bid,
            best_ask,
            spread,
        }
    }
}

/// Periodic report for one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentReport {
    pub symbol: Symbol,
    pub metrics: BookMetrics,
    /// Book position the metrics were read at
    pub last_update_id: u64,
}

struct Undefined(Option<f64>);

impl fmt::Display for Undefined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:.4}", v),
            None => write!(f, "n/a"),
        }
    }
}

impl fmt::Display for SentimentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metrics;
        write!(
            f,
            "{} : Total Bids: {:.4}, Total Asks: {:.4}, Lowest Ask: {}, Highest Bid: {}, Spread: {}",
            self.symbol,
            m.total_bid_qty,
            m.total_ask_qty,
            Undefined(m.best_ask),
            Undefined(m.best_bid),
            Undefined(m.spread)
        )
    }
}
