use parking_lot::RwLock;
use std::sync::Arc;
use trading_core::{BookSide, PriceLevel, Symbol};

use super::metrics::{BookMetrics, SentimentReport};
use super::price_level_map::PriceLevelMap;
use crate::domain::{Classification, DiffEvent, SequenceCursor, Snapshot};

/// One symbol's mirrored book plus its sequence bookkeeping
#[derive(Debug, Clone)]
pub struct OrderBookState {
    symbol: Symbol,
    bids: PriceLevelMap,
    asks: PriceLevelMap,
    cursor: SequenceCursor,
    events_applied: u64,
}

impl OrderBookState {
    pub fn new(symbol: Symbol) -> Self {
        OrderBookState {
            symbol,
            bids: PriceLevelMap::new(BookSide::Bid),
            asks: PriceLevelMap::new(BookSide::Ask),
            cursor: SequenceCursor::default(),
            events_applied: 0,
        }
    }

    /// Replace the book with a snapshot and reset all sequence state
    pub fn seed(&mut self, snapshot: &Snapshot) {
        self.load_levels(snapshot);
        self.events_applied = 0;
    }

    /// Like `seed`, but keeps the applied-event count of the session
    pub fn reseed(&mut self, snapshot: &Snapshot) {
        self.load_levels(snapshot);
    }

    fn load_levels(&mut self, snapshot: &Snapshot) {
        self.bids.clear();
        self.asks.clear();
        for level in &snapshot.bids {
            self.bids.apply_level(level);
        }
        for level in &snapshot.asks {
            self.asks.apply_level(level);
        }
        self.cursor = SequenceCursor::seeded(snapshot.last_update_id);
    }

    /// Apply a diff that has already been classified `Accept`.
    ///
    /// No sequence validation happens here.
    pub fn apply(&mut self, diff: &DiffEvent) {
        for level in &diff.bids {
            self.bids.apply_level(level);
        }
        for level in &diff.asks {
            self.asks.apply_level(level);
        }
        self.cursor.advance(diff.last_update_id);
        self.events_applied += 1;
    }

    pub fn classify(&self, first_update_id: u64, last_update_id: u64) -> Classification {
        self.cursor.classify(first_update_id, last_update_id)
    }

    pub fn snapshot_metrics(&self) -> BookMetrics {
        BookMetrics::compute(&self.bids, &self.asks)
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn bids(&self) -> &PriceLevelMap {
        &self.bids
    }

    pub fn asks(&self) -> &PriceLevelMap {
        &self.asks
    }

    pub fn cursor(&self) -> SequenceCursor {
        self.cursor
    }

    pub fn events_applied(&self) -> u64 {
        self.events_applied
    }
}

/// Thread-safe handle to one symbol's book.
///
/// Cloned between the diff-applying loop (single writer) and the
/// reporting task (reader). `apply` holds the write lock for the whole
/// diff, so a reader never sees half of one.
#[derive(Clone)]
pub struct SharedOrderBook {
    inner: Arc<RwLock<OrderBookState>>,
}

impl SharedOrderBook {
    pub fn new(symbol: Symbol) -> Self {
        SharedOrderBook {
            inner: Arc::new(RwLock::new(OrderBookState::new(symbol))),
        }
    }

    pub fn seed(&self, snapshot: &Snapshot) {
        self.inner.write().seed(snapshot);
    }

    pub fn reseed(&self, snapshot: &Snapshot) {
        self.inner.write().reseed(snapshot);
    }

    pub fn apply(&self, diff: &DiffEvent) {
        self.inner.write().apply(diff);
    }

    pub fn classify(&self, first_update_id: u64, last_update_id: u64) -> Classification {
        self.inner.read().classify(first_update_id, last_update_id)
    }

    pub fn snapshot_metrics(&self) -> BookMetrics {
        self.inner.read().snapshot_metrics()
    }

    /// Metrics and book position taken under one read lock
    pub fn sentiment_report(&self) -> SentimentReport {
        let state = self.inner.read();
        SentimentReport {
            symbol: state.symbol.clone(),
            metrics: state.snapshot_metrics(),
            last_update_id: state.cursor.last_applied_update_id,
        }
    }

    pub fn symbol(&self) -> Symbol {
        self.inner.read().symbol.clone()
    }

    pub fn events_applied(&self) -> u64 {
        self.inner.read().events_applied
    }

    pub fn last_update_id(&self) -> u64 {
        self.inner.read().cursor.last_applied_update_id
    }

    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.inner.read().bids.best_level()
    }

    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.inner.read().asks.best_level()
    }

    /// Copy of the full state for inspection
    pub fn state(&self) -> OrderBookState {
        self.inner.read().clone()
    }
}
