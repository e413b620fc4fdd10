use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use trading_core::{BookSide, PriceLevel};

/// One side of a symbol's book: price -> resting quantity.
///
/// Every stored quantity is strictly positive; a zero quantity update
/// removes the price instead of storing it.
#[derive(Debug, Clone)]
pub struct PriceLevelMap {
    side: BookSide,
    levels: BTreeMap<OrderedFloat<f64>, f64>,
}

impl PriceLevelMap {
    pub fn new(side: BookSide) -> Self {
        PriceLevelMap {
            side,
            levels: BTreeMap::new(),
        }
    }

    pub fn side(&self) -> BookSide {
        self.side
    }

    /// Set `price` to `quantity`, or evict it when `quantity` is zero
    pub fn upsert_or_evict(&mut self, price: f64, quantity: f64) {
        let key = OrderedFloat(price);
        if quantity == 0.0 {
            self.levels.remove(&key);
        } else {
            self.levels.insert(key, quantity);
        }
    }

    pub fn apply_level(&mut self, level: &PriceLevel) {
        self.upsert_or_evict(level.price, level.quantity);
    }

    /// Sum of all resting quantities on this side
    pub fn total_quantity(&self) -> f64 {
        self.levels.values().sum()
    }

    /// Highest bid or lowest ask; `None` when the side is empty
    pub fn best_price(&self) -> Option<f64> {
        self.best_level().map(|level| level.price)
    }

    pub fn best_level(&self) -> Option<PriceLevel> {
        let entry = match self.side {
            BookSide::Bid => self.levels.iter().next_back(),
            BookSide::Ask => self.levels.iter().next(),
        };
        entry.map(|(p, q)| PriceLevel::new(p.0, *q))
    }

    /// All levels, best first
    pub fn levels(&self) -> Vec<PriceLevel> {
        self.top(self.levels.len())
    }

    /// Best `n` levels, best first
    pub fn top(&self, n: usize) -> Vec<PriceLevel> {
        let to_level = |(p, q): (&OrderedFloat<f64>, &f64)| PriceLevel::new(p.0, *q);
        match self.side {
            BookSide::Bid => self.levels.iter().rev().take(n).map(to_level).collect(),
            BookSide::Ask => self.levels.iter().take(n).map(to_level).collect(),
        }
    }

    pub fn get(&self, price: f64) -> Option<f64> {
        self.levels.get(&OrderedFloat(price)).copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }
}
