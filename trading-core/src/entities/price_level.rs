use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when a `[price, quantity]` string pair is not numeric
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseLevelError {
    #[error("Invalid price {0:?}")]
    Price(String),
    #[error("Invalid quantity {0:?}")]
    Quantity(String),
}

/// Represents a single price level in the order book
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub quantity: f64,
}

impl PriceLevel {
    pub fn new(price: f64, quantity: f64) -> Self {
        PriceLevel { price, quantity }
    }

    /// A level with zero quantity removes its price from the book
    pub fn is_empty(&self) -> bool {
        self.quantity == 0.0
    }

    /// Parse a Binance-style `["price", "quantity"]` pair.
    ///
    /// Non-finite and negative values are rejected along with
    /// unparseable text.
    pub fn parse(raw: &[String; 2]) -> Result<Self, ParseLevelError> {
        let [price, quantity] = raw;
        let p = parse_finite(price).ok_or_else(|| ParseLevelError::Price(price.clone()))?;
        let q = parse_finite(quantity).ok_or_else(|| ParseLevelError::Quantity(quantity.clone()))?;
        Ok(PriceLevel::new(p, q))
    }

    /// Parse every pair of a wire level list, failing on the first bad entry
    pub fn parse_all(raw: &[[String; 2]]) -> Result<Vec<Self>, ParseLevelError> {
        raw.iter().map(PriceLevel::parse).collect()
    }

    /// Wire representation
    pub fn to_wire(&self) -> [String; 2] {
        [self.price.to_string(), self.quantity.to_string()]
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

impl From<(f64, f64)> for PriceLevel {
    fn from((price, quantity): (f64, f64)) -> Self {
        PriceLevel { price, quantity }
    }
}
