mod price_level;

pub use price_level::{ParseLevelError, PriceLevel};
