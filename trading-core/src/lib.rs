//! Shared depth-stream types
//!
//! Wire events as delivered by Binance-compatible venues (REST depth
//! snapshot, WebSocket diff depth update) and the small value types the
//! order book mirror is built from.

pub mod entities;
pub mod events;
pub mod value_objects;

// Re-export value objects at crate root for convenience
pub use value_objects::{BookSide, Symbol};

// Re-export entities at crate root
pub use entities::{ParseLevelError, PriceLevel};

// Re-export events at crate root
pub use events::{DepthSnapshotEvent, DepthUpdateEvent};
