//! Error types for a synchronization session

use thiserror::Error;
use trading_core::{ParseLevelError, Symbol};

use crate::domain::{FeedError, FetchError, StopReason};

/// Fatal outcome of one symbol's session.
///
/// Sequence gaps are not errors; they are counted in the summary.
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    #[error("Snapshot acquisition failed: {0}")]
    Snapshot(#[from] FetchError),

    #[error("Malformed price level for {symbol}: {source}")]
    MalformedLevel {
        symbol: Symbol,
        #[source]
        source: ParseLevelError,
    },

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Stopped before the book was seeded: {0}")]
    Interrupted(StopReason),

    #[error("Session aborted: {0}")]
    Aborted(String),
}

impl SessionError {
    pub fn malformed(symbol: &Symbol, source: ParseLevelError) -> Self {
        SessionError::MalformedLevel {
            symbol: symbol.clone(),
            source,
        }
    }
}
