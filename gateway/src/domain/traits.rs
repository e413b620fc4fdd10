use async_trait::async_trait;
use thiserror::Error;
use trading_core::{DepthSnapshotEvent, DepthUpdateEvent, Symbol};

use super::events::StreamData;
use super::session::SessionSummary;
use crate::order_book::SentimentReport;

/// Domain error for depth snapshot fetching
///
/// This is a domain-level abstraction that doesn't expose infrastructure details.
/// Infrastructure implementations convert their specific errors to this type.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// Network or communication failure
    #[error("Network error: {0}")]
    Network(String),
    /// API returned an error response
    #[error("API error {code}: {message}")]
    Api { code: i32, message: String },
    /// Failed to parse the response
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Domain error for the diff event feed
#[derive(Error, Debug, Clone)]
pub enum FeedError {
    /// Could not connect or subscribe
    #[error("Subscription failed: {0}")]
    Subscribe(String),
    /// Connection dropped or the socket reported an error
    #[error("Transport error: {0}")]
    Transport(String),
    /// Venue rejected a request on the stream
    #[error("API error {code}: {message}")]
    Api { code: i32, message: String },
}

/// Request-response source of full depth snapshots
///
/// Implements Interface Segregation - only snapshot fetching capability.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<DepthSnapshotEvent, FetchError>;
}

/// Push-based feed of diff depth events for one symbol
///
/// Events are yielded in arrival order. `Ok(None)` means the feed has
/// closed (gracefully or after `stop`); callers stop polling after it.
#[async_trait]
pub trait DiffSource: Send {
    /// Next event in arrival order. Must be cancel safe: the session
    /// drops a pending call when its deadline fires.
    async fn next_event(&mut self) -> Result<Option<DepthUpdateEvent>, FeedError>;

    /// Request unsubscription. Later calls are no-ops.
    async fn stop(&mut self) -> Result<(), FeedError>;
}

/// Opens a subscribed diff feed for a symbol
///
/// Owned by the orchestrator, which creates one feed per session.
#[async_trait]
pub trait FeedConnector: Send + Sync {
    type Source: DiffSource + 'static;

    async fn connect(&self, symbol: &Symbol) -> Result<Self::Source, FeedError>;
}

/// Destination of periodic sentiment reports and final session summaries
pub trait ReportSink: Send + Sync {
    fn report(&self, report: &SentimentReport);

    fn summary(&self, summary: &SessionSummary);
}

/// Trait for parsing stream data
///
/// Implements Open/Closed - add new parsers without modifying existing code.
pub trait StreamParser: Send + Sync {
    /// Check if this parser can handle the given stream name
    fn can_parse(&self, stream: &str) -> bool;

    /// Parse the stream data. Returns None if parsing fails.
    fn parse(&self, stream: &str, data: &serde_json::Value) -> Option<StreamData>;
}
