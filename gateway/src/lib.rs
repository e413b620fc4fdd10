//! Depth Gateway
//!
//! Keeps a local mirror of an exchange's price-level order book per
//! symbol, built from a REST snapshot plus the diff depth stream, and
//! reports depth and top-of-book figures while the session runs.
//!
//! # Architecture
//!
//! ```text
//!   REST snapshot            WebSocket diffs
//!        │                         │
//!        ▼                         ▼
//! ┌──────────────────────────────────────────────┐
//! │ Synchronizer (one per symbol)                │
//! │   seed ──► classify ──► apply ──► SharedBook │
//! │                 │                    │       │
//! │          stale / gap            MetricsReporter
//! └─────────────────────────────────────│────────┘
//!                                       ▼
//!                                  ReportSink
//! ```
//!
//! `SessionOrchestrator` runs one `Synchronizer` per symbol and collects
//! their outcomes; a failure in one symbol never touches another.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod order_book;
pub mod presentation;

// Re-export key types
pub use domain::events::{DiffEvent, Snapshot, StreamData, WsEvent, WsRequest, WsResponse};
pub use domain::sequence::{Classification, SequenceCursor};
pub use domain::session::{SessionState, SessionSummary, StopReason};
pub use domain::traits::{
    DiffSource, FeedConnector, FeedError, FetchError, ReportSink, SnapshotProvider, StreamParser,
};
pub use error::SessionError;

pub use order_book::{BookMetrics, OrderBookState, PriceLevelMap, SentimentReport, SharedOrderBook};

pub use application::{
    GapPolicy, MetricsReporter, SessionConfig, SessionOrchestrator, SessionOutcome,
    ShutdownHandle, Synchronizer,
};

pub use infrastructure::parsers::{DepthParser, StreamDataParser};
pub use infrastructure::rest_client::{RestClient, RestError};
pub use infrastructure::ws_client::{WsClient, WsConnector, WsDiffSource, WsError};

pub use presentation::{ChannelReporter, ReportEvent, TracingReporter};

pub use config::{ConfigError, GatewayConfigFile, load_config, load_default_config};
