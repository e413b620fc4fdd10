//! Infrastructure Layer - Inbound adapters from upstream systems
//!
//! This layer contains adapters for systems we consume from:
//! - RestClient: HTTP client for depth snapshots
//! - WsClient / WsConnector: WebSocket diff depth feeds
//! - Parsers: Stream data parsing from exchange formats
//!
//! Follows Hexagonal Architecture:
//! - Infrastructure = inbound (exchange → gateway)
//! - Presentation = outbound (gateway → report consumers)

pub mod parsers;
pub mod rest_client;
pub mod ws_client;

pub use parsers::{DepthParser, StreamDataParser};
pub use rest_client::{DEFAULT_SNAPSHOT_LIMIT, RestClient, RestError};
pub use ws_client::{WsClient, WsConnector, WsDiffSource, WsError, WsRequestSender};
