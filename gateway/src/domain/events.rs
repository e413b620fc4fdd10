use serde::{Deserialize, Serialize};
use serde_json::Value;
use trading_core::{DepthSnapshotEvent, DepthUpdateEvent, ParseLevelError, PriceLevel};

use super::traits::StreamParser;

/// Parsed stream data from WebSocket - core domain event
#[derive(Debug, Clone)]
pub enum StreamData {
    DepthUpdate(DepthUpdateEvent),
}

impl StreamData {
    /// Parse stream data using injected parsers (Dependency Inversion compliant)
    ///
    /// Parsers are injected from the caller (typically infrastructure layer),
    /// keeping the domain layer free of infrastructure dependencies.
    pub fn parse_with(stream: &str, data: &Value, parsers: &[&dyn StreamParser]) -> Option<Self> {
        for parser in parsers {
            if parser.can_parse(stream)
                && let Some(result) = parser.parse(stream, data)
            {
                return Some(result);
            }
        }
        None
    }
}

/// Events received from the WebSocket connection
#[derive(Debug, Clone)]
pub enum WsEvent {
    /// Successful response to a request
    Response {
        id: u64,
        result: Option<serde_json::Value>,
    },
    /// Parsed stream data
    StreamData(StreamData),
    /// Raw message (couldn't parse)
    RawMessage(String),
    /// API error
    ApiError {
        id: Option<u64>,
        code: i32,
        msg: String,
    },
    /// Connection error
    Error(String),
    /// Disconnected
    Disconnected,
}

/// WebSocket request messages (Binance-compatible)
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", rename_all = "UPPERCASE")]
pub enum WsRequest {
    Subscribe { id: u64, params: Vec<String> },
    Unsubscribe { id: u64, params: Vec<String> },
}

impl WsRequest {
    pub fn subscribe(id: u64, streams: Vec<String>) -> Self {
        WsRequest::Subscribe {
            id,
            params: streams,
        }
    }

    pub fn unsubscribe(id: u64, streams: Vec<String>) -> Self {
        WsRequest::Unsubscribe {
            id,
            params: streams,
        }
    }
}

/// WebSocket response messages
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WsResponse {
    /// Error response (listed first: `result` would default to None)
    Error {
        id: Option<u64>,
        code: i32,
        msg: String,
    },
    /// Successful response to a request
    Result { id: u64, result: Option<Value> },
    /// Combined-stream envelope (`/stream?streams=...`)
    Stream { stream: String, data: Value },
    /// Raw event payload (`/ws` endpoint), dispatched on its `e` field
    Event(Value),
}

/// Depth snapshot with numeric levels, ready to seed a book
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub last_update_id: u64,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl TryFrom<&DepthSnapshotEvent> for Snapshot {
    type Error = ParseLevelError;

    fn try_from(event: &DepthSnapshotEvent) -> Result<Self, Self::Error> {
        Ok(Snapshot {
            last_update_id: event.last_update_id,
            bids: PriceLevel::parse_all(&event.bids)?,
            asks: PriceLevel::parse_all(&event.asks)?,
        })
    }
}

/// Diff depth update with numeric levels, ready to apply
#[derive(Debug, Clone, PartialEq)]
pub struct DiffEvent {
    pub first_update_id: u64,
    pub last_update_id: u64,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl DiffEvent {
    pub fn new(first_update_id: u64, last_update_id: u64) -> Self {
        DiffEvent {
            first_update_id,
            last_update_id,
            bids: Vec::new(),
            asks: Vec::new(),
        }
    }

    pub fn with_bids(mut self, bids: Vec<PriceLevel>) -> Self {
        self.bids = bids;
        self
    }

    pub fn with_asks(mut self, asks: Vec<PriceLevel>) -> Self {
        self.asks = asks;
        self
    }
}

impl TryFrom<&DepthUpdateEvent> for DiffEvent {
    type Error = ParseLevelError;

    fn try_from(event: &DepthUpdateEvent) -> Result<Self, Self::Error> {
        Ok(DiffEvent {
            first_update_id: event.first_update_id,
            last_update_id: event.final_update_id,
            bids: PriceLevel::parse_all(&event.bids)?,
            asks: PriceLevel::parse_all(&event.asks)?,
        })
    }
}
