use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use trading_core::{DepthUpdateEvent, Symbol};
use url::Url;

use super::parsers::StreamDataParser;
use crate::domain::{
    DiffSource, FeedConnector, FeedError, StreamData, WsEvent, WsRequest, WsResponse,
};

#[derive(Error, Debug)]
pub enum WsError {
    #[error("Connection error: {0}")]
    Connection(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Unsupported URL scheme: {0}")]
    Scheme(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Channel closed")]
    ChannelClosed,
}

/// Convert infrastructure WsError to domain FeedError
impl From<WsError> for FeedError {
    fn from(err: WsError) -> Self {
        match err {
            WsError::Connection(e) => FeedError::Transport(e.to_string()),
            WsError::ChannelClosed => FeedError::Transport("connection closed".to_string()),
            other => FeedError::Subscribe(other.to_string()),
        }
    }
}

/// Frames handed to the writer task
#[derive(Debug)]
enum Outgoing {
    Request(WsRequest),
    Close,
}

/// WebSocket client for streaming market data
/// Infrastructure component - handles WebSocket communication
#[derive(Debug, Clone)]
pub struct WsClient {
    url: Url,
}

impl WsClient {
    pub fn new(url: &str) -> Result<Self, WsError> {
        let url = Url::parse(url)?;
        match url.scheme() {
            "ws" | "wss" => Ok(WsClient { url }),
            other => Err(WsError::Scheme(other.to_string())),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Connect and return channels for sending requests and receiving events
    pub async fn connect(&self) -> Result<(WsRequestSender, mpsc::Receiver<WsEvent>), WsError> {
        let (ws_stream, _) = connect_async(self.url.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();

        let (req_tx, mut req_rx) = mpsc::channel::<Outgoing>(32);
        let (event_tx, event_rx) = mpsc::channel::<WsEvent>(1024);

        // Outgoing: requests until a close frame is sent
        let event_tx_clone = event_tx.clone();
        tokio::spawn(async move {
            while let Some(outgoing) = req_rx.recv().await {
                let message = match outgoing {
                    Outgoing::Request(req) => match serde_json::to_string(&req) {
                        Ok(json) => Message::Text(json.into()),
                        Err(e) => {
                            let _ = event_tx_clone.send(WsEvent::Error(e.to_string())).await;
                            continue;
                        }
                    },
                    Outgoing::Close => Message::Close(None),
                };
                let closing = matches!(message, Message::Close(_));

                if let Err(e) = write.send(message).await {
                    let _ = event_tx_clone.send(WsEvent::Error(e.to_string())).await;
                    break;
                }
                if closing {
                    break;
                }
            }
        });

        // Parser is created in infrastructure layer - keeps domain free of concrete dependencies
        let parser = StreamDataParser::new();

        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                let event = match msg {
                    Ok(Message::Text(text)) => decode_text(&parser, text.as_str()),
                    Ok(Message::Close(frame)) => {
                        tracing::debug!(?frame, "WebSocket closed by peer");
                        let _ = event_tx.send(WsEvent::Disconnected).await;
                        return;
                    }
                    Ok(Message::Ping(data)) => {
                        tracing::trace!("Received ping: {:?}", data);
                        continue;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        let _ = event_tx.send(WsEvent::Error(e.to_string())).await;
                        return;
                    }
                };

                if event_tx.send(event).await.is_err() {
                    return;
                }
            }
            let _ = event_tx.send(WsEvent::Disconnected).await;
        });

        Ok((WsRequestSender::new(req_tx), event_rx))
    }
}

fn decode_text(parser: &StreamDataParser, text: &str) -> WsEvent {
    let Ok(response) = serde_json::from_str::<WsResponse>(text) else {
        return WsEvent::RawMessage(text.to_string());
    };

    match response {
        WsResponse::Error { id, code, msg } => WsEvent::ApiError { id, code, msg },
        WsResponse::Result { id, result } => WsEvent::Response { id, result },
        WsResponse::Stream { stream, data } => parser
            .parse(&stream, &data)
            .map(WsEvent::StreamData)
            .unwrap_or_else(|| WsEvent::RawMessage(text.to_string())),
        WsResponse::Event(data) => parser
            .parse_raw(&data)
            .map(WsEvent::StreamData)
            .unwrap_or_else(|| WsEvent::RawMessage(text.to_string())),
    }
}

/// Handle for sending WebSocket requests
#[derive(Clone)]
pub struct WsRequestSender {
    tx: mpsc::Sender<Outgoing>,
    request_id: Arc<AtomicU64>,
}

impl WsRequestSender {
    fn new(tx: mpsc::Sender<Outgoing>) -> Self {
        WsRequestSender {
            tx,
            request_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn send(&self, outgoing: Outgoing) -> Result<(), WsError> {
        self.tx
            .send(outgoing)
            .await
            .map_err(|_| WsError::ChannelClosed)
    }

    /// Subscribe to streams
    pub async fn subscribe(&self, streams: Vec<String>) -> Result<u64, WsError> {
        let id = self.next_id();
        self.send(Outgoing::Request(WsRequest::subscribe(id, streams)))
            .await?;
        Ok(id)
    }

    /// Unsubscribe from streams
    pub async fn unsubscribe(&self, streams: Vec<String>) -> Result<u64, WsError> {
        let id = self.next_id();
        self.send(Outgoing::Request(WsRequest::unsubscribe(id, streams)))
            .await?;
        Ok(id)
    }

    /// Send a close frame; the writer stops afterwards
    pub async fn close(&self) -> Result<(), WsError> {
        self.send(Outgoing::Close).await
    }
}

/// Diff depth feed for one symbol over a dedicated connection
pub struct WsDiffSource {
    symbol: Symbol,
    sender: WsRequestSender,
    events: mpsc::Receiver<WsEvent>,
    stopped: bool,
    closed: bool,
}

impl WsDiffSource {
    fn new(symbol: Symbol, sender: WsRequestSender, events: mpsc::Receiver<WsEvent>) -> Self {
        WsDiffSource {
            symbol,
            sender,
            events,
            stopped: false,
            closed: false,
        }
    }
}

#[async_trait]
impl DiffSource for WsDiffSource {
    async fn next_event(&mut self) -> Result<Option<DepthUpdateEvent>, FeedError> {
        if self.closed {
            return Ok(None);
        }

        // Only `recv` is awaited, so dropping this future loses nothing
        loop {
            let Some(event) = self.events.recv().await else {
                self.closed = true;
                return Ok(None);
            };

            match event {
                WsEvent::StreamData(StreamData::DepthUpdate(update)) => {
                    if update.symbol.eq_ignore_ascii_case(self.symbol.as_str()) {
                        return Ok(Some(update));
                    }
                    tracing::debug!(
                        symbol = %self.symbol,
                        other = %update.symbol,
                        "Ignoring depth update for another symbol"
                    );
                }
                WsEvent::Response { id, .. } => {
                    tracing::debug!(symbol = %self.symbol, id, "Request acknowledged");
                }
                WsEvent::ApiError { code, msg, .. } => {
                    return Err(FeedError::Api { code, message: msg });
                }
                WsEvent::RawMessage(text) => {
                    tracing::debug!(symbol = %self.symbol, %text, "Unrecognised message");
                }
                WsEvent::Error(e) => {
                    self.closed = true;
                    return Err(FeedError::Transport(e));
                }
                WsEvent::Disconnected => {
                    self.closed = true;
                    return Ok(None);
                }
            }
        }
    }

    async fn stop(&mut self) -> Result<(), FeedError> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        if self.closed {
            return Ok(());
        }

        tracing::debug!(symbol = %self.symbol, "Unsubscribing");
        self.sender
            .unsubscribe(vec![self.symbol.depth_stream()])
            .await?;
        self.sender.close().await?;
        Ok(())
    }
}

/// Opens one WebSocket connection per symbol and subscribes to its
/// diff depth stream
#[derive(Debug, Clone)]
pub struct WsConnector {
    client: WsClient,
}

impl WsConnector {
    pub fn new(client: WsClient) -> Self {
        WsConnector { client }
    }
}

#[async_trait]
impl FeedConnector for WsConnector {
    type Source = WsDiffSource;

    async fn connect(&self, symbol: &Symbol) -> Result<Self::Source, FeedError> {
        let (sender, events) = self.client.connect().await?;
        let id = sender.subscribe(vec![symbol.depth_stream()]).await?;
        tracing::info!(symbol = %symbol, url = %self.client.url(), id, "Subscribed to diff depth stream");
        Ok(WsDiffSource::new(symbol.clone(), sender, events))
    }
}
