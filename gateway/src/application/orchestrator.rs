use std::sync::Arc;
use tokio::sync::watch;
use trading_core::Symbol;

use crate::domain::{FeedConnector, ReportSink, SessionSummary, SnapshotProvider};
use crate::error::SessionError;

use super::config::SessionConfig;
use super::synchronizer::Synchronizer;

/// Result of one symbol's session
#[derive(Debug)]
pub struct SessionOutcome {
    pub symbol: Symbol,
    pub result: Result<SessionSummary, SessionError>,
}

impl SessionOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Requests every running session to stop early
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Signal shutdown. Repeated calls are harmless.
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Runs one independent session per symbol and waits for all of them.
///
/// Owns the shared transports: the snapshot provider is shared by every
/// session, and each session gets its own feed from the connector.
pub struct SessionOrchestrator<P, C>
where
    P: SnapshotProvider + 'static,
    C: FeedConnector + 'static,
{
    provider: Arc<P>,
    connector: Arc<C>,
    sink: Arc<dyn ReportSink>,
    config: SessionConfig,
    shutdown: Arc<watch::Sender<bool>>,
}

impl<P, C> SessionOrchestrator<P, C>
where
    P: SnapshotProvider + 'static,
    C: FeedConnector + 'static,
{
    pub fn new(
        provider: Arc<P>,
        connector: Arc<C>,
        sink: Arc<dyn ReportSink>,
        config: SessionConfig,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        SessionOrchestrator {
            provider,
            connector,
            sink,
            config,
            shutdown: Arc::new(shutdown),
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown),
        }
    }

    /// Run every symbol's session concurrently.
    ///
    /// Outcomes are returned in input order. A failure in one session
    /// never affects another.
    pub async fn run_all(&self, symbols: Vec<Symbol>) -> Vec<SessionOutcome> {
        tracing::info!(count = symbols.len(), "Starting sessions");

        let handles: Vec<_> = symbols
            .into_iter()
            .map(|symbol| {
                let handle = tokio::spawn(self.session(symbol.clone()));
                (symbol, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (symbol, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(symbol = %symbol, "Session task failed: {}", e);
                    Err(SessionError::Aborted(e.to_string()))
                }
            };
            outcomes.push(SessionOutcome { symbol, result });
        }

        outcomes
    }

    fn session(
        &self,
        symbol: Symbol,
    ) -> impl Future<Output = Result<SessionSummary, SessionError>> + Send + 'static {
        let provider = Arc::clone(&self.provider);
        let connector = Arc::clone(&self.connector);
        let sink = Arc::clone(&self.sink);
        let config = self.config.clone();
        let shutdown = self.shutdown.subscribe();

        async move {
            let source = match connector.connect(&symbol).await {
                Ok(source) => source,
                Err(e) => {
                    tracing::error!(symbol = %symbol, "Failed to open diff feed: {}", e);
                    return Err(SessionError::Feed(e));
                }
            };

            Synchronizer::new(symbol, config, provider, sink)
                .with_shutdown(shutdown)
                .run(source)
                .await
        }
    }
}
