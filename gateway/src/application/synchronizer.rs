use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;
use trading_core::{DepthUpdateEvent, Symbol};

use crate::domain::{
    Classification, DiffEvent, DiffSource, ReportSink, SessionState, SessionSummary, Snapshot,
    SnapshotProvider, StopReason,
};
use crate::error::SessionError;
use crate::order_book::SharedOrderBook;

use super::config::{GapPolicy, SessionConfig};
use super::metrics_reporter::MetricsReporter;

#[derive(Debug, Default)]
struct Counters {
    stale: u64,
    gaps: u64,
    resyncs: u64,
    /// A gap was flagged and no resync has cleared it since
    unresolved_gap: bool,
}

/// Drives one symbol's session: seed from a snapshot, then apply the
/// diff stream until the deadline, the capacity limit, the feed closing
/// or a shutdown request, whichever comes first.
///
/// The deadline is armed when `run` starts, and snapshot fetches race
/// it along with the shutdown signal.
///
/// Application layer - owns the book for the session and the reporting
/// task that reads it.
pub struct Synchronizer<P>
where
    P: SnapshotProvider + ?Sized,
{
    symbol: Symbol,
    config: SessionConfig,
    provider: Arc<P>,
    sink: Arc<dyn ReportSink>,
    book: SharedOrderBook,
    shutdown: Option<watch::Receiver<bool>>,
    state: watch::Sender<SessionState>,
    counters: Counters,
}

impl<P> Synchronizer<P>
where
    P: SnapshotProvider + ?Sized,
{
    pub fn new(
        symbol: Symbol,
        config: SessionConfig,
        provider: Arc<P>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Init);
        Synchronizer {
            book: SharedOrderBook::new(symbol.clone()),
            symbol,
            config,
            provider,
            sink,
            shutdown: None,
            state,
            counters: Counters::default(),
        }
    }

    /// Stop streaming once `shutdown` turns true
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Handle to the book this session maintains
    pub fn book(&self) -> SharedOrderBook {
        self.book.clone()
    }

    /// Observe the session's lifecycle transitions
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Run the session to completion against `source`.
    ///
    /// `source` is stopped exactly once on every path, and the report
    /// task is always awaited before returning.
    pub async fn run<S>(mut self, mut source: S) -> Result<SessionSummary, SessionError>
    where
        S: DiffSource,
    {
        let deadline = Instant::now() + self.config.max_session_duration;
        let mut shutdown = self.shutdown.clone();

        let seeded = match interruptible(deadline, &mut shutdown, self.fetch_snapshot()).await {
            Ok(fetched) => fetched,
            Err(reason) => Err(SessionError::Interrupted(reason)),
        };
        let snapshot = match seeded {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(symbol = %self.symbol, "Failed to seed book: {}", e);
                if let Err(stop_err) = source.stop().await {
                    tracing::warn!(symbol = %self.symbol, "Failed to stop feed: {}", stop_err);
                }
                self.transition(SessionState::Done);
                return Err(e);
            }
        };

        self.book.seed(&snapshot);
        self.transition(SessionState::Seeded);
        tracing::info!(
            symbol = %self.symbol,
            last_update_id = snapshot.last_update_id,
            bids = snapshot.bids.len(),
            asks = snapshot.asks.len(),
            "Book seeded"
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        let reporter = MetricsReporter::new(
            self.book.clone(),
            Arc::clone(&self.sink),
            self.config.report_interval,
        );
        let reporter_handle = tokio::spawn(reporter.run(stop_rx));

        self.transition(SessionState::Streaming);
        let outcome = self.stream(&mut source, deadline).await;

        self.transition(SessionState::Stopping);
        stop_tx.send_replace(true);

        let feed_open = !matches!(outcome, Ok(StopReason::FeedClosed));
        if let Err(e) = source.stop().await {
            tracing::warn!(symbol = %self.symbol, "Failed to stop feed: {}", e);
        } else if feed_open && outcome.is_ok() {
            self.await_closure(&mut source).await;
        }

        if let Err(e) = reporter_handle.await {
            tracing::error!(symbol = %self.symbol, "Report task failed: {}", e);
        }

        self.transition(SessionState::Done);

        match outcome {
            Ok(stop_reason) => {
                let summary = self.summary(stop_reason);
                self.sink.summary(&summary);
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(symbol = %self.symbol, "Session failed: {}", e);
                Err(e)
            }
        }
    }

    async fn stream<S>(
        &mut self,
        source: &mut S,
        deadline: Instant,
    ) -> Result<StopReason, SessionError>
    where
        S: DiffSource,
    {
        let expiry = tokio::time::sleep_until(deadline);
        tokio::pin!(expiry);
        let mut shutdown = self.shutdown.clone();

        loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => return Ok(StopReason::Shutdown),
                _ = &mut expiry => return Ok(StopReason::Deadline),
                event = source.next_event() => match event? {
                    Some(event) => {
                        if let Some(reason) = self.handle_event(&event, deadline).await? {
                            return Ok(reason);
                        }
                    }
                    None => return Ok(StopReason::FeedClosed),
                },
            }
        }
    }

    /// Classify and apply one diff. Returns a stop reason when streaming
    /// must end: capacity reached, or a resync cut short.
    async fn handle_event(
        &mut self,
        event: &DepthUpdateEvent,
        deadline: Instant,
    ) -> Result<Option<StopReason>, SessionError> {
        let first = event.first_update_id;
        let last = event.final_update_id;

        match self.book.classify(first, last) {
            Classification::Stale => {
                self.counters.stale += 1;
                tracing::debug!(symbol = %self.symbol, first, last, "Dropping stale diff");
                Ok(None)
            }
            Classification::Gap { expected } => {
                self.counters.gaps += 1;
                tracing::warn!(
                    symbol = %self.symbol,
                    expected,
                    first,
                    last,
                    "Sequence gap in diff stream"
                );
                self.counters.unresolved_gap = true;
                match self.config.gap_policy {
                    GapPolicy::Flag => Ok(None),
                    GapPolicy::Resync => self.resync(deadline).await,
                }
            }
            Classification::Accept => {
                // Parse before taking the write lock: a bad level must not
                // leave half a diff in the book.
                let diff = DiffEvent::try_from(event)
                    .map_err(|e| SessionError::malformed(&self.symbol, e))?;
                self.book.apply(&diff);
                let applied = self.book.events_applied();
                tracing::debug!(
                    symbol = %self.symbol,
                    first,
                    last,
                    levels = event.level_count(),
                    applied,
                    "Applied diff"
                );
                Ok(self
                    .config
                    .capacity_reached(applied)
                    .then_some(StopReason::Capacity))
            }
        }
    }

    /// Re-seed from a fresh snapshot. A deadline or shutdown during the
    /// fetch leaves the gap unresolved and ends streaming.
    async fn resync(&mut self, deadline: Instant) -> Result<Option<StopReason>, SessionError> {
        let mut shutdown = self.shutdown.clone();
        let snapshot = match interruptible(deadline, &mut shutdown, self.fetch_snapshot()).await {
            Ok(fetched) => fetched?,
            Err(reason) => {
                tracing::warn!(symbol = %self.symbol, %reason, "Resync abandoned");
                return Ok(Some(reason));
            }
        };
        self.book.reseed(&snapshot);
        self.counters.resyncs += 1;
        self.counters.unresolved_gap = false;
        tracing::info!(
            symbol = %self.symbol,
            last_update_id = snapshot.last_update_id,
            "Book re-seeded after gap"
        );
        Ok(None)
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, SessionError> {
        tracing::debug!(symbol = %self.symbol, "Fetching snapshot");
        let event = self.provider.fetch_snapshot(&self.symbol).await?;
        Snapshot::try_from(&event).map_err(|e| SessionError::malformed(&self.symbol, e))
    }

    /// Wait for the feed to acknowledge the unsubscribe, discarding any
    /// diffs still in flight.
    async fn await_closure<S>(&self, source: &mut S)
    where
        S: DiffSource,
    {
        let drain = async {
            let mut discarded = 0u64;
            loop {
                match source.next_event().await {
                    Ok(Some(_)) => discarded += 1,
                    Ok(None) => return Ok(discarded),
                    Err(e) => return Err(e),
                }
            }
        };

        match tokio::time::timeout(self.config.close_grace, drain).await {
            Ok(Ok(discarded)) => {
                tracing::debug!(symbol = %self.symbol, discarded, "Feed closed");
            }
            Ok(Err(e)) => {
                tracing::warn!(symbol = %self.symbol, "Feed failed while closing: {}", e);
            }
            Err(_) => {
                tracing::warn!(
                    symbol = %self.symbol,
                    grace = ?self.config.close_grace,
                    "Feed did not acknowledge unsubscribe in time"
                );
            }
        }
    }

    fn transition(&self, next: SessionState) {
        let previous = self.state.send_replace(next);
        tracing::debug!(symbol = %self.symbol, ?previous, ?next, "Session state changed");
        if next.is_streaming() {
            tracing::info!(symbol = %self.symbol, "Streaming diffs");
        } else if next.is_terminal() {
            tracing::debug!(symbol = %self.symbol, "Session done");
        }
    }

    fn summary(&self, stop_reason: StopReason) -> SessionSummary {
        SessionSummary {
            symbol: self.symbol.clone(),
            events_applied: self.book.events_applied(),
            stale: self.counters.stale,
            gaps: self.counters.gaps,
            resyncs: self.counters.resyncs,
            consistent: !self.counters.unresolved_gap,
            stop_reason,
        }
    }
}

/// Run `fut` unless the deadline passes or shutdown is requested first
async fn interruptible<F>(
    deadline: Instant,
    shutdown: &mut Option<watch::Receiver<bool>>,
    fut: F,
) -> Result<F::Output, StopReason>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = shutdown_requested(shutdown) => Err(StopReason::Shutdown),
        _ = tokio::time::sleep_until(deadline) => Err(StopReason::Deadline),
        output = fut => Ok(output),
    }
}

/// Resolves once `shutdown` is true; never resolves without a receiver or
/// after the sender is gone.
async fn shutdown_requested(shutdown: &mut Option<watch::Receiver<bool>>) {
    let Some(rx) = shutdown else {
        return std::future::pending().await;
    };
    let stopped = rx.wait_for(|stop| *stop).await.is_ok();
    if !stopped {
        std::future::pending::<()>().await;
    }
}
