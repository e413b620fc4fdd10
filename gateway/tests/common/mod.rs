//! Scripted collaborators for session tests: no network involved.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use depth_gateway::{
    DiffSource, FeedConnector, FeedError, FetchError, ReportSink, SentimentReport,
    SessionSummary, SnapshotProvider,
};
use trading_core::{DepthSnapshotEvent, DepthUpdateEvent, PriceLevel, Symbol};

// ============================================================================
// Builders
// ============================================================================

pub fn snapshot(last_update_id: u64, bids: &[(f64, f64)], asks: &[(f64, f64)]) -> DepthSnapshotEvent {
    DepthSnapshotEvent::new(last_update_id, levels(bids), levels(asks))
}

pub fn diff(symbol: &str, first: u64, last: u64) -> DepthUpdateEvent {
    DepthUpdateEvent::new(&Symbol::new(symbol), first, last, vec![], vec![], 0)
}

pub fn diff_with(
    symbol: &str,
    first: u64,
    last: u64,
    bids: &[(f64, f64)],
    asks: &[(f64, f64)],
) -> DepthUpdateEvent {
    DepthUpdateEvent::new(&Symbol::new(symbol), first, last, levels(bids), levels(asks), 0)
}

fn levels(pairs: &[(f64, f64)]) -> Vec<PriceLevel> {
    pairs.iter().copied().map(PriceLevel::from).collect()
}

// ============================================================================
// Snapshot provider
// ============================================================================

/// Serves queued snapshot results per symbol; the last one repeats
#[derive(Default)]
pub struct StaticProvider {
    responses: Mutex<HashMap<String, VecDeque<Result<DepthSnapshotEvent, FetchError>>>>,
    calls: AtomicUsize,
    stall_after: Option<usize>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, symbol: &str, response: Result<DepthSnapshotEvent, FetchError>) -> Self {
        self.responses
            .lock()
            .entry(Symbol::new(symbol).to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Every call after the first `calls` ones takes an hour to answer
    pub fn stalling_after(mut self, calls: usize) -> Self {
        self.stall_after = Some(calls);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotProvider for StaticProvider {
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<DepthSnapshotEvent, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.stall_after.is_some_and(|limit| call > limit) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        let mut responses = self.responses.lock();
        let queue = responses
            .get_mut(symbol.as_str())
            .ok_or_else(|| FetchError::Api {
                code: -1121,
                message: "Invalid symbol.".to_string(),
            })?;
        if queue.len() > 1 {
            return queue.pop_front().expect("queue has more than one response");
        }
        queue
            .front()
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Network("no snapshot".to_string())))
    }
}

// ============================================================================
// Diff source
// ============================================================================

pub enum Step {
    Event(DepthUpdateEvent),
    Fail(FeedError),
    /// Wait before yielding the next step
    Pause(Duration),
}

/// What the source does once its script runs out
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum AfterScript {
    /// Report the feed as closed
    Close,
    /// Stay silent until stopped, then close
    HangUntilStopped,
    /// Stay silent forever, even after stop
    HangForever,
}

pub struct ScriptedSource {
    steps: VecDeque<Step>,
    after: AfterScript,
    stopped: bool,
    stop_calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(events: Vec<DepthUpdateEvent>, after: AfterScript) -> Self {
        Self::from_steps(events.into_iter().map(Step::Event).collect(), after)
    }

    pub fn from_steps(steps: Vec<Step>, after: AfterScript) -> Self {
        ScriptedSource {
            steps: steps.into(),
            after,
            stopped: false,
            stop_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of `stop` calls, readable after the source is moved
    pub fn stop_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stop_calls)
    }
}

#[async_trait]
impl DiffSource for ScriptedSource {
    async fn next_event(&mut self) -> Result<Option<DepthUpdateEvent>, FeedError> {
        loop {
            if let Some(Step::Pause(duration)) = self.steps.front() {
                let duration = *duration;
                tokio::time::sleep(duration).await;
                self.steps.pop_front();
                continue;
            }

            return match self.steps.pop_front() {
                Some(Step::Event(event)) => Ok(Some(event)),
                Some(Step::Fail(err)) => Err(err),
                Some(Step::Pause(_)) => continue,
                None => match self.after {
                    AfterScript::Close => Ok(None),
                    AfterScript::HangUntilStopped if self.stopped => Ok(None),
                    _ => std::future::pending().await,
                },
            };
        }
    }

    async fn stop(&mut self) -> Result<(), FeedError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.stopped = true;
        Ok(())
    }
}

// ============================================================================
// Feed connector
// ============================================================================

#[derive(Default)]
pub struct ScriptedConnector {
    sources: Mutex<HashMap<String, ScriptedSource>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, symbol: &str, source: ScriptedSource) -> Self {
        self.sources
            .lock()
            .insert(Symbol::new(symbol).to_string(), source);
        self
    }
}

#[async_trait]
impl FeedConnector for ScriptedConnector {
    type Source = ScriptedSource;

    async fn connect(&self, symbol: &Symbol) -> Result<Self::Source, FeedError> {
        self.sources
            .lock()
            .remove(symbol.as_str())
            .ok_or_else(|| FeedError::Subscribe(format!("no stream for {}", symbol)))
    }
}

// ============================================================================
// Report sink
// ============================================================================

#[derive(Default)]
pub struct CollectingSink {
    pub reports: Mutex<Vec<SentimentReport>>,
    pub summaries: Mutex<Vec<SessionSummary>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn report_count(&self) -> usize {
        self.reports.lock().len()
    }
}

impl ReportSink for CollectingSink {
    fn report(&self, report: &SentimentReport) {
        self.reports.lock().push(report.clone());
    }

    fn summary(&self, summary: &SessionSummary) {
        self.summaries.lock().push(summary.clone());
    }
}
