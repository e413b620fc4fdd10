use std::fmt;
use trading_core::Symbol;

/// Lifecycle of one symbol's synchronization session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, snapshot not yet fetched
    Init,
    /// Book seeded from a snapshot
    Seeded,
    /// Consuming diff events
    Streaming,
    /// Stop triggered, waiting for the feed and reporter to wind down
    Stopping,
    /// Finished, normally or with an error
    Done,
}

impl SessionState {
    /// Check whether diffs may be applied in this state
    pub fn is_streaming(&self) -> bool {
        matches!(self, SessionState::Streaming)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Done)
    }
}

/// Why a session left the streaming state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Maximum session duration elapsed
    Deadline,
    /// Applied event count reached the configured limit
    Capacity,
    /// The feed closed on its own
    FeedClosed,
    /// Orchestrator-wide shutdown was requested
    Shutdown,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::Deadline => "deadline",
            StopReason::Capacity => "capacity",
            StopReason::FeedClosed => "feed closed",
            StopReason::Shutdown => "shutdown",
        };
        write!(f, "{}", s)
    }
}

/// Final accounting for a completed session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub symbol: Symbol,
    /// Diffs classified Accept and applied
    pub events_applied: u64,
    /// Diffs discarded as already reflected
    pub stale: u64,
    /// Diffs discarded because updates were missed
    pub gaps: u64,
    /// Snapshots re-fetched after a gap
    pub resyncs: u64,
    /// False when a gap was detected and never resolved by a resync
    pub consistent: bool,
    pub stop_reason: StopReason,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : Finished events capturing. Events processed: {} (stale: {}, gaps: {}, resyncs: {}, stop: {}{})",
            self.symbol,
            self.events_applied,
            self.stale,
            self.gaps,
            self.resyncs,
            self.stop_reason,
            if self.consistent { "" } else { ", book unverified" }
        )
    }
}
