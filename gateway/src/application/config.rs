use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a session does when a sequence gap is detected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Discard the diff, count it and mark the book unverified
    #[default]
    Flag,
    /// Discard the diff and re-seed the book from a fresh snapshot
    Resync,
}

/// Configuration for one symbol's synchronization session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Streaming stops once this much time has passed since the session started
    pub max_session_duration: Duration,
    /// Interval between sentiment reports
    pub report_interval: Duration,
    /// Streaming stops once this many diffs were applied
    pub max_buffered_events: Option<usize>,
    /// How long to wait for the feed to acknowledge an unsubscribe
    pub close_grace: Duration,
    pub gap_policy: GapPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_session_duration: Duration::from_secs(15 * 60),
            report_interval: Duration::from_secs(30),
            max_buffered_events: None,
            close_grace: Duration::from_secs(5),
            gap_policy: GapPolicy::Flag,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_session_duration(mut self, duration: Duration) -> Self {
        self.max_session_duration = duration;
        self
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn with_max_buffered_events(mut self, limit: usize) -> Self {
        self.max_buffered_events = Some(limit);
        self
    }

    pub fn with_close_grace(mut self, grace: Duration) -> Self {
        self.close_grace = grace;
        self
    }

    pub fn with_gap_policy(mut self, policy: GapPolicy) -> Self {
        self.gap_policy = policy;
        self
    }

    /// Whether `applied` diffs reach the configured capacity
    pub fn capacity_reached(&self, applied: u64) -> bool {
        self.max_buffered_events
            .is_some_and(|limit| applied >= limit as u64)
    }
}
