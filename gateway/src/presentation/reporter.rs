use tokio::sync::mpsc;

use crate::domain::{ReportSink, SessionSummary};
use crate::order_book::SentimentReport;

/// Logs sentiment reports and session summaries at INFO
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ReportSink for TracingReporter {
    fn report(&self, report: &SentimentReport) {
        tracing::info!(
            symbol = %report.symbol,
            last_update_id = report.last_update_id,
            "{}",
            report
        );
    }

    fn summary(&self, summary: &SessionSummary) {
        tracing::info!(
            symbol = %summary.symbol,
            events_applied = summary.events_applied,
            consistent = summary.consistent,
            "{}",
            summary
        );
    }
}

/// Item delivered by [`ChannelReporter`]
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    Report(SentimentReport),
    Summary(SessionSummary),
}

/// Forwards reports to an unbounded channel.
///
/// Sending never blocks the reporting task; items are dropped once the
/// receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<ReportEvent>,
}

impl ChannelReporter {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ReportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelReporter { tx }, rx)
    }

    fn forward(&self, event: ReportEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Report receiver dropped");
        }
    }
}

impl ReportSink for ChannelReporter {
    fn report(&self, report: &SentimentReport) {
        self.forward(ReportEvent::Report(report.clone()));
    }

    fn summary(&self, summary: &SessionSummary) {
        self.forward(ReportEvent::Summary(summary.clone()));
    }
}
