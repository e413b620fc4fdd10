use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::domain::ReportSink;
use crate::order_book::{SentimentReport, SharedOrderBook};

/// Periodically reads a book and hands sentiment reports to a sink.
///
/// Only ever takes the read lock, so reporting never stalls diff
/// processing for longer than one metrics computation.
pub struct MetricsReporter {
    book: SharedOrderBook,
    sink: Arc<dyn ReportSink>,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(book: SharedOrderBook, sink: Arc<dyn ReportSink>, interval: Duration) -> Self {
        MetricsReporter {
            book,
            sink,
            interval,
        }
    }

    /// Compute one report and forward it to the sink
    pub fn report_once(&self) -> SentimentReport {
        let report = self.book.sentiment_report();
        self.sink.report(&report);
        report
    }

    /// Report every `interval` until `stop` turns true or its sender is
    /// dropped. The first report is sent one interval after start.
    pub async fn run(self, mut stop: watch::Receiver<bool>) -> u64 {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sent = 0u64;

        loop {
            if *stop.borrow_and_update() {
                break;
            }

            tokio::select! {
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let report = self.report_once();
                    tracing::debug!(
                        symbol = %report.symbol,
                        last_update_id = report.last_update_id,
                        "sentiment report sent"
                    );
                    sent += 1;
                }
            }
        }

        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SessionSummary, Snapshot};
    use parking_lot::Mutex;
    use trading_core::{PriceLevel, Symbol};

    #[derive(Default)]
    struct Collect {
        reports: Mutex<Vec<SentimentReport>>,
    }

    impl ReportSink for Collect {
        fn report(&self, report: &SentimentReport) {
            self.reports.lock().push(report.clone());
        }

        fn summary(&self, _summary: &SessionSummary) {}
    }

    fn seeded_book() -> SharedOrderBook {
        let book = SharedOrderBook::new(Symbol::new("BTCUSDT"));
        book.seed(&Snapshot {
            last_update_id: 7,
            bids: vec![PriceLevel::new(10.0, 2.0)],
            asks: vec![PriceLevel::new(11.0, 1.0)],
        });
        book
    }

    #[test]
    fn test_report_once() {
        let sink = Arc::new(Collect::default());
        let reporter = MetricsReporter::new(seeded_book(), sink.clone(), Duration::from_secs(1));

        let report = reporter.report_once();
        assert_eq!(report.metrics.spread, Some(1.0));
        assert_eq!(report.last_update_id, 7);
        assert_eq!(sink.reports.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_on_interval_until_stopped() {
        let sink = Arc::new(Collect::default());
        let reporter = MetricsReporter::new(seeded_book(), sink.clone(), Duration::from_secs(30));
        let (stop_tx, stop_rx) = watch::channel(false);

        let handle = tokio::spawn(reporter.run(stop_rx));
        tokio::time::sleep(Duration::from_secs(95)).await;
        stop_tx.send_replace(true);

        let sent = handle.await.unwrap();
        assert_eq!(sent, 3);
        assert_eq!(sink.reports.lock().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_sender_dropped() {
        let sink = Arc::new(Collect::default());
        let reporter = MetricsReporter::new(seeded_book(), sink.clone(), Duration::from_secs(30));
        let (stop_tx, stop_rx) = watch::channel(false);
        drop(stop_tx);

        assert_eq!(reporter.run(stop_rx).await, 0);
    }

    #[tokio::test]
    async fn test_already_stopped_sends_nothing() {
        let sink = Arc::new(Collect::default());
        let reporter = MetricsReporter::new(seeded_book(), sink.clone(), Duration::from_millis(1));
        let (_stop_tx, stop_rx) = watch::channel(true);

        assert_eq!(reporter.run(stop_rx).await, 0);
        assert!(sink.reports.lock().is_empty());
    }
}
