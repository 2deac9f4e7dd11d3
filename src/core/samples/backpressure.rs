//! Overload samples: a synchronous burst far faster than a slow consumer.
//!
//! `run_unhandled` pushes into an unbounded channel. Tokio's unbounded mpsc
//! never blocks or drops, so the whole burst is buffered in memory and the
//! consumer works through it at one item per delay until cancelled.
//!
//! `run_sampled` pushes into a bounded channel and drops whatever does not fit,
//! then forwards only the latest value per sample window to the consumer.

use crate::config::toml_config::BackpressureConfig;
use crate::core::cancel::CancelToken;
use crate::core::operators::sample;
use crate::core::output::SampleOutput;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

const CANCEL_CHECK_INTERVAL: u64 = 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BurstReport {
    pub pushed: u64,
    pub dropped: u64,
    pub interrupted: bool,
}

impl BurstReport {
    pub fn summary(&self, burst_size: u64) -> String {
        if self.interrupted {
            format!("burst interrupted after {} of {} items", self.pushed + self.dropped, burst_size)
        } else {
            format!(
                "burst of {} items done: {} buffered, {} dropped",
                burst_size, self.pushed, self.dropped
            )
        }
    }
}

pub fn push_burst_unbounded(tx: &mpsc::UnboundedSender<u64>, burst_size: u64, token: &CancelToken) -> BurstReport {
    let mut report = BurstReport::default();
    for value in 0..burst_size {
        if value % CANCEL_CHECK_INTERVAL == 0 && token.is_cancelled() {
            report.interrupted = true;
            break;
        }
        if tx.send(value).is_err() {
            report.interrupted = true;
            break;
        }
        report.pushed += 1;
    }
    report
}

pub fn push_burst_dropping(tx: &mpsc::Sender<u64>, burst_size: u64, token: &CancelToken) -> BurstReport {
    let mut report = BurstReport::default();
    for value in 0..burst_size {
        if value % CANCEL_CHECK_INTERVAL == 0 && token.is_cancelled() {
            report.interrupted = true;
            break;
        }
        match tx.try_send(value) {
            Ok(()) => report.pushed += 1,
            Err(TrySendError::Full(_)) => report.dropped += 1,
            Err(TrySendError::Closed(_)) => {
                report.interrupted = true;
                break;
            }
        }
    }
    report
}

async fn consume_unbounded(output: &SampleOutput, mut items: mpsc::UnboundedReceiver<u64>, item_delay: Duration) {
    while let Some(value) = items.recv().await {
        tokio::time::sleep(item_delay).await;
        output.append_line(format!("consumed {}", value));
    }
}

async fn consume(output: &SampleOutput, mut items: mpsc::Receiver<u64>, item_delay: Duration) {
    while let Some(value) = items.recv().await {
        tokio::time::sleep(item_delay).await;
        output.append_line(format!("consumed {}", value));
    }
}

pub async fn run_unhandled(output: SampleOutput, settings: BackpressureConfig) {
    let (tx, rx) = mpsc::unbounded_channel();
    let burst_size = settings.burst_size;
    let token = output.token().clone();

    let burst = tokio::task::spawn_blocking(move || push_burst_unbounded(&tx, burst_size, &token));
    let producer = async {
        match burst.await {
            Ok(report) => {
                tracing::info!(pushed = report.pushed, "unbounded burst finished");
                output.append_line(report.summary(burst_size));
            }
            Err(e) => tracing::error!("❌ burst producer failed: {}", e),
        }
    };

    tokio::join!(
        producer,
        consume_unbounded(&output, rx, Duration::from_millis(settings.item_delay_ms))
    );
}

pub async fn run_sampled(output: SampleOutput, settings: BackpressureConfig) {
    let (tx, rx) = mpsc::channel(settings.buffer_size);
    let burst_size = settings.burst_size;
    let token = output.token().clone();

    let sampled = sample(rx, Duration::from_millis(settings.sample_window_ms));

    let burst = tokio::task::spawn_blocking(move || push_burst_dropping(&tx, burst_size, &token));
    let producer = async {
        match burst.await {
            Ok(report) => {
                tracing::info!(pushed = report.pushed, dropped = report.dropped, "dropping burst finished");
                output.append_line(report.summary(burst_size));
            }
            Err(e) => tracing::error!("❌ burst producer failed: {}", e),
        }
    };

    tokio::join!(
        producer,
        consume(&output, sampled, Duration::from_millis(settings.item_delay_ms))
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cancel::CancellationGroup;

    #[test]
    fn test_dropping_burst_keeps_buffer_size() {
        let group = CancellationGroup::new("samples");
        let (tx, _rx) = mpsc::channel(8);
        let report = push_burst_dropping(&tx, 100, &group.token());
        assert_eq!(report.pushed, 8);
        assert_eq!(report.dropped, 92);
        assert!(!report.interrupted);
    }

    #[test]
    fn test_unbounded_burst_buffers_everything() {
        let group = CancellationGroup::new("samples");
        let (tx, rx) = mpsc::unbounded_channel();
        let report = push_burst_unbounded(&tx, 5000, &group.token());
        assert_eq!(report.pushed, 5000);
        assert_eq!(rx.len(), 5000);
    }

    #[test]
    fn test_cancelled_burst_stops_early() {
        let group = CancellationGroup::new("samples");
        let token = group.token();
        group.cancel_all();

        let (tx, _rx) = mpsc::unbounded_channel();
        let report = push_burst_unbounded(&tx, 5000, &token);
        assert!(report.interrupted);
        assert_eq!(report.pushed, 0);
    }
}
