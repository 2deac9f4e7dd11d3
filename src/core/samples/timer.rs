use crate::core::output::SampleOutput;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub fn tick_line(counter: u64, timestamp_millis: i64) -> String {
    format!("{}  {}", counter, timestamp_millis)
}

/// Rewrites the last output line once per `period` with a counter and the
/// wall-clock time, until cancelled.
pub async fn run(output: SampleOutput, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut counter: u64 = 0;
    loop {
        ticker.tick().await;
        output.replace_last_line(tick_line(counter, chrono::Utc::now().timestamp_millis()));
        counter += 1;
    }
}
