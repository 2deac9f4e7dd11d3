//! Stream operators over `tokio::sync::mpsc` channels.
//!
//! Each operator takes ownership of an input receiver, spawns one task that
//! drives it, and hands back a new receiver. The task ends when its input
//! closes or when nobody reads its output anymore.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

const OPERATOR_BUFFER: usize = 16;

/// Emits a value only after `period` has passed without a newer one.
/// A value still pending when the input closes is emitted.
pub fn debounce<T: Send + 'static>(mut input: mpsc::Receiver<T>, period: Duration) -> mpsc::Receiver<T> {
    let (tx, output) = mpsc::channel(OPERATOR_BUFFER);

    tokio::spawn(async move {
        let mut pending: Option<T> = None;
        loop {
            match pending.take() {
                None => tokio::select! {
                    next = input.recv() => match next {
                        Some(value) => pending = Some(value),
                        None => break,
                    },
                    _ = tx.closed() => break,
                },
                Some(value) => tokio::select! {
                    next = input.recv() => match next {
                        Some(newer) => pending = Some(newer),
                        None => {
                            let _ = tx.send(value).await;
                            break;
                        }
                    },
                    _ = tokio::time::sleep(period) => {
                        if tx.send(value).await.is_err() {
                            break;
                        }
                    }
                },
            }
        }
    });

    output
}

/// Lets the first value through, then ignores everything for `window`.
pub fn throttle_first<T: Send + 'static>(mut input: mpsc::Receiver<T>, window: Duration) -> mpsc::Receiver<T> {
    let (tx, output) = mpsc::channel(OPERATOR_BUFFER);

    tokio::spawn(async move {
        let mut last_emit: Option<Instant> = None;
        loop {
            let value = tokio::select! {
                next = input.recv() => match next {
                    Some(value) => value,
                    None => break,
                },
                _ = tx.closed() => break,
            };

            let now = Instant::now();
            let open = last_emit.map_or(true, |at| now.duration_since(at) >= window);
            if !open {
                tracing::trace!("throttled");
                continue;
            }
            last_emit = Some(now);
            if tx.send(value).await.is_err() {
                break;
            }
        }
    });

    output
}

/// Accepts a value only when it follows the previous one within `period`.
/// An accepted pair is consumed, so a third quick value starts a new pair.
pub fn filter_double_tap<T: Send + 'static>(mut input: mpsc::Receiver<T>, period: Duration) -> mpsc::Receiver<T> {
    let (tx, output) = mpsc::channel(OPERATOR_BUFFER);

    tokio::spawn(async move {
        let mut last_tap: Option<Instant> = None;
        loop {
            let value = tokio::select! {
                next = input.recv() => match next {
                    Some(value) => value,
                    None => break,
                },
                _ = tx.closed() => break,
            };

            let now = Instant::now();
            let accepted = last_tap.map_or(false, |at| now.duration_since(at) <= period);
            last_tap = if accepted { None } else { Some(now) };

            if accepted && tx.send(value).await.is_err() {
                break;
            }
        }
    });

    output
}

/// Forwards only the most recent value seen in each `window`.
/// Windows with no new value emit nothing. The last unsent value is emitted
/// when the input closes.
pub fn sample<T: Send + 'static>(mut input: mpsc::Receiver<T>, window: Duration) -> mpsc::Receiver<T> {
    // 容量為 1：下游忙碌時取樣器等待，不堆積舊值
    let (tx, output) = mpsc::channel(1);

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + window, window);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut latest: Option<T> = None;

        loop {
            tokio::select! {
                next = input.recv() => match next {
                    Some(value) => latest = Some(value),
                    None => {
                        if let Some(value) = latest.take() {
                            let _ = tx.send(value).await;
                        }
                        break;
                    }
                },
                _ = ticker.tick() => {
                    if let Some(value) = latest.take() {
                        if tx.send(value).await.is_err() {
                            break;
                        }
                    }
                },
                _ = tx.closed() => break,
            }
        }
    });

    output
}

/// Combines the latest values of both inputs every time either one updates.
/// Nothing is emitted until both sides have produced at least one value.
pub fn combine_latest<A, B, R, F>(
    mut left: mpsc::Receiver<A>,
    mut right: mpsc::Receiver<B>,
    combine: F,
) -> mpsc::Receiver<R>
where
    A: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    F: Fn(&A, &B) -> R + Send + 'static,
{
    let (tx, output) = mpsc::channel(OPERATOR_BUFFER);

    tokio::spawn(async move {
        let mut latest_left: Option<A> = None;
        let mut latest_right: Option<B> = None;
        let mut left_open = true;
        let mut right_open = true;

        while left_open || right_open {
            tokio::select! {
                next = left.recv(), if left_open => match next {
                    Some(value) => latest_left = Some(value),
                    None => {
                        left_open = false;
                        continue;
                    }
                },
                next = right.recv(), if right_open => match next {
                    Some(value) => latest_right = Some(value),
                    None => {
                        right_open = false;
                        continue;
                    }
                },
            }

            if let (Some(l), Some(r)) = (&latest_left, &latest_right) {
                if tx.send(combine(l, r)).await.is_err() {
                    break;
                }
            }
        }
    });

    output
}

/// Emits `values` one per `period`, the first one after a full period.
pub fn paced<T: Send + 'static>(values: Vec<T>, period: Duration) -> mpsc::Receiver<T> {
    let (tx, output) = mpsc::channel(OPERATOR_BUFFER);

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        for value in values {
            ticker.tick().await;
            if tx.send(value).await.is_err() {
                break;
            }
        }
    });

    output
}

/// Runs `operation` until it succeeds, at most `max_retries` extra times.
/// The closure receives the 1-based attempt number. The last error is returned
/// once retries are exhausted.
pub async fn retry<F, Fut, T, E>(max_retries: usize, mut operation: F) -> Result<T, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(attempt, "retry: operation succeeded after retries");
                }
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!(attempt, max = max_retries + 1, error = %e, "retry: operation failed");
                if attempt > max_retries {
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect<T>(mut rx: mpsc::Receiver<T>) -> Vec<T> {
        let mut items = Vec::new();
        while let Some(item) = rx.recv().await {
            items.push(item);
        }
        items
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_keeps_only_settled_values() {
        let (tx, rx) = mpsc::channel(16);
        let debounced = debounce(rx, Duration::from_millis(300));

        tokio::spawn(async move {
            for text in ["t", "ti", "tim", "timer"] {
                tx.send(text.to_string()).await.unwrap();
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            tokio::time::sleep(Duration::from_millis(400)).await;
            tx.send("maybe".to_string()).await.unwrap();
        });

        assert_eq!(collect(debounced).await, vec!["timer", "maybe"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_first_drops_within_window() {
        let (tx, rx) = mpsc::channel(16);
        let throttled = throttle_first(rx, Duration::from_secs(4));

        tokio::spawn(async move {
            for i in 0..3 {
                tx.send(i).await.unwrap();
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            tokio::time::sleep(Duration::from_secs(2)).await;
            tx.send(3).await.unwrap();
        });

        assert_eq!(collect(throttled).await, vec![0, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_double_tap() {
        let (tx, rx) = mpsc::channel(16);
        let taps = filter_double_tap(rx, Duration::from_millis(500));

        tokio::spawn(async move {
            // 第二下在 200ms 內：接受
            tx.send(1).await.unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
            tx.send(2).await.unwrap();
            // 接受後重新配對，第三下不算
            tokio::time::sleep(Duration::from_millis(100)).await;
            tx.send(3).await.unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
            tx.send(4).await.unwrap();
        });

        assert_eq!(collect(taps).await, vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_emits_latest_per_window() {
        let (tx, rx) = mpsc::channel(16);
        let sampled = sample(rx, Duration::from_millis(100));

        tokio::spawn(async move {
            for i in 0..10 {
                tx.send(i).await.unwrap();
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
        });

        let values = collect(sampled).await;
        // 每 100ms 只留下最新值，最後一個值在結束時送出
        assert!(values.len() < 10);
        assert_eq!(values.last(), Some(&9));
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_combine_latest_waits_for_both_sides() {
        let left = paced(vec![true, true, false, true], Duration::from_millis(300));
        let right = paced(vec![false, true, false, false, true], Duration::from_millis(200));

        let combined = collect(combine_latest(left, right, |a, b| *a && *b)).await;

        // 9 次更新，減去右側在 200ms 時的第一次（左側尚未有值）
        assert_eq!(combined.len(), 8);
        assert!(!combined[0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paced_spacing() {
        let started = Instant::now();
        let mut rx = paced(vec!['a', 'b'], Duration::from_millis(300));

        assert_eq!(rx.recv().await, Some('a'));
        assert_eq!(started.elapsed(), Duration::from_millis(300));
        assert_eq!(rx.recv().await, Some('b'));
        assert_eq!(started.elapsed(), Duration::from_millis(600));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let mut calls = 0;
        let result: Result<(), String> = retry(4, |attempt| {
            calls += 1;
            async move { Err(format!("attempt {} failed", attempt)) }
        })
        .await;

        assert_eq!(calls, 5);
        assert_eq!(result.unwrap_err(), "attempt 5 failed");
    }

    #[tokio::test]
    async fn test_retry_stops_on_success() {
        let result: Result<usize, String> = retry(4, |attempt| async move {
            if attempt < 3 {
                Err("flaky".to_string())
            } else {
                Ok(attempt)
            }
        })
        .await;

        assert_eq!(result, Ok(3));
    }
}
