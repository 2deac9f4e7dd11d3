//! The sample runner and its samples.
//!
//! Every sample runs as a member of the shared "ongoing samples" group and
//! writes through a [`SampleOutput`](crate::core::output::SampleOutput) bound
//! to that run, so starting another sample silences the previous one.

pub mod backpressure;
pub mod combine;
pub mod fallback;
pub mod maybe;
pub mod retry;
pub mod timer;

use crate::config::AppConfig;
use crate::core::cancel::CancellationGroup;
use crate::core::dispatcher::{Action, CommandTable};
use crate::core::output::OutputHandle;
use crate::utils::error::{AppError, Result};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    Timer,
    BackpressureUnhandled,
    BackpressureSample,
    CombineLatest,
    Maybe,
    Retry,
    ErrorFallback,
}

impl SampleKind {
    pub const ALL: [SampleKind; 7] = [
        SampleKind::Timer,
        SampleKind::BackpressureUnhandled,
        SampleKind::BackpressureSample,
        SampleKind::CombineLatest,
        SampleKind::Maybe,
        SampleKind::Retry,
        SampleKind::ErrorFallback,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SampleKind::Timer => "timer",
            SampleKind::BackpressureUnhandled => "backpressure-unhandled",
            SampleKind::BackpressureSample => "backpressure-sample",
            SampleKind::CombineLatest => "combine-latest",
            SampleKind::Maybe => "maybe",
            SampleKind::Retry => "retry",
            SampleKind::ErrorFallback => "error-fallback",
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        SampleKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| AppError::UnknownSample { name: s.to_string() })
    }
}

pub struct SampleRunner {
    group: Arc<CancellationGroup>,
    output: OutputHandle,
    config: Arc<AppConfig>,
    rng: Mutex<StdRng>,
}

impl SampleRunner {
    pub fn new(group: Arc<CancellationGroup>, output: OutputHandle, config: Arc<AppConfig>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            group,
            output,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Cancels whatever is running and starts `kind`.
    pub fn start(&self, kind: SampleKind) {
        self.group.cancel_all();
        tracing::info!(sample = %kind, "starting sample");

        // 每次執行各自的亂數來源，確保固定種子時可重現
        let rng = StdRng::seed_from_u64(self.rng.lock().gen());
        let config = Arc::clone(&self.config);
        let output = self.output.clone();

        self.group.spawn(move |token| async move {
            let out = output.scoped(&token);
            match kind {
                SampleKind::Timer => {
                    timer::run(out, Duration::from_millis(config.timer.period_ms)).await
                }
                SampleKind::BackpressureUnhandled => {
                    backpressure::run_unhandled(out, config.backpressure.clone()).await
                }
                SampleKind::BackpressureSample => {
                    backpressure::run_sampled(out, config.backpressure.clone()).await
                }
                SampleKind::CombineLatest => combine::run(out, config.combine_latest.clone()).await,
                SampleKind::Maybe => maybe::run(out, rng, config.maybe.clone()).await,
                SampleKind::Retry => retry::run(out, rng, config.retry.clone()).await,
                SampleKind::ErrorFallback => fallback::run(out, config.error_fallback.clone()).await,
            }
            tracing::debug!(sample = %kind, "sample finished");
        });
    }

    /// One command per sample, each starting it on this runner.
    pub fn command_table(self: &Arc<Self>) -> Result<CommandTable> {
        CommandTable::from_pairs(SampleKind::ALL.into_iter().map(|kind| {
            let runner = Arc::clone(self);
            let action: Action = Arc::new(move || runner.start(kind));
            (kind.name(), action)
        }))
    }
}
