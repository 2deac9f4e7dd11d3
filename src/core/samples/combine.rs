use crate::config::toml_config::CombineLatestConfig;
use crate::core::operators::{combine_latest, paced};
use crate::core::output::SampleOutput;
use std::time::Duration;

pub const BOTH_TRUE: &str = "Both are true!";
pub const ONE_FALSE: &str = "at least one is false";

/// Two paced boolean sequences combined with AND on every update of either.
pub async fn run(output: SampleOutput, settings: CombineLatestConfig) {
    let left = paced(settings.left_values, Duration::from_millis(settings.left_period_ms));
    let right = paced(settings.right_values, Duration::from_millis(settings.right_period_ms));

    let mut combined = combine_latest(left, right, |a: &bool, b: &bool| *a && *b);
    while let Some(both) = combined.recv().await {
        output.append_line(if both { BOTH_TRUE } else { ONE_FALSE });
    }
}
