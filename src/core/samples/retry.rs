use crate::config::toml_config::RetryConfig;
use crate::core::operators::retry;
use crate::core::output::SampleOutput;
use crate::utils::error::{AppError, Result};
use rand::Rng;
use std::time::Duration;

/// Connects over a link that drops with `failure_rate`, retrying up to
/// `max_retries` extra times. Returns the attempt that got through.
pub async fn connect_with_retries<R: Rng>(output: &SampleOutput, rng: &mut R, settings: &RetryConfig) -> Result<usize> {
    let delay = Duration::from_millis(settings.attempt_delay_ms);

    retry(settings.max_retries, |attempt| {
        let dropped = rng.gen_bool(settings.failure_rate);
        let output = output.clone();
        async move {
            tokio::time::sleep(delay).await;
            if dropped {
                output.append_line(format!("attempt {}: connection dropped", attempt));
                Err(AppError::ConnectionError { attempt })
            } else {
                Ok(attempt)
            }
        }
    })
    .await
}

pub async fn run<R: Rng + Send>(output: SampleOutput, mut rng: R, settings: RetryConfig) {
    match connect_with_retries(&output, &mut rng, &settings).await {
        Ok(attempt) => output.append_line(format!("connected on attempt {}", attempt)),
        Err(e) => output.append_line(format!("giving up after {} attempts: {}", settings.max_retries + 1, e)),
    }
}
