use crate::config::toml_config::ErrorFallbackConfig;
use crate::core::output::SampleOutput;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackOutcome {
    pub stage_one: i64,
    pub used_default: bool,
    pub result: i64,
}

pub fn divide(dividend: i64, divisor: i64) -> Result<i64> {
    dividend.checked_div(divisor).ok_or_else(|| AppError::ArithmeticError {
        message: format!("cannot divide {} by {}", dividend, divisor),
    })
}

pub fn stage_two(value: i64) -> i64 {
    value.saturating_mul(10)
}

/// Stage one may fail; its failure is replaced by `default_value` and stage
/// two runs either way.
pub fn divide_then_scale(dividend: i64, divisor: i64, default_value: i64) -> FallbackOutcome {
    let (stage_one, used_default) = match divide(dividend, divisor) {
        Ok(value) => (value, false),
        Err(e) => {
            tracing::warn!("stage one failed, using default {}: {}", default_value, e);
            (default_value, true)
        }
    };

    FallbackOutcome {
        stage_one,
        used_default,
        result: stage_two(stage_one),
    }
}

pub async fn run(output: SampleOutput, settings: ErrorFallbackConfig) {
    for divisor in settings.divisors {
        let outcome = divide_then_scale(settings.dividend, divisor, settings.default_value);
        let line = if outcome.used_default {
            format!(
                "{} / {} failed, fell back to {} -> {}",
                settings.dividend, divisor, outcome.stage_one, outcome.result
            )
        } else {
            format!("{} / {} = {} -> {}", settings.dividend, divisor, outcome.stage_one, outcome.result)
        };
        output.append_line(line);
    }
}
