use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_non_empty_list, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub seed: Option<u64>,
    pub runtime: RuntimeConfig,
    pub dispatcher: DispatcherConfig,
    pub data: DataConfig,
    pub timer: TimerConfig,
    pub backpressure: BackpressureConfig,
    pub combine_latest: CombineLatestConfig,
    pub maybe: MaybeConfig,
    pub retry: RetryConfig,
    pub error_fallback: ErrorFallbackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { worker_threads: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub debounce_ms: u64,
    pub fetch_throttle_ms: u64,
    pub double_tap_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            fetch_throttle_ms: 4000,
            double_tap_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// 模擬網路延遲
    pub latency_ms: u64,
    /// 設定後改用真正的 REST API
    pub api_base_url: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            latency_ms: 1000,
            api_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub period_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self { period_ms: 1000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackpressureConfig {
    pub burst_size: u64,
    pub item_delay_ms: u64,
    pub sample_window_ms: u64,
    pub buffer_size: usize,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            burst_size: 1_300_000,
            item_delay_ms: 100,
            sample_window_ms: 100,
            buffer_size: 128,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineLatestConfig {
    pub left_values: Vec<bool>,
    pub left_period_ms: u64,
    pub right_values: Vec<bool>,
    pub right_period_ms: u64,
}

impl Default for CombineLatestConfig {
    fn default() -> Self {
        Self {
            left_values: vec![true, true, false, true],
            left_period_ms: 300,
            right_values: vec![false, true, false, false, true],
            right_period_ms: 200,
        }
    }
}

/// 抽籤範圍是 1..=10，抽到的數字大於門檻才算成功
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaybeConfig {
    pub cache_threshold: u32,
    pub network_threshold: u32,
}

impl Default for MaybeConfig {
    fn default() -> Self {
        Self {
            cache_threshold: 7,
            network_threshold: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub failure_rate: f64,
    pub attempt_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 4,
            failure_rate: 0.5,
            attempt_delay_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorFallbackConfig {
    pub dividend: i64,
    pub divisors: Vec<i64>,
    pub default_value: i64,
}

impl Default for ErrorFallbackConfig {
    fn default() -> Self {
        Self {
            dividend: 10,
            divisors: vec![2, 0],
            default_value: 1,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_BASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn debounce_period(&self) -> Duration {
        Duration::from_millis(self.dispatcher.debounce_ms)
    }

    pub fn fetch_throttle(&self) -> Duration {
        Duration::from_millis(self.dispatcher.fetch_throttle_ms)
    }

    pub fn double_tap_period(&self) -> Duration {
        Duration::from_millis(self.dispatcher.double_tap_ms)
    }

    pub fn data_latency(&self) -> Duration {
        Duration::from_millis(self.data.latency_ms)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("runtime.worker_threads", self.runtime.worker_threads as u64, 1)?;
        validate_positive_number("dispatcher.debounce_ms", self.dispatcher.debounce_ms, 1)?;
        validate_positive_number("dispatcher.double_tap_ms", self.dispatcher.double_tap_ms, 1)?;

        if let Some(url) = &self.data.api_base_url {
            validate_url("data.api_base_url", url)?;
        }

        validate_positive_number("timer.period_ms", self.timer.period_ms, 1)?;

        validate_positive_number("backpressure.burst_size", self.backpressure.burst_size, 1)?;
        validate_positive_number("backpressure.sample_window_ms", self.backpressure.sample_window_ms, 1)?;
        validate_positive_number("backpressure.buffer_size", self.backpressure.buffer_size as u64, 1)?;

        validate_non_empty_list("combine_latest.left_values", &self.combine_latest.left_values)?;
        validate_non_empty_list("combine_latest.right_values", &self.combine_latest.right_values)?;
        validate_positive_number("combine_latest.left_period_ms", self.combine_latest.left_period_ms, 1)?;
        validate_positive_number("combine_latest.right_period_ms", self.combine_latest.right_period_ms, 1)?;

        validate_range("maybe.cache_threshold", self.maybe.cache_threshold, 0, 10)?;
        validate_range("maybe.network_threshold", self.maybe.network_threshold, 0, 10)?;

        validate_range("retry.failure_rate", self.retry.failure_rate, 0.0, 1.0)?;

        validate_non_empty_list("error_fallback.divisors", &self.error_fallback.divisors)?;

        Ok(())
    }
}
