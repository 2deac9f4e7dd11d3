use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status} for {url}")]
    ApiStatusError { status: u16, url: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Command '{name}' is registered more than once")]
    DuplicateCommand { name: String },

    #[error("Unknown sample: {name}")]
    UnknownSample { name: String },

    #[error("Arithmetic error: {message}")]
    ArithmeticError { message: String },

    #[error("No value produced by any stage")]
    NoValue,

    #[error("Connection failed on attempt {attempt}")]
    ConnectionError { attempt: usize },

    #[error("Background task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::ApiError(_) | AppError::ApiStatusError { .. } | AppError::ConnectionError { .. } => {
                ErrorCategory::Network
            }
            AppError::ConfigError { .. }
            | AppError::ConfigValidationError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::DuplicateCommand { .. }
            | AppError::UnknownSample { .. } => ErrorCategory::Configuration,
            AppError::SerializationError(_) | AppError::ArithmeticError { .. } | AppError::NoValue => {
                ErrorCategory::Processing
            }
            AppError::IoError(_) | AppError::TaskError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 樣本內部的失敗會被吸收，不影響程式
            AppError::NoValue | AppError::ArithmeticError { .. } => ErrorSeverity::Low,
            AppError::ApiError(_) | AppError::ApiStatusError { .. } | AppError::ConnectionError { .. } => {
                ErrorSeverity::Medium
            }
            AppError::ConfigError { .. }
            | AppError::ConfigValidationError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::DuplicateCommand { .. }
            | AppError::UnknownSample { .. }
            | AppError::SerializationError(_) => ErrorSeverity::High,
            AppError::IoError(_) | AppError::TaskError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the data source: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Processing => format!("Processing problem: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AppError::ApiError(_) | AppError::ApiStatusError { .. } => {
                "Check data.api_base_url or unset it to use the built-in fake data"
            }
            AppError::ConnectionError { .. } => "Try again, the connection is flaky by design",
            AppError::ConfigError { .. }
            | AppError::ConfigValidationError { .. }
            | AppError::InvalidConfigValueError { .. } => "Fix the configuration file and run again",
            AppError::DuplicateCommand { .. } => "Register each command name only once",
            AppError::UnknownSample { .. } => {
                "Use one of: timer, backpressure-unhandled, backpressure-sample, combine-latest, maybe, retry, error-fallback"
            }
            AppError::SerializationError(_) => "Make sure the API returns the expected JSON shape",
            AppError::ArithmeticError { .. } | AppError::NoValue => "No action needed",
            AppError::IoError(_) | AppError::TaskError(_) => "Check system resources and run again",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
