pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::{provider_from_config, MainScreen};
pub use config::AppConfig;
pub use crate::core::{Dispatcher, OutputHandle, SampleKind, SampleRunner};
pub use utils::error::{AppError, Result};
