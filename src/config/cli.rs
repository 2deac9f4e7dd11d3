use crate::config::toml_config::AppConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "stream-samples")]
#[command(about = "Debounced command dispatcher running cancellable stream samples")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    /// Run a single sample and print the final output instead of the interactive prompt
    #[arg(long)]
    pub run: Option<String>,

    /// How long a sample started with --run is left running
    #[arg(long, default_value = "5")]
    pub duration_secs: u64,

    /// Use a live REST API instead of the built-in fake data
    #[arg(long)]
    pub api_base_url: Option<String>,

    #[arg(long)]
    pub seed: Option<u64>,
}

impl CliConfig {
    /// 載入配置檔並套用命令列覆蓋設定
    pub fn load_app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(url) = &self.api_base_url {
            tracing::info!("🔧 API base URL overridden to: {}", url);
            config.data.api_base_url = Some(url.clone());
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }

        Ok(config)
    }
}
