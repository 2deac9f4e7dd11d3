use clap::Parser;
use stream_samples::app::terminal::{run_interactive, run_single, TerminalDisplay};
use stream_samples::domain::ports::NullDisplay;
use stream_samples::utils::error::ErrorSeverity;
use stream_samples::utils::{logger, validation::Validate};
use stream_samples::{provider_from_config, AppConfig, AppError, CliConfig, MainScreen, SampleKind};
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting stream-samples");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match cli.load_app_config().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.runtime.worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(run(cli, config))
}

async fn run(cli: CliConfig, config: AppConfig) -> anyhow::Result<()> {
    let provider = provider_from_config(&config);

    match cli.run.as_deref() {
        Some(name) => {
            let kind = match name.parse::<SampleKind>() {
                Ok(kind) => kind,
                Err(e) => exit_with(&e),
            };
            let screen = MainScreen::open(config, provider, NullDisplay)?;
            tracing::info!("▶️ Running {} for {}s", kind, cli.duration_secs);

            let lines = run_single(&screen, kind, Duration::from_secs(cli.duration_secs)).await;
            for line in lines {
                println!("{}", line);
            }
        }
        None => {
            let screen = MainScreen::open(config, provider, TerminalDisplay::default())?;
            run_interactive(&screen).await?;
        }
    }

    tracing::info!("✅ Done");
    Ok(())
}

fn exit_with(e: &AppError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
