use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use stream_samples::config::toml_config::MaybeConfig;
use stream_samples::core::samples::maybe::cache_then_network;
use stream_samples::utils::logger;

#[derive(Parser)]
#[command(name = "maybe-trials")]
#[command(about = "Runs the cache-then-network chain many times and reports how often it came up empty")]
struct Args {
    /// Number of trials
    #[arg(short, long, default_value = "100000")]
    trials: u64,

    #[arg(long, default_value = "42")]
    seed: u64,

    #[arg(long, default_value = "7")]
    cache_threshold: u32,

    #[arg(long, default_value = "4")]
    network_threshold: u32,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    anyhow::ensure!(args.trials > 0, "trials must be at least 1");
    anyhow::ensure!(
        args.cache_threshold <= 10 && args.network_threshold <= 10,
        "thresholds must be between 0 and 10"
    );

    let settings = MaybeConfig {
        cache_threshold: args.cache_threshold,
        network_threshold: args.network_threshold,
    };
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut first = 0u64;
    let mut second = 0u64;
    let mut empty = 0u64;
    for _ in 0..args.trials {
        match cache_then_network(&mut rng, &settings) {
            Ok(prize) if prize == "first prize" => first += 1,
            Ok(_) => second += 1,
            Err(_) => empty += 1,
        }
    }

    let expected = (args.cache_threshold as f64 / 10.0) * (args.network_threshold as f64 / 10.0);
    let ratio = |n: u64| n as f64 / args.trials as f64;

    println!("📊 {} trials (seed {})", args.trials, args.seed);
    println!("   first prize:  {:.4}", ratio(first));
    println!("   second prize: {:.4}", ratio(second));
    println!("   no value:     {:.4} (expected {:.4})", ratio(empty), expected);

    Ok(())
}
