use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fourwd_runtime::config::{DriveConfig, INPUT_TIMEOUT, LOOP_HZ};
use fourwd_runtime::runtime::{self, RunOptions};

/// 4WD throttle/ramp controller runtime (simulated board, zenoh tuning)
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON drive config; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Control loop rate
    #[arg(long, default_value_t = LOOP_HZ, value_parser = clap::value_parser!(u64).range(1..=1000))]
    hz: u64,

    /// Release the pedal after this long without input
    #[arg(long, default_value_t = INPUT_TIMEOUT.as_millis() as u64)]
    input_timeout_ms: u64,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init(); // installs the subscriber globally

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match DriveConfig::from_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(1);
            }
        },
        None => DriveConfig::default(),
    };

    let opts = RunOptions {
        config,
        loop_hz: args.hz,
        input_timeout: Duration::from_millis(args.input_timeout_ms),
    };

    if let Err(e) = runtime::run(opts).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
