// One-shot tuning command
//
// Usage: cargo run --example tune -- deadband 40
//        cargo run --example tune -- input-range 120 900
//        cargo run --example tune -- defaults

use clap::{Parser, Subcommand};
use tracing::info;

use fourwd_runtime::config::TOPIC_CMD_TUNE;
use fourwd_runtime::messages::TuneCommand;

#[derive(Debug, Parser)]
#[command(about = "Send a tuning command to a running fourwd-runtime")]
struct Args {
    #[command(subcommand)]
    param: Param,
}

#[derive(Debug, Subcommand)]
enum Param {
    /// ADC counts treated as zero
    Deadband { value: u16 },
    /// Throttle readings mapped to 0 and to full cap
    InputRange { min: u16, max: u16 },
    /// Counts per cycle while speeding up
    AccelStep { value: u16 },
    /// Counts per cycle while slowing down
    DecelStep { value: u16 },
    /// Same step both ways
    RampStep { value: u16 },
    SlowPct { value: u8 },
    FastPct { value: u8 },
    ReversePct { value: u8 },
    /// Restore every default
    Defaults,
}

impl From<Param> for TuneCommand {
    fn from(param: Param) -> Self {
        match param {
            Param::Deadband { value } => TuneCommand::Deadband { value },
            Param::InputRange { min, max } => TuneCommand::InputRange { min, max },
            Param::AccelStep { value } => TuneCommand::AccelStep { value },
            Param::DecelStep { value } => TuneCommand::DecelStep { value },
            Param::RampStep { value } => TuneCommand::RampStep { value },
            Param::SlowPct { value } => TuneCommand::SlowPct { value },
            Param::FastPct { value } => TuneCommand::FastPct { value },
            Param::ReversePct { value } => TuneCommand::ReversePct { value },
            Param::Defaults => TuneCommand::Defaults,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cmd = TuneCommand::from(Args::parse().param);
    let json = serde_json::to_string(&cmd)?;

    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_CMD_TUNE).await?;
    publisher.put(json.clone()).await?;
    info!("Sent {} -> {}", json, TOPIC_CMD_TUNE);

    session.close().await?;
    Ok(())
}
