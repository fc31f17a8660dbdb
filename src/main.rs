use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use diddyborg_udp_bridge::config::BridgeConfig;
use diddyborg_udp_bridge::error::BridgeError;
use diddyborg_udp_bridge::motor::SimulatedBoard;
use diddyborg_udp_bridge::runtime;
use diddyborg_udp_bridge::telemetry::{NoTelemetry, ZenohTelemetry};

/// UDP joystick bridge for a two-motor DiddyBorg base
#[derive(Parser, Debug)]
#[command(name = "diddyborg-udp-bridge", version)]
#[command(about = "Drive a DiddyBorg from the JoystickRC4DiddyBorg app", long_about = None)]
struct Args {
    /// JSON config file (missing fields use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// UDP port to receive frames on
    #[arg(long)]
    rx_port: Option<u16>,

    /// UDP port replies are sent to
    #[arg(long)]
    tx_port: Option<u16>,

    /// Hold the last command forever instead of stopping when frames stop
    #[arg(long)]
    no_watchdog: bool,

    /// Publish drive levels and health over Zenoh
    #[arg(long)]
    telemetry: bool,
}

fn load_config(args: &Args) -> Result<BridgeConfig, BridgeError> {
    let mut config = match &args.config {
        Some(path) => BridgeConfig::from_json_file(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(port) = args.rx_port {
        config.rx_port = port;
    }
    if let Some(port) = args.tx_port {
        config.tx_port = port;
    }
    if args.no_watchdog {
        config.cmd_timeout_ms = 0;
    }
    config.validate()?;
    Ok(config)
}

async fn start(args: Args) -> Result<(), BridgeError> {
    let config = load_config(&args)?;

    // Hardware access lives outside this crate; the simulated board logs writes
    info!("Using simulated motor board");
    let board = SimulatedBoard::new();

    if args.telemetry {
        let telemetry = ZenohTelemetry::open().await?;
        runtime::run(config, board, telemetry).await
    } else {
        runtime::run(config, board, NoTelemetry).await
    }
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init(); // installs the subscriber globally

    let args = Args::parse();
    if let Err(e) = start(args).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
