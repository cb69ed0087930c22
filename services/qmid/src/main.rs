//! qmid entry point

mod daemon;
mod decode;
mod link;

use anyhow::Result;
use clap::{Parser, Subcommand};
use qmid_config::DaemonConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register with NAS and follow attach state
    Run {
        /// QMI character device
        #[arg(long)]
        device: Option<PathBuf>,

        /// Network interface brought up on attach
        #[arg(long)]
        interface: Option<String>,

        /// Trace every frame sent and received
        #[arg(long)]
        dump: bool,
    },
    /// Describe hex-encoded frames (read from stdin when none are given)
    Decode { frames: Vec<String> },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = DaemonConfig::load(args.config.as_deref())?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match args.command {
        Command::Run {
            device,
            interface,
            dump,
        } => {
            if let Some(device) = device {
                config.device = device;
            }
            if let Some(interface) = interface {
                config.interface = interface;
            }
            config.dump_frames |= dump;
            config.validate()?;

            info!("Starting qmid {}", env!("CARGO_PKG_VERSION"));
            daemon::run(&config)
        }
        Command::Decode { frames } => decode::run(&frames),
    }
}
