/// MusicBox Host - drives playback sessions from a console
use clap::{Parser, Subcommand};
use musicbox_host::{HostConfig, MusicBoxHost};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Interval of one song tick at the default speed of 20 ticks per second
const TICK_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "musicbox-host")]
#[command(about = "MusicBox playback session host", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the host, reading commands from stdin
    Run {
        /// Configuration file path
        #[arg(short, long, env = "MUSICBOX_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Load and validate the configuration, then print it
    CheckConfig {
        /// Configuration file path
        #[arg(short, long, env = "MUSICBOX_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "musicbox_host=info,musicbox_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            run(load_config(config)?).await?;
        }
        Commands::CheckConfig { config } => {
            let config = load_config(config)?;
            println!("{:#?}", config);
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<HostConfig> {
    let config = HostConfig::load(path.as_deref())?;
    config.validate()?;
    Ok(config)
}

async fn run(config: HostConfig) -> anyhow::Result<()> {
    tracing::info!("Starting MusicBox host");
    tracing::info!("Indicator enabled: {}", config.indicator.enable);
    tracing::info!("Speaker radius: {}", config.speaker.radius);

    let host = MusicBoxHost::new(&config);
    host.run_lines(BufReader::new(tokio::io::stdin()), TICK_INTERVAL)
        .await?;

    Ok(())
}
