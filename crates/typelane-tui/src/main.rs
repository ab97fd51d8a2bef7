//! typelane TUI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use typelane_tui::Runtime;

/// typelane terminal typing race
#[derive(Parser, Debug)]
#[command(name = "typelane")]
#[command(about = "Terminal multiplayer typing race")]
#[command(version)]
struct Args {
    /// Server address to connect to for multiplayer races
    #[arg(short, long, default_value = "127.0.0.1:4433")]
    server: String,

    /// Words per generated solo sentence
    #[arg(long, default_value = "10")]
    words: usize,

    /// Write logs to this file (the terminal is owned by the UI)
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)?;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(file).with_ansi(false))
            .with(filter)
            .init();
    }

    let runtime = Runtime::new(args.server, args.words)?;

    Ok(runtime.run().await?)
}
