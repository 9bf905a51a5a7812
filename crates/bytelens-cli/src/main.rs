use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod settings;

use commands::{hexdump, interpret, scan};
use settings::Settings;

#[derive(Parser)]
#[command(name = "bytelens")]
#[command(version, about = "Annotate raw account bytes and verify embedded keys")]
struct Cli {
    /// Settings file (defaults to <config dir>/bytelens/settings.toml)
    #[arg(short, long, global = true, env = "BYTELENS_CONFIG")]
    config: Option<PathBuf>,

    /// Pattern database (JSON)
    #[arg(short, long, global = true)]
    patterns: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the detectors and verify public key candidates
    Scan(scan::ScanArgs),
    /// Show every reading for a byte range
    Interpret(interpret::InterpretArgs),
    /// Print the buffer as a hexdump
    Hexdump(hexdump::HexdumpArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bytelens=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Command::Scan(args) => scan::run(settings, cli.patterns, args).await,
        Command::Interpret(args) => interpret::run(settings, cli.patterns, args).await,
        Command::Hexdump(args) => hexdump::run(settings, cli.patterns, args).await,
    }
}
