//! Interpret command: every reading for a selected byte range.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;

use super::{InputArgs, build_engine, load_input, parse_range};
use crate::settings::Settings;

#[derive(Args, Debug)]
pub struct InterpretArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Selection as `start..end`, `start+len` or a single offset
    #[arg(short, long)]
    pub range: String,

    /// Do not check 32-byte selections against the network
    #[arg(long)]
    pub no_verify: bool,
}

pub async fn run(settings: Settings, patterns: Option<PathBuf>, args: InterpretArgs) -> Result<()> {
    let range = parse_range(&args.range)?;
    let mut engine = build_engine(&settings, patterns)?;
    load_input(&mut engine, &args.input).await?;

    engine.select(range)?;
    let selection = engine.interpret_selection()?;

    println!("Selection {} ({} bytes):", range, range.len());
    for reading in &selection.readings {
        println!(
            "  {:<10} {:<10} {}",
            reading.kind.to_string(),
            reading.range.to_string(),
            reading.value
        );
    }

    if let Some(check) = selection.check
        && !args.no_verify
    {
        println!("Checking {}...", check.address());
        if let Some(text) = check.run().await {
            let label = format!("{:<10}", "PublicKey");
            println!("  {} {}", label.bold(), text);
        }
    }

    Ok(())
}
