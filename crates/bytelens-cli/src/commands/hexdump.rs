//! Hexdump command implementation.
//!
//! # Output Format
//!
//! ```text
//! 0x000: 48 65 6C 6C 6F 20 57 6F  72 6C 64 00 00 00 00 00  |Hello World.....|
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{InputArgs, build_engine, load_input, parse_range};
use crate::settings::Settings;

#[derive(Args, Debug)]
pub struct HexdumpArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Accept the maximum-confidence suggestions first and mask their bytes
    #[arg(long)]
    pub mask_verified: bool,

    /// Only dump this range (`start..end` or `start+len`)
    #[arg(short, long)]
    pub range: Option<String>,
}

pub async fn run(settings: Settings, patterns: Option<PathBuf>, args: HexdumpArgs) -> Result<()> {
    let mut engine = build_engine(&settings, patterns)?;
    load_input(&mut engine, &args.input).await?;

    if args.mask_verified {
        engine.run_detectors()?.run().await;
        for suggestion in engine.max_confidence_suggestions() {
            if let Err(e) = engine.accept_suggestion(&suggestion.key(), None) {
                tracing::debug!("Skipping {} at {}: {}", suggestion.kind, suggestion.range, e);
            }
        }
    }

    println!("Hexdump ({} bytes):", engine.bytes().len());
    println!();
    let dump = engine.hexdump(args.mask_verified);

    match &args.range {
        Some(range) => {
            let range = parse_range(range)?;
            let first_row = range.start / 16;
            let last_row = range.end.div_ceil(16);
            for line in dump.lines().skip(first_row).take(last_row - first_row) {
                println!("{}", line);
            }
        }
        None => print!("{}", dump),
    }

    Ok(())
}
