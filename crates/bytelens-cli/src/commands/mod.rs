//! CLI command implementations.
//!
//! Every command loads a buffer the same way (hex argument, hex file or
//! account address) and builds the engine from the operator settings.

pub mod hexdump;
pub mod interpret;
pub mod scan;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use bytelens::{
    BoardEvent, BoardObserver, ByteRange, Engine, HttpTransport, PatternDatabase, SystemClock,
};
use clap::Args;
use owo_colors::OwoColorize;

use crate::settings::Settings;

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Hex bytes (whitespace and 0x prefixes are ignored)
    #[arg(long, conflicts_with_all = ["file", "account"])]
    pub hex: Option<String>,

    /// File containing hex text
    #[arg(long, conflicts_with = "account")]
    pub file: Option<PathBuf>,

    /// Account address whose data should be loaded
    #[arg(long)]
    pub account: Option<String>,
}

/// Prints verification failures as they happen.
struct ConsoleObserver;

impl BoardObserver for ConsoleObserver {
    fn on_event(&self, event: &BoardEvent) {
        if let BoardEvent::VerificationFailed { address, category } = event {
            eprintln!(
                "{} {}: {}",
                "verification failed".yellow(),
                address,
                category.describe()
            );
        }
    }
}

pub fn build_engine(settings: &Settings, patterns: Option<PathBuf>) -> Result<Engine> {
    let config = settings.engine_config();
    let transport = HttpTransport::new(config.request_timeout)
        .context("Failed to create RPC transport")?;

    let patterns = match patterns.or_else(|| settings.patterns.clone()) {
        Some(path) => PatternDatabase::load_or_empty(path),
        None => PatternDatabase::new(),
    };

    let engine = Engine::new(config, patterns, Arc::new(transport), Arc::new(SystemClock));
    engine.subscribe(Arc::new(ConsoleObserver));
    Ok(engine)
}

pub async fn load_input(engine: &mut Engine, input: &InputArgs) -> Result<()> {
    if let Some(hex) = &input.hex {
        engine.load_hex(hex).context("Invalid hex input")?;
    } else if let Some(path) = &input.file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        engine
            .load_hex(&content)
            .with_context(|| format!("Invalid hex in {}", path.display()))?;
    } else if let Some(address) = &input.account {
        let info = engine
            .load_account(address)
            .await
            .with_context(|| format!("Failed to load account {}", address))?;
        println!(
            "Account {}: {} bytes, {} lamports, owner {}",
            address,
            info.data.len(),
            info.lamports,
            info.owner
        );
    } else {
        bail!("No input given: use --hex, --file or --account");
    }
    Ok(())
}

/// Parse `start..end` or `start+len` (decimal or 0x-prefixed hex).
pub fn parse_range(input: &str) -> Result<ByteRange> {
    let parse = |s: &str| -> Result<usize> {
        let s = s.trim();
        let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => usize::from_str_radix(hex, 16),
            None => s.parse(),
        };
        value.with_context(|| format!("Invalid offset: {}", s))
    };

    let (start, end) = if let Some((start, end)) = input.split_once("..") {
        (parse(start)?, parse(end)?)
    } else if let Some((start, len)) = input.split_once('+') {
        let start = parse(start)?;
        (start, start + parse(len)?)
    } else {
        let start = parse(input)?;
        (start, start + 1)
    };

    if start >= end {
        bail!("Empty range: {}", input);
    }
    Ok(ByteRange::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_forms() {
        assert_eq!(parse_range("4..8").unwrap(), ByteRange::new(4, 8));
        assert_eq!(parse_range("0x10+4").unwrap(), ByteRange::new(16, 20));
        assert_eq!(parse_range("7").unwrap(), ByteRange::new(7, 8));
    }

    #[test]
    fn test_parse_range_rejects_bad_input() {
        assert!(parse_range("8..4").is_err());
        assert!(parse_range("a..b").is_err());
        assert!(parse_range("3+0").is_err());
    }
}
