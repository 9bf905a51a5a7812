//! Scan command: run the detectors, verify key candidates and print the
//! ranked suggestions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bytelens::codec::hex::format_offset;
use bytelens::{Engine, Suggestion, VerificationReport};
use clap::Args;
use owo_colors::OwoColorize;

use super::{InputArgs, build_engine, load_input};
use crate::settings::Settings;

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Skip account verification of public key candidates
    #[arg(long)]
    pub no_verify: bool,

    /// Send verification requests in batches
    #[arg(long)]
    pub batch: bool,

    /// Show suggestions below the display threshold too
    #[arg(long)]
    pub all: bool,

    /// Accept every maximum-confidence suggestion
    #[arg(long)]
    pub accept_max: bool,

    /// Write accepted annotations to this JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Print suggestions as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(mut settings: Settings, patterns: Option<PathBuf>, args: ScanArgs) -> Result<()> {
    if args.batch {
        settings.batching = true;
    }
    let mut engine = build_engine(&settings, patterns)?;
    load_input(&mut engine, &args.input).await?;

    let job = engine.run_detectors()?;
    if args.no_verify {
        println!("Skipping verification of {} key candidates", job.candidates().len());
    } else if !job.candidates().is_empty() {
        println!("Verifying {} key candidates...", job.candidates().len());
        let report = job.run().await;
        print_report(&report);
    }

    let suggestions = if args.all {
        engine.all_suggestions()
    } else {
        engine.ranked_suggestions()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else {
        print_suggestions(&suggestions);
    }

    if args.accept_max {
        accept_max(&mut engine);
    }

    if let Some(path) = &args.export {
        engine
            .export_annotations(path)
            .with_context(|| format!("Failed to export annotations to {}", path.display()))?;
        println!("Annotations saved to: {}", path.display());
    }

    let metrics = engine.metrics();
    tracing::debug!(
        "cache hits={} misses={} rpc requests={} failures={}",
        metrics.cache_hits,
        metrics.cache_misses,
        metrics.rpc_requests,
        metrics.rpc_failures
    );

    Ok(())
}

fn accept_max(engine: &mut Engine) {
    for suggestion in engine.max_confidence_suggestions() {
        match engine.accept_suggestion(&suggestion.key(), None) {
            Ok(annotation) => println!(
                "{} {} at {}",
                "accepted".green(),
                annotation.name,
                annotation.range
            ),
            Err(e) => println!("{} {}: {}", "skipped".yellow(), suggestion.range, e),
        }
    }
}

fn print_report(report: &VerificationReport) {
    println!(
        "Verification: {} funded, {} empty, {} failed ({} from cache)",
        report.positive.green(),
        report.negative,
        report.failures.len().red(),
        report.cache_hits
    );
    for failure in &report.failures {
        println!(
            "  {:<8} {} [{}] {}",
            format_offset(failure.offset),
            failure.address,
            failure.category,
            failure.message
        );
    }
}

fn print_suggestions(suggestions: &[Suggestion]) {
    if suggestions.is_empty() {
        println!("No suggestions.");
        return;
    }

    println!();
    println!("{:<12} {:<22} {:>6}  VALUE", "RANGE", "KIND", "CONF");
    for s in suggestions {
        let confidence = confidence_cell(s);
        let mut value = s.value.clone();
        if let Some(info) = &s.metadata {
            value.push_str(&format!(" ({} lamports, owner {})", info.lamports, info.owner));
        }
        println!(
            "{:<12} {:<22} {}  {}",
            s.range.to_string(),
            s.kind.to_string(),
            confidence,
            value
        );
    }
}

/// Fixed-width confidence column. Padded before coloring; escape codes
/// would otherwise count toward the width.
fn confidence_cell(s: &Suggestion) -> String {
    let cell = format!("{:>6.2}", s.confidence);
    if s.is_max_confidence() {
        cell.green().bold().to_string()
    } else if s.confidence >= 0.85 {
        cell.cyan().to_string()
    } else {
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytelens::{ByteRange, SuggestionKind};

    fn suggestion(confidence: f64) -> Suggestion {
        Suggestion::new(SuggestionKind::U32, ByteRange::new(0, 4), "1000", confidence)
    }

    #[test]
    fn test_confidence_cell_pads_inside_color() {
        let plain = confidence_cell(&suggestion(0.8));
        assert_eq!(plain, "  0.80");

        let colored = confidence_cell(&suggestion(1.0));
        assert!(colored.contains("  1.00"));
        assert!(colored.len() > 6);

        let cyan = confidence_cell(&suggestion(0.9));
        assert!(cyan.contains("  0.90"));
    }
}
