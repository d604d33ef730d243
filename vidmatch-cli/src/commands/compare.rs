// ============================================================================
// vidmatch-cli/src/commands/compare.rs
// ============================================================================
//
// COMPARE COMMAND: pairwise similarity over a set of videos
//
// Expands directory arguments into their video files, runs the comparison on
// the core's background worker and renders events through the terminal or
// JSON reporter, mirrored into the run log.

use console::style;
use log::{debug, info};
use serde_json::json;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;
use vidmatch_core::file_logging::LoggingReporter;
use vidmatch_core::{
    CompareConfigBuilder, ComparisonResults, ComparisonService, ComparisonSummary,
    CompositeReporter, CoreError, JsonReporter, PairScore, Reporter, SidecarOpener,
    TerminalReporter, check_ffmpeg_tools, find_video_files,
};

use crate::cli::CompareArgs;
use crate::error::{CliErrorContext, CliResult};

/// Expands each argument: directories contribute their video files, anything
/// else is passed through as given so the core can warn about it.
pub fn collect_inputs(paths: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for path in paths {
        if !path.is_dir() {
            inputs.push(path.clone());
            continue;
        }
        match find_video_files(path) {
            Ok(files) => inputs.extend(files),
            Err(CoreError::NoFilesFound) => {
                debug!("No video files in {}", path.display());
            }
            Err(e) => {
                return Err(e).cli_with_context(|| format!("Failed to scan {}", path.display()));
            }
        }
    }
    Ok(inputs)
}

/// Distinct inputs that exist on disk; a path listed twice counts once.
pub fn count_present(inputs: &[PathBuf]) -> usize {
    inputs
        .iter()
        .filter(|p| p.exists())
        .collect::<HashSet<_>>()
        .len()
}

pub fn run_compare(args: CompareArgs) -> CliResult<()> {
    let start = Instant::now();
    let inputs = collect_inputs(&args.paths)?;

    if inputs.is_empty() {
        if args.json {
            println!("{}", json!({ "type": "no_videos" }));
        } else {
            println!("{}", style("No video files to compare.").yellow());
        }
        return Ok(());
    }

    let existing = count_present(&inputs);
    if existing > 0 {
        check_ffmpeg_tools()?;
    }

    let config = CompareConfigBuilder::new()
        .diff_threshold(args.diff_threshold)
        .uniform_bins(args.bins)
        .similarity_threshold(args.threshold)
        .build();
    config.validate()?;

    info!(
        "Comparing {} inputs ({} present) with diff threshold {}, {} bins, threshold {}",
        inputs.len(),
        existing,
        config.diff_threshold,
        args.bins,
        config.similarity_threshold
    );

    let display: Box<dyn Reporter> = if args.json {
        Box::new(JsonReporter::new())
    } else {
        Box::new(TerminalReporter::new())
    };
    let reporter = CompositeReporter::new()
        .with(display)
        .with(Box::new(LoggingReporter::new()));

    let service = ComparisonService::new();
    let job = service.start(SidecarOpener::new(), inputs, config.clone())?;
    let results = job.forward_to(&reporter)?;

    let summary = ComparisonSummary::from_results(
        &results,
        existing,
        config.similarity_threshold,
        start.elapsed(),
    );
    reporter.comparison_complete(&summary);

    if args.all {
        if args.json {
            print_all_pairs_json(&results)?;
        } else {
            print_all_pairs(&results);
        }
    }

    Ok(())
}

fn print_all_pairs(results: &ComparisonResults) {
    println!("\n{}", style("ALL PAIRS").bold().cyan());
    if results.is_empty() {
        println!("  {}", style("No pairs were compared").dim());
        return;
    }
    for pair in results {
        let score = match pair.score {
            PairScore::Score(value) => style(format!("{value:>8.4}")).bold(),
            PairScore::NoScore => style(format!("{:>8}", "no score")).dim(),
        };
        println!(
            "  {} {} <-> {}",
            score,
            pair.left.display(),
            pair.right.display()
        );
    }
}

fn print_all_pairs_json(results: &ComparisonResults) -> CliResult<()> {
    let pairs = serde_json::to_value(results.iter().collect::<Vec<_>>())
        .map_err(|e| CoreError::JsonParseError(e.to_string()))?;
    println!("{}", json!({ "type": "all_pairs", "pairs": pairs }));
    Ok(())
}
