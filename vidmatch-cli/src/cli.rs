// vidmatch-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vidmatch_core::config::{DEFAULT_HISTOGRAM_BINS, DEFAULT_DIFF_THRESHOLD, DEFAULT_SIMILARITY_THRESHOLD};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "vidmatch: find visually similar videos",
    long_about = "Compares videos by their keyframe color histograms using ffmpeg via vidmatch-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log at debug level (only affects --log-dir output)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scores every pair of input videos and lists likely duplicates
    Compare(CompareArgs),
    /// Prints probed metadata for each input video
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Video files or directories of videos (directories are not searched recursively)
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Report pairs scoring at or below this distance (0 = identical, 1 = unrelated)
    #[arg(
        long,
        value_name = "SCORE",
        env = "VIDMATCH_THRESHOLD",
        default_value_t = DEFAULT_SIMILARITY_THRESHOLD
    )]
    pub threshold: f64,

    /// Mean grayscale difference a frame needs to become a keyframe
    #[arg(long, value_name = "DIFF", default_value_t = DEFAULT_DIFF_THRESHOLD)]
    pub diff_threshold: f64,

    /// Histogram bins per color channel
    #[arg(long, value_name = "N", default_value_t = DEFAULT_HISTOGRAM_BINS)]
    pub bins: usize,

    /// Print every scored pair, not only those under the threshold
    #[arg(long)]
    pub all: bool,

    /// Emit JSON lines instead of the interactive display
    #[arg(long)]
    pub json: bool,

    /// Optional: Directory for a run log file
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Video files to probe
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Print one JSON object per file
    #[arg(long)]
    pub json: bool,
}
