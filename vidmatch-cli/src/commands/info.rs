// vidmatch-cli/src/commands/info.rs
//
// `vidmatch info`: probes each file with ffprobe and prints its details.

use console::style;
use vidmatch_core::{
    CoreError, VideoDetails, check_dependency, format_duration, probe_video_details,
};

use crate::cli::InfoArgs;
use crate::error::CliResult;

pub fn run_info(args: InfoArgs) -> CliResult<()> {
    if args.paths.iter().any(|p| p.exists()) {
        check_dependency("ffprobe")?;
    }

    let mut failures = 0usize;
    for path in &args.paths {
        let details = if path.is_file() {
            probe_video_details(path)
        } else {
            Err(CoreError::PathError(format!(
                "File not found: {}",
                path.display()
            )))
        };

        match details {
            Ok(details) if args.json => {
                let line = serde_json::to_string(&details)
                    .map_err(|e| CoreError::JsonParseError(e.to_string()))?;
                println!("{line}");
            }
            Ok(details) => print_details(&details),
            Err(e) => {
                failures += 1;
                eprintln!("{}", style(format!("WARN: {}: {e}", path.display())).yellow());
            }
        }
    }

    if failures > 0 {
        return Err(CoreError::OperationFailed(format!(
            "{failures} of {} files could not be probed",
            args.paths.len()
        )));
    }
    Ok(())
}

fn print_details(details: &VideoDetails) {
    println!("\n{}", style(&details.filename).bold().cyan());
    println!(
        "  {:<12} {}x{}",
        style("Resolution:").bold(),
        details.width,
        details.height
    );
    match details.fps {
        Some(fps) => println!("  {:<12} {fps:.3}", style("Frame rate:").bold()),
        None => println!("  {:<12} unknown", style("Frame rate:").bold()),
    }
    match details.frame_count {
        Some(frames) => println!("  {:<12} {frames}", style("Frames:").bold()),
        None => println!("  {:<12} unknown", style("Frames:").bold()),
    }
    println!(
        "  {:<12} {}",
        style("Duration:").bold(),
        details
            .duration_secs
            .map(format_duration)
            .unwrap_or_else(|| "unknown".to_string())
    );
    println!(
        "  {:<12} {}",
        style("Codec:").bold(),
        details.codec.as_deref().unwrap_or("unknown")
    );
    println!("  {:<12} {}", style("Size:").bold(), details.size_readable);
    if details.bitrate_kbps > 0 {
        println!(
            "  {:<12} {} kb/s",
            style("Bitrate:").bold(),
            details.bitrate_kbps
        );
    }
}
