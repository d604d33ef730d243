// vidmatch-cli/src/main.rs
//
// Entry point for the vidmatch binary: parses arguments, installs the
// optional run log, dispatches to a command and maps failures to exit
// code 1.

use clap::Parser;
use console::style;
use std::process;
use vidmatch::cli::{Cli, Commands};
use vidmatch::logging::{file_log_level, get_timestamp};
use vidmatch::{run_compare, run_info};
use vidmatch_core::file_logging::{run_log_path, setup_file_logging};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare(args) => {
            if let Some(log_dir) = &args.log_dir {
                let log_path = run_log_path(log_dir, "compare", &get_timestamp());
                if let Err(e) = setup_file_logging(&log_path, file_log_level(cli.verbose)) {
                    eprintln!(
                        "{}",
                        style(format!(
                            "Warning: could not open log file {}: {e}",
                            log_path.display()
                        ))
                        .yellow()
                    );
                }
            }
            run_compare(args)
        }
        Commands::Info(args) => run_info(args),
    };

    if let Err(e) = result {
        eprintln!("{}", style(format!("Error: {e}")).red().bold());
        process::exit(1);
    }
}
