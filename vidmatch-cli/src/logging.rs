// ============================================================================
// vidmatch-cli/src/logging.rs
// ============================================================================
//
// LOGGING UTILITIES: helpers for the optional run log
//
// Console output goes through the core reporters. The `log` facade is only
// wired up when `--log-dir` is given, in which case main.rs installs the
// core's log4rs file logger.

use log::LevelFilter;

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Log level for the run log file.
pub fn file_log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
