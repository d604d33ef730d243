use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Logger, Root},
    encode::pattern::PatternEncoder,
};
use std::path::{Path, PathBuf};

/// Line layout of the run log.
pub const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}";

/// Third-party targets that log every ffmpeg line; capped at warn so the
/// run log stays about the comparison.
const NOISY_TARGETS: &[&str] = &["ffmpeg_sidecar", "rayon_core"];

/// Routes the `log` facade to a fresh `log_file` at `log_level`.
///
/// Creates the parent directory if needed. Can only succeed once per
/// process, since the global logger is set here.
pub fn setup_file_logging(log_file: &Path, log_level: LevelFilter) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }

    let file_appender = FileAppender::builder()
        .append(false)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(log_file)
        .with_context(|| format!("opening log file {}", log_file.display()))?;

    let mut builder =
        Config::builder().appender(Appender::builder().build("file", Box::new(file_appender)));
    for target in NOISY_TARGETS {
        builder = builder.logger(Logger::builder().build(*target, log_level.min(LevelFilter::Warn)));
    }
    let config = builder.build(Root::builder().appender("file").build(log_level))?;

    log4rs::init_config(config)?;
    log::info!("vidmatch {} logging to {}", env!("CARGO_PKG_VERSION"), log_file.display());

    Ok(())
}

/// Log file for one CLI run: `<log_dir>/vidmatch_<command>_run_<timestamp>.log`.
pub fn run_log_path(log_dir: &Path, command: &str, timestamp: &str) -> PathBuf {
    log_dir.join(format!("vidmatch_{command}_run_{timestamp}.log"))
}
