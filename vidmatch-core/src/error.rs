//! Error types for the vidmatch-core library.
//!
//! Almost nothing inside a comparison run is fatal: unreadable videos and
//! decode failures are logged and degrade to "no fingerprints". The variants
//! here surface at the edges instead (configuration validation, probing a
//! single file, starting a worker, file discovery).

use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// Custom error types for vidmatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, io::Error),

    #[error("{0} failed with status {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Failed to wait for {0}: {1}")]
    CommandWait(String, io::Error),

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to parse ffprobe output: {0}")]
    FfprobeParse(String),

    #[error("Video information error: {0}")]
    VideoInfoError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("No video files found")]
    NoFilesFound,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("A comparison is already running")]
    AlreadyRunning,

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for vidmatch-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`] for a command that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds a [`CoreError::CommandFailed`] for a command that ran but failed.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}

/// Builds a [`CoreError::CommandWait`] for a command whose exit could not be collected.
pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}
