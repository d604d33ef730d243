// vidmatch-cli/src/lib.rs
//
// Library portion of the vidmatch CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, CompareArgs, InfoArgs};
pub use commands::compare::run_compare;
pub use commands::info::run_info;
pub use error::{CliErrorContext, CliResult};
