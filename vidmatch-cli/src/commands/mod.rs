//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Pairwise comparison of input videos.
pub mod compare;

/// Metadata dump for individual files.
pub mod info;
