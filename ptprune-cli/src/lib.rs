//! ptprune CLI library
//!
//! Command-line front end for the `ptprune-core` phrase-table pruner:
//! argument parsing, configuration files, logging and progress reporting.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod progress;

pub use error::{CliError, CliResult};
